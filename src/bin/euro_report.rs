use std::path::PathBuf;

use anyhow::{Result, bail};

use euro24_terminal::aggregate::Selection;
use euro24_terminal::charts::{COLORBAR_TITLE, format_corr};
use euro24_terminal::config::Config;
use euro24_terminal::dataset::load_dataset;
use euro24_terminal::export;
use euro24_terminal::report::{
    DATA_HEADER, HEATMAP_HEADER, PAGE_TITLE, Report, SHOTS_HEADER, SUBHEADER,
};

struct Args {
    teams: Vec<String>,
    xlsx: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        teams: Vec::new(),
        xlsx: None,
        json: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--xlsx" => {
                let Some(path) = iter.next() else {
                    bail!("--xlsx needs a file path");
                };
                args.xlsx = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("usage: euro_report [--json] [--xlsx <path>] [TEAM ...]");
                std::process::exit(0);
            }
            _ => args.teams.push(arg),
        }
    }
    Ok(args)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load();
    let dataset = load_dataset(&config.dataset_path)?;
    let selection = Selection::from_teams(args.teams);
    let report = Report::build(&dataset, &selection)?;

    for team in report.missing_teams() {
        eprintln!("warn: no rows for selected team '{team}'");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = args.xlsx {
        let done = export::export_report(&path, &report)?;
        eprintln!(
            "wrote {} ({} teams, {} shot rows, {} correlation rows)",
            done.path.display(),
            done.data_rows,
            done.shot_rows,
            done.correlation_rows
        );
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("{PAGE_TITLE}");
    println!("{SUBHEADER}");
    println!();

    println!("{COLORBAR_TITLE}");
    for cell in &report.map {
        let region = if cell.location.is_some() { "" } else { "  (no map region)" };
        println!(
            "  {:<16} goals {:>4.0}  on target {:>4.0}  rgb({},{},{}){region}",
            cell.team, cell.goals, cell.shots_on_target, cell.color.0, cell.color.1, cell.color.2
        );
    }
    println!();

    println!("{DATA_HEADER}");
    let view = &report.view;
    print!("  {:<16}", "team");
    for column in &view.columns {
        print!(" {column:>16}");
    }
    println!();
    for row in &view.rows {
        print!("  {:<16}", row.team);
        for value in &row.values {
            print!(" {value:>16}");
        }
        println!();
    }
    println!();

    println!("{SHOTS_HEADER}");
    if report.shots.is_empty() {
        println!("  (no teams selected)");
    }
    for split in &report.shots {
        println!("  {}", split.title());
        for (label, count, pct) in split.slices() {
            println!("    {label:<16} {count:>5.0}  {pct:>5.1}%");
        }
    }
    println!();

    println!("{HEATMAP_HEADER}");
    let matrix = &report.correlation;
    print!("  {:<16}", "");
    for column in &matrix.columns {
        print!(" {column:>16}");
    }
    println!();
    for (name, values) in matrix.columns.iter().zip(&matrix.values) {
        print!("  {name:<16}");
        for r in values {
            print!(" {:>16}", format_corr(*r));
        }
        println!();
    }
}
