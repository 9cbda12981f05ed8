use std::path::PathBuf;

use euro24_terminal::aggregate::{Selection, aggregate};
use euro24_terminal::charts::{MISSED_LABEL, ON_TARGET_LABEL};
use euro24_terminal::correlation::{HEATMAP_COLUMNS, correlation_matrix};
use euro24_terminal::dataset::{
    Dataset, GOALS_SCORED, KEEPER_SAVES, SHOTS_ON_TARGET, TOTAL_SHOTS, load_dataset,
};
use euro24_terminal::report::Report;

fn load_fixture(name: &str) -> Dataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    load_dataset(&path).expect("fixture should load")
}

#[test]
fn view_teams_stay_within_selection() {
    let ds = load_fixture("euro_sample.csv");
    let selections = [
        Selection::new(),
        Selection::from_teams(["Spain"]),
        Selection::from_teams(["Italy", "Georgia", "Atlantis"]),
    ];
    for sel in &selections {
        let view = aggregate(&ds, sel);
        for team in view.teams() {
            if sel.is_empty() {
                assert!(ds.contains_team(team));
            } else {
                assert!(sel.contains(team), "{team} not in selection");
            }
        }
    }
}

#[test]
fn empty_selection_keeps_every_team_sorted() {
    let ds = load_fixture("euro_sample.csv");
    let report = Report::build(&ds, &Selection::new()).unwrap();
    assert_eq!(
        report.view.teams(),
        vec!["England", "Georgia", "Germany", "Italy", "Spain"]
    );
    assert_eq!(report.map.len(), 5);
    assert!(report.shots.is_empty());
    for record in &ds.records {
        let row = report.view.row(&record.team).expect("every team present");
        let expected: Vec<f64> = record.values.iter().map(|v| v.unwrap_or(0.0)).collect();
        assert_eq!(row.values, expected);
    }
}

#[test]
fn text_columns_are_left_out_of_the_view() {
    let ds = load_fixture("euro_sample.csv");
    let view = aggregate(&ds, &Selection::new());
    assert!(view.column_index("coach").is_none());
    assert_eq!(view.columns().len(), 5);
}

#[test]
fn missed_shots_complete_the_total() {
    let ds = load_fixture("euro_sample.csv");
    let sel = Selection::from_teams(ds.teams());
    let report = Report::build(&ds, &sel).unwrap();
    assert_eq!(report.shots.len(), 5);
    for split in &report.shots {
        let total = report.view.value(&split.team, TOTAL_SHOTS).unwrap();
        let on_target = report.view.value(&split.team, SHOTS_ON_TARGET).unwrap();
        assert_eq!(split.missed_shots, total - on_target);
        assert_eq!(split.shots_on_target + split.missed_shots, total);
    }
}

#[test]
fn germany_pie_is_half_and_half() {
    let ds = load_fixture("germany.csv");
    let report = Report::build(&ds, &Selection::from_teams(["Germany"])).unwrap();
    assert_eq!(report.shots.len(), 1);
    let split = &report.shots[0];
    assert_eq!(split.title(), "Germany - Shots on Target vs Total Shots");
    let [on, missed] = split.slices();
    assert_eq!(on.0, ON_TARGET_LABEL);
    assert_eq!(on.1, 10.0);
    assert_eq!(missed.0, MISSED_LABEL);
    assert_eq!(missed.1, 10.0);
    assert!((on.2 - 50.0).abs() < 1e-9);
}

#[test]
fn unknown_team_yields_empty_view_without_pies() {
    let ds = load_fixture("euro_sample.csv");
    let report = Report::build(&ds, &Selection::from_teams(["Atlantis"])).unwrap();
    assert!(report.view.is_empty());
    assert!(report.map.is_empty());
    assert!(report.shots.is_empty());
    assert_eq!(report.missing_teams(), vec!["Atlantis"]);
    assert!(report.correlation.values.iter().flatten().all(|r| r.is_nan()));
}

#[test]
fn pies_follow_pick_order_and_skip_unknown() {
    let ds = load_fixture("euro_sample.csv");
    let sel = Selection::from_teams(["Italy", "Atlantis", "Spain"]);
    let report = Report::build(&ds, &sel).unwrap();
    let teams: Vec<&str> = report.shots.iter().map(|s| s.team.as_str()).collect();
    assert_eq!(teams, vec!["Italy", "Spain"]);
    assert_eq!(report.view.teams(), vec!["Italy", "Spain"]);
}

#[test]
fn repeated_team_rows_are_summed() {
    let ds = load_fixture("multi_row.csv");
    let view = aggregate(&ds, &Selection::new());
    assert_eq!(view.teams(), vec!["France", "Spain"]);
    assert_eq!(view.value("Spain", GOALS_SCORED), Some(3.0));
    assert_eq!(view.value("Spain", TOTAL_SHOTS), Some(25.0));
    assert_eq!(view.value("Spain", SHOTS_ON_TARGET), Some(11.0));
    assert_eq!(view.value("Spain", KEEPER_SAVES), Some(2.0));
    assert_eq!(view.value("France", SHOTS_ON_TARGET), Some(3.0));
    assert_eq!(view.value("France", KEEPER_SAVES), Some(7.0));
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let ds = load_fixture("euro_sample.csv");
    let view = aggregate(&ds, &Selection::new());
    let matrix = correlation_matrix(&view, &HEATMAP_COLUMNS).unwrap();
    assert_eq!(matrix.size(), 4);
    for i in 0..4 {
        assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-9);
        for j in 0..4 {
            let a = matrix.get(i, j).unwrap();
            let b = matrix.get(j, i).unwrap();
            assert_eq!(a, b);
            assert!((-1.0..=1.0).contains(&a));
        }
    }
    // goals and total shots move together in this sample
    assert!(matrix.get(0, 1).unwrap() > 0.9);
}

#[test]
fn correlation_rejects_unknown_column() {
    let ds = load_fixture("euro_sample.csv");
    let view = aggregate(&ds, &Selection::new());
    assert!(correlation_matrix(&view, &["goals_scored", "xG"]).is_err());
}

#[test]
fn choropleth_colors_span_the_gradient() {
    let ds = load_fixture("euro_sample.csv");
    let report = Report::build(&ds, &Selection::new()).unwrap();
    let spain = report.map.iter().find(|c| c.team == "Spain").unwrap();
    let italy = report.map.iter().find(|c| c.team == "Italy").unwrap();
    assert_eq!(spain.goals, 15.0);
    assert_eq!(spain.shots_on_target, 42.0);
    assert_eq!((spain.color.0, spain.color.1, spain.color.2), (173, 216, 230));
    assert_eq!((italy.color.0, italy.color.1, italy.color.2), (0, 0, 255));
    assert!(report.map.iter().all(|c| c.location.is_some()));
}

#[test]
fn unplaced_team_stays_on_the_map() {
    let ds = load_fixture("unplaced.csv");
    let report = Report::build(&ds, &Selection::new()).unwrap();
    assert_eq!(report.view.teams(), vec!["Atlantis United", "Croatia"]);
    let atlantis = report
        .map
        .iter()
        .find(|c| c.team == "Atlantis United")
        .expect("team without a region is kept");
    assert!(atlantis.location.is_none());
    assert_eq!(atlantis.goals, 2.0);
    let croatia = report.map.iter().find(|c| c.team == "Croatia").unwrap();
    assert!(croatia.location.is_some());
}

#[test]
fn single_team_map_uses_midpoint_color() {
    let ds = load_fixture("euro_sample.csv");
    let report = Report::build(&ds, &Selection::from_teams(["Georgia"])).unwrap();
    assert_eq!(report.map.len(), 1);
    let cell = &report.map[0];
    assert_eq!((cell.color.0, cell.color.1, cell.color.2), (0, 128, 255));

    let ds = load_fixture("germany.csv");
    let report = Report::build(&ds, &Selection::new()).unwrap();
    let cell = &report.map[0];
    assert_eq!((cell.color.0, cell.color.1, cell.color.2), (0, 128, 255));
}

#[test]
fn blank_team_rows_join_no_group() {
    let ds = load_fixture("unplaced.csv");
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.teams(), vec!["Atlantis United".to_string(), "Croatia".to_string()]);
    let view = aggregate(&ds, &Selection::new());
    assert!(view.row("").is_none());
    assert_eq!(view.value("Croatia", GOALS_SCORED), Some(3.0));
}
