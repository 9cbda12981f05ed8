use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::charts::{MISSED_LABEL, ON_TARGET_LABEL, ShotSplit, format_corr};
use crate::correlation::CorrelationMatrix;
use crate::report::Report;
use crate::state::Delta;

pub struct ExportReport {
    pub path: PathBuf,
    pub data_rows: usize,
    pub shot_rows: usize,
    pub correlation_rows: usize,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

enum Cell {
    Text(String),
    Number(f64),
}

pub fn default_export_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("euro2024_report_{stamp}.xlsx"))
}

pub fn export_report(path: &Path, report: &Report) -> Result<ExportReport> {
    export_report_with_progress(path, report, |_| {})
}

pub fn export_report_with_progress(
    path: &Path,
    report: &Report,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportReport> {
    const TOTAL: usize = 4;

    on_progress(ExportProgress {
        current: 0,
        total: TOTAL,
        message: "Building data sheet".to_string(),
    });
    let mut data_rows = vec![
        std::iter::once(Cell::Text("team".to_string()))
            .chain(report.view.columns.iter().map(|c| Cell::Text(c.clone())))
            .collect::<Vec<_>>(),
    ];
    for row in &report.view.rows {
        data_rows.push(
            std::iter::once(Cell::Text(row.team.clone()))
                .chain(row.values.iter().map(|v| Cell::Number(*v)))
                .collect(),
        );
    }

    on_progress(ExportProgress {
        current: 1,
        total: TOTAL,
        message: "Building shots sheet".to_string(),
    });
    let mut shot_rows = vec![
        ["Team", "Category", "Count", "Percent"]
            .iter()
            .map(|h| Cell::Text(h.to_string()))
            .collect::<Vec<_>>(),
    ];
    for split in &report.shots {
        shot_rows.extend(shot_split_rows(split));
    }

    on_progress(ExportProgress {
        current: 2,
        total: TOTAL,
        message: "Building correlation sheet".to_string(),
    });
    let corr_rows = correlation_rows(&report.correlation);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Data")?;
        write_rows(sheet, &data_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Shots")?;
        write_rows(sheet, &shot_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Correlation")?;
        write_rows(sheet, &corr_rows)?;
    }

    on_progress(ExportProgress {
        current: 3,
        total: TOTAL,
        message: format!("Saving {}", path.display()),
    });
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    on_progress(ExportProgress {
        current: TOTAL,
        total: TOTAL,
        message: "Export complete".to_string(),
    });

    Ok(ExportReport {
        path: path.to_path_buf(),
        data_rows: data_rows.len().saturating_sub(1),
        shot_rows: shot_rows.len().saturating_sub(1),
        correlation_rows: corr_rows.len().saturating_sub(1),
    })
}

/// Runs the export off the UI thread, reporting through `tx`.
pub fn spawn_export(tx: mpsc::Sender<Delta>, path: PathBuf, report: Report) {
    std::thread::spawn(move || {
        let display = path.display().to_string();
        let _ = tx.send(Delta::ExportStarted {
            path: display.clone(),
            total: 0,
        });

        let progress_tx = tx.clone();
        let result = export_report_with_progress(&path, &report, |progress| {
            let _ = progress_tx.send(Delta::ExportProgress {
                current: progress.current,
                total: progress.total,
                message: progress.message,
            });
        });

        let _ = match result {
            Ok(done) => tx.send(Delta::ExportFinished {
                path: display,
                data_rows: done.data_rows,
                shot_rows: done.shot_rows,
            }),
            Err(err) => tx.send(Delta::ExportFailed {
                path: display,
                error: format!("{err:#}"),
            }),
        };
    });
}

fn shot_split_rows(split: &ShotSplit) -> Vec<Vec<Cell>> {
    vec![
        vec![
            Cell::Text(split.team.clone()),
            Cell::Text(ON_TARGET_LABEL.to_string()),
            Cell::Number(split.shots_on_target),
            Cell::Number(split.on_target_pct()),
        ],
        vec![
            Cell::Text(split.team.clone()),
            Cell::Text(MISSED_LABEL.to_string()),
            Cell::Number(split.missed_shots),
            Cell::Number(split.missed_pct()),
        ],
    ]
}

fn correlation_rows(matrix: &CorrelationMatrix) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        std::iter::once(Cell::Text(String::new()))
            .chain(matrix.columns.iter().map(|c| Cell::Text(c.clone())))
            .collect::<Vec<_>>(),
    ];
    for (name, values) in matrix.columns.iter().zip(&matrix.values) {
        rows.push(
            std::iter::once(Cell::Text(name.clone()))
                .chain(values.iter().map(|r| {
                    if r.is_nan() {
                        Cell::Text(format_corr(*r))
                    } else {
                        Cell::Number((r * 100.0).round() / 100.0)
                    }
                }))
                .collect(),
        );
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let written = match value {
                Cell::Text(text) => worksheet.write_string(row_idx as u32, col_idx as u16, text),
                Cell::Number(num) => worksheet.write_number(row_idx as u32, col_idx as u16, *num),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
