use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;

pub const DEFAULT_DATASET_FILE: &str = "Euro_2024_Team_Stats_Reduced.csv";

pub const TEAM_COLUMN: &str = "team";
pub const GOALS_SCORED: &str = "goals_scored";
pub const TOTAL_SHOTS: &str = "Total shots";
pub const SHOTS_ON_TARGET: &str = "Shots on target";
pub const ACCURATE_PASSES: &str = "Accurate passes";
pub const KEEPER_SAVES: &str = "Keeper saves";

// Cell values read as missing, the same set pandas' `read_csv` uses by default.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub const REQUIRED_NUMERIC_COLUMNS: [&str; 5] = [
    GOALS_SCORED,
    TOTAL_SHOTS,
    SHOTS_ON_TARGET,
    ACCURATE_PASSES,
    KEEPER_SAVES,
];

#[derive(Debug, Clone, Serialize)]
pub struct TeamRecord {
    // Empty when the cell was blank or a missing marker; such rows join no group.
    pub team: String,
    // Parallel to `Dataset::numeric_columns`; `None` is an empty cell.
    pub values: Vec<Option<f64>>,
    // Parallel to `Dataset::text_columns`.
    pub text: Vec<String>,
}

/// Immutable in-memory copy of the stats file, one record per CSV row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub records: Vec<TeamRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.numeric_columns.iter().position(|c| c == name)
    }

    /// Distinct team names in first-seen order, as offered by the sidebar.
    pub fn teams(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for record in self.records.iter().filter(|r| !r.team.is_empty()) {
            if !out.iter().any(|t| t == &record.team) {
                out.push(record.team.clone());
            }
        }
        out
    }

    pub fn contains_team(&self, team: &str) -> bool {
        !team.is_empty() && self.records.iter().any(|r| r.team == team)
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    load_dataset_from_reader(file).with_context(|| format!("failed to load {}", path.display()))
}

pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("read header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let Some(team_idx) = headers.iter().position(|h| h == TEAM_COLUMN) else {
        bail!("missing required column '{TEAM_COLUMN}'");
    };
    for required in REQUIRED_NUMERIC_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("missing required column '{required}'");
        }
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("malformed row {}", line + 2))?;
        raw_rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    // A column is numeric when every present cell parses as a number.
    let mut numeric_idx = Vec::new();
    let mut text_idx = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if idx == team_idx {
            continue;
        }
        let numeric = raw_rows
            .iter()
            .all(|row| is_missing(&row[idx]) || parse_number(&row[idx]).is_some());
        if numeric {
            numeric_idx.push(idx);
        } else if REQUIRED_NUMERIC_COLUMNS.contains(&name.as_str()) {
            let (line, cell) = raw_rows
                .iter()
                .enumerate()
                .find(|(_, row)| !is_missing(&row[idx]) && parse_number(&row[idx]).is_none())
                .map(|(line, row)| (line + 2, row[idx].clone()))
                .ok_or_else(|| anyhow!("column '{name}' is not numeric"))?;
            bail!("column '{name}' expects a number, found '{cell}' on row {line}");
        } else {
            text_idx.push(idx);
        }
    }

    let records = raw_rows
        .into_iter()
        .map(|row| TeamRecord {
            team: if is_missing(&row[team_idx]) {
                String::new()
            } else {
                row[team_idx].clone()
            },
            values: numeric_idx.iter().map(|&i| parse_number(&row[i])).collect(),
            text: text_idx.iter().map(|&i| row[i].clone()).collect(),
        })
        .collect();

    Ok(Dataset {
        numeric_columns: numeric_idx.iter().map(|&i| headers[i].clone()).collect(),
        text_columns: text_idx.iter().map(|&i| headers[i].clone()).collect(),
        records,
    })
}

pub fn is_missing(raw: &str) -> bool {
    let cleaned = raw.trim();
    cleaned.is_empty() || NA_MARKERS.contains(&cleaned)
}

fn parse_number(raw: &str) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "team,goals_scored,Total shots,Shots on target,Accurate passes,Keeper saves";

    #[test]
    fn splits_numeric_and_text_columns() {
        let raw = format!("{HEADER},coach\nSpain,15,108,42,3400,9,de la Fuente\nItaly,3,50,14,2500,14,Spalletti\n");
        let ds = load_dataset_from_reader(raw.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.numeric_columns.len(), 5);
        assert_eq!(ds.text_columns, vec!["coach".to_string()]);
        assert_eq!(ds.records[0].values[0], Some(15.0));
    }

    #[test]
    fn empty_cell_is_missing_value() {
        let raw = format!("{HEADER}\nSpain,15,108,,3400,9\n");
        let ds = load_dataset_from_reader(raw.as_bytes()).unwrap();
        let idx = ds.column_index(SHOTS_ON_TARGET).unwrap();
        assert_eq!(ds.records[0].values[idx], None);
    }

    #[test]
    fn missing_markers_load_as_missing() {
        let raw = format!("{HEADER}\nSpain,15,108,42,3921,NA\nItaly,3,N/A,14,2500,null\n");
        let ds = load_dataset_from_reader(raw.as_bytes()).unwrap();
        let saves = ds.column_index(KEEPER_SAVES).unwrap();
        let shots = ds.column_index(TOTAL_SHOTS).unwrap();
        assert_eq!(ds.records[0].values[saves], None);
        assert_eq!(ds.records[1].values[shots], None);
        assert_eq!(ds.records[1].values[saves], None);
        assert_eq!(ds.records[0].values[shots], Some(108.0));
    }

    #[test]
    fn blank_team_is_left_out_of_sidebar() {
        let raw = format!("{HEADER}\n,1,1,1,1,1\nNA,2,2,2,2,2\nItaly,3,3,3,3,3\n");
        let ds = load_dataset_from_reader(raw.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.teams(), vec!["Italy".to_string()]);
        assert!(!ds.contains_team(""));
    }

    #[test]
    fn teams_are_distinct_in_first_seen_order() {
        let raw = format!("{HEADER}\nSpain,1,1,1,1,1\nItaly,1,1,1,1,1\nSpain,2,2,2,2,2\n");
        let ds = load_dataset_from_reader(raw.as_bytes()).unwrap();
        assert_eq!(ds.teams(), vec!["Spain".to_string(), "Italy".to_string()]);
    }
}
