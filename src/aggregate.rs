use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::Dataset;

/// Teams picked in the sidebar, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    teams: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_teams<I, S>(teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for team in teams {
            selection.insert(team);
        }
        selection
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    /// Returns false when the team was already selected.
    pub fn insert(&mut self, team: impl Into<String>) -> bool {
        let team = team.into();
        if self.contains(&team) {
            return false;
        }
        self.teams.push(team);
        true
    }

    pub fn remove(&mut self, team: &str) -> bool {
        let before = self.teams.len();
        self.teams.retain(|t| t != team);
        self.teams.len() != before
    }

    /// Returns true when the team ends up selected.
    pub fn toggle(&mut self, team: &str) -> bool {
        if self.remove(team) {
            false
        } else {
            self.teams.push(team.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.teams.clear();
    }

    /// Empty selection means every team.
    pub fn admits(&self, team: &str) -> bool {
        self.is_empty() || self.contains(team)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub team: String,
    pub values: Vec<f64>,
}

/// Dataset narrowed to the selection and summed per team, ordered by team name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedView {
    pub columns: Vec<String>,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn teams(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.team.as_str()).collect()
    }

    pub fn row(&self, team: &str) -> Option<&AggregatedRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn value(&self, team: &str, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.row(team).map(|r| r.values[idx])
    }

    pub fn column(&self, column: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

pub fn aggregate(dataset: &Dataset, selection: &Selection) -> AggregatedView {
    let width = dataset.numeric_columns.len();
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in dataset
        .records
        .iter()
        .filter(|record| !record.team.is_empty() && selection.admits(&record.team))
    {
        let sums = groups
            .entry(record.team.as_str())
            .or_insert_with(|| vec![0.0; width]);
        for (sum, value) in sums.iter_mut().zip(&record.values) {
            if let Some(v) = value {
                *sum += v;
            }
        }
    }

    AggregatedView {
        columns: dataset.numeric_columns.clone(),
        rows: groups
            .into_iter()
            .map(|(team, values)| AggregatedRow {
                team: team.to_string(),
                values,
            })
            .collect(),
    }
}
