use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregate::{AggregatedView, Selection, aggregate};
use crate::charts::{ChoroplethCell, ShotSplit, choropleth, shot_splits};
use crate::correlation::{CorrelationMatrix, HEATMAP_COLUMNS, correlation_matrix};
use crate::dataset::Dataset;

pub const PAGE_TITLE: &str = "EURO 2024";
pub const SUBHEADER: &str = "Germany 2024";
pub const SIDEBAR_HEADER: &str = "Filter Data by Country(s):";
pub const DATA_HEADER: &str = "Data";
pub const SHOTS_HEADER: &str = "Percentage of Shots on Target to Total Shots for Each Team";
pub const HEATMAP_HEADER: &str = "Correlation Heatmap";

/// Everything the page shows for one selection. Rebuilt from scratch on every
/// selection change; the dataset is the only thing that outlives it.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub selection: Selection,
    pub view: AggregatedView,
    pub map: Vec<ChoroplethCell>,
    pub shots: Vec<ShotSplit>,
    pub correlation: CorrelationMatrix,
}

impl Report {
    pub fn build(dataset: &Dataset, selection: &Selection) -> Result<Self> {
        let view = aggregate(dataset, selection);
        let map = choropleth(&view);
        let shots = shot_splits(&view, selection);
        let correlation =
            correlation_matrix(&view, &HEATMAP_COLUMNS).context("build correlation heatmap")?;
        Ok(Self {
            selection: selection.clone(),
            view,
            map,
            shots,
            correlation,
        })
    }

    /// Selected teams that produced no rows (unknown names).
    pub fn missing_teams(&self) -> Vec<&str> {
        self.selection
            .teams()
            .iter()
            .filter(|team| self.view.row(team).is_none())
            .map(|team| team.as_str())
            .collect()
    }
}
