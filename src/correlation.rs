use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::aggregate::AggregatedView;
use crate::dataset::{ACCURATE_PASSES, GOALS_SCORED, KEEPER_SAVES, TOTAL_SHOTS};

pub const HEATMAP_COLUMNS: [&str; 4] = [GOALS_SCORED, TOTAL_SHOTS, ACCURATE_PASSES, KEEPER_SAVES];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    // Row-major, `columns.len()` squared. NaN where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Pairwise Pearson correlation across all rows of the view.
///
/// A column named here but absent from the view is an error. Entries with
/// fewer than two rows or a constant column are NaN.
pub fn correlation_matrix(view: &AggregatedView, columns: &[&str]) -> Result<CorrelationMatrix> {
    let series = columns
        .iter()
        .map(|name| {
            view.column(name)
                .ok_or_else(|| anyhow!("correlation column '{name}' not in view"))
        })
        .collect::<Result<Vec<_>>>()?;

    let n = series.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
