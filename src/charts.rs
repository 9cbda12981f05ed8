use serde::Serialize;

use crate::aggregate::{AggregatedView, Selection};
use crate::dataset::{GOALS_SCORED, SHOTS_ON_TARGET, TOTAL_SHOTS};
use crate::geo::{self, Centroid};

pub const COLORBAR_TITLE: &str = "Goals by Team";
pub const ON_TARGET_LABEL: &str = "Shots on Target";
pub const MISSED_LABEL: &str = "Missed Shots";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Piecewise-linear colour scale over [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Rgb)>,
}

impl ColorScale {
    pub fn new(stops: Vec<(f64, Rgb)>) -> Self {
        Self { stops }
    }

    /// Choropleth gradient, dark blue to light blue (never white).
    pub fn blues() -> Self {
        Self::new(vec![
            (0.0, Rgb(0, 0, 255)),
            (0.5, Rgb(0, 128, 255)),
            (1.0, Rgb(173, 216, 230)),
        ])
    }

    /// Diverging cool-warm scale; evaluate with `(r + 1) / 2` for r in [-1, 1].
    pub fn coolwarm() -> Self {
        Self::new(vec![
            (0.0, Rgb(59, 76, 192)),
            (0.5, Rgb(221, 221, 221)),
            (1.0, Rgb(180, 4, 38)),
        ])
    }

    pub fn at(&self, t: f64) -> Rgb {
        let Some(first) = self.stops.first() else {
            return Rgb(0, 0, 0);
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let f = if span <= 0.0 { 1.0 } else { (t - t0) / span };
                return Rgb(lerp(c0.0, c1.0, f), lerp(c0.1, c1.1, f), lerp(c0.2, c1.2, f));
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

fn lerp(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethCell {
    pub team: String,
    pub goals: f64,
    pub shots_on_target: f64,
    pub color: Rgb,
    #[serde(skip)]
    pub location: Option<Centroid>,
}

/// One cell per view row, coloured by goals normalised over the view's range.
pub fn choropleth(view: &AggregatedView) -> Vec<ChoroplethCell> {
    let scale = ColorScale::blues();
    let goals = view.column(GOALS_SCORED).unwrap_or_default();
    let (min, max) = goals
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| {
            (lo.min(*g), hi.max(*g))
        });

    view.rows
        .iter()
        .map(|row| {
            let goals = view.value(&row.team, GOALS_SCORED).unwrap_or(0.0);
            let t = if max > min { (goals - min) / (max - min) } else { 0.5 };
            ChoroplethCell {
                team: row.team.clone(),
                goals,
                shots_on_target: view.value(&row.team, SHOTS_ON_TARGET).unwrap_or(0.0),
                color: scale.at(t),
                location: geo::centroid(&row.team),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotSplit {
    pub team: String,
    pub total_shots: f64,
    pub shots_on_target: f64,
    pub missed_shots: f64,
}

impl ShotSplit {
    pub fn title(&self) -> String {
        format!("{} - Shots on Target vs Total Shots", self.team)
    }

    pub fn on_target_pct(&self) -> f64 {
        share(self.shots_on_target, self.shots_on_target + self.missed_shots)
    }

    pub fn missed_pct(&self) -> f64 {
        share(self.missed_shots, self.shots_on_target + self.missed_shots)
    }

    /// Pie slices as (category, count, percent).
    pub fn slices(&self) -> [(&'static str, f64, f64); 2] {
        [
            (ON_TARGET_LABEL, self.shots_on_target, self.on_target_pct()),
            (MISSED_LABEL, self.missed_shots, self.missed_pct()),
        ]
    }
}

fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

/// One split per selected team present in the view, in pick order.
pub fn shot_splits(view: &AggregatedView, selection: &Selection) -> Vec<ShotSplit> {
    selection
        .teams()
        .iter()
        .filter_map(|team| {
            let total = view.value(team, TOTAL_SHOTS)?;
            let on_target = view.value(team, SHOTS_ON_TARGET)?;
            Some(ShotSplit {
                team: team.clone(),
                total_shots: total,
                shots_on_target: on_target,
                missed_shots: total - on_target,
            })
        })
        .collect()
}

/// Heatmap cell colour for a correlation coefficient.
pub fn heat_color(r: f64) -> Option<Rgb> {
    if r.is_nan() {
        return None;
    }
    Some(ColorScale::coolwarm().at((r + 1.0) / 2.0))
}

pub fn format_corr(r: f64) -> String {
    if r.is_nan() {
        "-".to_string()
    } else {
        format!("{r:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blues_hits_each_stop() {
        let scale = ColorScale::blues();
        assert_eq!(scale.at(0.0), Rgb(0, 0, 255));
        assert_eq!(scale.at(0.5), Rgb(0, 128, 255));
        assert_eq!(scale.at(1.0), Rgb(173, 216, 230));
        assert_eq!(scale.at(2.0), Rgb(173, 216, 230));
    }

    #[test]
    fn coolwarm_midpoint_is_neutral() {
        assert_eq!(heat_color(0.0), Some(Rgb(221, 221, 221)));
        assert_eq!(heat_color(f64::NAN), None);
    }

    #[test]
    fn corr_formats_two_places() {
        assert_eq!(format_corr(0.756), "0.76");
        assert_eq!(format_corr(f64::NAN), "-");
    }
}
