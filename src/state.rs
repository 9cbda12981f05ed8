use std::collections::VecDeque;
use std::time::Instant;

use crate::aggregate::Selection;
use crate::dataset::Dataset;
use crate::report::Report;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Map,
    Data,
    Shots,
    Heatmap,
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub current: usize,
    pub total: usize,
    pub message: String,
    pub failed: bool,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            current: 0,
            total: 0,
            message: String::new(),
            failed: false,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

/// Messages from background jobs back to the UI thread.
#[derive(Debug, Clone)]
pub enum Delta {
    ExportStarted {
        path: String,
        total: usize,
    },
    ExportProgress {
        current: usize,
        total: usize,
        message: String,
    },
    ExportFinished {
        path: String,
        data_rows: usize,
        shot_rows: usize,
    },
    ExportFailed {
        path: String,
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub tab: Tab,
    pub dataset: Dataset,
    pub teams: Vec<String>,
    pub cursor: usize,
    pub selection: Selection,
    pub report: Option<Report>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub data_scroll: usize,
    pub data_col_offset: usize,
    pub shots_scroll: usize,
    pub export: ExportState,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        let teams = dataset.teams();
        let mut state = Self {
            tab: Tab::Map,
            dataset,
            teams,
            cursor: 0,
            selection: Selection::new(),
            report: None,
            logs: VecDeque::new(),
            help_overlay: false,
            data_scroll: 0,
            data_col_offset: 0,
            shots_scroll: 0,
            export: ExportState::new(),
        };
        state.push_log(format!(
            "[INFO] Loaded {} rows, {} teams",
            state.dataset.len(),
            state.teams.len()
        ));
        state.refresh();
        state
    }

    /// Re-runs filter, aggregate and render for the current selection.
    pub fn refresh(&mut self) {
        match Report::build(&self.dataset, &self.selection) {
            Ok(report) => {
                let missing: Vec<String> =
                    report.missing_teams().into_iter().map(str::to_string).collect();
                for team in missing {
                    self.push_log(format!("[WARN] No rows for selected team '{team}'"));
                }
                self.report = Some(report);
            }
            Err(err) => {
                self.report = None;
                self.push_log(format!("[ERROR] {err:#}"));
            }
        }
        self.trim_logs();
        self.data_scroll = 0;
        self.shots_scroll = 0;
    }

    pub fn cursor_team(&self) -> Option<&str> {
        self.teams.get(self.cursor).map(|t| t.as_str())
    }

    pub fn cursor_next(&mut self) {
        if self.teams.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % self.teams.len();
    }

    pub fn cursor_prev(&mut self) {
        if self.teams.is_empty() {
            self.cursor = 0;
            return;
        }
        if self.cursor == 0 {
            self.cursor = self.teams.len() - 1;
        } else {
            self.cursor -= 1;
        }
    }

    pub fn toggle_cursor_team(&mut self) {
        let Some(team) = self.cursor_team().map(|t| t.to_string()) else {
            return;
        };
        let selected = self.selection.toggle(&team);
        self.push_log(format!(
            "[INFO] {} {team} ({} selected)",
            if selected { "Added" } else { "Removed" },
            self.selection.len()
        ));
        self.refresh();
    }

    pub fn select_all(&mut self) {
        for team in &self.teams {
            self.selection.insert(team.clone());
        }
        self.push_log(format!("[INFO] Selected all {} teams", self.selection.len()));
        self.refresh();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.push_log("[INFO] Selection cleared (showing all teams)");
        self.refresh();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn cycle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Map => Tab::Data,
            Tab::Data => Tab::Shots,
            Tab::Shots => Tab::Heatmap,
            Tab::Heatmap => Tab::Map,
        };
    }

    pub fn scroll_down(&mut self) {
        let Some(report) = &self.report else {
            return;
        };
        match self.tab {
            Tab::Data => {
                let max = report.view.len().saturating_sub(1);
                self.data_scroll = (self.data_scroll + 1).min(max);
            }
            Tab::Shots => {
                let max = report.shots.len().saturating_sub(1);
                self.shots_scroll = (self.shots_scroll + 1).min(max);
            }
            Tab::Map | Tab::Heatmap => {}
        }
    }

    pub fn scroll_up(&mut self) {
        match self.tab {
            Tab::Data => self.data_scroll = self.data_scroll.saturating_sub(1),
            Tab::Shots => self.shots_scroll = self.shots_scroll.saturating_sub(1),
            Tab::Map | Tab::Heatmap => {}
        }
    }

    pub fn scroll_columns_right(&mut self) {
        let max = self.dataset.numeric_columns.len().saturating_sub(1);
        self.data_col_offset = (self.data_col_offset + 1).min(max);
    }

    pub fn scroll_columns_left(&mut self) {
        self.data_col_offset = self.data_col_offset.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        self.trim_logs();
    }

    fn trim_logs(&mut self) {
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }
}

pub fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Map => "Map",
        Tab::Data => "Data",
        Tab::Shots => "Shots",
        Tab::Heatmap => "Heatmap",
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::ExportStarted { path, total } => {
            state.export = ExportState::new();
            state.export.active = true;
            state.export.path = Some(path.clone());
            state.export.total = total;
            state.export.message = "Starting export".to_string();
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Exporting to {path}"));
        }
        Delta::ExportProgress {
            current,
            total,
            message,
        } => {
            state.export.active = true;
            state.export.current = current;
            state.export.total = total;
            state.export.message = message;
            state.export.last_updated = Some(Instant::now());
        }
        Delta::ExportFinished {
            path,
            data_rows,
            shot_rows,
        } => {
            state.export.active = true;
            state.export.done = true;
            state.export.current = state.export.total;
            state.export.message = format!("Done: {data_rows} teams, {shot_rows} shot rows");
            state.export.path = Some(path.clone());
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export written to {path}"));
        }
        Delta::ExportFailed { path, error } => {
            state.export.active = true;
            state.export.done = true;
            state.export.failed = true;
            state.export.message = "Export failed".to_string();
            state.export.path = Some(path);
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[ERROR] Export failed: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
