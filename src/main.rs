use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use euro24_terminal::charts::{self, COLORBAR_TITLE, ColorScale, Rgb, ShotSplit};
use euro24_terminal::config::Config;
use euro24_terminal::dataset::load_dataset;
use euro24_terminal::export;
use euro24_terminal::geo::{EUROPE_LAT, EUROPE_LON};
use euro24_terminal::report::{
    DATA_HEADER, HEATMAP_HEADER, PAGE_TITLE, Report, SHOTS_HEADER, SIDEBAR_HEADER, SUBHEADER,
};
use euro24_terminal::state::{AppState, Delta, Tab, apply_delta, tab_label};

const PIES_PER_ROW: usize = 3;
const ON_TARGET_COLOR: Color = Color::Rgb(0, 128, 255);
const MISSED_COLOR: Color = Color::Rgb(239, 85, 59);

struct App {
    state: AppState,
    config: Config,
    should_quit: bool,
    delta_tx: mpsc::Sender<Delta>,
}

impl App {
    fn new(state: AppState, config: Config, delta_tx: mpsc::Sender<Delta>) -> Self {
        Self {
            state,
            config,
            should_quit: false,
            delta_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            } else if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_tab(Tab::Map),
            KeyCode::Char('2') => self.state.set_tab(Tab::Data),
            KeyCode::Char('3') => self.state.set_tab(Tab::Shots),
            KeyCode::Char('4') => self.state.set_tab(Tab::Heatmap),
            KeyCode::Tab => self.state.cycle_tab(),
            KeyCode::Char('j') | KeyCode::Down => self.state.cursor_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.cursor_prev(),
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_cursor_team(),
            KeyCode::Char('c') => self.state.clear_selection(),
            KeyCode::Char('a') => self.state.select_all(),
            KeyCode::Char('J') | KeyCode::PageDown => self.state.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => self.state.scroll_up(),
            KeyCode::Char('l') | KeyCode::Right => self.state.scroll_columns_right(),
            KeyCode::Char('h') | KeyCode::Left => self.state.scroll_columns_left(),
            KeyCode::Char('e') => self.request_export(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn request_export(&mut self) {
        if self.state.export.active && !self.state.export.done {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let Some(report) = self.state.report.clone() else {
            self.state.push_log("[WARN] Nothing to export");
            return;
        };
        let path = export::default_export_path(&self.config.export_dir);
        export::spawn_export(self.delta_tx.clone(), path, report);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let dataset = load_dataset(&config.dataset_path)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let tick_rate = config.tick_rate;
    let mut app = App::new(AppState::new(dataset), config, tx);
    let res = run_app(&mut terminal, &mut app, rx, tick_rate);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal loop failed")
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], state);
    match &state.report {
        Some(report) => match state.tab {
            Tab::Map => render_map(frame, body[1], report),
            Tab::Data => render_data(frame, body[1], state, report),
            Tab::Shots => render_shots(frame, body[1], state, report),
            Tab::Heatmap => render_heatmap(frame, body[1], report),
        },
        None => {
            let empty = Paragraph::new("Report unavailable, see console")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, body[1]);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> Text<'static> {
    let tabs = [Tab::Map, Tab::Data, Tab::Shots, Tab::Heatmap]
        .iter()
        .enumerate()
        .flat_map(|(idx, tab)| {
            let style = if *tab == state.tab {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [
                Span::styled(format!(" {} {} ", idx + 1, tab_label(*tab)), style),
                Span::raw(" "),
            ]
        })
        .collect::<Vec<_>>();

    let scope = if state.selection.is_empty() {
        "All teams".to_string()
    } else {
        format!("{} selected", state.selection.len())
    };

    Text::from(vec![
        Line::from(vec![
            Span::styled(PAGE_TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  |  {scope}")),
        ]),
        Line::from(vec![Span::styled(SUBHEADER, Style::default().fg(Color::Yellow))]),
        Line::from(tabs),
    ])
}

fn footer_text(state: &AppState) -> String {
    let mut text = "j/k Move | Space Toggle | a All | c Clear | Tab/1-4 View | J/K Scroll | h/l Columns | e Export | ? Help | q Quit".to_string();
    if state.export.active {
        text = format!(
            "Export {}/{}: {} | {}",
            state.export.current, state.export.total, state.export.message, text
        );
    }
    text
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title(SIDEBAR_HEADER).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    let label = Paragraph::new("Choose the Country(s)").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(label, sections[0]);

    let list_area = sections[1];
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.cursor, state.teams.len(), visible);
    let lines = (start..end)
        .map(|idx| {
            let team = &state.teams[idx];
            let mark = if state.selection.contains(team) { "[x]" } else { "[ ]" };
            let style = if idx == state.cursor {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(format!("{mark} {team}"), style)
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), list_area);
}

fn render_map(frame: &mut Frame, area: Rect, report: &Report) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(area);

    let cells = &report.map;
    let placed: Vec<(Vec<(f64, f64)>, Color, String)> = cells
        .iter()
        .filter_map(|cell| {
            let loc = cell.location?;
            Some((region_points(loc.lon, loc.lat), rgb(cell.color), cell.team.clone()))
        })
        .collect();

    let canvas = Canvas::default()
        .block(Block::default().title("Goals by team").borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds(EUROPE_LON)
        .y_bounds(EUROPE_LAT)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (coords, color, _) in &placed {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color: *color,
                });
            }
            for (coords, _, team) in &placed {
                if let Some((x, y)) = coords.first() {
                    ctx.print(*x, *y + 1.5, Line::styled(team.clone(), Style::default().fg(Color::White)));
                }
            }
        });
    frame.render_widget(canvas, cols[0]);

    render_map_legend(frame, cols[1], report);
}

// Filled disc around a centroid, sized to read as a country blob.
fn region_points(lon: f64, lat: f64) -> Vec<(f64, f64)> {
    const RADIUS: f64 = 1.6;
    const STEP: f64 = 0.25;
    let mut points = Vec::new();
    let mut dx = -RADIUS;
    while dx <= RADIUS {
        let mut dy = -RADIUS;
        while dy <= RADIUS {
            if dx * dx + dy * dy <= RADIUS * RADIUS {
                points.push((lon + dx, lat + dy * 0.6));
            }
            dy += STEP;
        }
        dx += STEP;
    }
    points
}

fn render_map_legend(frame: &mut Frame, area: Rect, report: &Report) {
    let scale = ColorScale::blues();
    let (min, max) = report.map.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.goals), hi.max(c.goals))
    });

    let mut lines = vec![Line::styled(
        COLORBAR_TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if report.map.is_empty() {
        lines.push(Line::raw("No teams in view"));
    } else {
        let bar: Vec<Span> = (0..20)
            .map(|i| Span::styled("█", Style::default().fg(rgb(scale.at(i as f64 / 19.0)))))
            .collect();
        lines.push(Line::from(bar));
        lines.push(Line::raw(format!("{min:<10.0}{max:>10.0}")));
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Team          Goals  On tgt",
            Style::default().fg(Color::DarkGray),
        ));

        let mut cells: Vec<_> = report.map.iter().collect();
        cells.sort_by(|a, b| b.goals.total_cmp(&a.goals).then(a.team.cmp(&b.team)));
        for cell in cells {
            let placed = if cell.location.is_some() { "" } else { " *" };
            lines.push(Line::from(vec![
                Span::styled("■ ", Style::default().fg(rgb(cell.color))),
                Span::raw(format!(
                    "{:<12}{:>5.0}{:>8.0}{placed}",
                    truncate(&cell.team, 12),
                    cell.goals,
                    cell.shots_on_target
                )),
            ]));
        }
        if report.map.iter().any(|c| c.location.is_none()) {
            lines.push(Line::styled(
                "* no map region",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let legend = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(legend, area);
}

fn render_data(frame: &mut Frame, area: Rect, state: &AppState, report: &Report) {
    let view = &report.view;
    let block = Block::default()
        .title(format!("{DATA_HEADER} ({} rows)", view.len()))
        .borders(Borders::ALL);

    if view.is_empty() {
        let empty = Paragraph::new("No rows for the current selection")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let offset = state.data_col_offset.min(view.columns.len().saturating_sub(1));
    let shown: Vec<usize> = (offset..view.columns.len()).collect();

    let header = Row::new(
        std::iter::once(Cell::from("team"))
            .chain(shown.iter().map(|&i| Cell::from(view.columns[i].clone()))),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = view.rows.iter().skip(state.data_scroll).map(|row| {
        Row::new(
            std::iter::once(Cell::from(row.team.clone()))
                .chain(shown.iter().map(|&i| Cell::from(format_number(row.values[i])))),
        )
    });

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(16))
        .chain(
            shown
                .iter()
                .map(|&i| Constraint::Length(view.columns[i].chars().count().max(8) as u16 + 1)),
        )
        .collect();

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn render_shots(frame: &mut Frame, area: Rect, state: &AppState, report: &Report) {
    let block = Block::default().title(SHOTS_HEADER).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = if state.selection.is_empty() {
        Some("Select teams in the sidebar to compare shots on target")
    } else if report.shots.is_empty() {
        Some("No data for the selected teams")
    } else {
        None
    };
    if let Some(message) = message {
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    const PIE_HEIGHT: u16 = 14;
    let rows_fit = (inner.height / PIE_HEIGHT).max(1) as usize;
    let first_row = state.shots_scroll / PIES_PER_ROW;
    let splits: Vec<&ShotSplit> = report
        .shots
        .iter()
        .skip(first_row * PIES_PER_ROW)
        .take(rows_fit * PIES_PER_ROW)
        .collect();

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(PIE_HEIGHT); rows_fit])
        .split(inner);

    for (row_idx, chunk) in splits.chunks(PIES_PER_ROW).enumerate() {
        let Some(row_area) = row_areas.get(row_idx) else {
            break;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, PIES_PER_ROW as u32); PIES_PER_ROW])
            .split(*row_area);
        for (col_idx, split) in chunk.iter().enumerate() {
            render_pie(frame, cols[col_idx], split);
        }
    }
}

fn render_pie(frame: &mut Frame, area: Rect, split: &ShotSplit) {
    let block = Block::default().title(split.title()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let (on_target, missed) = pie_points(split.on_target_pct() / 100.0);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.6, 1.6])
        .y_bounds([-1.1, 1.1])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &on_target,
                color: ON_TARGET_COLOR,
            });
            ctx.draw(&Points {
                coords: &missed,
                color: MISSED_COLOR,
            });
        });
    frame.render_widget(canvas, parts[0]);

    let [on, miss] = split.slices();
    let legend = vec![
        Line::styled(
            format!("■ {} {:.1}% ({:.0})", on.0, on.2, on.1),
            Style::default().fg(ON_TARGET_COLOR),
        ),
        Line::styled(
            format!("■ {} {:.1}% ({:.0})", miss.0, miss.2, miss.1),
            Style::default().fg(MISSED_COLOR),
        ),
    ];
    frame.render_widget(Paragraph::new(legend), parts[1]);
}

/// Samples the unit disc into two slices; the first covers `fraction` of the
/// circle clockwise from twelve o'clock.
fn pie_points(fraction: f64) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    const STEP: f64 = 0.03;
    let fraction = fraction.clamp(0.0, 1.0);
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut x: f64 = -1.0;
    while x <= 1.0 {
        let mut y: f64 = -1.0;
        while y <= 1.0 {
            if x * x + y * y <= 1.0 {
                let clockwise = x.atan2(y).rem_euclid(std::f64::consts::TAU);
                if clockwise / std::f64::consts::TAU < fraction {
                    first.push((x, y));
                } else {
                    second.push((x, y));
                }
            }
            y += STEP;
        }
        x += STEP;
    }
    (first, second)
}

fn render_heatmap(frame: &mut Frame, area: Rect, report: &Report) {
    let matrix = &report.correlation;
    let block = Block::default().title(HEATMAP_HEADER).borders(Borders::ALL);

    const CELL_WIDTH: u16 = 17;
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(matrix.columns.iter().map(|c| Cell::from(c.clone()))),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = matrix.columns.iter().zip(&matrix.values).map(|(name, values)| {
        let cells = std::iter::once(
            Cell::from(name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .chain(values.iter().map(|r| {
            let text = format!("{:^width$}", charts::format_corr(*r), width = CELL_WIDTH as usize);
            match charts::heat_color(*r) {
                Some(bg) => Cell::from(text).style(Style::default().bg(rgb(bg)).fg(Color::Black)),
                None => Cell::from(text).style(Style::default().fg(Color::DarkGray)),
            }
        }));
        Row::new(cells).height(3)
    });

    let widths = std::iter::once(Constraint::Length(CELL_WIDTH))
        .chain(std::iter::repeat(Constraint::Length(CELL_WIDTH)).take(matrix.size()))
        .collect::<Vec<_>>();

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, sections[0]);

    let scale: Vec<Span> = (0..=20)
        .map(|i| {
            let r = -1.0 + i as f64 / 10.0;
            let color = charts::heat_color(r).map(rgb).unwrap_or(Color::DarkGray);
            Span::styled("█", Style::default().fg(color))
        })
        .collect();
    let legend = Paragraph::new(vec![
        Line::from(scale),
        Line::raw(format!("{:<10}{:^1}{:>10}", "-1.00", "0", "1.00")),
    ])
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(legend, sections[1]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "EURO 2024 - Help",
        "",
        "Sidebar:",
        "  j/k or ↑/↓   Move cursor",
        "  Space/Enter  Toggle team",
        "  a            Select all teams",
        "  c            Clear selection (all teams)",
        "",
        "Views:",
        "  1 / Tab      Map",
        "  2            Data table",
        "  3            Shot pies",
        "  4            Correlation heatmap",
        "  J/K          Scroll data or pies",
        "  h/l          Scroll data columns",
        "",
        "  e            Export report to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_slices_partition_the_disc() {
        let (a, b) = pie_points(0.5);
        let (full, none) = pie_points(1.0);
        assert_eq!(a.len() + b.len(), full.len() + none.len());
        assert!(none.is_empty());
        let ratio = a.len() as f64 / (a.len() + b.len()) as f64;
        assert!((ratio - 0.5).abs() < 0.05);
    }

    #[test]
    fn visible_range_centres_cursor() {
        assert_eq!(visible_range(10, 24, 6), (7, 13));
        assert_eq!(visible_range(23, 24, 6), (18, 24));
        assert_eq!(visible_range(0, 3, 6), (0, 3));
    }
}
