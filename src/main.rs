use std::io;
use std::time::{Duration, Instant};

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
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table};

use footstats_terminal::aggregate;
use footstats_terminal::dataset::DataSource;
use footstats_terminal::metrics::Kpi;
use footstats_terminal::persist;
use footstats_terminal::players;
use footstats_terminal::records::{Period, PlayerRecord, Tier};
use footstats_terminal::state::{AppState, Tab};

struct App {
    state: AppState,
    source: DataSource,
    should_quit: bool,
}

impl App {
    fn new(source: DataSource) -> Self {
        let mut state = AppState::new();
        persist::load_into_state(&mut state);
        Self {
            state,
            source,
            should_quit: false,
        }
    }

    /// One synchronous pipeline run: compile filters, fetch, rebuild derived
    /// views. On failure the previous dataset stays on screen and the error
    /// lands in the log pane; the analyst adjusts filters and retries.
    fn refresh(&mut self) {
        match self.source.fetch(&self.state.criteria) {
            Ok(rows) => {
                let n = rows.len();
                self.state.apply_dataset(rows);
                self.state.last_refresh =
                    Some(chrono::Local::now().format("%H:%M:%S").to_string());
                self.state.push_log(format!("[INFO] Loaded {n} rows"));
            }
            Err(err) => {
                self.state.push_log(format!("[WARN] Fetch failed: {err}"));
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.tab = Tab::Overview,
            KeyCode::Char('2') => self.state.tab = Tab::Rankings,
            KeyCode::Char('3') => self.state.tab = Tab::Player,
            KeyCode::Char('4') => self.state.tab = Tab::Data,
            KeyCode::Tab => self.next_tab(),
            KeyCode::Char('p') => {
                self.state.criteria.cycle_period();
                self.refresh();
            }
            KeyCode::Char('e') => self.toggle_tier(Tier::Elite),
            KeyCode::Char('c') => self.toggle_tier(Tier::Competitive),
            KeyCode::Char('g') => self.toggle_tier(Tier::CupLower),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_minutes(100),
            KeyCode::Char('-') => self.adjust_minutes(-100),
            KeyCode::Char('s') => self.cycle_kpi(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let idx = Tab::ALL
            .iter()
            .position(|t| *t == self.state.tab)
            .unwrap_or(0);
        self.state.tab = Tab::ALL[(idx + 1) % Tab::ALL.len()];
    }

    fn toggle_tier(&mut self, tier: Tier) {
        self.state.criteria.toggle_tier(tier);
        self.refresh();
    }

    fn adjust_minutes(&mut self, delta: i64) {
        let current = i64::from(self.state.criteria.min_minutes);
        let next = (current + delta).clamp(0, 3000);
        if next != current {
            self.state.criteria.min_minutes = next as u32;
            self.refresh();
        }
    }

    fn cycle_kpi(&mut self) {
        match self.state.tab {
            Tab::Overview => self.state.dist_kpi = self.state.dist_kpi.next(),
            Tab::Rankings => {
                self.state.rank_kpi = self.state.rank_kpi.next();
                self.state.rebuild_leaderboard();
            }
            Tab::Player | Tab::Data => {}
        }
    }

    fn move_down(&mut self) {
        match self.state.tab {
            Tab::Player => self.state.select_next_player(),
            Tab::Data => {
                if self.state.data_scroll + 1 < self.state.dataset.len() {
                    self.state.data_scroll += 1;
                }
            }
            _ => {}
        }
    }

    fn move_up(&mut self) {
        match self.state.tab {
            Tab::Player => self.state.select_prev_player(),
            Tab::Data => {
                self.state.data_scroll = self.state.data_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(DataSource::from_env());
    app.refresh();
    let res = run_app(&mut terminal, &mut app);

    persist::save_from_state(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

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

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.tab {
        Tab::Overview => render_overview(frame, chunks[1], &app.state),
        Tab::Rankings => render_rankings(frame, chunks[1], &app.state),
        Tab::Player => render_player(frame, chunks[1], &app.state),
        Tab::Data => render_data(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let period = match state.criteria.period {
        None => "All".to_string(),
        Some(p) => p.as_sql_str().to_string(),
    };
    let tiers = if state.criteria.tiers.is_empty() {
        "All".to_string()
    } else {
        state
            .criteria
            .tiers
            .iter()
            .map(|t| t.as_sql_str())
            .collect::<Vec<_>>()
            .join(",")
    };
    let refreshed = state.last_refresh.as_deref().unwrap_or("-");
    format!(
        "FOOTSTATS | {} | Period: {period} | Tiers: {tiers} | Min minutes: {} | Refreshed: {refreshed}\n\
         Tabs: [1]Overview [2]Rankings [3]Player [4]Data",
        state.tab.label(),
        state.criteria.min_minutes,
    )
}

fn footer_text(state: &AppState) -> String {
    match state.tab {
        Tab::Overview => {
            "p Period | e/c/g Tiers | +/- Minutes | s KPI | r Refresh | ? Help | q Quit".to_string()
        }
        Tab::Rankings => {
            "s Ranking KPI | p Period | e/c/g Tiers | +/- Minutes | ? Help | q Quit".to_string()
        }
        Tab::Player => "j/k/↑/↓ Select player | p Period | e/c/g Tiers | ? Help | q Quit".to_string(),
        Tab::Data => "j/k/↑/↓ Scroll | p Period | e/c/g Tiers | ? Help | q Quit".to_string(),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(5),
        ])
        .split(area);

    render_kpi_cards(frame, sections[0], state);
    render_tier_chart(frame, sections[1], state);
    render_logs(frame, sections[2], state);
}

fn render_kpi_cards(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let cards = [
        (
            "Total Players",
            state.summary.unique_players.to_string(),
        ),
        ("Total Goals", state.summary.total_goals.to_string()),
        (
            "Avg Efficiency",
            fmt_opt(state.summary.mean_efficiency, 4),
        ),
        (
            "Avg Discipline",
            fmt_opt(state.summary.mean_discipline, 2),
        ),
    ];

    for (i, (title, value)) in cards.iter().enumerate() {
        let card = Paragraph::new(value.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(*title));
        frame.render_widget(card, cols[i]);
    }
}

fn render_tier_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let groups = aggregate::tier_period_means(&state.dataset, state.dist_kpi);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Mean by Tier & Period — {}", state.dist_kpi.label()));

    if groups.is_empty() {
        let empty =
            Paragraph::new("No rows match the current filters")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Bars plot magnitudes so negative KPIs (discipline) keep visible
    // heights; the signed mean rides as the bar text.
    let max_abs = groups
        .iter()
        .flat_map(|(_, means)| means.iter())
        .fold(0.0_f64, |acc, (_, mean)| acc.max(mean.abs()));
    let scale = chart_scale(max_abs);

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(9)
        .bar_gap(1)
        .group_gap(3);
    for (tier, means) in &groups {
        let bars: Vec<Bar> = means
            .iter()
            .map(|(period, mean)| {
                Bar::default()
                    .label(period_short(*period).into())
                    .value(bar_height(*mean, scale))
                    .text_value(format!("{mean:.3}"))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(tier.as_sql_str().into())
                .bars(&bars),
        );
    }
    frame.render_widget(chart, area);
}

fn period_short(period: Period) -> &'static str {
    match period {
        Period::PrePandemic => "Pre",
        Period::PostPandemic => "Post",
    }
}

fn render_rankings(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Top 10 — {}", state.rank_kpi.label()));

    if state.ranked.is_empty() {
        let empty = Paragraph::new("No rows match the current filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let max_value = state
        .ranked
        .iter()
        .map(|r| state.rank_kpi.value_of(r))
        .fold(f64::MIN, f64::max);

    let rows: Vec<Row> = state
        .ranked
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let value = state.rank_kpi.value_of(rec);
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(rec.player_name.clone()),
                Cell::from(rec.tier.as_sql_str()),
                Cell::from(rec.period.as_sql_str()),
                Cell::from(format!("{value:.3}")),
                Cell::from(value_bar(value, max_value, 24)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(18),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(26),
        ],
    )
    .header(
        Row::new(vec!["#", "Player", "Tier", "Period", "Value", ""])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn render_player(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(1)])
        .split(area);

    render_player_list(frame, cols[0], state);

    let rows = state.selected_player_rows();
    let detail_area = cols[1];
    if rows.is_empty() {
        let empty = Paragraph::new("No player in the current filtered set")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Detail"));
        frame.render_widget(empty, detail_area);
        return;
    }

    let spans = players::spans_multiple_periods(&rows);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if spans {
            vec![Constraint::Min(4), Constraint::Length(8)]
        } else {
            vec![Constraint::Min(1)]
        })
        .split(detail_area);

    render_player_detail(frame, sections[0], state, &rows);
    if spans {
        render_period_comparison(frame, sections[1], &rows);
    }
}

fn render_player_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Players");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.player_names.is_empty() {
        let empty =
            Paragraph::new("(none)").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.player_selected, state.player_names.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let style = if idx == state.player_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let line = Paragraph::new(state.player_names[idx].as_str()).style(style);
        frame.render_widget(line, row_area);
    }
}

fn render_player_detail(frame: &mut Frame, area: Rect, state: &AppState, rows: &[PlayerRecord]) {
    let name = state.selected_player().unwrap_or("-");
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.tier.as_sql_str()),
                Cell::from(r.period.as_sql_str()),
                Cell::from(r.goals.to_string()),
                Cell::from(r.assists.to_string()),
                Cell::from(r.total_contribution.to_string()),
                Cell::from(format!("{:.4}", r.efficiency)),
                Cell::from(format!("{:.2}", r.discipline_score)),
                Cell::from(r.minutes_played.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Tier", "Period", "G", "A", "G+A", "Eff", "Disc", "Mins"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Detail — {name}")),
    );
    frame.render_widget(table, area);
}

fn render_period_comparison(frame: &mut Frame, area: Rect, rows: &[PlayerRecord]) {
    let comparison =
        players::compare_periods(rows, &[Kpi::TotalContribution, Kpi::Efficiency]);
    let table_rows: Vec<Row> = comparison
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.period.as_sql_str()),
                Cell::from(c.kpi.label()),
                Cell::from(format!("{:.4}", c.value)),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(14),
            Constraint::Min(26),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Period", "Metric", "Value"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Evolution Over Time"),
    );
    frame.render_widget(table, area);
}

fn render_data(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Filtered rows ({})",
        state.dataset.len()
    ));

    if state.dataset.is_empty() {
        let empty = Paragraph::new("No rows match the current filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = state
        .dataset
        .iter()
        .skip(state.data_scroll)
        .map(|r| {
            Row::new(vec![
                Cell::from(r.player_name.clone()),
                Cell::from(r.tier.as_sql_str()),
                Cell::from(r.period.as_sql_str()),
                Cell::from(r.minutes_played.to_string()),
                Cell::from(r.goals.to_string()),
                Cell::from(r.assists.to_string()),
                Cell::from(r.total_contribution.to_string()),
                Cell::from(format!("{:.4}", r.efficiency)),
                Cell::from(format!("{:.2}", r.discipline_score)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec![
            "Player", "Tier", "Period", "Mins", "G", "A", "G+A", "Eff", "Disc",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn render_logs(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|l| Line::from(l.as_str()))
        .collect();
    let logs = Paragraph::new(lines)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Log"));
    frame.render_widget(logs, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(56);
    let height = area.height.min(14);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let help = Paragraph::new(
        "1-4 / Tab  switch view\n\
         p          cycle period (All → Pre → Post)\n\
         e, c, g    toggle Elite / Competitive / Cup-Lower\n\
         + / -      min minutes ±100 (0..3000)\n\
         s          cycle KPI (overview / rankings)\n\
         j k ↑ ↓    select player / scroll data\n\
         r          re-run query\n\
         ?          toggle this help\n\
         q          quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Keys"));
    frame.render_widget(help, popup);
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "—".to_string(),
    }
}

fn value_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max_value) * width as f64).round().max(0.0) as usize;
    "█".repeat(filled.min(width))
}

fn chart_scale(max_abs: f64) -> f64 {
    if max_abs > 0.0 && max_abs < 100.0 {
        // Keep small KPI values (e.g. per-minute efficiency) visible.
        1000.0
    } else {
        1.0
    }
}

fn bar_height(mean: f64, scale: f64) -> u64 {
    (mean.abs() * scale) as u64
}

fn visible_range(selected: usize, len: usize, visible: usize) -> (usize, usize) {
    if visible == 0 || len == 0 {
        return (0, 0);
    }
    let half = visible / 2;
    let start = selected.saturating_sub(half).min(len.saturating_sub(visible));
    (start, (start + visible).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_means_still_get_visible_bars() {
        // Discipline means are negative; the bar plots the magnitude.
        let scale = chart_scale(4.2);
        assert!(bar_height(-4.2, scale) > 0);
        assert_eq!(bar_height(-4.2, scale), bar_height(4.2, scale));
    }

    #[test]
    fn chart_scale_only_boosts_small_magnitudes() {
        assert_eq!(chart_scale(0.012), 1000.0);
        assert_eq!(chart_scale(250.0), 1.0);
        assert_eq!(chart_scale(0.0), 1.0);
    }

    #[test]
    fn value_bar_clamps_to_width() {
        assert_eq!(value_bar(10.0, 10.0, 4), "████");
        assert_eq!(value_bar(-1.0, 10.0, 4), "");
        assert_eq!(value_bar(5.0, 0.0, 4), "");
    }
}
