use std::collections::VecDeque;

use crate::aggregate::{self, Summary};
use crate::filters::FilterCriteria;
use crate::metrics::Kpi;
use crate::players;
use crate::records::PlayerRecord;

const LOG_CAPACITY: usize = 50;
const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Rankings,
    Player,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Rankings, Tab::Player, Tab::Data];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Rankings => "Rankings",
            Tab::Player => "Player",
            Tab::Data => "Data",
        }
    }
}

/// All state behind the terminal UI. Filters live here as an explicit
/// `FilterCriteria` value that the refresh pipeline receives by parameter;
/// derived views (summary, leaderboard, player list) are rebuilt from the
/// dataset on every refresh.
pub struct AppState {
    pub criteria: FilterCriteria,
    pub dataset: Vec<PlayerRecord>,
    pub summary: Summary,
    pub ranked: Vec<PlayerRecord>,
    pub player_names: Vec<String>,

    pub tab: Tab,
    pub dist_kpi: Kpi,
    pub rank_kpi: Kpi,
    pub player_selected: usize,
    pub data_scroll: usize,
    pub help_overlay: bool,

    pub last_refresh: Option<String>,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            dataset: Vec::new(),
            summary: Summary::empty(),
            ranked: Vec::new(),
            player_names: Vec::new(),
            tab: Tab::Overview,
            dist_kpi: Kpi::TotalContribution,
            rank_kpi: Kpi::TotalContribution,
            player_selected: 0,
            data_scroll: 0,
            help_overlay: false,
            last_refresh: None,
            logs: VecDeque::new(),
        }
    }

    /// Install a freshly fetched dataset and rebuild everything derived
    /// from it. An empty dataset is a valid state, not an error.
    pub fn apply_dataset(&mut self, rows: Vec<PlayerRecord>) {
        self.summary = aggregate::summarize(&rows);
        self.ranked = aggregate::top_n(&rows, self.rank_kpi, LEADERBOARD_SIZE);
        self.player_names = players::list_players(&rows);
        self.dataset = rows;
        self.player_selected = self
            .player_selected
            .min(self.player_names.len().saturating_sub(1));
        self.data_scroll = 0;
    }

    pub fn rebuild_leaderboard(&mut self) {
        self.ranked = aggregate::top_n(&self.dataset, self.rank_kpi, LEADERBOARD_SIZE);
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.player_names
            .get(self.player_selected)
            .map(String::as_str)
    }

    pub fn selected_player_rows(&self) -> Vec<PlayerRecord> {
        match self.selected_player() {
            Some(name) => players::lookup(&self.dataset, name),
            None => Vec::new(),
        }
    }

    pub fn select_next_player(&mut self) {
        if !self.player_names.is_empty() {
            self.player_selected = (self.player_selected + 1) % self.player_names.len();
        }
    }

    pub fn select_prev_player(&mut self) {
        if !self.player_names.is_empty() {
            self.player_selected =
                (self.player_selected + self.player_names.len() - 1) % self.player_names.len();
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Period, Tier};

    fn rec(name: &str) -> PlayerRecord {
        PlayerRecord {
            player_name: name.to_string(),
            period: Period::PrePandemic,
            tier: Tier::Elite,
            minutes_played: 900,
            goals: 1,
            assists: 1,
            total_contribution: 2,
            efficiency: 2.0 / 900.0,
            discipline_score: -0.5,
        }
    }

    #[test]
    fn apply_dataset_rebuilds_derived_views() {
        let mut state = AppState::new();
        state.apply_dataset(vec![rec("B"), rec("A")]);
        assert_eq!(state.summary.unique_players, 2);
        assert_eq!(state.player_names, vec!["A", "B"]);
        assert_eq!(state.ranked.len(), 2);

        state.player_selected = 1;
        state.apply_dataset(vec![rec("A")]);
        assert_eq!(state.player_selected, 0);
        assert_eq!(state.selected_player(), Some("A"));
    }

    #[test]
    fn empty_dataset_is_a_valid_state() {
        let mut state = AppState::new();
        state.apply_dataset(Vec::new());
        assert_eq!(state.summary.unique_players, 0);
        assert!(state.ranked.is_empty());
        assert_eq!(state.selected_player(), None);
        state.select_next_player();
        assert_eq!(state.player_selected, 0);
    }

    #[test]
    fn log_ring_is_bounded() {
        let mut state = AppState::new();
        for i in 0..120 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), LOG_CAPACITY);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 70"));
    }
}
