use serde::{Deserialize, Serialize};

/// Coarse time bucket partitioning the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    PrePandemic,
    PostPandemic,
}

impl Period {
    /// Chronological order, used for period-over-period comparisons.
    pub const ALL: [Period; 2] = [Period::PrePandemic, Period::PostPandemic];

    pub fn as_sql_str(self) -> &'static str {
        match self {
            Period::PrePandemic => "Pre-Pandemic",
            Period::PostPandemic => "Post-Pandemic",
        }
    }

    pub fn from_sql_str(raw: &str) -> Option<Period> {
        match raw {
            "Pre-Pandemic" => Some(Period::PrePandemic),
            "Post-Pandemic" => Some(Period::PostPandemic),
            _ => None,
        }
    }
}

/// Competition level grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Elite,
    Competitive,
    CupLower,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Elite, Tier::Competitive, Tier::CupLower];

    pub fn as_sql_str(self) -> &'static str {
        match self {
            Tier::Elite => "Elite",
            Tier::Competitive => "Competitive",
            Tier::CupLower => "Cup/Lower",
        }
    }

    pub fn from_sql_str(raw: &str) -> Option<Tier> {
        match raw {
            "Elite" => Some(Tier::Elite),
            "Competitive" => Some(Tier::Competitive),
            "Cup/Lower" => Some(Tier::CupLower),
            _ => None,
        }
    }
}

/// One row of the `player_performances` table: a player's numbers for one
/// period/tier combination. A player may appear in several rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player_name: String,
    pub period: Period,
    pub tier: Tier,
    pub minutes_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub total_contribution: u32,
    pub efficiency: f64,
    pub discipline_score: f64,
}

impl PlayerRecord {
    /// Contribution per minute. Zero-minute rows score 0.0 rather than NaN
    /// and still count toward averages.
    pub fn efficiency_of(total_contribution: u32, minutes_played: u32) -> f64 {
        if minutes_played == 0 {
            0.0
        } else {
            f64::from(total_contribution) / f64::from(minutes_played)
        }
    }

    pub fn recomputed_contribution(&self) -> u32 {
        self.goals + self.assists
    }
}
