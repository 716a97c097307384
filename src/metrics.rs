use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::PlayerRecord;

/// The selectable KPIs, in catalog order. The order is what the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kpi {
    TotalContribution,
    Efficiency,
    DisciplineScore,
    MinutesPlayed,
}

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("unknown KPI label '{0}'")]
    UnknownLabel(String),
    #[error("unknown metric column '{0}'")]
    UnknownColumn(String),
}

impl Kpi {
    pub const ALL: [Kpi; 4] = [
        Kpi::TotalContribution,
        Kpi::Efficiency,
        Kpi::DisciplineScore,
        Kpi::MinutesPlayed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Kpi::TotalContribution => "Total Contribution (G+A)",
            Kpi::Efficiency => "Efficiency (Score per Min)",
            Kpi::DisciplineScore => "Discipline Score (Card Impact)",
            Kpi::MinutesPlayed => "Continuity (Total Minutes)",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Kpi::TotalContribution => "total_contribution",
            Kpi::Efficiency => "efficiency",
            Kpi::DisciplineScore => "discipline_score",
            Kpi::MinutesPlayed => "minutes_played",
        }
    }

    /// The KPI's precomputed value on a record. The catalog only names
    /// metrics; no aggregation happens here.
    pub fn value_of(self, rec: &PlayerRecord) -> f64 {
        match self {
            Kpi::TotalContribution => f64::from(rec.total_contribution),
            Kpi::Efficiency => rec.efficiency,
            Kpi::DisciplineScore => rec.discipline_score,
            Kpi::MinutesPlayed => f64::from(rec.minutes_played),
        }
    }

    pub fn next(self) -> Kpi {
        let idx = Kpi::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Kpi::ALL[(idx + 1) % Kpi::ALL.len()]
    }
}

static BY_LABEL: Lazy<HashMap<&'static str, Kpi>> =
    Lazy::new(|| Kpi::ALL.iter().map(|k| (k.label(), *k)).collect());

/// Display labels in stable catalog order, for populating selectors.
pub fn labels() -> Vec<&'static str> {
    Kpi::ALL.iter().map(|k| k.label()).collect()
}

pub fn resolve(label: &str) -> Result<Kpi, MetricError> {
    BY_LABEL
        .get(label)
        .copied()
        .ok_or_else(|| MetricError::UnknownLabel(label.to_string()))
}

pub fn resolve_column(column: &str) -> Result<Kpi, MetricError> {
    Kpi::ALL
        .iter()
        .copied()
        .find(|k| k.column() == column)
        .ok_or_else(|| MetricError::UnknownColumn(column.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable_catalog_order() {
        assert_eq!(
            labels(),
            vec![
                "Total Contribution (G+A)",
                "Efficiency (Score per Min)",
                "Discipline Score (Card Impact)",
                "Continuity (Total Minutes)",
            ]
        );
    }

    #[test]
    fn resolve_round_trips_every_kpi() {
        for kpi in Kpi::ALL {
            assert_eq!(resolve(kpi.label()).unwrap(), kpi);
            assert_eq!(resolve_column(kpi.column()).unwrap(), kpi);
        }
    }

    #[test]
    fn unknown_label_and_column_are_errors() {
        assert!(matches!(
            resolve("Expected Goals (xG)"),
            Err(MetricError::UnknownLabel(_))
        ));
        assert!(matches!(
            resolve_column("xg"),
            Err(MetricError::UnknownColumn(_))
        ));
    }
}
