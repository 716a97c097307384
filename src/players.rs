use crate::metrics::Kpi;
use crate::records::{Period, PlayerRecord};

/// One cell of the long-form period comparison: (period, metric, value).
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub period: Period,
    pub kpi: Kpi,
    pub value: f64,
}

/// Distinct player names in the filtered set, sorted for the selector.
pub fn list_players(records: &[PlayerRecord]) -> Vec<String> {
    let mut names: Vec<String> = records.iter().map(|r| r.player_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Every row for the named player, in the table's order. Empty when the
/// current filters exclude the player entirely.
pub fn lookup(records: &[PlayerRecord], player_name: &str) -> Vec<PlayerRecord> {
    records
        .iter()
        .filter(|r| r.player_name == player_name)
        .cloned()
        .collect()
}

pub fn spans_multiple_periods(records: &[PlayerRecord]) -> bool {
    let Some(first) = records.first() else {
        return false;
    };
    records.iter().any(|r| r.period != first.period)
}

/// Reshape a player's rows into (period, metric, value) triples for the
/// requested KPIs, periods in chronological order within each KPI. The caller
/// only shows this when the rows span more than one period.
pub fn compare_periods(records: &[PlayerRecord], kpis: &[Kpi]) -> Vec<ComparisonRow> {
    let mut out = Vec::new();
    for kpi in kpis {
        for period in Period::ALL {
            for rec in records.iter().filter(|r| r.period == period) {
                out.push(ComparisonRow {
                    period,
                    kpi: *kpi,
                    value: kpi.value_of(rec),
                });
            }
        }
    }
    out
}
