use std::collections::HashSet;

use crate::metrics::Kpi;
use crate::records::{Period, PlayerRecord, Tier};

/// Headline numbers for the current filtered dataset. Over an empty dataset
/// the counts and sums are zero and the means are `None`; the UI renders
/// `None` as a dash rather than leaking a NaN into a metric card.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub unique_players: usize,
    pub total_goals: u64,
    pub mean_efficiency: Option<f64>,
    pub mean_discipline: Option<f64>,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            unique_players: 0,
            total_goals: 0,
            mean_efficiency: None,
            mean_discipline: None,
        }
    }
}

pub fn summarize(records: &[PlayerRecord]) -> Summary {
    if records.is_empty() {
        return Summary::empty();
    }

    // Distinct names, not distinct rows: a player with records in both
    // periods counts once.
    let unique_players = records
        .iter()
        .map(|r| r.player_name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_goals = records.iter().map(|r| u64::from(r.goals)).sum();
    let n = records.len() as f64;
    let mean_efficiency = records.iter().map(|r| r.efficiency).sum::<f64>() / n;
    let mean_discipline = records.iter().map(|r| r.discipline_score).sum::<f64>() / n;

    Summary {
        unique_players,
        total_goals,
        mean_efficiency: Some(mean_efficiency),
        mean_discipline: Some(mean_discipline),
    }
}

/// Top `n` records by the given KPI, descending. The sort is stable, so rows
/// with equal values keep their original relative order; fewer than `n` rows
/// returns all of them.
pub fn top_n(records: &[PlayerRecord], kpi: Kpi, n: usize) -> Vec<PlayerRecord> {
    let mut ranked: Vec<PlayerRecord> = records.to_vec();
    ranked.sort_by(|a, b| kpi.value_of(b).total_cmp(&kpi.value_of(a)));
    ranked.truncate(n);
    ranked
}

/// Mean of the KPI per tier and period for the distribution view. Tiers in
/// declared order, periods chronological within each tier; (tier, period)
/// pairs with no rows are omitted, as is any tier with no rows at all.
pub fn tier_period_means(
    records: &[PlayerRecord],
    kpi: Kpi,
) -> Vec<(Tier, Vec<(Period, f64)>)> {
    let mut out = Vec::new();
    for tier in Tier::ALL {
        let mut by_period = Vec::new();
        for period in Period::ALL {
            let values: Vec<f64> = records
                .iter()
                .filter(|r| r.tier == tier && r.period == period)
                .map(|r| kpi.value_of(r))
                .collect();
            if !values.is_empty() {
                by_period.push((period, values.iter().sum::<f64>() / values.len() as f64));
            }
        }
        if !by_period.is_empty() {
            out.push((tier, by_period));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Period, Tier};

    fn rec(name: &str, goals: u32, efficiency: f64) -> PlayerRecord {
        PlayerRecord {
            player_name: name.to_string(),
            period: Period::PrePandemic,
            tier: Tier::Elite,
            minutes_played: 900,
            goals,
            assists: 0,
            total_contribution: goals,
            efficiency,
            discipline_score: -1.0,
        }
    }

    #[test]
    fn summarize_empty_uses_documented_policy() {
        let s = summarize(&[]);
        assert_eq!(s.unique_players, 0);
        assert_eq!(s.total_goals, 0);
        assert_eq!(s.mean_efficiency, None);
        assert_eq!(s.mean_discipline, None);
    }

    #[test]
    fn summarize_counts_distinct_names_once() {
        let rows = vec![rec("A", 3, 0.01), rec("A", 2, 0.02), rec("B", 1, 0.03)];
        let s = summarize(&rows);
        assert_eq!(s.unique_players, 2);
        assert_eq!(s.total_goals, 6);
        assert!((s.mean_efficiency.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let rows = vec![
            rec("first", 5, 0.5),
            rec("second", 5, 0.5),
            rec("third", 9, 0.9),
        ];
        let ranked = top_n(&rows, Kpi::TotalContribution, 3);
        assert_eq!(ranked[0].player_name, "third");
        assert_eq!(ranked[1].player_name, "first");
        assert_eq!(ranked[2].player_name, "second");
    }

    #[test]
    fn top_n_truncates_and_handles_short_input() {
        let rows = vec![rec("a", 1, 0.1), rec("b", 2, 0.2)];
        assert_eq!(top_n(&rows, Kpi::Efficiency, 1).len(), 1);
        assert_eq!(top_n(&rows, Kpi::Efficiency, 10).len(), 2);
        assert!(top_n(&[], Kpi::Efficiency, 10).is_empty());
    }

    #[test]
    fn tier_period_means_group_by_tier_then_period() {
        let mut post = rec("c", 6, 0.6);
        post.period = Period::PostPandemic;
        let rows = vec![rec("a", 2, 0.2), rec("b", 4, 0.4), post];

        let groups = tier_period_means(&rows, Kpi::TotalContribution);
        assert_eq!(
            groups,
            vec![(
                Tier::Elite,
                vec![(Period::PrePandemic, 3.0), (Period::PostPandemic, 6.0)],
            )]
        );
        assert!(tier_period_means(&[], Kpi::Efficiency).is_empty());
    }

    #[test]
    fn tier_period_means_keep_negative_means_signed() {
        let rows = vec![rec("a", 2, 0.2), rec("b", 4, 0.4)];
        let groups = tier_period_means(&rows, Kpi::DisciplineScore);
        assert_eq!(groups[0].1, vec![(Period::PrePandemic, -1.0)]);
    }
}
