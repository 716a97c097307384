use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::records::{Period, Tier};

pub const PERFORMANCES_TABLE: &str = "player_performances";

/// The three analyst-facing filters, carried as an explicit value through the
/// pipeline. `period: None` means "All"; an empty tier set applies no tier
/// restriction (all tiers pass).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub period: Option<Period>,
    pub tiers: Vec<Tier>,
    pub min_minutes: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        // Mirrors the dashboard's startup selection.
        Self {
            period: None,
            tiers: vec![Tier::Elite, Tier::Competitive],
            min_minutes: 500,
        }
    }
}

impl FilterCriteria {
    /// True when the criteria cannot exclude any row.
    pub fn is_all_pass(&self) -> bool {
        self.period.is_none() && self.tiers.is_empty() && self.min_minutes == 0
    }

    pub fn toggle_tier(&mut self, tier: Tier) {
        if let Some(pos) = self.tiers.iter().position(|t| *t == tier) {
            self.tiers.remove(pos);
        } else {
            self.tiers.push(tier);
            self.tiers.sort();
        }
    }

    pub fn cycle_period(&mut self) {
        self.period = match self.period {
            None => Some(Period::PrePandemic),
            Some(Period::PrePandemic) => Some(Period::PostPandemic),
            Some(Period::PostPandemic) => None,
        };
    }

    /// Compile into a SELECT over `player_performances`. Every value is bound
    /// through a `?N` placeholder; nothing user-influenced lands in the SQL
    /// text itself.
    pub fn compile(&self) -> CompiledQuery {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        params.push(Value::Integer(i64::from(self.min_minutes)));
        clauses.push(format!("minutes_played >= ?{}", params.len()));

        if let Some(period) = self.period {
            params.push(Value::Text(period.as_sql_str().to_string()));
            clauses.push(format!("period = ?{}", params.len()));
        }

        if !self.tiers.is_empty() {
            let mut placeholders = Vec::with_capacity(self.tiers.len());
            for tier in &self.tiers {
                params.push(Value::Text(tier.as_sql_str().to_string()));
                placeholders.push(format!("?{}", params.len()));
            }
            clauses.push(format!("tier IN ({})", placeholders.join(", ")));
        }

        let sql = format!(
            "SELECT player_name, period, tier, minutes_played, goals, assists, \
             total_contribution, efficiency, discipline_score \
             FROM {PERFORMANCES_TABLE} WHERE {} ORDER BY rowid",
            clauses.join(" AND ")
        );

        CompiledQuery { sql, params }
    }
}

/// A parameterized query: SQL text with placeholders plus the bound values,
/// in placeholder order.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_texts(q: &CompiledQuery) -> Vec<String> {
        q.params
            .iter()
            .filter_map(|v| match v {
                Value::Text(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn all_pass_criteria_compiles_to_minutes_clause_only() {
        let criteria = FilterCriteria {
            period: None,
            tiers: Vec::new(),
            min_minutes: 0,
        };
        let q = criteria.compile();
        assert!(q.sql.contains("minutes_played >= ?1"));
        assert!(!q.sql.contains("period ="));
        assert!(!q.sql.contains("tier IN"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn every_selected_value_is_bound_not_interpolated() {
        let criteria = FilterCriteria {
            period: Some(Period::PrePandemic),
            tiers: vec![Tier::Elite, Tier::CupLower],
            min_minutes: 750,
        };
        let q = criteria.compile();

        // One placeholder per bound value, and none of the values appear
        // verbatim in the SQL text.
        assert_eq!(q.params.len(), 4);
        for n in 1..=q.params.len() {
            assert!(q.sql.contains(&format!("?{n}")));
        }
        assert!(!q.sql.contains("750"));
        for text in bound_texts(&q) {
            assert!(!q.sql.contains(&text));
        }
    }

    #[test]
    fn empty_tier_set_means_no_tier_clause() {
        let criteria = FilterCriteria {
            period: None,
            tiers: Vec::new(),
            min_minutes: 500,
        };
        assert!(!criteria.compile().sql.contains("tier IN"));
    }

    #[test]
    fn toggle_tier_adds_then_removes() {
        let mut criteria = FilterCriteria {
            period: None,
            tiers: vec![Tier::Elite],
            min_minutes: 0,
        };
        criteria.toggle_tier(Tier::CupLower);
        assert_eq!(criteria.tiers, vec![Tier::Elite, Tier::CupLower]);
        criteria.toggle_tier(Tier::Elite);
        assert_eq!(criteria.tiers, vec![Tier::CupLower]);
    }

    #[test]
    fn cycle_period_walks_all_then_back_to_all() {
        let mut criteria = FilterCriteria::default();
        assert_eq!(criteria.period, None);
        criteria.cycle_period();
        assert_eq!(criteria.period, Some(Period::PrePandemic));
        criteria.cycle_period();
        assert_eq!(criteria.period, Some(Period::PostPandemic));
        criteria.cycle_period();
        assert_eq!(criteria.period, None);
    }
}
