use std::path::{Path, PathBuf};

use rusqlite::{Connection, params_from_iter};
use thiserror::Error;

use crate::filters::{FilterCriteria, PERFORMANCES_TABLE};
use crate::records::{Period, PlayerRecord, Tier};

/// Columns the dashboard requires on `player_performances`.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "player_name",
    "period",
    "tier",
    "minutes_played",
    "goals",
    "assists",
    "total_contribution",
    "efficiency",
    "discipline_score",
];

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("schema mismatch: {PERFORMANCES_TABLE} is missing column '{column}'")]
    SchemaMismatch { column: String },
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Read-only handle on the SQLite file. Each fetch opens its own connection
/// and drops it before returning, failure paths included.
#[derive(Debug, Clone)]
pub struct DataSource {
    path: PathBuf,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// DB path from `FOOTBALL_DB`, falling back to `football_data.db` in the
    /// working directory.
    pub fn from_env() -> Self {
        let path = std::env::var("FOOTBALL_DB")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("football_data.db"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One synchronous attempt, no retry; errors surface to the caller.
    pub fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<PlayerRecord>, DataSourceError> {
        let conn = Connection::open_with_flags(
            &self.path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )
        .map_err(|source| DataSourceError::Open {
            path: self.path.clone(),
            source,
        })?;
        verify_schema(&conn)?;
        fetch_with_conn(&conn, criteria)
    }
}

/// Confirm every required column exists before querying, so a stale or
/// foreign database fails with a named column instead of a SQL error.
pub fn verify_schema(conn: &Connection) -> Result<(), DataSourceError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({PERFORMANCES_TABLE})"))?;
    let present: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;
    for required in REQUIRED_COLUMNS {
        if !present.iter().any(|c| c == required) {
            return Err(DataSourceError::SchemaMismatch {
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

/// Run the compiled query on an existing connection. Split out so tests can
/// work against in-memory databases.
pub fn fetch_with_conn(
    conn: &Connection,
    criteria: &FilterCriteria,
) -> Result<Vec<PlayerRecord>, DataSourceError> {
    let query = criteria.compile();
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| {
        let period_raw: String = row.get(1)?;
        let tier_raw: String = row.get(2)?;
        let period = Period::from_sql_str(&period_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("unknown period '{period_raw}'").into(),
            )
        })?;
        let tier = Tier::from_sql_str(&tier_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown tier '{tier_raw}'").into(),
            )
        })?;
        Ok(PlayerRecord {
            player_name: row.get(0)?,
            period,
            tier,
            minutes_played: row.get(3)?,
            goals: row.get(4)?,
            assists: row.get(5)?,
            total_contribution: row.get(6)?,
            efficiency: row.get(7)?,
            discipline_score: row.get(8)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Schema used by the seed tool and the test fixtures.
pub fn init_schema(conn: &Connection) -> Result<(), DataSourceError> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {PERFORMANCES_TABLE} (
            player_name TEXT NOT NULL,
            period TEXT NOT NULL,
            tier TEXT NOT NULL,
            minutes_played INTEGER NOT NULL,
            goals INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            total_contribution INTEGER NOT NULL,
            efficiency REAL NOT NULL,
            discipline_score REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_performances_period ON {PERFORMANCES_TABLE}(period);
        CREATE INDEX IF NOT EXISTS idx_performances_tier ON {PERFORMANCES_TABLE}(tier);
        CREATE INDEX IF NOT EXISTS idx_performances_minutes ON {PERFORMANCES_TABLE}(minutes_played);
        "#
    ))?;
    Ok(())
}

/// Insert one record. Used by the out-of-band seed tool and tests only; the
/// dashboard itself never writes.
pub fn insert_record(conn: &Connection, rec: &PlayerRecord) -> Result<(), DataSourceError> {
    conn.execute(
        &format!(
            "INSERT INTO {PERFORMANCES_TABLE} (
                player_name, period, tier, minutes_played, goals, assists,
                total_contribution, efficiency, discipline_score
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        rusqlite::params![
            rec.player_name,
            rec.period.as_sql_str(),
            rec.tier.as_sql_str(),
            rec.minutes_played,
            rec.goals,
            rec.assists,
            rec.total_contribution,
            rec.efficiency,
            rec.discipline_score,
        ],
    )?;
    Ok(())
}
