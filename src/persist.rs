use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::filters::FilterCriteria;
use crate::metrics::Kpi;
use crate::state::AppState;

const CACHE_DIR: &str = "footstats_terminal";
const CACHE_FILE: &str = "session.json";
const CACHE_VERSION: u32 = 1;

/// Last-used UI selections, restored on the next launch. Holds no
/// performance data; the dashboard never writes to the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    criteria: FilterCriteria,
    dist_kpi: Kpi,
    rank_kpi: Kpi,
    #[serde(default)]
    saved_at: Option<String>,
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = session_path() else {
        return;
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return;
    };
    let Ok(session) = serde_json::from_str::<SessionFile>(&raw) else {
        return;
    };
    if session.version != CACHE_VERSION {
        return;
    }
    state.criteria = session.criteria;
    state.dist_kpi = session.dist_kpi;
    state.rank_kpi = session.rank_kpi;
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = session_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let session = SessionFile {
        version: CACHE_VERSION,
        criteria: state.criteria.clone(),
        dist_kpi: state.dist_kpi,
        rank_kpi: state.rank_kpi,
        saved_at: Some(Utc::now().to_rfc3339()),
    };

    if let Ok(json) = serde_json::to_string(&session) {
        write_atomically(&path, &json);
    }
}

fn write_atomically(path: &Path, json: &str) {
    let tmp = path.with_extension("json.tmp");
    if fs::write(&tmp, json).is_ok() {
        let _ = fs::rename(&tmp, path);
    }
}

fn session_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
