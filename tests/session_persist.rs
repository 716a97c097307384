use std::fs;
use std::path::PathBuf;

use footstats_terminal::filters::FilterCriteria;
use footstats_terminal::metrics::Kpi;
use footstats_terminal::persist::{load_into_state, save_from_state};
use footstats_terminal::records::{Period, Tier};
use footstats_terminal::state::AppState;

fn scratch_cache_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("footstats_session_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

// XDG_CACHE_HOME is process-global state, so every persistence case lives in
// this one test.
#[test]
fn session_round_trips_through_the_cache_file() {
    let dir = scratch_cache_dir();
    unsafe { std::env::set_var("XDG_CACHE_HOME", &dir) };

    let mut saved = AppState::new();
    saved.criteria = FilterCriteria {
        period: Some(Period::PostPandemic),
        tiers: vec![Tier::CupLower],
        min_minutes: 1200,
    };
    saved.dist_kpi = Kpi::DisciplineScore;
    saved.rank_kpi = Kpi::Efficiency;
    save_from_state(&saved);

    let file = dir.join("footstats_terminal").join("session.json");
    assert!(file.exists(), "session file should land under XDG_CACHE_HOME");
    // The tmp+rename write leaves no temp file behind.
    assert!(!file.with_extension("json.tmp").exists());

    let mut loaded = AppState::new();
    load_into_state(&mut loaded);
    assert_eq!(loaded.criteria, saved.criteria);
    assert_eq!(loaded.dist_kpi, Kpi::DisciplineScore);
    assert_eq!(loaded.rank_kpi, Kpi::Efficiency);

    // A session written by an incompatible version is ignored, not applied.
    let raw = fs::read_to_string(&file).expect("session json");
    fs::write(&file, raw.replace("\"version\":1", "\"version\":99")).expect("rewrite");
    let mut stale = AppState::new();
    load_into_state(&mut stale);
    assert_eq!(stale.criteria, FilterCriteria::default());
    assert_eq!(stale.dist_kpi, Kpi::TotalContribution);

    // Garbage on disk falls back to defaults the same way.
    fs::write(&file, "{not json").expect("rewrite");
    let mut broken = AppState::new();
    load_into_state(&mut broken);
    assert_eq!(broken.criteria, FilterCriteria::default());

    let _ = fs::remove_dir_all(&dir);
}
