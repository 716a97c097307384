use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

use footstats_terminal::dataset::{init_schema, insert_record};
use footstats_terminal::records::{Period, PlayerRecord, Tier};

const PLAYER_NAMES: &[&str] = &[
    "Adeyemi", "Baresi", "Cubarsi", "Dragusin", "Eze", "Ferran", "Gravenberch", "Hojlund",
    "Isak", "Jorginho", "Kvaratskhelia", "Lautaro", "Mainoo", "Nkunku", "Olise", "Pedri",
    "Quansah", "Rodrygo", "Saliba", "Tonali", "Ugarte", "Vitinha", "Wirtz", "Xavi Simons",
    "Yamal", "Zaire-Emery",
];

/// Creates a demo `football_data.db` so the dashboard has data to show.
/// Out-of-band tooling: the dashboard itself never writes to the database.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FOOTBALL_DB").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("football_data.db"));

    let conn = Connection::open(&path)
        .with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;

    let mut rng = StdRng::seed_from_u64(2026);
    let mut inserted = 0usize;

    for name in PLAYER_NAMES {
        for period in Period::ALL {
            // Not every player appears in every period or tier.
            if rng.gen_bool(0.15) {
                continue;
            }
            let tier = match rng.gen_range(0..10) {
                0..=4 => Tier::Elite,
                5..=7 => Tier::Competitive,
                _ => Tier::CupLower,
            };
            let minutes_played: u32 = rng.gen_range(0..=3000);
            let goals: u32 = rng.gen_range(0..=25);
            let assists: u32 = rng.gen_range(0..=18);
            let total_contribution = goals + assists;
            let rec = PlayerRecord {
                player_name: (*name).to_string(),
                period,
                tier,
                minutes_played,
                goals,
                assists,
                total_contribution,
                efficiency: PlayerRecord::efficiency_of(total_contribution, minutes_played),
                discipline_score: -rng.gen_range(0.0..6.0),
            };
            insert_record(&conn, &rec)?;
            inserted += 1;
        }
    }

    println!("Seed complete");
    println!("DB: {}", path.display());
    println!("Rows inserted: {inserted}");
    Ok(())
}
