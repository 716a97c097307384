use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use footstats_terminal::aggregate::{summarize, top_n};
use footstats_terminal::metrics::Kpi;
use footstats_terminal::players::list_players;
use footstats_terminal::records::{Period, PlayerRecord, Tier};

fn synthetic_records(n: usize) -> Vec<PlayerRecord> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n)
        .map(|i| {
            let goals = rng.gen_range(0..30);
            let assists = rng.gen_range(0..20);
            let minutes = rng.gen_range(0..=3000);
            let total = goals + assists;
            PlayerRecord {
                player_name: format!("player_{:04}", i % 500),
                period: if rng.gen_bool(0.5) {
                    Period::PrePandemic
                } else {
                    Period::PostPandemic
                },
                tier: match rng.gen_range(0..3) {
                    0 => Tier::Elite,
                    1 => Tier::Competitive,
                    _ => Tier::CupLower,
                },
                minutes_played: minutes,
                goals,
                assists,
                total_contribution: total,
                efficiency: PlayerRecord::efficiency_of(total, minutes),
                discipline_score: -rng.gen_range(0.0..6.0),
            }
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let records = synthetic_records(10_000);

    c.bench_function("summarize_10k", |b| {
        b.iter(|| summarize(black_box(&records)))
    });

    c.bench_function("top_n_10k", |b| {
        b.iter(|| top_n(black_box(&records), Kpi::Efficiency, 10))
    });

    c.bench_function("list_players_10k", |b| {
        b.iter(|| list_players(black_box(&records)))
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
