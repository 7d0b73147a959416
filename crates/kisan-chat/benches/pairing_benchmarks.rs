//! Benchmark for the history pairing scan.
//!
//! The review screen re-pairs the full fetched page on every refresh, so the
//! scan must stay linear and cheap even for large audit pages.

use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use kisan_chat::pair_exchanges;
use kisan_core::types::{Role, StoredTurn, StoredTurnId, UserId};

/// Build a newest-first log of `pairs` alternating exchanges.
fn alternating_log(pairs: usize) -> Vec<StoredTurn> {
    let base = Utc::now();
    let mut turns = Vec::with_capacity(pairs * 2);
    for i in (0..pairs).rev() {
        turns.push(StoredTurn {
            id: StoredTurnId((i * 2 + 2) as i64),
            user_id: UserId::new("bench-user"),
            role: Role::Model,
            text: format!("answer {}", i),
            created_at: base + Duration::milliseconds((i * 2 + 2) as i64),
        });
        turns.push(StoredTurn {
            id: StoredTurnId((i * 2 + 1) as i64),
            user_id: UserId::new("bench-user"),
            role: Role::User,
            text: format!("question {}", i),
            created_at: base + Duration::milliseconds((i * 2 + 1) as i64),
        });
    }
    turns
}

/// A log where every third answer is missing, as left by failed exchanges.
fn gappy_log(pairs: usize) -> Vec<StoredTurn> {
    alternating_log(pairs)
        .into_iter()
        .filter(|t| !(t.role == Role::Model && t.id.0 % 6 == 0))
        .collect()
}

fn bench_pairing(c: &mut Criterion) {
    let alternating = alternating_log(5_000);
    c.bench_function("pair_exchanges/alternating_10k_turns", |b| {
        b.iter(|| pair_exchanges(std::hint::black_box(&alternating)))
    });

    let gappy = gappy_log(5_000);
    c.bench_function("pair_exchanges/gappy_10k_turns", |b| {
        b.iter(|| pair_exchanges(std::hint::black_box(&gappy)))
    });
}

criterion_group!(benches, bench_pairing);
criterion_main!(benches);
