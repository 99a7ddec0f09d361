use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tui_match3::core::cascade::{compact, mark_removed, refill, settle};
use tui_match3::core::{
    find_hint_pair, find_matches, CardFactory, CascadePacing, GameConfig, Grid, Session, SpawnRules,
};

const RULES: SpawnRules = SpawnRules {
    pool: 5,
    trap_rate: 0.05,
};

fn random_grid(seed: u64) -> (Grid, CardFactory, SmallRng) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut factory = CardFactory::new();
    let grid = Grid::filled(8, 8, &mut factory, RULES, &mut rng, 0);
    (grid, factory, rng)
}

fn bench_find_matches(c: &mut Criterion) {
    let (grid, _, _) = random_grid(12345);
    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| find_matches(black_box(&grid), 3))
    });
}

fn bench_hint_search(c: &mut Criterion) {
    let (mut grid, _, _) = random_grid(12345);
    c.bench_function("find_hint_pair_8x8", |b| {
        b.iter(|| find_hint_pair(black_box(&mut grid), 3))
    });
}

fn bench_cascade_cycle(c: &mut Criterion) {
    c.bench_function("cascade_remove_compact_refill", |b| {
        b.iter(|| {
            let (mut grid, mut factory, mut rng) = random_grid(777);
            let mut removed = Vec::new();
            let groups = find_matches(&grid, 3);
            mark_removed(&mut grid, &groups, 0, &mut removed);
            compact(&mut grid);
            refill(&mut grid, &mut factory, RULES, &mut rng, 0);
            settle(&mut grid);
            black_box(grid)
        })
    });
}

fn bench_session_tick(c: &mut Criterion) {
    let mut session = Session::new(
        GameConfig::campaign()
            .with_seed(12345)
            .with_pacing(CascadePacing::immediate()),
    );
    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            session.tick(black_box(16));
        })
    });
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_hint_search,
    bench_cascade_cycle,
    bench_session_tick
);
criterion_main!(benches);
