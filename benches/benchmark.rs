use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use standings_core::config::SimulationConfig;
use standings_core::driver::SimulationDriver;
use standings_core::game::GameRecord;
use standings_core::ratings::RatingTable;
use standings_core::season::simulate_season;
use standings_core::standings::compute_standings;
use standings_core::team::{directory, Team, TeamDirectory};
use standings_core::win_prob::{rating_delta, rating_diff, win_probability, win_probability_from_diff};

const DIVISIONS: [(&str, &str); 4] = [
    ("Atlantic", "Eastern"),
    ("Metropolitan", "Eastern"),
    ("Central", "Western"),
    ("Pacific", "Western"),
];

/// 32 teams, every pair meeting home and away, the first half of the schedule final.
fn create_league() -> (TeamDirectory, RatingTable, Vec<GameRecord>) {
    let mut teams = Vec::new();
    let mut ratings = RatingTable::new();
    for i in 0..32 {
        let id = format!("T{:02}", i);
        let (division, conference) = DIVISIONS[i / 8];
        teams.push(Team::new(id.clone(), format!("Team {}", i), division, conference, format!("Arena {}", i)));
        ratings.insert(id, 1400.0 + (i as f64 * 37.0) % 200.0);
    }
    let teams = directory(teams);

    let start = NaiveDate::from_ymd_opt(2023, 10, 10).unwrap();
    let mut season = Vec::new();
    let mut id = 0;
    for home in 0..32 {
        for away in 0..32 {
            if home == away {
                continue;
            }
            let date = start + Duration::days(id / 6);
            let game = GameRecord::scheduled(
                id,
                date,
                format!("Arena {}", home),
                format!("T{:02}", home),
                format!("T{:02}", away),
            );
            season.push(game);
            id += 1;
        }
    }
    let played = season.len() / 2;
    for (i, game) in season.iter_mut().take(played).enumerate() {
        *game = if i % 3 == 0 {
            game.clone().with_result(2, 3, true, i % 2 == 0)
        } else {
            game.clone().with_result(4, 1, false, false)
        };
    }

    (teams, ratings, season)
}

fn bench_win_probability(c: &mut Criterion) {
    c.bench_function("win_probability", |b| {
        b.iter(|| win_probability(black_box(1560.0), black_box(1490.0), black_box(true)))
    });
}

fn bench_rating_delta(c: &mut Criterion) {
    let game = GameRecord::scheduled(1, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), "Arena", "A", "B")
        .with_result(5, 2, false, false);
    let diff = rating_diff(1560.0, 1490.0, true);
    let prob = win_probability_from_diff(diff);

    c.bench_function("rating_delta", |b| {
        b.iter(|| rating_delta(black_box(diff), black_box(prob), black_box(&game)))
    });
}

fn bench_simulate_season(c: &mut Criterion) {
    let (teams, ratings, season) = create_league();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("simulate_season_32_teams", |b| {
        b.iter(|| simulate_season(black_box(&ratings), black_box(&season), &teams, 10_000, &mut rng))
    });
}

fn bench_compute_standings(c: &mut Criterion) {
    let (teams, ratings, season) = create_league();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let completed = simulate_season(&ratings, &season, &teams, 10_000, &mut rng).unwrap();

    c.bench_function("compute_standings_32_teams", |b| {
        b.iter(|| compute_standings(black_box(&teams), black_box(&completed)))
    });
}

fn bench_driver(c: &mut Criterion) {
    let (teams, ratings, season) = create_league();
    let driver = SimulationDriver::new(teams, ratings, season, SimulationConfig::default()).unwrap();

    let mut group = c.benchmark_group("driver");
    group.sample_size(10);
    group.bench_function("run_100_sims_batch", |b| {
        b.iter(|| black_box(&driver).run_simulations(100, Some(42)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_win_probability,
    bench_rating_delta,
    bench_simulate_season,
    bench_compute_standings,
    bench_driver,
);
criterion_main!(benches);
