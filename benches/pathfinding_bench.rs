use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use skirmish::battle::{generate_from_seed, trace, Battlefield, IdAllocator};
use skirmish::core::{GenerationConfig, Position};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn generated_field(seed: u64) -> Battlefield {
    let sector = generate_from_seed(&GenerationConfig::default(), seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Battlefield::from_sector(sector, false, IdAllocator::default(), &mut rng)
}

/// Nearest passable cell scanning right from `pos`
fn open_cell(bf: &Battlefield, pos: Position) -> Position {
    (0..bf.grid.width as i32)
        .map(|dx| Position::new((pos.x + dx) % bf.grid.width as i32, pos.y))
        .find(|p| bf.passable(*p))
        .unwrap_or(pos)
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");

    let open = Battlefield::new(skirmish::battle::Grid::new(80, 40), false);
    group.bench_function("open_field_corner_to_corner", |b| {
        b.iter(|| open.path(black_box(Position::new(0, 0)), black_box(Position::new(79, 39))))
    });

    let bf = generated_field(0xBEEF);
    let from = open_cell(&bf, Position::new(0, 20));
    let to = open_cell(&bf, Position::new(60, 20));
    group.bench_function("generated_sector_across", |b| {
        b.iter(|| bf.path(black_box(from), black_box(to)))
    });
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    c.bench_function("generate_sector_80x40", |b| {
        let mut seed = 0u64;
        b.iter_batched(
            || {
                seed += 1;
                seed
            },
            |seed| generate_from_seed(&GenerationConfig::default(), seed),
            BatchSize::SmallInput,
        )
    });
}

fn bench_sight(c: &mut Criterion) {
    let bf = generated_field(7);
    c.bench_function("sight_line_across_sector", |b| {
        b.iter(|| bf.sight(black_box(Position::new(1, 1)), black_box(Position::new(78, 38))))
    });
    c.bench_function("trace_long_diagonal", |b| {
        b.iter(|| trace(black_box(Position::new(0, 0)), black_box(Position::new(79, 27))))
    });
}

criterion_group!(benches, bench_paths, bench_generation, bench_sight);
criterion_main!(benches);
