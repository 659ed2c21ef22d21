use criterion::{Criterion, criterion_group, criterion_main};
use sapador_core::{
    BoardConfig, BoardGenerator as _, InferenceEngine, RandomBoardGenerator, RevealedCell,
};

const TIERS: &[(&str, (u8, u8), f64)] = &[
    ("beginner", (9, 9), 0.12),
    ("intermediate", (16, 16), 0.15),
    ("expert", (30, 16), 0.175),
];

fn bench_reasoning(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_board_reasoning");

    for &(name, size, density) in TIERS {
        let config = BoardConfig::new(size, density);
        let board = RandomBoardGenerator::new(7).generate(config);

        let mut batch = Vec::new();
        for x in 0..size.0 {
            for y in 0..size.1 {
                let cell = board[(x, y)];
                if !cell.mine {
                    batch.push(RevealedCell::new((x, y), cell.adjacent_mines));
                }
            }
        }

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut engine = InferenceEngine::new(board.size());
                engine.observe(&batch);
                engine.run_to_quiescence().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reasoning);
criterion_main!(benches);
