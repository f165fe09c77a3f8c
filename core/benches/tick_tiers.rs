use std::hint::black_box;

use arcadero_core::*;
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_flood_reveal(c: &mut Criterion) {
    // one mine in the far corner leaves a single huge zero region
    let layout = MineLayout::from_mine_coords((64, 64), &[(63, 63)]).unwrap();

    c.bench_function("flood_reveal_64x64", |b| {
        b.iter(|| {
            let mut game = MinefieldGame::new(layout.clone());
            black_box(game.reveal((0, 0)))
        })
    });
}

fn bench_shooter_frames(c: &mut Criterion) {
    c.bench_function("shooter_120_frames", |b| {
        b.iter(|| {
            let mut game = ShooterGame::new(ShooterConfig::standard(), 99).unwrap();
            game.key_down(Intent::MoveRight);
            for frame in 0..120 {
                if frame % 10 == 0 {
                    game.key_up(Intent::Fire);
                    game.key_down(Intent::Fire);
                }
                game.step();
            }
            black_box(game.score())
        })
    });
}

fn bench_combat_steps(c: &mut Criterion) {
    c.bench_function("combat_120_steps", |b| {
        b.iter(|| {
            let mut game = CombatGame::new(CombatConfig::standard(), 7).unwrap();
            for _ in 0..120 {
                game.step();
            }
            black_box(game.agents()[0].pos)
        })
    });
}

criterion_group!(
    benches,
    bench_flood_reveal,
    bench_shooter_frames,
    bench_combat_steps
);
criterion_main!(benches);
