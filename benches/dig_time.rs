use criterion::{Criterion, black_box, criterion_group, criterion_main};
use endermite::{
    BlockFactory, DigConditions, Effect, Effects, Enchantment, Registry, block_hash, properties,
};
use std::sync::Arc;

const PC_1_20: &str = include_str!("../fixtures/pc_1_20.json");

pub fn criterion_benchmark(c: &mut Criterion) {
    let registry = Registry::from_json(PC_1_20).expect("fixture registry");
    let blocks = BlockFactory::new(Arc::new(registry));

    c.bench_function("from_state_id (all fixture states)", |b| {
        b.iter(|| {
            for state_id in 0..153 {
                black_box(blocks.from_state_id(black_box(state_id), 1));
            }
        })
    });

    let ore = blocks.from_string("iron_ore", 0).expect("iron ore");
    let pickaxe = blocks.registry().item_by_name("iron_pickaxe").map(|i| i.id);
    let enchantments = [Enchantment::new("efficiency", 5)];
    let mut effects = Effects::new();
    effects.insert(
        3,
        Effect {
            amplifier: 1,
            duration: 600,
        },
    );
    c.bench_function("dig_time (efficiency + haste)", |b| {
        b.iter(|| {
            black_box(ore.dig_time(
                black_box(pickaxe),
                DigConditions::default(),
                &enchantments,
                &effects,
            ))
        })
    });

    let candle = properties([("candles", "3"), ("lit", "true"), ("waterlogged", "false")]);
    c.bench_function("block_hash", |b| {
        b.iter(|| black_box(block_hash(black_box("candle"), &candle)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
