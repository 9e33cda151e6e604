//! Benchmarks for kvemu engine operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kvemu::{Config, GroupCondition, IteratorMode, KvEmulator, StoreOption};

const KEYS: u32 = 10_000;

fn key(i: u32) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&(i % 8).to_be_bytes());
    key[4..].copy_from_slice(&i.to_be_bytes());
    key
}

fn filled_engine(value_size: usize) -> KvEmulator {
    let engine = KvEmulator::new(Config::default()).unwrap();
    let value = vec![7u8; value_size];
    for i in 0..KEYS {
        engine.store(&key(i), &value, StoreOption::None).unwrap();
    }
    engine
}

fn store_benchmarks(c: &mut Criterion) {
    let engine = KvEmulator::new(Config::default()).unwrap();
    let value = vec![1u8; 512];
    let mut i = 0u32;

    c.bench_function("store_512b", |b| {
        b.iter(|| {
            i = i.wrapping_add(1);
            engine
                .store(black_box(&key(i % KEYS)), black_box(&value), StoreOption::None)
                .unwrap()
        })
    });
}

fn retrieve_benchmarks(c: &mut Criterion) {
    let engine = filled_engine(512);
    let mut buf = vec![0u8; 512];
    let mut i = 0u32;

    c.bench_function("retrieve_512b", |b| {
        b.iter(|| {
            i = i.wrapping_add(1);
            engine.retrieve(black_box(&key(i % KEYS)), 0, &mut buf).unwrap()
        })
    });
}

fn iterator_benchmarks(c: &mut Criterion) {
    let engine = filled_engine(64);
    let mut buffer = vec![0u8; 32 * 1024];

    c.bench_function("next_set_group_32k", |b| {
        b.iter_batched(
            || {
                engine
                    .open_iterator(IteratorMode::KeyValue, GroupCondition::new(u32::MAX, 3), false)
                    .unwrap()
            },
            |handle| {
                let mut total = 0u32;
                loop {
                    let list = engine.iterator_next_set(handle, &mut buffer).unwrap();
                    total += list.num_entries;
                    if list.end {
                        break;
                    }
                }
                engine.close_iterator(handle).unwrap();
                total
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    store_benchmarks,
    retrieve_benchmarks,
    iterator_benchmarks
);
criterion_main!(benches);
