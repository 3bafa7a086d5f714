//! Buffer pool benchmarks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hearth_buffer::{BufferPoolConfig, BufferPoolManager, ExtendibleHashTable, LruKReplacer};
use hearth_common::types::FrameId;
use hearth_storage::MemoryDiskManager;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn replacer_churn_benchmark(c: &mut Criterion) {
    c.bench_function("replacer_churn_1000", |b| {
        b.iter(|| {
            let replacer = LruKReplacer::new(1000, 2);
            for i in 0..1000u32 {
                let frame = FrameId::new(i);
                replacer.record_access(frame);
                replacer.record_access(frame);
                replacer.set_evictable(frame, true);
            }
            let mut evicted = 0;
            while replacer.evict().is_some() {
                evicted += 1;
            }
            black_box(evicted)
        })
    });
}

fn page_table_insert_benchmark(c: &mut Criterion) {
    c.bench_function("page_table_insert_1000", |b| {
        b.iter(|| {
            let table = ExtendibleHashTable::new(4);
            for i in 0..1000u64 {
                table.insert(i, i * 2);
            }
            black_box(table.num_buckets())
        })
    });
}

fn page_table_find_benchmark(c: &mut Criterion) {
    let table = ExtendibleHashTable::new(4);
    for i in 0..1000u64 {
        table.insert(i, i * 2);
    }

    c.bench_function("page_table_find_1000", |b| {
        b.iter(|| {
            for i in 0..1000u64 {
                black_box(table.find(&i));
            }
        })
    });
}

fn pool_fetch_benchmark(c: &mut Criterion) {
    let config = BufferPoolConfig::default()
        .with_pool_size(64)
        .with_replacer_k(2);
    let pool = BufferPoolManager::new(config, Arc::new(MemoryDiskManager::new()));

    // Materialize a working set twice the pool size, then fetch from it
    // at random so the replacer sees steady churn.
    let mut page_ids = Vec::new();
    for _ in 0..128 {
        let (page_id, _) = pool.new_page().unwrap();
        pool.unpin_page(page_id, true);
        page_ids.push(page_id);
    }

    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("pool_random_fetch", |b| {
        b.iter(|| {
            let page_id = page_ids[rng.gen_range(0..page_ids.len())];
            let handle = pool.fetch_page(page_id).unwrap();
            black_box(handle.read().page_id());
            drop(handle);
            pool.unpin_page(page_id, false);
        })
    });
}

criterion_group!(
    benches,
    replacer_churn_benchmark,
    page_table_insert_benchmark,
    page_table_find_benchmark,
    pool_fetch_benchmark,
);
criterion_main!(benches);
