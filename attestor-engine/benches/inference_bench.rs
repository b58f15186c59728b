use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use attestor_engine::inference::{InferenceEngine, InferenceOptions, VecRecordSource};
use attestor_model::NormalizedRecord;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn record(path: String, t: u64) -> NormalizedRecord {
    NormalizedRecord {
        method: "GET".to_string(),
        path,
        status: 200,
        timestamp: SystemTime::UNIX_EPOCH + Duration::from_secs(t),
        query: BTreeMap::new(),
        headers: BTreeMap::new(),
    }
}

fn mixed_corpus(n: u64) -> Vec<NormalizedRecord> {
    (0..n)
        .map(|i| {
            let path = match i % 3 {
                0 => format!("/api/users/{}", i),
                1 => "/api/users/profile".to_string(),
                _ => format!("/api/orders/{}/items/{}", i, i % 7),
            };
            record(path, i)
        })
        .collect()
}

fn bench_infer_small_corpus(c: &mut Criterion) {
    c.bench_function("infer 300-record mixed corpus", |b| {
        b.iter_batched(
            || mixed_corpus(300),
            |records| {
                let engine = InferenceEngine::new(InferenceOptions::default());
                black_box(engine.infer(VecRecordSource::new(records)).unwrap())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_infer_saturating_corpus(c: &mut Criterion) {
    c.bench_function("infer corpus that saturates segment analysis", |b| {
        b.iter_batched(
            || {
                let mut options = InferenceOptions::default();
                options.max_unique_values = Some(50);
                options.min_sample_size = Some(1);
                let records: Vec<NormalizedRecord> = (0..5_000).map(|i| record(format!("/api/items/item-{i}"), i)).collect();
                (options, records)
            },
            |(options, records)| {
                let engine = InferenceEngine::new(options);
                black_box(engine.infer(VecRecordSource::new(records)).unwrap())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_infer_small_corpus, bench_infer_saturating_corpus);
criterion_main!(benches);
