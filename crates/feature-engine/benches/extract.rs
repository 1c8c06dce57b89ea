use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::fixtures::synthetic_face;
use feature_engine::FeatureExtractor;

fn bench_extract(c: &mut Criterion) {
    let extractor = FeatureExtractor::new();
    let face = synthetic_face(0.8, 0.4);

    c.bench_function("extract_face_mesh_features", |b| {
        b.iter(|| extractor.extract(black_box(&face)))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
