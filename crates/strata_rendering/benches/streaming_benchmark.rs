//! Benchmark for chunk meshing and clipmap sync.
//!
//! TARGET: a full ring-0 chunk (64x64 quads) in well under a millisecond
//!
//! Run with: cargo bench --package strata_rendering --bench streaming_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{generate_heightmap, NoiseProfile};
use strata_rendering::{
    ChunkCoord, HeadlessBackend, RuntimeSettings, TerrainLodManager, TerrainMeshBridge, TerrainRuntime3DManager,
};

fn benchmark_chunk_mesh(c: &mut Criterion) {
    let hf = generate_heightmap(512, &NoiseProfile::with_seed(42));

    let mut group = c.benchmark_group("chunk_mesh");
    group.throughput(Throughput::Elements(65 * 65));
    group.bench_function("resolution_64", |b| {
        b.iter(|| {
            black_box(TerrainMeshBridge::generate_chunk_mesh_data(
                &hf,
                black_box(ChunkCoord::new(1, 1)),
                64,
                1.0,
                64.0,
            ))
        });
    });
    group.finish();
}

fn benchmark_visible_chunks(c: &mut Criterion) {
    let lod = TerrainLodManager::default();

    c.bench_function("compute_visible_chunks_default_rings", |b| {
        b.iter(|| black_box(lod.compute_visible_chunks(black_box([1234.0, 0.0, -987.0]), 64.0)));
    });
}

fn benchmark_full_sync(c: &mut Criterion) {
    let hf = generate_heightmap(512, &NoiseProfile::with_seed(42));
    let lod = TerrainLodManager::default();
    let near = lod.compute_visible_chunks([0.0; 3], 32.0);
    let far = lod.compute_visible_chunks([320.0, 0.0, 0.0], 32.0);

    let mut runtime = TerrainRuntime3DManager::new(
        HeadlessBackend::new(),
        RuntimeSettings {
            chunk_size: 32.0,
            max_rebuilds_per_sync: 0,
            ..RuntimeSettings::default()
        },
    );

    let mut group = c.benchmark_group("clipmap_sync");
    group.sample_size(20);
    group.bench_function("unbounded_shift_10_chunks", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let rings = if flip { &far } else { &near };
            black_box(runtime.sync_clipmap(&hf, rings, 32))
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_chunk_mesh, benchmark_visible_chunks, benchmark_full_sync);
criterion_main!(benches);
