//! # Pipeline Tests
//!
//! World init → heightmap event → frames, with a headless backend.
//!
//! Run with: cargo test -p strata --test pipeline_test -- --nocapture

use strata::{TerrainConfig, TerrainPipeline};
use strata_procedural::{ElevationQuery, Heightfield, HeightmapReady, HeightmapSource, NoiseProfile};
use strata_rendering::HeadlessBackend;

/// Small world so the tests stay fast.
fn small_config() -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.generation.size = 128;
    config.generation.erosion_iterations = 2_000;
    config.generation.sea_level = 4.0;
    config.generation.profile.height_scale = 30.0;
    config.runtime.chunk_size = 16.0;
    config.runtime.base_resolution = 8;
    config.runtime.max_rebuilds_per_sync = 0;
    config.runtime.detail_radius = 40.0;
    config.lod.ring_radii = vec![1, 2, 4];
    config.lod.vertex_strides = vec![1, 2, 4];
    config
}

fn pipeline(config: TerrainConfig) -> TerrainPipeline<HeadlessBackend> {
    TerrainPipeline::new(config, HeadlessBackend::new()).expect("valid config")
}

/// Test: world init through the event source builds the first clipmap.
#[test]
fn test_world_init_to_first_frame() {
    let mut pipeline = pipeline(small_config());
    let source = HeightmapSource::default();
    pipeline.bind_source(&source);

    assert_eq!(pipeline.publish_world(&source), 1);
    let report = pipeline.update_frame([64.0, 0.0, 64.0]);
    println!("First frame: {report:?}");

    assert!(report.heightmap_applied);
    assert!(report.clipmap_rebuilt);
    let sync = report.sync.expect("first frame syncs");
    assert_eq!(sync.requested, 9 * 9);
    assert_eq!(sync.built, 9 * 9);
    assert_eq!(pipeline.runtime().active_chunk_count(), 81);
    assert_eq!(pipeline.runtime().backend().visible_count(), 81);
    assert!(pipeline.detail_renderer().grass_count() > 0);
}

/// Test: frames without camera crossings do no chunk work.
#[test]
fn test_idle_frames() {
    let mut pipeline = pipeline(small_config());
    let source = HeightmapSource::default();
    pipeline.bind_source(&source);
    pipeline.publish_world(&source);
    pipeline.update_frame([8.0, 0.0, 8.0]);

    let report = pipeline.update_frame([9.0, 0.0, 9.0]);
    assert!(!report.heightmap_applied);
    assert!(!report.clipmap_rebuilt);
    assert_eq!(report.sync, None);

    let report = pipeline.update_frame([40.0, 0.0, 8.0]);
    assert!(report.clipmap_rebuilt);
    assert!(report.sync.is_some_and(|sync| sync.released > 0));
}

/// Test: a disabled pipeline builds nothing, re-enabling streams again.
#[test]
fn test_disabled_pipeline() {
    let mut pipeline = pipeline(small_config());
    let source = HeightmapSource::default();
    pipeline.bind_source(&source);
    pipeline.configure_runtime_pipeline(false, NoiseProfile::with_seed(3), 500);
    pipeline.publish_world(&source);

    let report = pipeline.update_frame([0.0; 3]);
    assert!(report.heightmap_applied);
    assert_eq!(report.sync, None);
    assert_eq!(pipeline.runtime().active_chunk_count(), 0);
    assert_eq!(pipeline.detail_renderer().grass_count(), 0);

    pipeline.configure_runtime_pipeline(true, NoiseProfile::with_seed(3), 500);
    let report = pipeline.update_frame([0.0; 3]);
    assert!(report.clipmap_rebuilt);
    assert_eq!(pipeline.runtime().active_chunk_count(), 81);
}

/// Test: disabling a running pipeline pools every chunk.
#[test]
fn test_disable_releases_chunks() {
    let mut pipeline = pipeline(small_config());
    pipeline.apply_heightmap(HeightmapReady::new(Heightfield::flat(64, 20.0), 5.0));
    pipeline.update_frame([0.0; 3]);
    assert_eq!(pipeline.runtime().active_chunk_count(), 81);

    pipeline.configure_runtime_pipeline(false, NoiseProfile::default(), 0);
    assert!(!pipeline.is_enabled());
    assert_eq!(pipeline.runtime().active_chunk_count(), 0);
    assert_eq!(pipeline.runtime().pool_size(), 81);
    assert_eq!(pipeline.runtime().backend().visible_count(), 0);
}

/// Test: rebinding listens to the new source only.
#[test]
fn test_rebind_source() {
    let mut pipeline = pipeline(small_config());
    let old_source = HeightmapSource::default();
    let new_source = HeightmapSource::default();

    pipeline.bind_source(&old_source);
    pipeline.bind_source(&new_source);

    let stale = HeightmapReady::new(Heightfield::flat(32, 1.0), 0.0);
    assert_eq!(old_source.publish(&stale), 0, "Old source has no live listener");
    assert_eq!(old_source.subscriber_count(), 0);
    assert!(!pipeline.poll_events());

    let fresh = HeightmapReady::new(Heightfield::flat(48, 2.0), 0.5);
    assert_eq!(new_source.publish(&fresh), 1);
    assert!(pipeline.poll_events());
    assert_eq!(pipeline.heightfield().map(Heightfield::size), Some(48));
    assert_eq!(pipeline.sea_level(), 0.5);
}

/// Test: only the newest queued heightmap is applied.
#[test]
fn test_latest_heightmap_wins() {
    let mut pipeline = pipeline(small_config());
    let source = HeightmapSource::default();
    pipeline.bind_source(&source);

    source.publish(&HeightmapReady::new(Heightfield::flat(16, 1.0), 0.0));
    source.publish(&HeightmapReady::new(Heightfield::flat(24, 1.0), 0.0));
    assert!(pipeline.poll_events());
    assert_eq!(pipeline.heightfield().map(Heightfield::size), Some(24));
    assert!(!pipeline.poll_events());
}

/// Test: a new heightmap re-meshes every active chunk.
#[test]
fn test_new_heightmap_remeshes() {
    let mut pipeline = pipeline(small_config());
    pipeline.apply_heightmap(HeightmapReady::new(Heightfield::flat(64, 1.0), 0.0));
    pipeline.update_frame([0.0; 3]);
    let uploads = pipeline.runtime().backend().upload_count();

    pipeline.apply_heightmap(HeightmapReady::new(Heightfield::flat(64, 9.0), 0.0));
    let report = pipeline.update_frame([0.0; 3]);
    assert_eq!(report.sync.map(|sync| sync.built), Some(81));
    assert_eq!(pipeline.runtime().backend().upload_count(), uploads + 81);
    assert_eq!(pipeline.runtime().active_chunk_count(), 81);
}

/// Test: generation is reproducible for the configured seed.
#[test]
fn test_generate_world_reproducible() {
    let pipeline = pipeline(small_config());
    let a = pipeline.generate_world();
    let b = pipeline.generate_world();
    assert_eq!(a.heightfield, b.heightfield);
    assert_eq!(a.size(), 128);
    assert!(a.heightfield.min() >= 0.0);
}

/// Test: hints from a 2D map layer shape the generated world.
#[test]
fn test_generate_world_with_hints() {
    struct Lake;

    impl ElevationQuery for Lake {
        fn elevation_at(&self, _x: usize, _z: usize) -> Option<f32> {
            None
        }

        fn is_water(&self, x: usize, z: usize) -> bool {
            (48..80).contains(&x) && (48..80).contains(&z)
        }
    }

    let mut config = small_config();
    config.generation.erosion_iterations = 0;
    let pipeline = pipeline(config);

    let plain = pipeline.generate_world();
    let hinted = pipeline.generate_world_with_hints(&Lake, 1.0);
    assert!(hinted.heightfield.get(64, 64) < plain.heightfield.get(64, 64));
    assert_eq!(hinted.heightfield.get(10, 10), plain.heightfield.get(10, 10));
}

/// Test: an invalid config is rejected at construction.
#[test]
fn test_invalid_config_rejected() {
    let mut config = small_config();
    config.lod.vertex_strides.pop();
    assert!(TerrainPipeline::new(config, HeadlessBackend::new()).is_err());
}
