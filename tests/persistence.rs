mod common;

use common::synthetic::{pinhole_views, random_map};
use depth_fusion::export::{DepthSimCodec, JsonCodec, MapTarget, PngExporter, PreviewExporter};
use depth_fusion::{CodecError, DepthSim, DepthSimError, DepthSimMap};
use std::path::Path;

#[test]
fn save_then_load_reproduces_cells() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let codec = JsonCodec::new(dir.path());
    let views = pinhole_views(32, 24, 30.0);

    let map = random_map(5, 32, 24, 2, 2, 0.2);
    map.save(&views, &codec).unwrap();
    assert!(dir.path().join("0_depthMap_2.json").exists());
    assert!(dir.path().join("0_simMap_2.json").exists());

    let mut same = DepthSimMap::for_view(&views, 0, 2, 2).unwrap();
    same.load(&codec, 2).unwrap();
    assert_eq!(same.cells(), map.cells());

    // Loading into a finer grid reads the stored scale-2 pixels.
    let mut fine = DepthSimMap::for_view(&views, 0, 1, 1).unwrap();
    fine.load(&codec, 2).unwrap();
    for y in 0..fine.height() {
        for x in 0..fine.width() {
            assert_eq!(fine.get(x, y), map.get(x / 4, y / 4), "({x}, {y})");
        }
    }
}

#[test]
fn saved_metadata_carries_camera_and_range() {
    let dir = tempfile::tempdir().unwrap();
    let codec = JsonCodec::new(dir.path());
    let views = pinhole_views(16, 16, 20.0);

    let mut map = DepthSimMap::for_view(&views, 0, 1, 1).unwrap();
    map.set(3, 4, DepthSim::new(2.0, 0.1));
    map.set(5, 6, DepthSim::new(9.0, -0.3));
    map.save(&views, &codec).unwrap();

    let maps = codec
        .read(&MapTarget::Indexed { view: 0, scale: 1 })
        .unwrap();
    assert_eq!((maps.width, maps.height), (16, 16));
    let meta = &maps.metadata;
    assert_eq!(meta["minDepth"], 2.0);
    assert_eq!(meta["maxDepth"], 9.0);
    assert_eq!(meta["downscale"], 1.0);
    assert_eq!(meta["source"], "synthetic");
    assert_eq!(meta["CArr"].as_array().map(Vec::len), Some(3));
    assert_eq!(meta["iCamArr"].as_array().map(Vec::len), Some(9));
    assert_eq!(meta["P"].as_array().map(Vec::len), Some(12));
    // Row-major inverse calibration: first row is (1/f, 0, -cx/f).
    assert_eq!(meta["iCamArr"][0], 1.0 / 20.0);
    assert_eq!(meta["iCamArr"][2], -8.0 / 20.0);
}

#[test]
fn save_refine_writes_internal_grid() {
    let dir = tempfile::tempdir().unwrap();
    let codec = JsonCodec::new(dir.path());
    let views = pinhole_views(24, 12, 20.0);
    let map = random_map(9, 24, 12, 1, 3, 0.0);

    let depth_path = dir.path().join("refined/depth.json");
    let sim_path = dir.path().join("refined/sim.json");
    map.save_refine(&views, &codec, &depth_path, &sim_path).unwrap();

    let maps = codec
        .read(&MapTarget::Paths {
            depth: depth_path,
            sim: sim_path,
        })
        .unwrap();
    assert_eq!((maps.width, maps.height), (map.width(), map.height()));
    assert_eq!(maps.depth, map.depth_values());
    assert_eq!(maps.sim, map.similarity_values());
}

#[test]
fn zero_scales_are_errors_not_panics() {
    let dir = tempfile::tempdir().unwrap();
    let codec = JsonCodec::new(dir.path());
    let views = pinhole_views(8, 8, 10.0);

    assert!(matches!(
        DepthSimMap::for_view(&views, 0, 0, 1),
        Err(DepthSimError::InvalidScale { scale: 0, step: 1 })
    ));
    assert!(matches!(
        DepthSimMap::for_view(&views, 0, 2, 0),
        Err(DepthSimError::InvalidScale { scale: 2, step: 0 })
    ));

    let mut map = DepthSimMap::for_view(&views, 0, 1, 1).unwrap();
    let err = map.load(&codec, 0).unwrap_err();
    assert!(matches!(err, DepthSimError::InvalidScale { .. }), "{err}");
}

#[test]
fn codec_failures_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let codec = JsonCodec::new(dir.path());
    let mut map = DepthSimMap::new(0, 8, 8, 1, 1);
    let err = map.load(&codec, 1).unwrap_err();
    assert!(
        matches!(err, DepthSimError::Codec(CodecError::Io { .. })),
        "{err}"
    );
}

#[test]
fn preview_is_written_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview/view0.png");
    let map = random_map(2, 20, 10, 1, 1, 0.1);

    assert!(map.save_to_image(&path, None, &PngExporter));
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (40, 10));

    assert!(map.save_to_image(&path, Some(0.5), &PngExporter));
}

struct FailingExporter;

impl PreviewExporter for FailingExporter {
    fn write_rgb(&self, _: &Path, _: usize, _: usize, _: &[[u8; 3]]) -> Result<(), String> {
        Err("disk full".to_string())
    }
}

#[test]
fn preview_failures_are_swallowed() {
    let map = random_map(4, 8, 8, 1, 1, 0.0);
    assert!(!map.save_to_image(Path::new("unused.png"), None, &FailingExporter));

    // No valid depth: nothing to normalize against.
    let empty = DepthSimMap::new(0, 8, 8, 1, 1);
    assert!(!empty.save_to_image(Path::new("unused.png"), None, &PngExporter));
}

#[test]
fn preview_colors_follow_normalization() {
    let mut map = DepthSimMap::new(0, 2, 1, 1, 1);
    map.set(0, 0, DepthSim::new(1.0, -1.0));
    map.set(1, 0, DepthSim::new(1.0, 0.5));
    let pixels = map.render_preview(Some(0.5)).unwrap();
    assert_eq!(pixels.len(), 4);
    // Similarity -1 maps to 0 and the threshold to 1.
    assert_eq!(pixels[2], depth_fusion::export::jet_color(0.0));
    assert_eq!(pixels[3], depth_fusion::export::jet_color(1.0));
}
