use depth_fusion::camera::{MetadataBag, MultiViewParams, ViewCamera};
use depth_fusion::{DepthSim, DepthSimMap, NO_DEPTH};
use nalgebra::{Matrix3, Point3};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Map with random depths in `[1, 11)`, similarities in `[-1, 1)` and
/// roughly `invalid_ratio` missing cells.
pub fn random_map(
    seed: u64,
    view_w: usize,
    view_h: usize,
    scale: usize,
    step: usize,
    invalid_ratio: f32,
) -> DepthSimMap {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut map = DepthSimMap::new(0, view_w, view_h, scale, step);
    for cell in map.cells_mut() {
        let depth = if rng.random::<f32>() < invalid_ratio {
            NO_DEPTH
        } else {
            rng.random_range(1.0..11.0)
        };
        let sim = rng.random_range(-1.0..1.0);
        *cell = DepthSim::new(depth, sim);
    }
    map
}

/// Like [`random_map`], but cells without depth keep the default
/// similarity.
pub fn sparse_map(
    seed: u64,
    view_w: usize,
    view_h: usize,
    scale: usize,
    step: usize,
    invalid_ratio: f32,
) -> DepthSimMap {
    let mut map = random_map(seed, view_w, view_h, scale, step, invalid_ratio);
    for cell in map.cells_mut().iter_mut().filter(|c| !c.has_depth()) {
        *cell = DepthSim::default();
    }
    map
}

/// Map filled with a single cell value.
pub fn uniform_map(view_w: usize, view_h: usize, scale: usize, step: usize, cell: DepthSim) -> DepthSimMap {
    let mut map = DepthSimMap::new(0, view_w, view_h, scale, step);
    map.cells_mut().fill(cell);
    map
}

/// Single pinhole view at the origin looking down +z with focal `f` and the
/// principal point at the image center.
pub fn pinhole_views(width: usize, height: usize, f: f64) -> MultiViewParams {
    let k = Matrix3::new(
        f,
        0.0,
        width as f64 / 2.0,
        0.0,
        f,
        height as f64 / 2.0,
        0.0,
        0.0,
        1.0,
    );
    let mut cam = ViewCamera::from_krc(width, height, &k, &Matrix3::identity(), &Point3::origin())
        .expect("pinhole calibration is invertible");
    cam.metadata
        .insert("source".into(), serde_json::json!("synthetic"));
    MultiViewParams::new(vec![cam])
}

/// View whose every pixel back-projects along +z from `center`.
pub fn collapsed_ray_views(width: usize, height: usize, center: [f64; 3]) -> MultiViewParams {
    MultiViewParams::new(vec![ViewCamera {
        width,
        height,
        center,
        inv_k: [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        downscale: 1.0,
        projection: None,
        metadata: MetadataBag::new(),
    }])
}

/// Distance along the ray through pixel `(u, v)` to the plane `z = z0` for a
/// pinhole made by [`pinhole_views`].
pub fn plane_depth(u: f64, v: f64, width: usize, height: usize, f: f64, z0: f64) -> f32 {
    let x = (u - width as f64 / 2.0) / f;
    let y = (v - height as f64 / 2.0) / f;
    (z0 * (x * x + y * y + 1.0).sqrt()) as f32
}
