//! Per-view camera parameters consumed by the raster operations.
//!
//! Rasters only carry a view index. Anything that needs geometry takes a
//! [`ViewParams`] provider explicitly at call time; nothing here is global.
//!
//! The inverse calibration `inv_k` maps a homogeneous pixel `(x, y, 1)` to a
//! world-space ray direction, i.e. it is `(K·R)⁻¹` for a camera with
//! intrinsics `K` and world-to-camera rotation `R`.

use nalgebra::{Matrix3, Matrix3x4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Opaque per-view metadata forwarded to codecs.
pub type MetadataBag = BTreeMap<String, serde_json::Value>;

/// Lookup capability for per-view camera parameters.
pub trait ViewParams {
    /// Full-resolution `(width, height)` of the view.
    fn dimensions(&self, view: usize) -> Option<(usize, usize)>;
    /// Projection center and inverse calibration of the view.
    fn geometry(&self, view: usize) -> Option<ViewGeometry>;
    /// Downscale factor, projection matrix and free-form tags.
    fn metadata(&self, view: usize) -> Option<ViewMetadata>;
}

/// Back-projection data for a single view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewGeometry {
    pub center: Point3<f64>,
    pub inv_k: Matrix3<f64>,
}

impl ViewGeometry {
    /// Unit ray direction through full-resolution pixel `px`.
    #[inline]
    pub fn ray(&self, px: [f64; 2]) -> Vector3<f64> {
        (self.inv_k * Vector3::new(px[0], px[1], 1.0)).normalize()
    }

    /// 3D point at distance `depth` from the center along the ray through `px`.
    #[inline]
    pub fn back_project(&self, px: [f64; 2], depth: f64) -> Point3<f64> {
        self.center + self.ray(px) * depth
    }
}

/// Metadata a view contributes when its maps are persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewMetadata {
    pub downscale: f64,
    pub projection: Option<Matrix3x4<f64>>,
    pub tags: MetadataBag,
}

/// Camera record for one view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewCamera {
    pub width: usize,
    pub height: usize,
    /// Projection center in world coordinates.
    pub center: [f64; 3],
    /// Row-major inverse calibration.
    pub inv_k: [[f64; 3]; 3],
    #[serde(default = "default_downscale")]
    pub downscale: f64,
    /// Row-major 3x4 projection matrix at original resolution.
    #[serde(default)]
    pub projection: Option<[[f64; 4]; 3]>,
    #[serde(default)]
    pub metadata: MetadataBag,
}

fn default_downscale() -> f64 {
    1.0
}

impl ViewCamera {
    /// Build a camera from intrinsics `k`, world-to-camera rotation `r` and
    /// center `c`. Returns `None` when `K·R` is singular.
    pub fn from_krc(
        width: usize,
        height: usize,
        k: &Matrix3<f64>,
        r: &Matrix3<f64>,
        c: &Point3<f64>,
    ) -> Option<Self> {
        let kr = k * r;
        let inv_k = kr.try_inverse()?;
        let t = -(r * c.coords);
        let mut rt = Matrix3x4::zeros();
        rt.fixed_view_mut::<3, 3>(0, 0).copy_from(r);
        rt.set_column(3, &t);
        let p = k * rt;
        Some(Self {
            width,
            height,
            center: [c.x, c.y, c.z],
            inv_k: rows3(&inv_k),
            downscale: 1.0,
            projection: Some([
                [p[(0, 0)], p[(0, 1)], p[(0, 2)], p[(0, 3)]],
                [p[(1, 0)], p[(1, 1)], p[(1, 2)], p[(1, 3)]],
                [p[(2, 0)], p[(2, 1)], p[(2, 2)], p[(2, 3)]],
            ]),
            metadata: MetadataBag::new(),
        })
    }

    pub fn geometry(&self) -> ViewGeometry {
        let m = &self.inv_k;
        ViewGeometry {
            center: Point3::new(self.center[0], self.center[1], self.center[2]),
            inv_k: Matrix3::new(
                m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
            ),
        }
    }

    pub fn view_metadata(&self) -> ViewMetadata {
        ViewMetadata {
            downscale: self.downscale,
            projection: self
                .projection
                .map(|rows| Matrix3x4::from_fn(|r, c| rows[r][c])),
            tags: self.metadata.clone(),
        }
    }
}

fn rows3(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}

/// In-memory camera table indexed by view.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MultiViewParams {
    pub views: Vec<ViewCamera>,
}

impl MultiViewParams {
    pub fn new(views: Vec<ViewCamera>) -> Self {
        Self { views }
    }

    /// Load a camera table from a JSON document `{ "views": [...] }`.
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        crate::image::io::read_json_file(path)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl ViewParams for MultiViewParams {
    fn dimensions(&self, view: usize) -> Option<(usize, usize)> {
        self.views.get(view).map(|v| (v.width, v.height))
    }

    fn geometry(&self, view: usize) -> Option<ViewGeometry> {
        self.views.get(view).map(ViewCamera::geometry)
    }

    fn metadata(&self, view: usize) -> Option<ViewMetadata> {
        self.views.get(view).map(ViewCamera::view_metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_ray_points_along_optical_axis() {
        let k = Matrix3::new(500.0, 0.0, 320.0, 0.0, 500.0, 240.0, 0.0, 0.0, 1.0);
        let cam = ViewCamera::from_krc(640, 480, &k, &Matrix3::identity(), &Point3::origin())
            .expect("invertible calibration");
        let geom = cam.geometry();
        let ray = geom.ray([320.0, 240.0]);
        assert!((ray - Vector3::z()).norm() < 1e-12, "ray={ray:?}");

        let p = geom.back_project([320.0, 240.0], 7.5);
        assert!((p.z - 7.5).abs() < 1e-12);
    }

    #[test]
    fn projection_maps_center_to_null_space() {
        let k = Matrix3::new(400.0, 0.0, 200.0, 0.0, 400.0, 150.0, 0.0, 0.0, 1.0);
        let c = Point3::new(1.0, -2.0, 0.5);
        let cam = ViewCamera::from_krc(400, 300, &k, &Matrix3::identity(), &c).unwrap();
        let p = cam.view_metadata().projection.unwrap();
        let h = p * c.to_homogeneous();
        assert!(h.norm() < 1e-9, "P·C should vanish, got {h:?}");
    }

    #[test]
    fn singular_calibration_is_rejected() {
        let cam = ViewCamera::from_krc(
            10,
            10,
            &Matrix3::zeros(),
            &Matrix3::identity(),
            &Point3::origin(),
        );
        assert!(cam.is_none());
    }

    #[test]
    fn table_lookup_out_of_range_is_none() {
        let table = MultiViewParams::default();
        assert!(table.dimensions(0).is_none());
        assert!(table.geometry(3).is_none());
        assert!(table.is_empty());
    }
}
