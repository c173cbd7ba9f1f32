//! Local surface smoothness from the 4-neighborhood.
//!
//! For an interior cell, the valid (`> 0`) neighbor depths are back-projected
//! and averaged into a centroid. The centroid is projected onto the viewing
//! ray of the center cell and the metric is the signed distance along that
//! ray between the projection and the center's own 3D point. Positive values
//! mean the neighborhood sits farther from the camera than the center.

use super::{for_each_row_mut, DepthSimMap};
use crate::camera::{ViewGeometry, ViewParams};
use crate::error::DepthSimError;
use crate::image::ImageF32;
use nalgebra::{Point3, Vector3};

impl DepthSimMap {
    /// Smoothness residual of cell `(x, y)`; `0` on the border or when the
    /// center or fewer than two neighbors carry a depth.
    pub fn cell_smooth_step<V: ViewParams + ?Sized>(
        &self,
        views: &V,
        x: usize,
        y: usize,
    ) -> Result<f32, DepthSimError> {
        let geom = self.geometry(views)?;
        Ok(self.smooth_step_with(&geom, x, y))
    }

    /// [`cell_smooth_step`](Self::cell_smooth_step) addressed by linear index.
    pub fn cell_smooth_step_at<V: ViewParams + ?Sized>(
        &self,
        views: &V,
        index: usize,
    ) -> Result<f32, DepthSimError> {
        self.cell_smooth_step(views, index % self.w, index / self.w)
    }

    /// Smoothness residual for every cell.
    pub fn smooth_step_map<V: ViewParams + ?Sized>(
        &self,
        views: &V,
    ) -> Result<ImageF32, DepthSimError> {
        let geom = self.geometry(views)?;
        let mut out = ImageF32::new(self.w, self.h);
        for_each_row_mut(&mut out.data, self.w, |y, row| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = self.smooth_step_with(&geom, x, y);
            }
        });
        Ok(out)
    }

    fn geometry<V: ViewParams + ?Sized>(&self, views: &V) -> Result<ViewGeometry, DepthSimError> {
        views
            .geometry(self.view)
            .ok_or(DepthSimError::UnknownView(self.view))
    }

    fn smooth_step_with(&self, geom: &ViewGeometry, x: usize, y: usize) -> f32 {
        if x == 0 || y == 0 || x + 1 >= self.w || y + 1 >= self.h {
            return 0.0;
        }

        let neighbors = [(x, y - 1), (x, y + 1), (x - 1, y), (x + 1, y)];
        let mut centroid = Vector3::<f64>::zeros();
        let mut n = 0usize;
        for (nx, ny) in neighbors {
            if let Some(d) = self.get(nx, ny).positive_depth() {
                centroid += self.back_project(geom, nx, ny, d).coords;
                n += 1;
            }
        }

        let Some(d0) = self.get(x, y).positive_depth() else {
            return 0.0;
        };
        if n < 2 {
            return 0.0;
        }

        let centroid = Point3::from(centroid / n as f64);
        let p0 = self.back_project(geom, x, y, d0);
        let v = (geom.center - p0).normalize();
        let closest = p0 + v * (centroid - p0).dot(&v);

        ((geom.center - closest).norm() - (geom.center - p0).norm()) as f32
    }

    #[inline]
    fn back_project(&self, geom: &ViewGeometry, x: usize, y: usize, depth: f32) -> Point3<f64> {
        let f = self.pixel_stride() as f64;
        geom.back_project([x as f64 * f, y as f64 * f], depth as f64)
    }
}
