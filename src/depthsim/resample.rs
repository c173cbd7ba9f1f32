//! Conversions between the step-subsampled grid and full-resolution buffers.
//!
//! "Full resolution" here always means the view downscaled by `scale` only,
//! i.e. `⌊view_w / scale⌋ × ⌊view_h / scale⌋`. Pixel `(x, y)` of that grid reads
//! cell `(x / step, y / step)`.

use super::{for_each_row_mut, DepthSimMap};
use crate::error::DepthSimError;
use crate::image::{ImageF32, ImageView};
use crate::types::{DepthSim, NO_DEPTH, NO_SIM};

/// How to treat output pixels that have no source cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Write the sentinel (`-1`) into every pixel before resampling.
    #[default]
    Sentinel,
    /// Leave unmapped pixels with whatever the buffer already holds.
    Preserve,
}

impl DepthSimMap {
    /// Depth at full resolution (at `scale`), sentinel-filled.
    pub fn full_res_depth(&self) -> ImageF32 {
        let mut out = ImageF32::new(0, 0);
        self.fill_full_res_depth(&mut out, FillMode::Sentinel);
        out
    }

    /// Similarity at full resolution (at `scale`), sentinel-filled.
    pub fn full_res_similarity(&self) -> ImageF32 {
        let mut out = ImageF32::new(0, 0);
        self.fill_full_res_similarity(&mut out, FillMode::Sentinel);
        out
    }

    /// Resample depth into `out`, resizing it to the full-resolution grid.
    pub fn fill_full_res_depth(&self, out: &mut ImageF32, mode: FillMode) {
        self.fill_full_res(out, mode, NO_DEPTH, |c| c.depth);
    }

    /// Resample similarity into `out`, resizing it to the full-resolution grid.
    pub fn fill_full_res_similarity(&self, out: &mut ImageF32, mode: FillMode) {
        self.fill_full_res(out, mode, NO_SIM, |c| c.sim);
    }

    /// Depth for the full-resolution strip `[x_from, x_from + columns)`.
    ///
    /// The result is `columns × ⌊view_h / scale⌋`, sentinel-filled where no
    /// cell maps.
    pub fn full_res_depth_columns(&self, x_from: usize, columns: usize) -> ImageF32 {
        self.full_res_columns(x_from, columns, NO_DEPTH, |c| c.depth)
    }

    /// Similarity for the full-resolution strip `[x_from, x_from + columns)`.
    pub fn full_res_similarity_columns(&self, x_from: usize, columns: usize) -> ImageF32 {
        self.full_res_columns(x_from, columns, NO_SIM, |c| c.sim)
    }

    /// Raw internal depths in cell order, without resampling.
    pub fn depth_values(&self) -> Vec<f32> {
        self.cells.iter().map(|c| c.depth).collect()
    }

    /// Raw internal similarities in cell order, without resampling.
    pub fn similarity_values(&self) -> Vec<f32> {
        self.cells.iter().map(|c| c.sim).collect()
    }

    /// Set depths from a full-resolution (at `scale`) buffer and every
    /// similarity to `default_sim`.
    ///
    /// Cell `(x, y)` reads `depth[(y·step, x·step)]`; cells falling outside
    /// the buffer are left untouched.
    pub fn init_from_depth_buffer(&mut self, depth: &ImageF32, default_sim: f32) {
        let (w, step) = (self.w, self.step);
        for_each_row_mut(&mut self.cells, w, |y, row| {
            let sy = y * step;
            if sy >= depth.h {
                return;
            }
            let src = depth.row(sy);
            for (x, cell) in row.iter_mut().enumerate() {
                let sx = x * step;
                if sx < depth.w {
                    *cell = DepthSim::new(src[sx], default_sim);
                }
            }
        });
    }

    /// Copy depths from a map with the same grid size, setting every
    /// similarity to `default_sim`.
    pub fn init_from_peer(
        &mut self,
        other: &DepthSimMap,
        default_sim: f32,
    ) -> Result<(), DepthSimError> {
        if other.w != self.w || other.h != self.h {
            return Err(DepthSimError::SizeMismatch {
                expected_w: self.w,
                expected_h: self.h,
                actual_w: other.w,
                actual_h: other.h,
            });
        }
        for (dst, src) in self.cells.iter_mut().zip(&other.cells) {
            *dst = DepthSim::new(src.depth, default_sim);
        }
        Ok(())
    }

    /// Copy depth and similarity from buffers stored at `source_scale`
    /// (step 1).
    ///
    /// Cell `(x, y)` reads source pixel
    /// `((x·step·scale) / source_scale, (y·step·scale) / source_scale)`;
    /// cells mapping outside the buffers are left untouched.
    pub fn init_from_depth_sim_at_scale(
        &mut self,
        depth: &ImageF32,
        sim: &ImageF32,
        source_scale: usize,
    ) -> Result<(), DepthSimError> {
        if source_scale == 0 {
            return Err(DepthSimError::InvalidScale {
                scale: source_scale,
                step: 1,
            });
        }
        if depth.w != sim.w || depth.h != sim.h {
            return Err(DepthSimError::SizeMismatch {
                expected_w: depth.w,
                expected_h: depth.h,
                actual_w: sim.w,
                actual_h: sim.h,
            });
        }
        let (w, factor) = (self.w, self.pixel_stride());
        for_each_row_mut(&mut self.cells, w, |y, row| {
            let sy = (y * factor) / source_scale;
            if sy >= depth.h {
                return;
            }
            let (depth_row, sim_row) = (depth.row(sy), sim.row(sy));
            for (x, cell) in row.iter_mut().enumerate() {
                let sx = (x * factor) / source_scale;
                if sx < depth.w {
                    *cell = DepthSim::new(depth_row[sx], sim_row[sx]);
                }
            }
        });
        Ok(())
    }

    fn fill_full_res<F>(&self, out: &mut ImageF32, mode: FillMode, sentinel: f32, pick: F)
    where
        F: Fn(&DepthSim) -> f32 + Send + Sync,
    {
        let (wdm, hdm) = self.scaled_dimensions();
        out.ensure_size(wdm, hdm);
        if mode == FillMode::Sentinel {
            out.fill(sentinel);
        }
        let (w, h, step) = (self.w, self.h, self.step);
        let cells = &self.cells;
        for_each_row_mut(&mut out.data, wdm, |yp, row| {
            let y = yp / step;
            if y >= h {
                return;
            }
            let src = &cells[y * w..(y + 1) * w];
            for (xp, px) in row.iter_mut().enumerate() {
                let x = xp / step;
                if x < w {
                    *px = pick(&src[x]);
                }
            }
        });
    }

    fn full_res_columns<F>(&self, x_from: usize, columns: usize, sentinel: f32, pick: F) -> ImageF32
    where
        F: Fn(&DepthSim) -> f32 + Send + Sync,
    {
        let (_, hdm) = self.scaled_dimensions();
        let mut out = ImageF32::filled(columns, hdm, sentinel);
        let (w, h, step) = (self.w, self.h, self.step);
        let cells = &self.cells;
        for_each_row_mut(&mut out.data, columns, |yp, row| {
            let y = yp / step;
            if y >= h {
                return;
            }
            for (i, px) in row.iter_mut().enumerate() {
                let x = (x_from + i) / step;
                if x < w {
                    *px = pick(&cells[y * w + x]);
                }
            }
        });
        out
    }
}
