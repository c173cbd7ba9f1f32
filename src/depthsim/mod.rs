//! Depth/similarity raster for one reference view.
//!
//! A [`DepthSimMap`] stores a `w × h` grid of [`DepthSim`] cells for a view at
//! a given `(scale, step)`. Cell `(x, y)` corresponds to the full-resolution
//! pixel `(x·scale·step, y·scale·step)`; the grid size is
//! `⌊view_w / (scale·step)⌋ × ⌊view_h / (scale·step)⌋`.
//!
//! Submodules:
//! - `resample`: conversions to and from full-resolution (at `scale`) buffers.
//! - `fusion`: same-resolution merge and coarse-to-fine footprint splat.
//! - `stats`: valid-value ranges and depth percentiles.
//! - `smoothness`: 4-neighborhood back-projection residual.
//! - `persist`: codec and preview export.
//!
//! All integer coordinate conversions truncate; read and write paths share
//! the same mapping.

pub mod fusion;
pub mod persist;
pub mod resample;
pub mod smoothness;
pub mod stats;


use crate::camera::ViewParams;
use crate::error::DepthSimError;
use crate::types::DepthSim;

pub use self::fusion::fuse_into_full_resolution;
pub use self::resample::FillMode;
pub use self::stats::DepthSimSummary;

#[derive(Clone, Debug, PartialEq)]
pub struct DepthSimMap {
    view: usize,
    view_w: usize,
    view_h: usize,
    scale: usize,
    step: usize,
    w: usize,
    h: usize,
    cells: Vec<DepthSim>,
}

impl DepthSimMap {
    /// Allocate an empty map for `view` whose full-resolution size is
    /// `view_w × view_h`.
    ///
    /// Panics if `scale` or `step` is zero.
    pub fn new(view: usize, view_w: usize, view_h: usize, scale: usize, step: usize) -> Self {
        assert!(scale >= 1, "scale must be >= 1");
        assert!(step >= 1, "step must be >= 1");
        let factor = scale * step;
        let w = view_w / factor;
        let h = view_h / factor;
        Self {
            view,
            view_w,
            view_h,
            scale,
            step,
            w,
            h,
            cells: vec![DepthSim::default(); w * h],
        }
    }

    /// Allocate an empty map sized from the provider's view dimensions.
    ///
    /// Unlike [`DepthSimMap::new`], a zero `scale` or `step` is reported as
    /// [`DepthSimError::InvalidScale`].
    pub fn for_view<V: ViewParams + ?Sized>(
        views: &V,
        view: usize,
        scale: usize,
        step: usize,
    ) -> Result<Self, DepthSimError> {
        if scale == 0 || step == 0 {
            return Err(DepthSimError::InvalidScale { scale, step });
        }
        let (view_w, view_h) = views
            .dimensions(view)
            .ok_or(DepthSimError::UnknownView(view))?;
        Ok(Self::new(view, view_w, view_h, scale, step))
    }

    pub fn view(&self) -> usize {
        self.view
    }

    /// Full-resolution `(width, height)` of the source view.
    pub fn view_dimensions(&self) -> (usize, usize) {
        (self.view_w, self.view_h)
    }

    pub fn scale(&self) -> usize {
        self.scale
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Size of the full-resolution-at-`scale` grid, `⌊view / scale⌋`.
    pub fn scaled_dimensions(&self) -> (usize, usize) {
        (self.view_w / self.scale, self.view_h / self.scale)
    }

    /// Distance in full-resolution pixels between neighboring cells.
    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.scale * self.step
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h, "cell ({x}, {y}) out of range");
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> DepthSim {
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: DepthSim) {
        let i = self.idx(x, y);
        self.cells[i] = cell;
    }

    #[inline]
    pub fn cell(&self, index: usize) -> DepthSim {
        self.cells[index]
    }

    pub fn cells(&self) -> &[DepthSim] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [DepthSim] {
        &mut self.cells
    }

    /// Reset every cell to the empty default.
    pub fn clear(&mut self) {
        self.cells.fill(DepthSim::default());
    }

    /// Number of cells carrying a depth estimate.
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.has_depth()).count()
    }
}

/// Run `f(y, row)` over the rows of a row-major buffer, in parallel when the
/// `parallel` feature is enabled.
pub(crate) fn for_each_row_mut<T, F>(data: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if width == 0 || data.is_empty() {
        return;
    }
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}
