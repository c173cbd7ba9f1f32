//! Fusion of several estimates of the same view.
//!
//! - [`DepthSimMap::fuse_same_resolution`]: per-cell keep-the-best-score.
//! - [`DepthSimMap::fuse_coarse_to_fine_best`]: splat each coarse cell over
//!   its full-resolution footprint unless a strictly better score already
//!   sits inside that footprint.

use super::DepthSimMap;
use crate::camera::ViewParams;
use crate::error::DepthSimError;
use crate::types::DepthSim;
use log::debug;

impl DepthSimMap {
    /// Replace every cell whose counterpart in `other` has a depth and a
    /// strictly lower similarity.
    ///
    /// Both maps must share `(scale, step)` and grid size.
    ///
    /// The merge is associative as long as cells without depth keep the
    /// worst similarity of 1. A depthless cell carrying a lower similarity is
    /// never copied across, but it still blocks valid estimates fused into it
    /// later, so the grouping of a fusion chain then matters.
    pub fn fuse_same_resolution(&mut self, other: &DepthSimMap) -> Result<(), DepthSimError> {
        if self.scale != other.scale || self.step != other.step {
            return Err(DepthSimError::ScaleMismatch {
                scale: self.scale,
                step: self.step,
                other_scale: other.scale,
                other_step: other.step,
            });
        }
        if self.w != other.w || self.h != other.h {
            return Err(DepthSimError::SizeMismatch {
                expected_w: self.w,
                expected_h: self.h,
                actual_w: other.w,
                actual_h: other.h,
            });
        }

        let replaced = merge_best(&mut self.cells, &other.cells);
        debug!(
            "DepthSimMap::fuse_same_resolution view={} scale={} step={} replaced={}/{}",
            self.view,
            self.scale,
            self.step,
            replaced,
            self.cells.len()
        );
        Ok(())
    }

    /// Splat the cells of a coarser map into this scale 1, step 1 map.
    ///
    /// A valid cell of `other` at `(x, y)` covers the window
    /// `[X - k, X + k1] × [Y - k, Y + k1]` around `(X, Y) = (x, y)·f`, with
    /// `f = other.scale·other.step`, `k1 = f / 2` and `k = k1 - 1` when `f` is
    /// even (`k = k1` otherwise). It overwrites the whole window (clipped to
    /// the grid) unless a cell already in the window has a strictly lower
    /// similarity. Cells are visited in row-major order and later candidates
    /// compete against earlier splats.
    pub fn fuse_coarse_to_fine_best(&mut self, other: &DepthSimMap) -> Result<(), DepthSimError> {
        if self.scale != 1 || self.step != 1 {
            return Err(DepthSimError::ResolutionPrecondition {
                scale: self.scale,
                step: self.step,
            });
        }

        let factor = other.pixel_stride();
        let k1 = (factor / 2) as isize;
        let k = if factor % 2 == 0 { k1 - 1 } else { k1 };
        let (w, h) = (self.w as isize, self.h as isize);

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        for (i, candidate) in other.cells.iter().enumerate() {
            if !candidate.has_depth() {
                continue;
            }
            let cx = ((i % other.w) * factor) as isize;
            let cy = ((i / other.w) * factor) as isize;
            let Some(window) = Window::clipped(cx - k, cy - k, cx + k1, cy + k1, w, h) else {
                // Footprint entirely outside the target grid.
                continue;
            };

            if self.window_beats(&window, candidate) {
                rejected += 1;
                continue;
            }
            for y in window.y0..=window.y1 {
                let row = y * self.w;
                self.cells[row + window.x0..=row + window.x1].fill(*candidate);
            }
            accepted += 1;
        }

        debug!(
            "DepthSimMap::fuse_coarse_to_fine_best view={} from scale={} step={} accepted={} rejected={}",
            self.view, other.scale, other.step, accepted, rejected
        );
        Ok(())
    }

    /// True if some cell inside `window` scores strictly better than `candidate`.
    fn window_beats(&self, window: &Window, candidate: &DepthSim) -> bool {
        (window.y0..=window.y1).any(|y| {
            let row = y * self.w;
            self.cells[row + window.x0..=row + window.x1]
                .iter()
                .any(|c| candidate.sim > c.sim)
        })
    }
}

/// Fuse `sources` in order into a new scale 1, step 1 map for `view`.
///
/// Sources are expected coarsest first so that finer estimates can win
/// their footprints afterwards.
pub fn fuse_into_full_resolution<V: ViewParams + ?Sized>(
    views: &V,
    view: usize,
    sources: &[DepthSimMap],
) -> Result<DepthSimMap, DepthSimError> {
    let mut fused = DepthSimMap::for_view(views, view, 1, 1)?;
    for source in sources {
        fused.fuse_coarse_to_fine_best(source)?;
    }
    Ok(fused)
}

/// Inclusive cell window clipped to the grid.
struct Window {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Window {
    fn clipped(x0: isize, y0: isize, x1: isize, y1: isize, w: isize, h: isize) -> Option<Self> {
        let (x0, y0) = (x0.max(0), y0.max(0));
        let (x1, y1) = (x1.min(w - 1), y1.min(h - 1));
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some(Self {
            x0: x0 as usize,
            y0: y0 as usize,
            x1: x1 as usize,
            y1: y1 as usize,
        })
    }
}

#[cfg(feature = "parallel")]
fn merge_best(dst: &mut [DepthSim], src: &[DepthSim]) -> usize {
    use rayon::prelude::*;

    dst.par_iter_mut()
        .zip(src.par_iter())
        .map(|(a, b)| usize::from(replace_if_better(a, b)))
        .sum()
}

#[cfg(not(feature = "parallel"))]
fn merge_best(dst: &mut [DepthSim], src: &[DepthSim]) -> usize {
    dst.iter_mut()
        .zip(src)
        .map(|(a, b)| usize::from(replace_if_better(a, b)))
        .sum()
}

#[inline]
fn replace_if_better(dst: &mut DepthSim, src: &DepthSim) -> bool {
    if src.has_depth() && src.sim < dst.sim {
        *dst = *src;
        true
    } else {
        false
    }
}
