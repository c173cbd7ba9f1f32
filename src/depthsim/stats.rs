use super::DepthSimMap;
use crate::types::{DepthSim, ValueRange};
use log::warn;
use serde::Serialize;

/// Upper bound on the number of cells sampled by [`DepthSimMap::percentile_depth`].
pub const PERCENTILE_MAX_SAMPLES: usize = 50_000;

impl DepthSimMap {
    /// `(max, min)` over cells with `depth > -1`; [`ValueRange::EMPTY`] if none.
    pub fn depth_range(&self) -> ValueRange {
        scan_range(&self.cells, DepthSim::valid_depth)
    }

    /// `(max, min)` over cells with `sim > -1`; [`ValueRange::EMPTY`] if none.
    ///
    /// A similarity of exactly `-1` is a legitimate best score but is skipped
    /// here, same as the depth sentinel.
    pub fn similarity_range(&self) -> ValueRange {
        scan_range(&self.cells, DepthSim::valid_sim)
    }

    /// Depth at rank `⌊n·p⌋` of the sorted valid depths of a strided sample.
    ///
    /// The sample stride is `max(1, cells / 50000)`. `p` is clamped to
    /// `[0, 1]` and the rank to `n - 1`, so `p = 1` yields the sample maximum.
    /// Returns `None` when the sample holds no valid depth.
    pub fn percentile_depth(&self, p: f32) -> Option<f32> {
        let stride = (self.cells.len() / PERCENTILE_MAX_SAMPLES).max(1);
        let mut depths: Vec<f32> = self
            .cells
            .iter()
            .step_by(stride)
            .filter_map(DepthSim::valid_depth)
            .collect();
        if depths.is_empty() {
            warn!(
                "DepthSimMap::percentile_depth view={} has no valid depth",
                self.view
            );
            return None;
        }
        depths.sort_unstable_by(f32::total_cmp);

        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        let rank = ((depths.len() as f32 * p) as usize).min(depths.len() - 1);
        Some(depths[rank])
    }

    /// Snapshot of the map statistics, suitable for JSON reports.
    pub fn summary(&self) -> DepthSimSummary {
        let depth = self.depth_range();
        let sim = self.similarity_range();
        DepthSimSummary {
            view: self.view,
            scale: self.scale,
            step: self.step,
            width: self.w,
            height: self.h,
            valid_cells: self.valid_count(),
            depth_range: (!depth.is_empty()).then_some(depth),
            similarity_range: (!sim.is_empty()).then_some(sim),
            depth_p01: self.percentile_depth(0.01),
            depth_p50: self.percentile_depth(0.5),
            depth_p90: self.percentile_depth(0.9),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSimSummary {
    pub view: usize,
    pub scale: usize,
    pub step: usize,
    pub width: usize,
    pub height: usize,
    pub valid_cells: usize,
    pub depth_range: Option<ValueRange>,
    pub similarity_range: Option<ValueRange>,
    pub depth_p01: Option<f32>,
    pub depth_p50: Option<f32>,
    pub depth_p90: Option<f32>,
}

#[cfg(feature = "parallel")]
fn scan_range<F>(cells: &[DepthSim], value: F) -> ValueRange
where
    F: Fn(&DepthSim) -> Option<f32> + Send + Sync,
{
    use rayon::prelude::*;

    cells
        .par_iter()
        .filter_map(value)
        .fold(ValueRange::default, |mut acc, v| {
            acc.include(v);
            acc
        })
        .reduce(ValueRange::default, ValueRange::merge)
}

#[cfg(not(feature = "parallel"))]
fn scan_range<F>(cells: &[DepthSim], value: F) -> ValueRange
where
    F: Fn(&DepthSim) -> Option<f32>,
{
    cells
        .iter()
        .filter_map(value)
        .fold(ValueRange::default(), |mut acc, v| {
            acc.include(v);
            acc
        })
}
