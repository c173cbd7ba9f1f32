use serde::{Deserialize, Serialize};

/// Depth value marking a cell without an estimate.
pub const NO_DEPTH: f32 = -1.0;
/// Similarity of an empty cell: the worst possible matching score.
pub const WORST_SIM: f32 = 1.0;
/// Sentinel written into similarity buffers for pixels with no source cell.
pub const NO_SIM: f32 = -1.0;

/// One raster entry: a depth estimate and its matching score.
///
/// Lower `sim` is better. A depth of [`NO_DEPTH`] marks a missing estimate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthSim {
    pub depth: f32,
    pub sim: f32,
}

impl Default for DepthSim {
    fn default() -> Self {
        Self {
            depth: NO_DEPTH,
            sim: WORST_SIM,
        }
    }
}

impl DepthSim {
    pub const fn new(depth: f32, sim: f32) -> Self {
        Self { depth, sim }
    }

    /// True when the cell carries a depth estimate (`depth > -1`).
    #[inline]
    pub fn has_depth(&self) -> bool {
        self.depth > NO_DEPTH
    }

    /// Depth if present.
    #[inline]
    pub fn valid_depth(&self) -> Option<f32> {
        self.has_depth().then_some(self.depth)
    }

    /// Similarity if it passes the `sim > -1` test used by range statistics.
    #[inline]
    pub fn valid_sim(&self) -> Option<f32> {
        (self.sim > NO_SIM).then_some(self.sim)
    }

    /// Depth usable for back-projection (strictly positive).
    #[inline]
    pub fn positive_depth(&self) -> Option<f32> {
        (self.depth > 0.0).then_some(self.depth)
    }
}

/// `(max, min)` pair returned by the range scans.
///
/// An empty scan yields `max == -1` and `min == +inf`; check
/// [`ValueRange::is_empty`] before using the bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub max: f32,
    pub min: f32,
}

impl ValueRange {
    pub const EMPTY: ValueRange = ValueRange {
        max: -1.0,
        min: f32::INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    #[inline]
    pub(crate) fn include(&mut self, v: f32) {
        self.max = self.max.max(v);
        self.min = self.min.min(v);
    }

    pub(crate) fn merge(mut self, other: ValueRange) -> ValueRange {
        self.max = self.max.max(other.max);
        self.min = self.min.min(other.min);
        self
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::EMPTY
    }
}
