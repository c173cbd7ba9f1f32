#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod camera;
pub mod depthsim;
pub mod error;
pub mod export;
pub mod image;
pub mod types;

// Tool-facing configuration.
pub mod config;

// --- High-level re-exports -------------------------------------------------

pub use crate::camera::{MultiViewParams, ViewCamera, ViewGeometry, ViewParams};
pub use crate::depthsim::{fuse_into_full_resolution, DepthSimMap, DepthSimSummary, FillMode};
pub use crate::error::{CodecError, DepthSimError};
pub use crate::types::{DepthSim, ValueRange, NO_DEPTH};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use depth_fusion::prelude::*;
///
/// let mut coarse = DepthSimMap::new(0, 64, 48, 4, 1);
/// coarse.set(3, 2, DepthSim::new(2.5, -0.4));
///
/// let mut fine = DepthSimMap::new(0, 64, 48, 1, 1);
/// fine.fuse_coarse_to_fine_best(&coarse).unwrap();
/// assert_eq!(fine.get(12, 8).depth, 2.5);
/// ```
pub mod prelude {
    pub use crate::camera::{MultiViewParams, ViewParams};
    pub use crate::image::ImageF32;
    pub use crate::types::DepthSim;
    pub use crate::{DepthSimError, DepthSimMap};
}
