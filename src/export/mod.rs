//! Collaborators at the persistence boundary.
//!
//! - [`codec`]: depth/similarity map encoding behind [`DepthSimCodec`], with a
//!   directory-backed JSON implementation.
//! - [`preview`]: color preview export behind [`PreviewExporter`], with a PNG
//!   implementation and the jet color map.

pub mod codec;
pub mod preview;

pub use codec::{DepthSimCodec, EncodedMaps, JsonCodec, MapKind, MapTarget};
pub use preview::{jet_color, PngExporter, PreviewExporter};
