use std::path::PathBuf;
use thiserror::Error;

/// Precondition and collaborator failures raised by raster operations.
#[derive(Debug, Error)]
pub enum DepthSimError {
    /// Same-resolution fusion between maps at different `(scale, step)`.
    #[error("cannot fuse map at scale {other_scale} step {other_step} into scale {scale} step {step}")]
    ScaleMismatch {
        scale: usize,
        step: usize,
        other_scale: usize,
        other_step: usize,
    },
    /// A scale or step of zero reached a fallible constructor or loader.
    #[error("scale {scale} and step {step} must both be >= 1")]
    InvalidScale { scale: usize, step: usize },
    /// Coarse-to-fine fusion into a map that is not at scale 1, step 1.
    #[error("coarse-to-fine fusion needs a scale 1 step 1 target, got scale {scale} step {step}")]
    ResolutionPrecondition { scale: usize, step: usize },
    /// Peer map grid dimensions differ.
    #[error("map size {actual_w}x{actual_h} does not match {expected_w}x{expected_h}")]
    SizeMismatch {
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },
    /// A raw buffer does not hold the number of values its dimensions imply.
    #[error("buffer holds {actual} values, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
    /// The view-parameters provider has no entry for the index.
    #[error("unknown view {0}")]
    UnknownView(usize),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failures reported by a depth/similarity codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode or decode {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path}: {width}x{height} map stores {len} values")]
    Shape {
        path: PathBuf,
        width: usize,
        height: usize,
        len: usize,
    },
}
