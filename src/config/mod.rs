//! JSON configuration for the command-line tools.

pub mod fuse;

pub use fuse::{load_config, FuseInput, FuseOutputConfig, FuseToolConfig};
