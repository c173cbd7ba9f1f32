use crate::camera::MetadataBag;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Depth and similarity buffers of identical size plus metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedMaps {
    pub width: usize,
    pub height: usize,
    pub depth: Vec<f32>,
    pub sim: Vec<f32>,
    pub metadata: MetadataBag,
}

/// Which of the two maps a file holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapKind {
    Depth,
    Sim,
}

impl MapKind {
    fn tag(self) -> &'static str {
        match self {
            MapKind::Depth => "depthMap",
            MapKind::Sim => "simMap",
        }
    }
}

/// Where a pair of maps lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapTarget {
    /// Conventional location for `view` at `scale`.
    Indexed { view: usize, scale: usize },
    /// Explicit destinations.
    Paths { depth: PathBuf, sim: PathBuf },
}

/// Encodes and decodes depth/similarity map pairs.
pub trait DepthSimCodec {
    fn write(&self, target: &MapTarget, maps: &EncodedMaps) -> Result<(), CodecError>;
    fn read(&self, target: &MapTarget) -> Result<EncodedMaps, CodecError>;
}

/// Stores each map as a JSON document under `root`.
///
/// Indexed targets resolve to `<root>/<view>_<kind>_<scale>.json`.
#[derive(Clone, Debug)]
pub struct JsonCodec {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct MapFile {
    width: usize,
    height: usize,
    values: Vec<f32>,
    #[serde(default)]
    metadata: MetadataBag,
}

impl JsonCodec {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, target: &MapTarget, kind: MapKind) -> PathBuf {
        match target {
            MapTarget::Indexed { view, scale } => self
                .root
                .join(format!("{view}_{}_{scale}.json", kind.tag())),
            MapTarget::Paths { depth, sim } => match kind {
                MapKind::Depth => depth.clone(),
                MapKind::Sim => sim.clone(),
            },
        }
    }

    fn write_file(path: &Path, file: &MapFile) -> Result<(), CodecError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CodecError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_vec(file).map_err(|source| CodecError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_file(path: &Path) -> Result<MapFile, CodecError> {
        let data = fs::read(path).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: MapFile = serde_json::from_slice(&data).map_err(|source| CodecError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if file.values.len() != file.width * file.height {
            return Err(CodecError::Shape {
                path: path.to_path_buf(),
                width: file.width,
                height: file.height,
                len: file.values.len(),
            });
        }
        Ok(file)
    }
}

impl DepthSimCodec for JsonCodec {
    fn write(&self, target: &MapTarget, maps: &EncodedMaps) -> Result<(), CodecError> {
        for (kind, values) in [(MapKind::Depth, &maps.depth), (MapKind::Sim, &maps.sim)] {
            let path = self.path_for(target, kind);
            if values.len() != maps.width * maps.height {
                return Err(CodecError::Shape {
                    path,
                    width: maps.width,
                    height: maps.height,
                    len: values.len(),
                });
            }
            let file = MapFile {
                width: maps.width,
                height: maps.height,
                values: values.clone(),
                metadata: maps.metadata.clone(),
            };
            Self::write_file(&path, &file)?;
        }
        Ok(())
    }

    fn read(&self, target: &MapTarget) -> Result<EncodedMaps, CodecError> {
        let depth_path = self.path_for(target, MapKind::Depth);
        let sim_path = self.path_for(target, MapKind::Sim);
        let depth = Self::read_file(&depth_path)?;
        let sim = Self::read_file(&sim_path)?;
        if sim.width != depth.width || sim.height != depth.height {
            return Err(CodecError::Shape {
                path: sim_path,
                width: depth.width,
                height: depth.height,
                len: sim.values.len(),
            });
        }
        Ok(EncodedMaps {
            width: depth.width,
            height: depth.height,
            depth: depth.values,
            sim: sim.values,
            metadata: depth.metadata,
        })
    }
}
