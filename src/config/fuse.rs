use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct FuseToolConfig {
    /// JSON camera table (`{ "views": [...] }`).
    pub cameras: PathBuf,
    /// Directory holding input maps and receiving indexed outputs.
    pub maps_dir: PathBuf,
    /// Reference view whose estimates are fused.
    pub view: usize,
    /// Input estimates, applied in order (coarsest first).
    pub inputs: Vec<FuseInput>,
    #[serde(default)]
    pub output: FuseOutputConfig,
}

/// One stored estimate to load into a `(scale, step)` grid.
#[derive(Clone, Debug, Deserialize)]
pub struct FuseInput {
    pub scale: usize,
    #[serde(default = "default_step")]
    pub step: usize,
    /// Scale the maps were written at; defaults to `scale`.
    #[serde(default)]
    pub stored_scale: Option<usize>,
}

fn default_step() -> usize {
    1
}

impl FuseInput {
    pub fn stored_scale(&self) -> usize {
        self.stored_scale.unwrap_or(self.scale)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FuseOutputConfig {
    /// Explicit depth destination. When both this and `sim_map` are set the
    /// fused grid is written as-is there; otherwise it is saved under
    /// `maps_dir` at scale 1.
    pub depth_map: Option<PathBuf>,
    pub sim_map: Option<PathBuf>,
    /// Side-by-side depth/similarity preview image.
    pub preview: Option<PathBuf>,
    /// Similarity upper clip for the preview; the map's own range if unset.
    pub sim_threshold: Option<f32>,
    /// JSON statistics of the fused map.
    pub summary_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<FuseToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: FuseToolConfig = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    if config.inputs.is_empty() {
        return Err(format!("Config {} lists no inputs", path.display()));
    }
    if let Some(bad) = config
        .inputs
        .iter()
        .find(|i| i.scale == 0 || i.step == 0 || i.stored_scale == Some(0))
    {
        return Err(format!(
            "Config {}: scale and step must be >= 1, got {bad:?}",
            path.display()
        ));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuse.json");
        fs::write(
            &path,
            r#"{
                "cameras": "cams.json",
                "maps_dir": "maps",
                "view": 2,
                "inputs": [{ "scale": 4 }, { "scale": 2, "step": 2, "stored_scale": 1 }]
            }"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.view, 2);
        assert_eq!(cfg.inputs[0].step, 1);
        assert_eq!(cfg.inputs[0].stored_scale(), 4);
        assert_eq!(cfg.inputs[1].stored_scale(), 1);
        assert!(cfg.output.preview.is_none());
    }

    #[test]
    fn rejects_zero_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuse.json");
        fs::write(
            &path,
            r#"{ "cameras": "c", "maps_dir": "m", "view": 0, "inputs": [{ "scale": 0 }] }"#,
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.contains("must be >= 1"), "{err}");
    }
}
