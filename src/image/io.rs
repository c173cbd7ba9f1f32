//! I/O helpers for preview images and JSON.
//!
//! - `save_rgb_u8`: write a packed RGB buffer to a PNG (or any format the
//!   extension selects).
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - `read_json_file`: parse a JSON document from disk.
use image::{ImageBuffer, Rgb, RgbImage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Save a `width × height` RGB buffer, creating parent directories.
pub fn save_rgb_u8(
    path: &Path,
    width: usize,
    height: usize,
    pixels: &[[u8; 3]],
) -> Result<(), String> {
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(format!("Image size {width}x{height} exceeds the PNG limits")),
    };
    if pixels.len() != width * height {
        return Err(format!(
            "RGB buffer holds {} pixels, expected {}x{}",
            pixels.len(),
            width,
            height
        ));
    }
    ensure_parent_dir(path)?;
    let raw: Vec<u8> = pixels.iter().flat_map(|px| px.iter().copied()).collect();
    let image: RgbImage = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w, h, raw)
        .ok_or_else(|| "Failed to create image buffer".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

/// Read and parse a JSON document from `path`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&data).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_buffer_length_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_rgb_u8(&dir.path().join("a.png"), 2, 2, &[[0, 0, 0]; 3]).unwrap_err();
        assert!(err.contains("expected 2x2"), "{err}");
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_dimensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        let err = save_rgb_u8(&path, u32::MAX as usize + 1, 0, &[]).unwrap_err();
        assert!(err.contains("exceeds"), "{err}");
        assert!(!path.exists());
    }
}
