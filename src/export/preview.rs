use std::path::Path;

/// Writes a packed RGB preview image.
pub trait PreviewExporter {
    fn write_rgb(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        pixels: &[[u8; 3]],
    ) -> Result<(), String>;
}

/// Encodes previews with the `image` crate; the format follows the extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngExporter;

impl PreviewExporter for PngExporter {
    fn write_rgb(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        pixels: &[[u8; 3]],
    ) -> Result<(), String> {
        crate::image::io::save_rgb_u8(path, width, height, pixels)
    }
}

/// Jet color map: `0 → dark blue`, `0.5 → green`, `1 → dark red`.
///
/// Values outside `[0, 1]` (and NaN) are clamped.
pub fn jet_color(v: f32) -> [u8; 3] {
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    let channel = |center: f32| {
        let c = (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
        (c * 255.0).round() as u8
    };
    [channel(3.0), channel(2.0), channel(1.0)]
}
