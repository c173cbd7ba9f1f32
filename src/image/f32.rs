//! Owned single-channel f32 buffer in row-major layout (stride == width).
//!
//! Used for every full-resolution depth or similarity map that crosses the
//! raster boundary. Provides row access and a contiguous slice.
use crate::error::DepthSimError;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every pixel set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing row-major buffer, checking that it holds `w × h` values.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Result<Self, DepthSimError> {
        if data.len() != w * h {
            return Err(DepthSimError::BufferMismatch {
                expected: w * h,
                actual: data.len(),
            });
        }
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Resize to `w × h` if needed. Existing contents survive only when the
    /// dimensions already match.
    pub fn ensure_size(&mut self, w: usize, h: usize) {
        if self.w != w || self.h != h || self.data.len() != w * h {
            self.w = w;
            self.h = h;
            self.stride = w;
            self.data = vec![0.0; w * h];
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}
