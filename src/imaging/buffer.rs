//! The decoded, normalized image handed to every analyzer.

use super::quality::QualityMetrics;
use image::RgbImage;
use std::fmt;
use std::sync::OnceLock;

/// Container format the image was submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    pub fn label(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
        }
    }

    /// Map a declared MIME type to an accepted format. Parameters
    /// (`; charset=...`) and case are ignored.
    pub fn from_mime(mime: &str) -> Option<SourceFormat> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(SourceFormat::Jpeg),
            "image/png" => Some(SourceFormat::Png),
            _ => None,
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// RGB8 pixel grid plus the facts analyzers need about where it came from.
///
/// Immutable once built: analyzers borrow it concurrently. Quality metrics
/// are measured on first use and shared by every analyzer after that.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pixels: RgbImage,
    source_format: SourceFormat,
    original_width: u32,
    original_height: u32,
    downscaled: bool,
    quality: OnceLock<QualityMetrics>,
}

impl ImageBuffer {
    /// Wrap pixels that were not resampled.
    pub fn from_rgb(pixels: RgbImage, source_format: SourceFormat) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            pixels,
            source_format,
            original_width: width,
            original_height: height,
            downscaled: false,
            quality: OnceLock::new(),
        }
    }

    pub(crate) fn with_provenance(
        pixels: RgbImage,
        source_format: SourceFormat,
        original: (u32, u32),
        downscaled: bool,
    ) -> Self {
        Self {
            pixels,
            source_format,
            original_width: original.0,
            original_height: original.1,
            downscaled,
            quality: OnceLock::new(),
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn source_format(&self) -> SourceFormat {
        self.source_format
    }

    pub fn original_dimensions(&self) -> (u32, u32) {
        (self.original_width, self.original_height)
    }

    /// Whether the pixels were resampled to fit the analysis bound.
    pub fn downscaled(&self) -> bool {
        self.downscaled
    }

    /// Blur, noise and exposure metrics of the analysis buffer.
    pub fn quality(&self) -> QualityMetrics {
        *self
            .quality
            .get_or_init(|| QualityMetrics::measure(&self.luma_plane()))
    }

    /// BT.601 luminance of every pixel.
    pub fn luma_plane(&self) -> LumaPlane {
        let values = self
            .pixels
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
            })
            .collect();
        LumaPlane {
            width: self.width(),
            height: self.height(),
            values,
        }
    }
}

/// Row-major luminance values in 8-bit levels (0.0–255.0).
#[derive(Debug, Clone)]
pub struct LumaPlane {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl LumaPlane {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Sobel gradient `(gx, gy)` at an interior pixel, normalized to levels
    /// per pixel. `gx` grows toward brighter columns, `gy` toward brighter
    /// rows.
    ///
    /// Callers must keep `1 <= x < width - 1` and `1 <= y < height - 1`.
    pub fn sobel(&self, x: u32, y: u32) -> (f32, f32) {
        let p = |dx: i32, dy: i32| {
            self.get((x as i32 + dx) as u32, (y as i32 + dy) as u32)
        };
        let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
        let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
        (gx / 8.0, gy / 8.0)
    }

    /// Mean Sobel gradient magnitude over all interior pixels.
    /// Images too small to have an interior yield 0.
    pub fn mean_gradient_magnitude(&self) -> f64 {
        self.region_gradient_magnitude((0, self.width), (0, self.height))
    }

    /// Mean Sobel gradient magnitude over the pixels of
    /// `[x0, x1) × [y0, y1)` whose stencil lies inside the image.
    /// 0 when no such pixel exists.
    pub fn region_gradient_magnitude(&self, x_range: (u32, u32), y_range: (u32, u32)) -> f64 {
        let xs = x_range.0.max(1)..x_range.1.min(self.width.saturating_sub(1));
        let ys = y_range.0.max(1)..y_range.1.min(self.height.saturating_sub(1));
        if xs.is_empty() || ys.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0f64;
        for y in ys.clone() {
            for x in xs.clone() {
                let (gx, gy) = self.sobel(x, y);
                sum += (gx as f64).hypot(gy as f64);
            }
        }
        sum / (xs.len() as f64 * ys.len() as f64)
    }

    /// 256-bin histogram of the luminance values, rounded to whole levels.
    pub fn histogram(&self) -> [u64; 256] {
        let mut histogram = [0u64; 256];
        for &v in &self.values {
            histogram[v.round().clamp(0.0, 255.0) as usize] += 1;
        }
        histogram
    }
}
