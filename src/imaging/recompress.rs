//! JPEG recompression seam used by error level analysis.
//!
//! The [`Recompressor`] trait is the one pixel operation ELA needs from a
//! codec: encode at a given quality and decode the result back. The
//! production implementation is [`JpegRecompressor`] (the `image` crate's
//! JPEG encoder and decoder); tests substitute a mock so error levels are
//! fully controlled.

use super::params::JpegQuality;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecompressError {
    #[error("JPEG encode failed: {0}")]
    Encode(String),
    #[error("JPEG decode failed: {0}")]
    Decode(String),
    #[error("recompressed image is {got:?}, expected {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },
}

/// Encode-then-decode round trip through a lossy codec.
pub trait Recompressor: Send + Sync {
    fn recompress(&self, image: &RgbImage, quality: JpegQuality)
    -> Result<RgbImage, RecompressError>;
}

/// In-memory JPEG round trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegRecompressor;

impl Recompressor for JpegRecompressor {
    fn recompress(
        &self,
        image: &RgbImage,
        quality: JpegQuality,
    ) -> Result<RgbImage, RecompressError> {
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, quality.value())
            .encode_image(image)
            .map_err(|e| RecompressError::Encode(e.to_string()))?;

        let decoded = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
            .map_err(|e| RecompressError::Decode(e.to_string()))?
            .to_rgb8();
        Ok(decoded)
    }
}
