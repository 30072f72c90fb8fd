//! Decoder/normalizer: raw upload bytes → [`ImageBuffer`].
//!
//! Every check that can reject an input happens here, in order of cost:
//!
//! 1. encoded size against `limits.max_input_bytes`
//! 2. magic-byte sniffing (JPEG and PNG only)
//! 3. header dimensions against `limits.max_source_edge` /
//!    `limits.max_source_pixels`, before pixel data is touched
//! 4. full decode under `image::Limits`, so a lying header cannot bypass (3)
//!
//! Successful decodes are converted to RGB8 and downscaled with Lanczos3 when
//! the longer edge exceeds `limits.analysis_max_edge`.

use super::buffer::{ImageBuffer, SourceFormat};
use super::calculations::calculate_clamped_dimensions;
use crate::config::LimitsConfig;
use image::imageops::FilterType;
use image::{ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Why an input was rejected. Each variant carries a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
}

impl InputError {
    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::Decode(_) => "decode_error",
            InputError::UnsupportedFormat(_) => "unsupported_format",
            InputError::ResourceLimitExceeded(_) => "resource_limit_exceeded",
        }
    }
}

/// Decode and normalize one submitted image.
///
/// `declared_mime` is the client's claim about the content type; the bytes
/// decide. It only affects which error unrecognized bytes produce.
pub fn decode_image(
    bytes: &[u8],
    declared_mime: Option<&str>,
    limits: &LimitsConfig,
) -> Result<ImageBuffer, InputError> {
    if bytes.len() as u64 > limits.max_input_bytes {
        return Err(InputError::ResourceLimitExceeded(format!(
            "input is {} bytes, limit is {}",
            bytes.len(),
            limits.max_input_bytes
        )));
    }
    if bytes.is_empty() {
        return Err(InputError::Decode("input is empty".into()));
    }

    let format = sniff_format(bytes, declared_mime)?;

    let (width, height) = reader(bytes, format, limits)
        .into_dimensions()
        .map_err(map_image_error)?;
    check_source_dimensions(width, height, limits)?;

    let decoded = reader(bytes, format, limits)
        .decode()
        .map_err(map_image_error)?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    debug!(%format, width, height, "decoded image");

    let (target_w, target_h) = calculate_clamped_dimensions((width, height), limits.analysis_max_edge);
    if (target_w, target_h) == (width, height) {
        return Ok(ImageBuffer::with_provenance(
            decoded,
            format,
            (width, height),
            false,
        ));
    }

    debug!(
        from_width = width,
        from_height = height,
        to_width = target_w,
        to_height = target_h,
        "downscaling for analysis"
    );
    let resized = image::imageops::resize(&decoded, target_w, target_h, FilterType::Lanczos3);
    Ok(ImageBuffer::with_provenance(
        resized,
        format,
        (width, height),
        true,
    ))
}

/// Identify the container from its magic bytes.
fn sniff_format(bytes: &[u8], declared_mime: Option<&str>) -> Result<SourceFormat, InputError> {
    let sniffed = match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => SourceFormat::Jpeg,
        Ok(ImageFormat::Png) => SourceFormat::Png,
        Ok(other) => {
            return Err(InputError::UnsupportedFormat(format!(
                "{other:?} images are not accepted, submit JPEG or PNG"
            )));
        }
        Err(_) => {
            return Err(match declared_mime {
                Some(mime) if SourceFormat::from_mime(mime).is_none() => {
                    InputError::UnsupportedFormat(format!("declared type '{mime}' is not accepted"))
                }
                _ => InputError::Decode("unrecognized image data".into()),
            });
        }
    };

    if let Some(mime) = declared_mime {
        if SourceFormat::from_mime(mime) != Some(sniffed) {
            debug!(declared = mime, sniffed = %sniffed, "declared MIME type does not match content");
        }
    }
    Ok(sniffed)
}

fn reader<'a>(
    bytes: &'a [u8],
    format: SourceFormat,
    limits: &LimitsConfig,
) -> ImageReader<Cursor<&'a [u8]>> {
    let mut reader = ImageReader::with_format(Cursor::new(bytes), format.image_format());
    reader.limits(decoder_limits(limits));
    reader
}

fn decoder_limits(limits: &LimitsConfig) -> image::Limits {
    let mut decoder_limits = image::Limits::default();
    decoder_limits.max_image_width = Some(limits.max_source_edge);
    decoder_limits.max_image_height = Some(limits.max_source_edge);
    // 16-bit RGBA is the widest layout a decoder may allocate
    decoder_limits.max_alloc = Some(limits.max_source_pixels.saturating_mul(8));
    decoder_limits
}

fn check_source_dimensions(width: u32, height: u32, limits: &LimitsConfig) -> Result<(), InputError> {
    if width == 0 || height == 0 {
        return Err(InputError::Decode(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    if width > limits.max_source_edge || height > limits.max_source_edge {
        return Err(InputError::ResourceLimitExceeded(format!(
            "image is {width}x{height}, edge limit is {}",
            limits.max_source_edge
        )));
    }
    let pixels = width as u64 * height as u64;
    if pixels > limits.max_source_pixels {
        return Err(InputError::ResourceLimitExceeded(format!(
            "image has {pixels} pixels, limit is {}",
            limits.max_source_pixels
        )));
    }
    Ok(())
}

fn map_image_error(err: ImageError) -> InputError {
    match err {
        ImageError::Limits(e) => InputError::ResourceLimitExceeded(e.to_string()),
        ImageError::Unsupported(e) => InputError::UnsupportedFormat(e.to_string()),
        other => InputError::Decode(other.to_string()),
    }
}
