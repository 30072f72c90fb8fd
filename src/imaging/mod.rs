//! Image decoding and pixel plumbing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Sniff** | `image::guess_format` (magic bytes) |
//! | **Decode** | `image::ImageReader` under `image::Limits` |
//! | **Downscale** | `image::imageops::resize` with `Lanczos3` |
//! | **Recompress** | `image::codecs::jpeg::JpegEncoder` + JPEG decoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math and statistics (unit testable)
//! - **Parameters**: Value types describing codec settings
//! - **Buffer**: [`ImageBuffer`], the normalized RGB8 grid analyzers borrow
//! - **Quality**: [`QualityMetrics`], blur / noise / exposure of the buffer
//! - **Decode**: [`decode_image`], bytes → [`ImageBuffer`] with every input check
//! - **Recompress**: [`Recompressor`] trait + [`JpegRecompressor`]

mod buffer;
mod calculations;
pub mod decode;
mod params;
pub mod quality;
pub mod recompress;

pub use buffer::{ImageBuffer, LumaPlane, SourceFormat};
pub use calculations::{
    angular_distance_deg, calculate_clamped_dimensions, median, percentile_from_histogram,
    region_bounds,
};
pub use decode::{InputError, decode_image};
pub use params::JpegQuality;
pub use quality::{QualityMetrics, QualityVerdict};
pub use recompress::{JpegRecompressor, RecompressError, Recompressor};
