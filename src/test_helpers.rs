//! Shared test utilities for the civic-eye unit tests.
//!
//! Builds every fixture in memory: synthetic images, JPEG/PNG encodings,
//! and hand-assembled EXIF (TIFF) and XMP segments spliced into them.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let exif = ExifFixture::camera("Canon", "EOS 90D", "2024:03:14 09:26:53");
//! let bytes = with_exif_app1(&encode_jpeg(&gradient_image(64, 64), 95), &exif.to_tiff());
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// Smooth diagonal color ramp.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 255 / (width + height).max(1)) as u8;
        Rgb([r, g, b])
    })
}

/// Single gray level everywhere.
pub fn flat_image(width: u32, height: u32, level: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([level, level, level]))
}

/// Gray image brightening left to right, with the ramp repeating every
/// `period` columns.
pub fn ramp_image(width: u32, height: u32, period: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        let v = (64 + x % period) as u8;
        Rgb([v, v, v])
    })
}

/// `ramp_image` with period 128 whose bottom `ground_rows` rows carry up to
/// ±24 levels of deterministic noise: smooth sky over busy ground.
pub fn sky_over_ground(width: u32, height: u32, ground_rows: u32) -> RgbImage {
    let mut state = 0x2545_F491u32;
    RgbImage::from_fn(width, height, |x, y| {
        let base = 64 + (x % 128) as i32;
        let noise = if y >= height.saturating_sub(ground_rows) {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ((state >> 16) % 49) as i32 - 24
        } else {
            0
        };
        let v = (base + noise).clamp(0, 255) as u8;
        Rgb([v, v, v])
    })
}

// =========================================================================
// Encoding
// =========================================================================

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .unwrap();
    out
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

// =========================================================================
// EXIF fixtures: little-endian TIFF structure
// =========================================================================

/// The EXIF tags a fixture can carry. `None` fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    pub processing_software: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    /// `DateTime` (last modification), IFD0.
    pub date_time: Option<String>,
    /// `DateTimeOriginal`, Exif IFD.
    pub date_time_original: Option<String>,
}

impl ExifFixture {
    /// Untouched camera output: make, model and matching capture/modify times.
    pub fn camera(make: &str, model: &str, taken: &str) -> Self {
        Self {
            make: Some(make.into()),
            model: Some(model.into()),
            date_time: Some(taken.into()),
            date_time_original: Some(taken.into()),
            ..Self::default()
        }
    }

    /// Serialize as a TIFF blob (what follows `Exif\0\0` in APP1).
    pub fn to_tiff(&self) -> Vec<u8> {
        let mut ifd0: Vec<IfdEntry> = [
            (0x000B, &self.processing_software),
            (0x010F, &self.make),
            (0x0110, &self.model),
            (0x0131, &self.software),
            (0x0132, &self.date_time),
        ]
        .into_iter()
        .filter_map(|(tag, value)| value.as_deref().map(|v| IfdEntry::ascii(tag, v)))
        .collect();

        let exif_ifd: Vec<IfdEntry> = self
            .date_time_original
            .as_deref()
            .map(|v| vec![IfdEntry::ascii(0x9003, v)])
            .unwrap_or_default();

        const HEADER_LEN: usize = 8;
        if !exif_ifd.is_empty() {
            // Pointer value is patched once IFD0's size is known
            ifd0.push(IfdEntry::long(0x8769, 0));
            let exif_offset = HEADER_LEN + ifd_size(&ifd0);
            if let Some(pointer) = ifd0.last_mut() {
                *pointer = IfdEntry::long(0x8769, exif_offset as u32);
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
        write_ifd(&mut out, &ifd0);
        if !exif_ifd.is_empty() {
            write_ifd(&mut out, &exif_ifd);
        }
        out
    }
}

struct IfdEntry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

impl IfdEntry {
    fn ascii(tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self {
            tag,
            kind: 2,
            count: data.len() as u32,
            data,
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            kind: 4,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    /// Bytes stored outside the entry table, padded to a word boundary.
    fn external_len(&self) -> usize {
        if self.data.len() <= 4 {
            0
        } else {
            self.data.len() + self.data.len() % 2
        }
    }
}

fn ifd_size(entries: &[IfdEntry]) -> usize {
    2 + entries.len() * 12 + 4 + entries.iter().map(IfdEntry::external_len).sum::<usize>()
}

/// Append an IFD at the current end of `out` (offsets are relative to the
/// TIFF header at `out[0]`).
fn write_ifd(out: &mut Vec<u8>, entries: &[IfdEntry]) {
    let table_len = 2 + entries.len() * 12 + 4;
    let mut data_offset = out.len() + table_len;
    let mut external = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = entry.data.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_offset as u32).to_le_bytes());
            external.extend_from_slice(&entry.data);
            if entry.data.len() % 2 == 1 {
                external.push(0);
            }
            data_offset += entry.external_len();
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&external);
}

// =========================================================================
// Segment splicing
// =========================================================================

/// Insert a JPEG APP segment right after SOI.
fn insert_jpeg_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Add an EXIF APP1 segment carrying `tiff`.
pub fn with_exif_app1(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);
    insert_jpeg_segment(jpeg, 0xE1, &payload)
}

/// Add an XMP APP1 segment carrying `packet`.
pub fn with_xmp_app1(jpeg: &[u8], packet: &str) -> Vec<u8> {
    let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
    payload.extend_from_slice(packet.as_bytes());
    insert_jpeg_segment(jpeg, 0xE1, &payload)
}

/// Add an uncompressed XMP `iTXt` chunk right after IHDR.
pub fn with_png_xmp(png: &[u8], packet: &str) -> Vec<u8> {
    // Signature (8) + IHDR chunk (4 + 4 + 13 + 4)
    const AFTER_IHDR: usize = 33;
    let mut data = b"XML:com.adobe.xmp\0\0\0\0\0".to_vec();
    data.extend_from_slice(packet.as_bytes());

    let mut chunk = Vec::new();
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let mut typed = b"iTXt".to_vec();
    typed.extend_from_slice(&data);
    chunk.extend_from_slice(&typed);
    chunk.extend_from_slice(&crc32(&typed).to_be_bytes());

    let mut out = png[..AFTER_IHDR].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[AFTER_IHDR..]);
    out
}

/// PNG chunk CRC (ISO-HDLC).
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_known_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn png_with_xmp_still_decodes() {
        let png = encode_png(&flat_image(4, 4, 7));
        let tagged = with_png_xmp(&png, "<x/>");
        assert!(image::load_from_memory(&tagged).is_ok());
    }

    #[test]
    fn exif_fixture_layout() {
        let tiff = ExifFixture::camera("A", "B", "2024:01:01 00:00:00").to_tiff();
        assert_eq!(&tiff[..4], b"II*\0");
        // IFD0: Make, Model, DateTime, ExifIFD pointer
        assert_eq!(u16::from_le_bytes([tiff[8], tiff[9]]), 4);
    }
}
