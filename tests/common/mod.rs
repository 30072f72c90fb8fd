//! Fixture builders shared by the integration tests.
//!
//! Images are synthesized in memory; EXIF blocks are written as big-endian
//! ("MM") TIFF so the byte order not covered by the unit tests gets
//! exercised end to end.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// 2024-06-01T00:00:00Z
pub const NOW: i64 = 1_717_200_000;

pub const TAG_MAKE: u16 = 0x010F;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_SOFTWARE: u16 = 0x0131;
pub const TAG_DATE_TIME: u16 = 0x0132;

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;

/// Scene lit evenly from the left: brightness rises left to right, the
/// ramp restarting every 128 columns.
pub fn lit_scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        let v = (64 + x % 128) as u8;
        Rgb([v, v, v])
    })
}

/// `lit_scene` whose bottom `ground_rows` rows carry up to ±24 levels of
/// deterministic noise: smooth sky over gravel or foliage.
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

pub fn flat(width: u32, height: u32, level: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([level, level, level]))
}

pub fn jpeg(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .expect("encode jpeg");
    out
}

pub fn png(image: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// Big-endian TIFF with `ifd0` ASCII tags and, when `taken` is set, an Exif
/// sub-IFD holding `DateTimeOriginal`.
pub fn exif_tiff(ifd0: &[(u16, &str)], taken: Option<&str>) -> Vec<u8> {
    let mut main: Vec<(u16, u16, Vec<u8>)> = ifd0
        .iter()
        .map(|&(tag, value)| (tag, TYPE_ASCII, ascii(value)))
        .collect();
    let sub: Vec<(u16, u16, Vec<u8>)> = taken
        .map(|t| vec![(TAG_DATE_TIME_ORIGINAL, TYPE_ASCII, ascii(t))])
        .unwrap_or_default();

    if !sub.is_empty() {
        main.push((TAG_EXIF_IFD, TYPE_LONG, vec![0; 4]));
        let sub_offset = (8 + ifd_len(&main)) as u32;
        if let Some(entry) = main.last_mut() {
            entry.2 = sub_offset.to_be_bytes().to_vec();
        }
    }

    let mut out = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
    write_ifd(&mut out, &main);
    if !sub.is_empty() {
        write_ifd(&mut out, &sub);
    }
    out
}

/// Tags of an unedited camera file.
pub fn camera_tags(taken: &str) -> Vec<u8> {
    exif_tiff(
        &[
            (TAG_MAKE, "NIKON CORPORATION"),
            (TAG_MODEL, "NIKON D7500"),
            (TAG_DATE_TIME, taken),
        ],
        Some(taken),
    )
}

/// Insert an EXIF APP1 segment right after SOI.
pub fn with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Insert an XMP APP1 segment right after SOI.
pub fn with_xmp(jpeg: &[u8], packet: &str) -> Vec<u8> {
    const XMP_ID: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((packet.len() + XMP_ID.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(XMP_ID);
    segment.extend_from_slice(packet.as_bytes());

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn ascii(value: &str) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    bytes.push(0);
    bytes
}

fn padded(len: usize) -> usize {
    if len <= 4 { 0 } else { len + len % 2 }
}

fn ifd_len(entries: &[(u16, u16, Vec<u8>)]) -> usize {
    2 + 12 * entries.len() + 4 + entries.iter().map(|e| padded(e.2.len())).sum::<usize>()
}

fn write_ifd(out: &mut Vec<u8>, entries: &[(u16, u16, Vec<u8>)]) {
    let mut next_data = out.len() + 2 + 12 * entries.len() + 4;
    let mut data = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for (tag, kind, value) in entries {
        let count = if *kind == TYPE_ASCII { value.len() } else { 1 };
        out.extend_from_slice(&tag.to_be_bytes());
        out.extend_from_slice(&kind.to_be_bytes());
        out.extend_from_slice(&(count as u32).to_be_bytes());
        if value.len() <= 4 {
            let mut inline = value.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(next_data as u32).to_be_bytes());
            data.extend_from_slice(value);
            if value.len() % 2 == 1 {
                data.push(0);
            }
            next_data += padded(value.len());
        }
    }
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&data);
}
