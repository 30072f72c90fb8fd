//! Embedded metadata reader: EXIF plus the XMP software properties.
//!
//! | Source | Reader |
//! |---|---|
//! | EXIF in JPEG APP1 / PNG eXIf | `kamadak-exif` (`exif::Reader::read_from_container`) |
//! | Raw TIFF-structured EXIF blob | `kamadak-exif` (`exif::Reader::read_raw`) |
//! | XMP `CreatorTool`, history agents | [`xmp`] (JPEG APP1 / PNG iTXt scan, quick-xml) |
//!
//! Only the primary image IFD (and the Exif/GPS IFDs it links to) is read;
//! thumbnail tags are ignored. Malformed or missing metadata is normalized to
//! `None`: absence is an analyzable state, never an error.

pub mod xmp;

use ::exif::{Context, Field, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// `ProcessingSoftware` (TIFF/EP tag 0x000B) is not in the EXIF tag table.
const PROCESSING_SOFTWARE: Tag = Tag(Context::Tiff, 0x000B);

/// Key under which the XMP `CreatorTool` value is stored.
pub const XMP_CREATOR_TOOL: &str = "XMP:CreatorTool";
/// Key under which XMP history software agents are stored (joined by `; `).
pub const XMP_HISTORY_AGENT: &str = "XMP:HistorySoftwareAgent";

/// Value of one metadata tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExifValue {
    Number(f64),
    Text(String),
}

impl ExifValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExifValue::Text(s) => Some(s),
            ExifValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifValue::Number(n) => write!(f, "{n}"),
            ExifValue::Text(s) => f.write_str(s),
        }
    }
}

/// Tag name → value, e.g. `Make`, `Software`, `DateTimeOriginal`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifRecord {
    tags: BTreeMap<String, ExifValue>,
}

impl ExifRecord {
    /// Read EXIF and XMP from an encoded JPEG or PNG.
    ///
    /// Returns `None` when neither yields a single tag.
    pub fn from_container(bytes: &[u8]) -> Option<ExifRecord> {
        let mut record = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => ExifRecord::from_fields(exif.fields()),
            Err(e) => {
                debug!(error = %e, "no readable EXIF");
                ExifRecord::default()
            }
        };
        record.merge_xmp(xmp::read_xmp(bytes));
        record.into_option()
    }

    /// Read a raw TIFF-structured EXIF blob (the payload of an APP1 segment
    /// after `Exif\0\0`), as supplied by callers that extracted it themselves.
    pub fn from_raw_tiff(blob: &[u8]) -> Option<ExifRecord> {
        match Reader::new().read_raw(blob.to_vec()) {
            Ok(exif) => ExifRecord::from_fields(exif.fields()).into_option(),
            Err(e) => {
                debug!(error = %e, "malformed raw EXIF blob");
                None
            }
        }
    }

    fn from_fields<'a>(fields: impl Iterator<Item = &'a Field>) -> ExifRecord {
        let mut tags = BTreeMap::new();
        for field in fields {
            if field.ifd_num != In::PRIMARY || is_structural(field.tag) {
                continue;
            }
            let name = if field.tag == PROCESSING_SOFTWARE {
                "ProcessingSoftware".to_string()
            } else if field.tag.description().is_some() {
                field.tag.to_string()
            } else {
                continue;
            };
            if let Some(value) = convert_value(field) {
                tags.entry(name).or_insert(value);
            }
        }
        ExifRecord { tags }
    }

    fn merge_xmp(&mut self, xmp: xmp::XmpData) {
        if let Some(tool) = xmp.creator_tool {
            self.tags
                .insert(XMP_CREATOR_TOOL.to_string(), ExifValue::Text(tool));
        }
        if !xmp.history_agents.is_empty() {
            self.tags.insert(
                XMP_HISTORY_AGENT.to_string(),
                ExifValue::Text(xmp.history_agents.join("; ")),
            );
        }
    }

    fn into_option(self) -> Option<ExifRecord> {
        if self.tags.is_empty() { None } else { Some(self) }
    }

    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> ExifRecord
    where
        I: IntoIterator<Item = (K, ExifValue)>,
        K: Into<String>,
    {
        ExifRecord {
            tags: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExifValue> {
        self.tags.get(name)
    }

    /// Text value of a tag, if present, non-empty and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(ExifValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExifValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// IFD pointers and thumbnail bookkeeping carry no evidence about the photo.
const STRUCTURAL_TAGS: [Tag; 6] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::MakerNote,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

fn is_structural(tag: Tag) -> bool {
    STRUCTURAL_TAGS.contains(&tag)
}

fn convert_value(field: &Field) -> Option<ExifValue> {
    let value = match &field.value {
        Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim_matches(['\0', ' ']).to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            ExifValue::Text(text)
        }
        Value::Short(v) if v.len() == 1 => ExifValue::Number(v[0] as f64),
        Value::Long(v) if v.len() == 1 => ExifValue::Number(v[0] as f64),
        Value::Rational(v) if v.len() == 1 && v[0].denom != 0 => {
            ExifValue::Number(v[0].to_f64())
        }
        Value::Undefined(bytes, _) if bytes.len() > 64 => return None,
        _ => ExifValue::Text(field.display_value().to_string()),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn reads_camera_tags_from_jpeg() {
        let exif = ExifFixture::camera("Canon", "EOS 90D", "2024:03:14 09:26:53");
        let bytes = with_exif_app1(&encode_jpeg(&gradient_image(32, 32), 90), &exif.to_tiff());
        let record = ExifRecord::from_container(&bytes).unwrap();
        assert_eq!(record.text("Make"), Some("Canon"));
        assert_eq!(record.text("Model"), Some("EOS 90D"));
        assert_eq!(record.text("DateTimeOriginal"), Some("2024:03:14 09:26:53"));
        assert!(record.get("ExifIFDPointer").is_none());
    }

    #[test]
    fn reads_software_tag() {
        let exif = ExifFixture {
            software: Some("Adobe Photoshop 25.0".into()),
            ..ExifFixture::default()
        };
        let bytes = with_exif_app1(&encode_jpeg(&gradient_image(16, 16), 90), &exif.to_tiff());
        let record = ExifRecord::from_container(&bytes).unwrap();
        assert_eq!(record.text("Software"), Some("Adobe Photoshop 25.0"));
        assert!(record.get("Make").is_none());
    }

    #[test]
    fn plain_jpeg_has_no_record() {
        let bytes = encode_jpeg(&gradient_image(16, 16), 90);
        assert!(ExifRecord::from_container(&bytes).is_none());
    }

    #[test]
    fn plain_png_has_no_record() {
        assert!(ExifRecord::from_container(&encode_png(&flat_image(8, 8, 50))).is_none());
    }

    #[test]
    fn xmp_only_jpeg_yields_record() {
        let packet = r#"<rdf:Description xmlns:xmp="http://ns.adobe.com/xap/1.0/" xmp:CreatorTool="GIMP 2.10"/>"#;
        let bytes = with_xmp_app1(&encode_jpeg(&flat_image(16, 16, 9), 90), packet);
        let record = ExifRecord::from_container(&bytes).unwrap();
        assert_eq!(record.text(XMP_CREATOR_TOOL), Some("GIMP 2.10"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn raw_tiff_blob() {
        let exif = ExifFixture::camera("Nikon", "D750", "2023:07:01 12:00:00");
        let record = ExifRecord::from_raw_tiff(&exif.to_tiff()).unwrap();
        assert_eq!(record.text("Make"), Some("Nikon"));
    }

    #[test]
    fn malformed_raw_blob_is_none() {
        assert!(ExifRecord::from_raw_tiff(b"II*\0garbage").is_none());
        assert!(ExifRecord::from_raw_tiff(&[]).is_none());
    }

    #[test]
    fn processing_software_is_named() {
        let exif = ExifFixture {
            processing_software: Some("Snapseed".into()),
            ..ExifFixture::default()
        };
        let record = ExifRecord::from_raw_tiff(&exif.to_tiff()).unwrap();
        assert_eq!(record.text("ProcessingSoftware"), Some("Snapseed"));
    }

    #[test]
    fn text_ignores_numbers_and_empty_values() {
        let record = ExifRecord::from_pairs([
            ("Orientation", ExifValue::Number(1.0)),
            ("Software", ExifValue::Text(String::new())),
        ]);
        assert_eq!(record.text("Orientation"), None);
        assert_eq!(record.text("Software"), None);
        assert_eq!(record.len(), 2);
    }
}
