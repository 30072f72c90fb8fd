//! Minimal XMP reader for JPEG and PNG files.
//!
//! Extracts the two properties that name the software that produced or
//! touched an image:
//! - `CreatorTool` in the XMP basic schema (`http://ns.adobe.com/xap/1.0/`)
//! - `softwareAgent` of every `ResourceEvent` in the edit history
//!
//! For JPEG: reads the APP1 segment whose payload starts with the XMP
//! namespace header. For PNG: reads the uncompressed `iTXt` chunk with
//! keyword `XML:com.adobe.xmp`.
//!
//! Properties are matched by namespace URI through `quick_xml::NsReader`,
//! so `xmp:`, the older `xap:` and any other bound prefix are all read.
//! Both attribute (`xmp:CreatorTool="..."`) and element
//! (`<xmp:CreatorTool>...</xmp:CreatorTool>`) serializations are accepted.
//! A malformed packet yields whatever was read before the error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::debug;

const NS_XMP_BASIC: &[u8] = b"http://ns.adobe.com/xap/1.0/";
const NS_RESOURCE_EVENT: &[u8] = b"http://ns.adobe.com/xap/1.0/sType/ResourceEvent#";

/// Software properties extracted from an XMP packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpData {
    pub creator_tool: Option<String>,
    pub history_agents: Vec<String>,
}

impl XmpData {
    pub fn is_empty(&self) -> bool {
        self.creator_tool.is_none() && self.history_agents.is_empty()
    }

    /// Keep the first `CreatorTool` and every history agent, in document
    /// order. Blank values are dropped.
    fn record(&mut self, property: Property, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match property {
            Property::CreatorTool => {
                self.creator_tool.get_or_insert_with(|| value.to_string());
            }
            Property::SoftwareAgent => self.history_agents.push(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    CreatorTool,
    SoftwareAgent,
}

impl Property {
    fn resolve(namespace: &ResolveResult, local_name: &[u8]) -> Option<Property> {
        let ResolveResult::Bound(Namespace(uri)) = namespace else {
            return None;
        };
        if *uri == NS_XMP_BASIC && local_name == b"CreatorTool" {
            Some(Property::CreatorTool)
        } else if *uri == NS_RESOURCE_EVENT && local_name == b"softwareAgent" {
            Some(Property::SoftwareAgent)
        } else {
            None
        }
    }
}

/// Read XMP from image bytes, dispatching on the container's magic bytes.
/// Returns default (empty) data when there is no packet or it is unreadable.
pub fn read_xmp(data: &[u8]) -> XmpData {
    let packet = if data.starts_with(&[0xFF, 0xD8]) {
        find_jpeg_xmp_packet(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        find_png_xmp_packet(data)
    } else {
        None
    };

    match packet {
        Some(bytes) => parse_xmp_packet(&String::from_utf8_lossy(bytes)),
        None => XmpData::default(),
    }
}

// ---------------------------------------------------------------------------
// Packet parsing
// ---------------------------------------------------------------------------

fn parse_xmp_packet(packet: &str) -> XmpData {
    let mut reader = NsReader::from_str(packet);
    let mut data = XmpData::default();
    // Property whose element is open, for the simple-element form
    let mut open = None;

    loop {
        match reader.read_resolved_event() {
            Ok((namespace, Event::Start(element))) => {
                open = Property::resolve(&namespace, element.local_name().as_ref());
                record_attributes(&reader, &element, &mut data);
            }
            Ok((_, Event::Empty(element))) => {
                open = None;
                record_attributes(&reader, &element, &mut data);
            }
            Ok((_, Event::Text(text))) => {
                if let Some(property) = open {
                    match text.unescape() {
                        Ok(value) => data.record(property, &value),
                        Err(e) => debug!(error = %e, "XMP text value skipped"),
                    }
                }
            }
            Ok((_, Event::End(_))) => open = None,
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(
                    error = %e,
                    position = reader.buffer_position(),
                    "malformed XMP packet, keeping properties read so far"
                );
                break;
            }
        }
    }
    data
}

fn record_attributes(reader: &NsReader<&[u8]>, element: &BytesStart, data: &mut XmpData) {
    for attribute in element.attributes().flatten() {
        let (namespace, local_name) = reader.resolve_attribute(attribute.key);
        let Some(property) = Property::resolve(&namespace, local_name.as_ref()) else {
            continue;
        };
        match attribute.unescape_value() {
            Ok(value) => data.record(property, &value),
            Err(e) => debug!(error = %e, "XMP attribute value skipped"),
        }
    }
}

// ---------------------------------------------------------------------------
// JPEG: XMP from APP1
// ---------------------------------------------------------------------------

const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Find the XMP packet inside a JPEG's APP1 segments.
fn find_jpeg_xmp_packet(data: &[u8]) -> Option<&[u8]> {
    // Skip SOI
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // SOS (0xDA) means entropy-coded data starts; EOI ends the image
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Fill bytes and markers without a length field
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xE1 && seg_start <= seg_end {
            if let Some(packet) = data[seg_start..seg_end].strip_prefix(XMP_HEADER) {
                return Some(packet);
            }
        }
        pos += 2 + seg_len.max(2);
    }
    None
}

// ---------------------------------------------------------------------------
// PNG: XMP from iTXt
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";

/// Find the XMP packet inside a PNG `iTXt` chunk.
///
/// Chunk layout: length (4, BE) + type (4) + data + CRC (4).
/// iTXt data: keyword \0 compression-flag compression-method
/// language \0 translated-keyword \0 text.
fn find_png_xmp_packet(data: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(len)?;
        if body_end > data.len() {
            break;
        }
        let body = &data[body_start..body_end];

        if chunk_type == b"IEND" {
            break;
        }
        if chunk_type == b"iTXt" {
            if let Some(text) = body.strip_prefix(XMP_KEYWORD).and_then(itxt_text) {
                return Some(text);
            }
        }
        pos = body_end + 4;
    }
    None
}

/// Text of an iTXt body positioned just after the keyword. Compressed
/// text is skipped.
fn itxt_text(after_keyword: &[u8]) -> Option<&[u8]> {
    let rest = after_keyword.strip_prefix(&[0])?;
    let (&compressed, rest) = rest.split_first()?;
    let (_method, rest) = rest.split_first()?;
    if compressed != 0 {
        debug!("compressed XMP iTXt chunk skipped");
        return None;
    }
    let lang_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[lang_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    Some(&rest[translated_end + 1..])
}
