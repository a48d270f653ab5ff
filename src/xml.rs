//! Small helpers shared by the OOXML readers and writers.

use quick_xml::events::{BytesEnd, BytesStart};

/// Local (prefix-free) name of a start or empty element.
pub fn local_name(e: &BytesStart) -> String {
    std::str::from_utf8(e.local_name().as_ref())
        .unwrap_or("")
        .to_string()
}

/// Local (prefix-free) name of an end element.
pub fn local_name_end(e: &BytesEnd) -> String {
    std::str::from_utf8(e.local_name().as_ref())
        .unwrap_or("")
        .to_string()
}

/// Gets an attribute value by local name, unescaped.
///
/// `w:val` and `val` both match `"val"`.
pub fn attr(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name.as_bytes() {
            if let Ok(val) = attr.unescape_value() {
                return Some(val.into_owned());
            }
        }
    }
    None
}

/// Gets a u32 attribute value by local name.
pub fn attr_u32(e: &BytesStart, name: &str) -> Option<u32> {
    attr(e, name).and_then(|v| v.trim().parse().ok())
}

/// Escapes text for use in element content or attribute values.
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
