//! Plain text decoding.

use encoding_rs::{Encoding, UTF_8};

/// Legacy encodings tried, in order, when the bytes are not valid UTF-8.
const LEGACY_LABELS: &[&str] = &["euc-kr", "windows-1252"];

/// Decodes text bytes.
///
/// A byte order mark selects the encoding. Without one, strict UTF-8 is
/// tried first, then the legacy encodings; the first decode without
/// replacement characters wins.
pub fn decode_bytes(data: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        let (decoded, _) = encoding.decode_without_bom_handling(&data[bom_len..]);
        return decoded.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(data) {
        return text.to_string();
    }

    for label in LEGACY_LABELS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        let (decoded, had_errors) = encoding.decode_without_bom_handling(data);
        if !had_errors {
            return decoded.into_owned();
        }
    }

    let (decoded, _) = UTF_8.decode_without_bom_handling(data);
    decoded.into_owned()
}

/// Reads and decodes a text file.
pub fn read_text(path: &std::path::Path) -> crate::Result<String> {
    let data = std::fs::read(path)?;
    Ok(decode_bytes(&data))
}
