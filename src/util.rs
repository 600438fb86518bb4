//! Byte-level helpers: format sniffing, text recovery and media type detection.

use std::borrow::Cow;

/// Local file header signature of a ZIP archive (`PK\x03\x04`).
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Returns true if `data` starts with the ZIP local file header signature.
///
/// Anything shorter than four bytes, or with different leading bytes, is
/// treated as plain markup.
pub fn is_archive(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_SIGNATURE
}

// ============================================================================
// Text Recovery
// ============================================================================

/// Decode bytes to a string, recovering from a wrong guess at the encoding.
///
/// This function:
/// 1. Decodes as UTF-8 (a BOM is honoured and stripped by encoding_rs)
/// 2. If the result contains U+FFFD, re-decodes the same bytes with a
///    single-byte legacy encoding: the one named by `hint_encoding` when it
///    is single-byte, otherwise Windows-1252
///
/// Never fails. Garbage in yields garbage text, which the markup parser
/// then rejects on its own terms.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(decode_text(b"<kml/>", None), "<kml/>");
/// // 0xE9 alone is not UTF-8; as Windows-1252 it is 'é'
/// assert_eq!(decode_text(b"caf\xE9", None), "café");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, _malformed) = encoding_rs::UTF_8.decode(bytes);

    if !result.contains(char::REPLACEMENT_CHARACTER) {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
        && encoding.is_single_byte()
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` in the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Decode a markup document: extract the declared encoding, then recover text.
pub fn decode_markup(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(bytes, extract_xml_encoding(bytes))
}

// ============================================================================
// Media Format Detection
// ============================================================================

/// Media formats commonly embedded in overlay archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
    WebP,
    /// Unknown/binary format
    Binary,
}

impl MediaFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Svg => "image/svg+xml",
            MediaFormat::WebP => "image/webp",
            MediaFormat::Binary => "application/octet-stream",
        }
    }
}

/// Detect media format from the entry path, falling back to magic bytes.
pub fn detect_media_format(path: &str, data: &[u8]) -> MediaFormat {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        return MediaFormat::Jpeg;
    }
    if path_lower.ends_with(".png") {
        return MediaFormat::Png;
    }
    if path_lower.ends_with(".gif") {
        return MediaFormat::Gif;
    }
    if path_lower.ends_with(".svg") {
        return MediaFormat::Svg;
    }
    if path_lower.ends_with(".webp") {
        return MediaFormat::WebP;
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return MediaFormat::Jpeg;
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return MediaFormat::Png;
    }
    if data.starts_with(b"GIF") {
        return MediaFormat::Gif;
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return MediaFormat::WebP;
    }

    MediaFormat::Binary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_archive() {
        assert!(is_archive(b"PK\x03\x04rest of archive"));
        assert!(is_archive(&ZIP_SIGNATURE));
        assert!(!is_archive(b"PK\x03"));
        assert!(!is_archive(b""));
        assert!(!is_archive(b"PK\x05\x06"));
        assert!(!is_archive(b"<?xml version=\"1.0\"?><kml/>"));
    }

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("Zürich".as_bytes(), None), "Zürich");
        // BOM is stripped
        assert_eq!(decode_text(b"\xEF\xBB\xBF<kml/>", None), "<kml/>");
    }

    #[test]
    fn test_decode_text_falls_back_to_windows_1252() {
        assert_eq!(decode_text(b"caf\xE9", None), "café");
        // A multi-byte hint is ignored; the fallback must be single-byte
        assert_eq!(decode_text(b"caf\xE9", Some("utf-8")), "café");
    }

    #[test]
    fn test_decode_text_uses_single_byte_hint() {
        // 0xC0 is 'А' (Cyrillic capital A) in windows-1251, 'À' in 1252
        assert_eq!(decode_text(b"\xC0", Some("windows-1251")), "А");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><kml/>";
        assert_eq!(extract_xml_encoding(doc), Some("ISO-8859-1"));
        assert_eq!(extract_xml_encoding(b"<?xml version='1.0' encoding='utf-8'?>"), Some("utf-8"));
        assert_eq!(extract_xml_encoding(b"<kml/>"), None);
    }

    #[test]
    fn test_decode_markup_latin1_declaration() {
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><name>Mont\xE9e</name>";
        assert!(decode_markup(doc).contains("Montée"));
    }

    #[test]
    fn test_detect_media_format() {
        assert_eq!(detect_media_format("files/icon.PNG", &[]), MediaFormat::Png);
        assert_eq!(detect_media_format("a.jpeg", &[]), MediaFormat::Jpeg);
        assert_eq!(detect_media_format("pin.svg", &[]), MediaFormat::Svg);
        assert_eq!(
            detect_media_format("blob", &[0x89, b'P', b'N', b'G', 0x0D]),
            MediaFormat::Png
        );
        assert_eq!(detect_media_format("blob", b"GIF89a"), MediaFormat::Gif);
        assert_eq!(detect_media_format("blob", b"????"), MediaFormat::Binary);
        assert_eq!(MediaFormat::Binary.mime_type(), "application/octet-stream");
    }
}
