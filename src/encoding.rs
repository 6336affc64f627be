//! Character encoding detection and transcoding.
//!
//! Raw HTML bytes (from a file, a pipe, or a renderer that hands back bytes)
//! are decoded to UTF-8 before parsing. A byte-order mark wins, then a
//! `<meta>` charset declaration in the first 1024 bytes, then UTF-8.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252, X_USER_DEFINED};

use crate::patterns::{CHARSET_META, CONTENT_TYPE_CHARSET};

/// How much of the document is scanned for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Result of decoding raw HTML bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// UTF-8 text with invalid sequences replaced by U+FFFD.
    pub text: String,
    /// Encoding that was used.
    pub encoding: &'static Encoding,
    /// Whether any replacement characters were inserted.
    pub had_errors: bool,
}

/// Detect character encoding from HTML bytes.
///
/// Looks for, in order: a byte-order mark, `<meta charset="...">`,
/// `<meta http-equiv="Content-Type" content="...; charset=...">`.
/// Unknown labels are ignored and UTF-8 is the default. A declared UTF-16
/// label means UTF-8, since the declaration itself was readable as ASCII,
/// and `x-user-defined` means windows-1252.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    [&*CHARSET_META, &*CONTENT_TYPE_CHARSET]
        .into_iter()
        .filter_map(|re| re.captures(&head))
        .filter_map(|caps| caps.get(1))
        .find_map(|label| Encoding::for_label(label.as_str().as_bytes()))
        .map_or(UTF_8, declared_encoding)
}

/// Adjusts an encoding named by a `<meta>` declaration.
fn declared_encoding(encoding: &'static Encoding) -> &'static Encoding {
    if encoding == X_USER_DEFINED {
        WINDOWS_1252
    } else {
        encoding.output_encoding()
    }
}

/// Decode HTML bytes, reporting the encoding used.
#[must_use]
pub fn decode(html: &[u8]) -> Decoded {
    let encoding = detect_encoding(html);
    // `decode` strips a BOM and may switch to the BOM's encoding.
    let (text, used, had_errors) = encoding.decode(html);
    Decoded {
        text: text.into_owned(),
        encoding: used,
        had_errors,
    }
}

/// Transcode HTML bytes to a UTF-8 string.
///
/// # Examples
///
/// ```
/// use essenz::encoding::transcode_to_utf8;
///
/// let html = b"<html><body>Hello, World!</body></html>";
/// assert!(transcode_to_utf8(html).contains("Hello, World!"));
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    decode(html).text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_utf8_from_meta_charset() {
        let html = br#"<html><head><meta charset="utf-8"></head><body>Test</body></html>"#;
        assert_eq!(detect_encoding(html), UTF_8);
    }

    #[test]
    fn detect_iso88591_from_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_charset_from_content_type() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(detect_encoding(html).name(), "Shift_JIS");
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let html = br#"<meta charset="klingon-8"><p>Test</p>"#;
        assert_eq!(detect_encoding(html), UTF_8);
    }

    #[test]
    fn utf16_meta_label_means_utf8() {
        let html = b"<meta charset=\"utf-16\"><p>caf\xC3\xA9</p>";
        assert_eq!(detect_encoding(html), UTF_8);
        assert!(transcode_to_utf8(html).contains("caf\u{e9}"));

        let big_endian = br#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-16BE">"#;
        assert_eq!(detect_encoding(big_endian), UTF_8);
    }

    #[test]
    fn x_user_defined_meta_label_means_windows1252() {
        let html = br#"<meta charset="x-user-defined">"#;
        assert_eq!(detect_encoding(html), WINDOWS_1252);
    }

    #[test]
    fn bom_wins_over_meta() {
        let mut html = vec![0xFF, 0xFE];
        for unit in "<meta charset=\"windows-1252\"><p>hi</p>".encode_utf16() {
            html.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&html);
        assert_eq!(decoded.encoding.name(), "UTF-16LE");
        assert!(decoded.text.contains("<p>hi</p>"));
        assert!(!decoded.text.starts_with('\u{FEFF}'));
    }

    #[test]
    fn transcode_windows1252_to_utf8() {
        let html = b"<meta charset=\"windows-1252\"><p>\x93Caf\xE9\x94</p>";
        let result = transcode_to_utf8(html);
        assert!(result.contains("\u{201C}Caf\u{e9}\u{201D}"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let decoded = decode(b"<p>Test \xFF\xFE Invalid</p>");
        assert!(decoded.had_errors);
        assert!(decoded.text.contains("Test"));
        assert!(decoded.text.contains("Invalid"));
    }
}
