//! Text versus binary fallback.
//!
//! Follows the WHATWG "rules for distinguishing if a resource is text or
//! binary": byte order marks first, then a scan for control bytes that never
//! occur in text.

use super::Classifier;
use super::OCTET_STREAM;

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const TEXT_UTF16BE: &str = "text/plain; charset=utf-16be";
const TEXT_UTF16LE: &str = "text/plain; charset=utf-16le";

/// Terminal fallback strategy. Always answers.
///
/// An empty prefix counts as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSniff;

impl Classifier for TextSniff {
    fn classify(&self, _path: &str, prefix: &[u8]) -> Option<String> {
        Some(sniff_text(prefix).to_string())
    }
}

/// Returns the text media type for `prefix`, or `application/octet-stream`
/// if it contains binary data.
#[must_use]
pub fn sniff_text(prefix: &[u8]) -> &'static str {
    if prefix.starts_with(&[0xFE, 0xFF]) {
        return TEXT_UTF16BE;
    }
    if prefix.starts_with(&[0xFF, 0xFE]) {
        return TEXT_UTF16LE;
    }
    if prefix.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return TEXT_UTF8;
    }

    if prefix.iter().copied().any(is_binary_byte) {
        OCTET_STREAM
    } else {
        TEXT_UTF8
    }
}

const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
