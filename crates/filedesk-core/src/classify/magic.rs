//! Binary signature detection.
//!
//! Uses the `infer` crate to match magic bytes at the start of the content
//! (images, documents, archives, audio, video, executables).

use super::Classifier;

/// Matches well-known binary signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicBytes;

impl Classifier for MagicBytes {
    fn classify(&self, _path: &str, prefix: &[u8]) -> Option<String> {
        infer::get(prefix).map(|kind| kind.mime_type().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png() {
        let header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(
            MagicBytes.classify("x", &header).as_deref(),
            Some("image/png")
        );
    }

    #[test]
    fn test_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(
            MagicBytes.classify("x", &header).as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_pdf() {
        assert_eq!(
            MagicBytes.classify("x", b"%PDF-1.7\n").as_deref(),
            Some("application/pdf")
        );
    }

    #[test]
    fn test_unknown_defers() {
        assert_eq!(MagicBytes.classify("x", &[0x00, 0x01, 0x02, 0x03]), None);
        assert_eq!(MagicBytes.classify("x", &[]), None);
    }
}
