//! Content type classification for archive entries.
//!
//! A [`ClassifierChain`] holds an ordered list of [`Classifier`] strategies.
//! Each strategy looks at an entry's path and, if it asks for it, the
//! leading bytes of the entry's content. The first strategy that returns a
//! media type wins.
//!
//! # Examples
//!
//! ```
//! use filedesk_core::classify::ClassifierChain;
//!
//! let chain = ClassifierChain::default();
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! assert_eq!(chain.classify("logo", &png), "image/png");
//! assert_eq!(chain.classify("notes.txt", b"hello"), "text/plain; charset=utf-8");
//! ```

pub mod magic;
pub mod sniff;
pub mod suffix;

use std::io;

pub use magic::MagicBytes;
pub use sniff::TextSniff;
pub use suffix::DocxSuffix;
pub use suffix::SuffixClassifier;

/// Media type returned when no strategy recognizes the content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A single content classification strategy.
///
/// Implementations must be deterministic: the same path and prefix always
/// yield the same answer.
pub trait Classifier: Send + Sync {
    /// Returns whether this strategy inspects entry content.
    ///
    /// Strategies that only look at the path let the chain answer without
    /// decompressing the entry.
    fn needs_content(&self) -> bool {
        true
    }

    /// Returns a media type, or `None` to defer to the next strategy.
    ///
    /// `prefix` is empty for strategies that do not need content.
    fn classify(&self, path: &str, prefix: &[u8]) -> Option<String>;
}

/// Ordered list of classification strategies.
pub struct ClassifierChain {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl ClassifierChain {
    /// Creates an empty chain. An empty chain classifies everything as
    /// [`OCTET_STREAM`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    /// Appends a strategy after the existing ones.
    #[must_use]
    pub fn with(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifiers.push(Box::new(classifier));
        self
    }

    /// Number of strategies in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// Returns `true` if the chain has no strategies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Classifies an entry whose leading bytes are already available.
    pub fn classify(&self, path: &str, prefix: &[u8]) -> String {
        self.classifiers
            .iter()
            .find_map(|c| c.classify(path, if c.needs_content() { prefix } else { &[] }))
            .unwrap_or_else(|| OCTET_STREAM.to_string())
    }

    /// Classifies an entry, reading its content only when a strategy needs it.
    ///
    /// `read_prefix` is called at most once, and only if no path-only
    /// strategy ahead of the first content strategy has answered.
    ///
    /// # Errors
    ///
    /// Returns the error from `read_prefix`.
    pub fn classify_lazy<F>(&self, path: &str, read_prefix: F) -> io::Result<String>
    where
        F: FnOnce() -> io::Result<Vec<u8>>,
    {
        let mut reader = Some(read_prefix);
        let mut prefix: Option<Vec<u8>> = None;

        for classifier in &self.classifiers {
            let bytes: &[u8] = if classifier.needs_content() {
                if prefix.is_none()
                    && let Some(read) = reader.take()
                {
                    prefix = Some(read()?);
                }
                prefix.as_deref().unwrap_or_default()
            } else {
                &[]
            };

            if let Some(media_type) = classifier.classify(path, bytes) {
                return Ok(media_type);
            }
        }

        Ok(OCTET_STREAM.to_string())
    }
}

impl Default for ClassifierChain {
    /// The `.docx` shortcut, then binary signatures, then the text fallback.
    fn default() -> Self {
        Self::new()
            .with(DocxSuffix::new())
            .with(MagicBytes)
            .with(TextSniff)
    }
}

impl std::fmt::Debug for ClassifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierChain")
            .field("classifiers", &self.classifiers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DOCX_MEDIA_TYPE;
    use std::cell::Cell;

    const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_docx_wins_over_content() {
        let chain = ClassifierChain::default();
        assert_eq!(chain.classify("report.docx", &PNG_SIGNATURE), DOCX_MEDIA_TYPE);
    }

    #[test]
    fn test_docx_suffix_is_case_sensitive() {
        let chain = ClassifierChain::default();
        assert_ne!(chain.classify("REPORT.DOCX", b"plain words"), DOCX_MEDIA_TYPE);
    }

    #[test]
    fn test_png_signature() {
        let chain = ClassifierChain::default();
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0u8; 100]);
        assert_eq!(chain.classify("logo.bin", &data), "image/png");
    }

    #[test]
    fn test_empty_prefix_has_fallback() {
        let chain = ClassifierChain::default();
        assert_eq!(chain.classify("empty", &[]), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_empty_chain_yields_octet_stream() {
        let chain = ClassifierChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.classify("anything", b"data"), OCTET_STREAM);
    }

    #[test]
    fn test_lazy_skips_read_for_docx() {
        let chain = ClassifierChain::default();
        let calls = Cell::new(0);
        let media_type = chain
            .classify_lazy("report.docx", || {
                calls.set(calls.get() + 1);
                Ok(Vec::new())
            })
            .unwrap();
        assert_eq!(media_type, DOCX_MEDIA_TYPE);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_lazy_reads_once() {
        let chain = ClassifierChain::default();
        let calls = Cell::new(0);
        let media_type = chain
            .classify_lazy("image", || {
                calls.set(calls.get() + 1);
                Ok(PNG_SIGNATURE.to_vec())
            })
            .unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_lazy_propagates_read_error() {
        let chain = ClassifierChain::default();
        let result = chain.classify_lazy("broken.bin", || {
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad crc"))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_custom_strategy_order() {
        let chain = ClassifierChain::new()
            .with(SuffixClassifier::new(".svg", "image/svg+xml"))
            .with(TextSniff);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.classify("icon.svg", b"<svg/>"), "image/svg+xml");
        assert_eq!(chain.classify("icon.txt", b"<svg/>"), "text/plain; charset=utf-8");
    }
}
