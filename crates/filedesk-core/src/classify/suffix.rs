//! Path suffix shortcuts.

use super::Classifier;
use crate::config::DOCX_MEDIA_TYPE;

/// Assigns a fixed media type to paths ending with a suffix.
///
/// Matching is case-sensitive and never looks at entry content.
#[derive(Debug, Clone)]
pub struct SuffixClassifier {
    suffix: String,
    media_type: String,
}

impl SuffixClassifier {
    /// Creates a classifier mapping `suffix` to `media_type`.
    #[must_use]
    pub fn new(suffix: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            media_type: media_type.into(),
        }
    }
}

impl Classifier for SuffixClassifier {
    fn needs_content(&self) -> bool {
        false
    }

    fn classify(&self, path: &str, _prefix: &[u8]) -> Option<String> {
        path.ends_with(self.suffix.as_str())
            .then(|| self.media_type.clone())
    }
}

/// `.docx` shortcut.
///
/// Word documents are zip containers, so sniffing their bytes only ever
/// finds a generic archive.
#[derive(Debug, Clone)]
pub struct DocxSuffix(SuffixClassifier);

impl DocxSuffix {
    /// Creates the `.docx` shortcut.
    #[must_use]
    pub fn new() -> Self {
        Self(SuffixClassifier::new(".docx", DOCX_MEDIA_TYPE))
    }
}

impl Default for DocxSuffix {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for DocxSuffix {
    fn needs_content(&self) -> bool {
        false
    }

    fn classify(&self, path: &str, prefix: &[u8]) -> Option<String> {
        self.0.classify(path, prefix)
    }
}
