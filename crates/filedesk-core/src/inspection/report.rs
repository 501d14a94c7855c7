//! Inspection report types.

use serde::Serialize;

/// One entry listed in an [`InspectionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Stored entry name, verbatim.
    #[serde(rename = "file_path")]
    pub path: String,

    /// Uncompressed size declared in the archive directory.
    #[serde(rename = "size")]
    pub uncompressed_size: u64,

    /// Detected media type.
    #[serde(rename = "mimetype")]
    pub mime_type: String,
}

/// Metadata of an inspected archive.
///
/// Serializes to the JSON document returned by the archive information
/// endpoint.
///
/// # Examples
///
/// ```
/// use filedesk_core::ArchiveEntry;
/// use filedesk_core::InspectionReport;
///
/// let mut report = InspectionReport::new("photos.zip", 1024);
/// report.add_entry(ArchiveEntry {
///     path: "cat.png".to_string(),
///     uncompressed_size: 4096,
///     mime_type: "image/png".to_string(),
/// });
///
/// assert_eq!(report.total_files, 1);
/// assert_eq!(report.total_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    /// Declared name of the uploaded archive.
    #[serde(rename = "filename")]
    pub file_name: String,

    /// Byte length of the uploaded archive.
    pub archive_size: u64,

    /// Sum of the uncompressed sizes of all listed entries.
    pub total_size: u64,

    /// Number of listed entries.
    pub total_files: usize,

    /// Listed entries in archive directory order.
    pub files: Vec<ArchiveEntry>,
}

impl InspectionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(file_name: impl Into<String>, archive_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            archive_size,
            total_size: 0,
            total_files: 0,
            files: Vec::new(),
        }
    }

    /// Appends an entry and updates the totals.
    pub fn add_entry(&mut self, entry: ArchiveEntry) {
        self.total_size = self.total_size.saturating_add(entry.uncompressed_size);
        self.files.push(entry);
        self.total_files = self.files.len();
    }

    /// Returns `true` if no entry was listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
