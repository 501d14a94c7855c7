//! Archive inspection implementation.

use std::io;
use std::io::Read;

use tracing::debug;
use tracing::warn;

use crate::DeskError;
use crate::InspectionConfig;
use crate::Result;
use crate::classify::ClassifierChain;
use crate::inspection::directory::CentralDirectory;
use crate::inspection::directory::DirectoryEntry;
use crate::inspection::report::ArchiveEntry;
use crate::inspection::report::InspectionReport;

/// Inspects an in-memory ZIP archive.
///
/// Lists every entry in central directory order with its declared
/// uncompressed size and a detected media type. Nothing is extracted; at most
/// `config.sniff_len` bytes of each entry are decompressed.
///
/// # Errors
///
/// Returns [`DeskError::InvalidArchive`] if `data` is not a structurally
/// valid ZIP archive. Entries that cannot be opened or read are logged and
/// left out of the report instead of failing the whole inspection.
///
/// # Examples
///
/// ```no_run
/// use filedesk_core::InspectionConfig;
/// use filedesk_core::inspect_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("photos.zip")?;
/// let report = inspect_archive(&data, "photos.zip", &InspectionConfig::default())?;
///
/// for entry in &report.files {
///     println!("{} ({} bytes): {}", entry.path, entry.uncompressed_size, entry.mime_type);
/// }
/// # Ok(())
/// # }
/// ```
pub fn inspect_archive(
    data: &[u8],
    file_name: &str,
    config: &InspectionConfig,
) -> Result<InspectionReport> {
    Inspector::new(config.clone()).inspect(data, file_name)
}

/// Reusable inspector holding a configuration and a classifier chain.
#[derive(Debug, Default)]
pub struct Inspector {
    config: InspectionConfig,
    classifiers: ClassifierChain,
}

impl Inspector {
    /// Creates an inspector with the default classifier chain.
    #[must_use]
    pub fn new(config: InspectionConfig) -> Self {
        Self {
            config,
            classifiers: ClassifierChain::default(),
        }
    }

    /// Replaces the classifier chain.
    #[must_use]
    pub fn with_classifiers(mut self, classifiers: ClassifierChain) -> Self {
        self.classifiers = classifiers;
        self
    }

    /// Returns the inspection configuration.
    #[must_use]
    pub const fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Inspects `data`, reporting it under `file_name`.
    ///
    /// # Errors
    ///
    /// See [`inspect_archive`].
    pub fn inspect(&self, data: &[u8], file_name: &str) -> Result<InspectionReport> {
        let directory = CentralDirectory::parse(data)?;
        let mut report = InspectionReport::new(file_name, data.len() as u64);

        for record in directory.entries() {
            if self.config.is_excluded(&record.name) {
                debug!(path = %record.name, "skipping excluded archive entry");
                continue;
            }

            match self.inspect_entry(&directory, record) {
                Ok(entry) => {
                    debug!(
                        path = %entry.path,
                        size = entry.uncompressed_size,
                        mime_type = %entry.mime_type,
                        "classified archive entry"
                    );
                    report.add_entry(entry);
                }
                Err(err) => {
                    warn!(archive = file_name, error = %err, "skipping unreadable archive entry");
                }
            }
        }

        Ok(report)
    }

    /// Classifies one record. The entry data is only opened when a
    /// content-based classifier has to run.
    fn inspect_entry(
        &self,
        directory: &CentralDirectory<'_>,
        record: &DirectoryEntry,
    ) -> Result<ArchiveEntry> {
        let sniff_len = self.config.sniff_len;
        let mime_type = self
            .classifiers
            .classify_lazy(&record.name, || read_prefix(directory.open(record)?, sniff_len))
            .map_err(|source| DeskError::EntryRead {
                path: record.name.clone(),
                source,
            })?;

        Ok(ArchiveEntry {
            path: record.name.clone(),
            uncompressed_size: record.uncompressed_size,
            mime_type,
        })
    }
}

/// Reads at most `limit` bytes. The reader is dropped before returning.
fn read_prefix<R: Read>(reader: R, limit: usize) -> io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(limit);
    reader.take(limit as u64).read_to_end(&mut prefix)?;
    Ok(prefix)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::SuffixClassifier;
    use crate::classify::TextSniff;
    use crate::config::DOCX_MEDIA_TYPE;
    use crate::test_utils::PNG_SIGNATURE;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::corrupt_entry_data;
    use crate::test_utils::create_test_zip;
    use crate::test_utils::rename_entry;

    fn inspect(data: &[u8]) -> Result<InspectionReport> {
        inspect_archive(data, "upload.zip", &InspectionConfig::default())
    }

    #[test]
    fn test_docx_and_png_scenario() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.resize(2048, 0);
        let data = ZipTestBuilder::new()
            .add_file("report.docx", b"not really a docx")
            .add_file("logo.png", &png)
            .build();

        let report = inspect(&data).unwrap();

        assert_eq!(report.file_name, "upload.zip");
        assert_eq!(report.archive_size, data.len() as u64);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_size, 2065);
        assert_eq!(
            report.files,
            vec![
                ArchiveEntry {
                    path: "report.docx".to_string(),
                    uncompressed_size: 17,
                    mime_type: DOCX_MEDIA_TYPE.to_string(),
                },
                ArchiveEntry {
                    path: "logo.png".to_string(),
                    uncompressed_size: 2048,
                    mime_type: "image/png".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_not_a_zip() {
        let result = inspect(b"just some plain text, definitely not an archive");
        assert!(matches!(result, Err(DeskError::InvalidArchive(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(inspect(&[]), Err(DeskError::InvalidArchive(_))));
    }

    #[test]
    fn test_empty_archive() {
        let data = create_test_zip(&[]);
        let report = inspect(&data).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_size, 0);
        assert_eq!(report.archive_size, data.len() as u64);
    }

    #[test]
    fn test_empty_entry_has_fallback_type() {
        let data = ZipTestBuilder::new().add_file("empty.dat", b"").build();
        let report = inspect(&data).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.files[0].uncompressed_size, 0);
        assert_eq!(report.files[0].mime_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_macosx_entries_excluded() {
        let data = ZipTestBuilder::new()
            .add_file("photo.png", &PNG_SIGNATURE)
            .add_file("__MACOSX/._photo.png", b"resource fork bytes")
            .build();
        let report = inspect(&data).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.total_size, PNG_SIGNATURE.len() as u64);
        assert_eq!(report.files[0].path, "photo.png");
    }

    #[test]
    fn test_macosx_entries_kept_without_exclusions() {
        let data = ZipTestBuilder::new()
            .add_file("photo.png", &PNG_SIGNATURE)
            .add_file("__MACOSX/._photo.png", b"resource fork bytes")
            .build();
        let config = InspectionConfig {
            excluded_prefixes: Vec::new(),
            ..Default::default()
        };
        let report = inspect_archive(&data, "upload.zip", &config).unwrap();
        assert_eq!(report.total_files, 2);
        assert_eq!(report.files[1].path, "__MACOSX/._photo.png");
    }

    #[test]
    fn test_entries_in_directory_order() {
        let data = ZipTestBuilder::new()
            .add_file("a.txt", b"first")
            .add_file("b.txt", b"second")
            .add_file("c.txt", b"third")
            .build();
        let report = inspect(&data).unwrap();
        let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_deflated_entries_are_sniffed() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.resize(10_000, 7);
        let data = ZipTestBuilder::new()
            .deflated()
            .add_file("image", &png)
            .add_file("readme", b"plain text readme\n")
            .build();
        let report = inspect(&data).unwrap();
        assert_eq!(report.files[0].mime_type, "image/png");
        assert_eq!(report.files[0].uncompressed_size, 10_000);
        assert_eq!(report.files[1].mime_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_directory_entries_listed() {
        let data = ZipTestBuilder::new()
            .add_directory("docs/")
            .add_file("docs/a.txt", b"alpha")
            .build();
        let report = inspect(&data).unwrap();
        assert_eq!(report.total_files, 2);
        assert_eq!(report.files[0].path, "docs/");
        assert_eq!(report.files[0].uncompressed_size, 0);
    }

    #[test]
    fn test_corrupt_entry_skipped() {
        let data = ZipTestBuilder::new()
            .add_file("good.txt", b"good entry")
            .add_file("bad.txt", b"corrupted payload bytes")
            .add_file("also-good.png", &PNG_SIGNATURE)
            .build();
        let data = corrupt_entry_data(data, b"corrupted payload bytes");

        let report = inspect(&data).unwrap();

        let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["good.txt", "also-good.png"]);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_size, 10 + PNG_SIGNATURE.len() as u64);
    }

    #[test]
    fn test_corrupt_docx_still_listed() {
        let data = ZipTestBuilder::new()
            .add_file("report.docx", b"corrupted docx bytes")
            .build();
        let data = corrupt_entry_data(data, b"corrupted docx bytes");
        let report = inspect(&data).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.files[0].mime_type, DOCX_MEDIA_TYPE);
    }

    #[test]
    fn test_sniff_len_limits_read() {
        // Binary byte after the sniff window is never seen
        let mut data = vec![b'a'; 600];
        data.push(0);
        let zip = ZipTestBuilder::new().add_file("long.txt", &data).build();
        let report = inspect(&zip).unwrap();
        assert_eq!(report.files[0].mime_type, "text/plain; charset=utf-8");

        let config = InspectionConfig {
            sniff_len: 1024,
            ..Default::default()
        };
        let report = inspect_archive(&zip, "upload.zip", &config).unwrap();
        assert_eq!(report.files[0].mime_type, "application/octet-stream");
    }

    #[test]
    fn test_custom_classifiers() {
        let data = ZipTestBuilder::new().add_file("table.csv", b"a,b\n1,2\n").build();
        let inspector = Inspector::new(InspectionConfig::default()).with_classifiers(
            ClassifierChain::new()
                .with(SuffixClassifier::new(".csv", "text/csv"))
                .with(TextSniff),
        );
        let report = inspector.inspect(&data, "tables.zip").unwrap();
        assert_eq!(report.files[0].mime_type, "text/csv");
        assert_eq!(report.file_name, "tables.zip");
    }

    #[test]
    fn test_duplicate_paths_listed_separately() {
        let data = ZipTestBuilder::new()
            .add_file("dup.txt", b"first copy!")
            .add_file("dux.txt", b"second, longer copy.")
            .build();
        let data = rename_entry(data, "dux.txt", "dup.txt");

        let report = inspect(&data).unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_size, 31);
        let entries: Vec<_> = report
            .files
            .iter()
            .map(|f| (f.path.as_str(), f.uncompressed_size))
            .collect();
        assert_eq!(entries, [("dup.txt", 11), ("dup.txt", 20)]);
    }

    #[test]
    fn test_docx_with_broken_local_header_still_listed() {
        let mut data = ZipTestBuilder::new()
            .add_file("report.docx", b"word")
            .add_file("logo.txt", b"plain")
            .build();
        // First local file header belongs to report.docx
        data[0] ^= 0xFF;

        let report = inspect(&data).unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.files[0].path, "report.docx");
        assert_eq!(report.files[0].uncompressed_size, 4);
        assert_eq!(report.files[0].mime_type, DOCX_MEDIA_TYPE);
        assert_eq!(report.files[1].mime_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_sniffed_entry_with_broken_local_header_skipped() {
        let mut data = ZipTestBuilder::new()
            .add_file("notes.txt", b"plain")
            .add_file("report.docx", b"word")
            .build();
        data[0] ^= 0xFF;

        let report = inspect(&data).unwrap();

        assert_eq!(report.total_files, 1);
        assert_eq!(report.files[0].path, "report.docx");
    }

    #[test]
    fn test_prepended_stub_is_tolerated() {
        let mut data = b"#!/bin/sh\nexit 0\n".to_vec();
        data.extend(
            ZipTestBuilder::new()
                .add_file("logo.png", &PNG_SIGNATURE)
                .build(),
        );

        let report = inspect(&data).unwrap();

        assert_eq!(report.files[0].mime_type, "image/png");
        assert_eq!(report.archive_size, data.len() as u64);
    }

    #[test]
    fn test_inspection_is_idempotent() {
        let data = ZipTestBuilder::new()
            .add_file("a.txt", b"alpha")
            .add_file("b.png", &PNG_SIGNATURE)
            .build();
        assert_eq!(inspect(&data).unwrap(), inspect(&data).unwrap());
    }
}
