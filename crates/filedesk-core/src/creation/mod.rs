//! Bundling uploaded files into a ZIP archive.
//!
//! # Examples
//!
//! ```
//! use filedesk_core::BundleConfig;
//! use filedesk_core::UploadedFile;
//! use filedesk_core::bundle_files;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let files = vec![UploadedFile::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G'])];
//! let archive = bundle_files(&files, &BundleConfig::default())?;
//! assert!(archive.starts_with(b"PK"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::io;
use std::io::Cursor;
use std::io::Write;

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::BundleConfig;
use crate::DeskError;
use crate::Result;

/// A file received from a client upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Declared file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    /// File content.
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Creates an uploaded file.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

/// Writes `files` into a new Deflate-compressed ZIP archive.
///
/// Entries are named after the uploads and written in the given order.
///
/// # Errors
///
/// - [`DeskError::DisallowedContentType`] for the first file whose declared
///   content type is not allowed; nothing is written in that case
/// - [`DeskError::DuplicateEntry`] for the first name used twice; nothing
///   is written in that case either
pub fn bundle_files(files: &[UploadedFile], config: &BundleConfig) -> Result<Vec<u8>> {
    if let Some(rejected) = files.iter().find(|f| !config.allows(&f.content_type)) {
        return Err(DeskError::DisallowedContentType {
            file_name: rejected.file_name.clone(),
            content_type: rejected.content_type.clone(),
        });
    }

    let mut seen = HashSet::with_capacity(files.len());
    if let Some(repeated) = files.iter().find(|f| !seen.insert(f.file_name.as_str())) {
        return Err(DeskError::DuplicateEntry {
            file_name: repeated.file_name.clone(),
        });
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(config.compression_level);

    let capacity = files.iter().map(|f| f.data.len()).sum::<usize>() + 512;
    let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));

    for file in files {
        zip.start_file(file.file_name.as_str(), options).map_err(io::Error::other)?;
        zip.write_all(&file.data)?;
        debug!(file = %file.file_name, bytes = file.data.len(), "added file to bundle");
    }

    let cursor = zip.finish().map_err(io::Error::other)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::InspectionConfig;
    use crate::config::DOCX_MEDIA_TYPE;
    use crate::inspect_archive;
    use crate::test_utils::PNG_SIGNATURE;
    use std::io::Read;

    fn png_upload(name: &str) -> UploadedFile {
        UploadedFile::new(name, "image/png", PNG_SIGNATURE.to_vec())
    }

    #[test]
    fn test_bundle_round_trip_order() {
        let files = vec![
            png_upload("b.png"),
            UploadedFile::new("a.docx", DOCX_MEDIA_TYPE, b"word".to_vec()),
            UploadedFile::new("c.xml", "application/xml", b"<?xml version=\"1.0\"?><r/>".to_vec()),
        ];

        let data = bundle_files(&files, &BundleConfig::default()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(&data)).unwrap();
        assert_eq!(archive.len(), 3);
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"b.png"));
        assert_eq!(archive.name_for_index(0), Some("b.png"));
        assert_eq!(archive.name_for_index(2), Some("c.xml"));

        let mut content = Vec::new();
        archive.by_name("a.docx").unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"word");
    }

    #[test]
    fn test_bundle_is_inspectable() {
        let files = vec![png_upload("logo.png")];
        let data = bundle_files(&files, &BundleConfig::default()).unwrap();
        let report = inspect_archive(&data, "files.zip", &InspectionConfig::default()).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.files[0].mime_type, "image/png");
        assert_eq!(report.total_size, PNG_SIGNATURE.len() as u64);
    }

    #[test]
    fn test_disallowed_content_type() {
        let files = vec![
            png_upload("ok.png"),
            UploadedFile::new("script.sh", "application/x-sh", b"#!/bin/sh".to_vec()),
        ];
        let err = bundle_files(&files, &BundleConfig::default()).unwrap_err();
        match err {
            DeskError::DisallowedContentType {
                file_name,
                content_type,
            } => {
                assert_eq!(file_name, "script.sh");
                assert_eq!(content_type, "application/x-sh");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_bundle() {
        let data = bundle_files(&[], &BundleConfig::default()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(&data)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let files = vec![
            png_upload("other.png"),
            png_upload("same.png"),
            png_upload("same.png"),
        ];
        let err = bundle_files(&files, &BundleConfig::default()).unwrap_err();
        assert!(
            matches!(&err, DeskError::DuplicateEntry { file_name } if file_name == "same.png"),
            "{err}"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_custom_allow_list() {
        let config = BundleConfig {
            allowed_content_types: vec!["text/plain".to_string()],
            compression_level: Some(9),
        };
        let files = vec![UploadedFile::new("notes.txt", "text/plain", b"notes".to_vec())];
        assert!(bundle_files(&files, &config).is_ok());
        assert!(bundle_files(&[png_upload("x.png")], &config).is_err());
    }
}
