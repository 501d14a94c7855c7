//! Test utilities for building in-memory ZIP archives.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// The eight byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed.
///
/// # Examples
///
/// ```
/// use filedesk_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(&[("file.txt", &b"hello"[..]), ("dir/nested.txt", &b"world!"[..])]);
/// ```
#[must_use]
pub fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    entries
        .iter()
        .fold(ZipTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Flips the first byte of `needle` inside `archive`.
///
/// Used on stored entries to break their CRC while keeping the central
/// directory intact.
#[must_use]
pub fn corrupt_entry_data(mut archive: Vec<u8>, needle: &[u8]) -> Vec<u8> {
    let offset = archive
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap();
    archive[offset] ^= 0xFF;
    archive
}

/// Renames every occurrence of entry name `from` to `to`.
///
/// Both names must have the same length, so all offsets stay valid. Since
/// the writer refuses duplicate names, this is how archives with repeated
/// entries are produced.
#[must_use]
pub fn rename_entry(mut archive: Vec<u8>, from: &str, to: &str) -> Vec<u8> {
    assert_eq!(from.len(), to.len(), "names must have equal length");
    let (from, to) = (from.as_bytes(), to.as_bytes());
    let mut pos = 0;
    while let Some(offset) = archive[pos..]
        .windows(from.len())
        .position(|window| window == from)
    {
        let start = pos + offset;
        archive[start..start + to.len()].copy_from_slice(to);
        pos = start + to.len();
    }
    archive
}

/// Builder for ZIP test archives.
///
/// # Examples
///
/// ```
/// use filedesk_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_directory("docs/")
///     .add_file("docs/readme.txt", b"read me")
///     .build();
/// ```
pub struct ZipTestBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipTestBuilder {
    /// Creates a builder that stores entries uncompressed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .unix_permissions(0o644),
        }
    }

    /// Deflate-compresses entries added after this call.
    #[must_use]
    pub fn deflated(mut self) -> Self {
        self.options = self
            .options
            .compression_method(CompressionMethod::Deflated);
        self
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        self.writer.start_file(path, self.options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Adds a directory entry.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        self.writer.add_directory(path, self.options).unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
