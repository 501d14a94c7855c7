//! ZIP central directory reader.
//!
//! Lists every central directory record in the order it was written,
//! including records that share a name, and opens entry data straight from
//! the local file headers. Sizes and names come from the central directory
//! only; a local header is not touched until an entry is opened.

use std::io;
use std::io::Read;

use crc32fast::Hasher;
use flate2::read::DeflateDecoder;

use crate::DeskError;
use crate::Result;

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_EOCD_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
const ZIP64_EOCD_SIGNATURE: u32 = 0x0606_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

const EOCD_LEN: usize = 22;
const ZIP64_EOCD_LOCATOR_LEN: usize = 20;
const ZIP64_EOCD_LEN: usize = 56;
const CENTRAL_HEADER_LEN: usize = 46;
const LOCAL_HEADER_LEN: usize = 30;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const ZIP64_EXTRA_ID: u16 = 0x0001;
const FLAG_ENCRYPTED: u16 = 0x0001;

/// Compression method of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Method 0.
    Stored,
    /// Method 8.
    Deflated,
    /// Any other method; entries using it cannot be opened.
    Other(u16),
}

impl From<u16> for Compression {
    fn from(method: u16) -> Self {
        match method {
            0 => Self::Stored,
            8 => Self::Deflated,
            other => Self::Other(other),
        }
    }
}

/// One central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Stored path. Bytes that are not UTF-8 are replaced with U+FFFD.
    pub name: String,
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method.
    pub compression: Compression,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Size of the stored data.
    pub compressed_size: u64,
    /// Declared size after decompression.
    pub uncompressed_size: u64,
    /// Offset of the local file header, relative to the archive start.
    pub header_offset: u64,
}

impl DirectoryEntry {
    /// Returns `true` if the entry data is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Parsed central directory of an in-memory ZIP archive.
#[derive(Clone)]
pub struct CentralDirectory<'a> {
    data: &'a [u8],
    /// Bytes prepended to the archive (self-extractor stubs and the like).
    base: u64,
    entries: Vec<DirectoryEntry>,
}

impl std::fmt::Debug for CentralDirectory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CentralDirectory")
            .field("archive_size", &self.data.len())
            .field("base", &self.base)
            .field("entries", &self.entries)
            .finish()
    }
}

impl<'a> CentralDirectory<'a> {
    /// Reads the central directory of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::InvalidArchive`] if the end of central directory
    /// record cannot be found, the archive spans several disks, or a
    /// directory record is truncated or has a bad signature.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let eocd_pos =
            find_eocd(data).ok_or_else(|| invalid("missing end of central directory"))?;
        let layout = read_layout(data, eocd_pos)?;

        let cd_start = layout
            .directory_end
            .checked_sub(layout.cd_size)
            .ok_or_else(|| invalid("central directory size exceeds archive"))?;
        let base = cd_start
            .checked_sub(layout.cd_offset)
            .ok_or_else(|| invalid("central directory offset exceeds archive"))?;

        let mut pos = to_usize(cd_start)?;
        let capacity = usize::try_from(layout.cd_size / CENTRAL_HEADER_LEN as u64)
            .unwrap_or(0)
            .min(usize::try_from(layout.entry_count).unwrap_or(0));
        let mut entries = Vec::with_capacity(capacity);

        for index in 0..layout.entry_count {
            let (entry, next) = read_central_header(data, pos)
                .ok_or_else(|| invalid(&format!("bad central directory record {index}")))?;
            entries.push(entry);
            pos = next;
        }

        Ok(Self {
            data,
            base,
            entries,
        })
    }

    /// Returns the records in directory order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Opens the decompressed data of `entry`.
    ///
    /// The returned reader verifies the declared size and CRC-32 once it
    /// reaches the end of the data.
    ///
    /// # Errors
    ///
    /// Fails if the entry is encrypted, uses an unsupported compression
    /// method, or its local file header is damaged.
    pub fn open(&self, entry: &DirectoryEntry) -> io::Result<EntryReader<'a>> {
        if entry.is_encrypted() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "encrypted entries are not supported",
            ));
        }

        let header = self
            .base
            .checked_add(entry.header_offset)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(|| corrupt("local header offset out of range"))?;
        if read_u32(self.data, header) != Some(LOCAL_HEADER_SIGNATURE) {
            return Err(corrupt("invalid local file header signature"));
        }

        let truncated = || corrupt("truncated local file header");
        let name_len = read_u16(self.data, header + 26).ok_or_else(truncated)?;
        let extra_len = read_u16(self.data, header + 28).ok_or_else(truncated)?;
        let start = header + LOCAL_HEADER_LEN + usize::from(name_len) + usize::from(extra_len);
        let raw = usize::try_from(entry.compressed_size)
            .ok()
            .and_then(|len| self.data.get(start..start.checked_add(len)?))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "entry data extends past end of archive",
                )
            })?;

        let decoder = match entry.compression {
            Compression::Stored => Decoder::Stored(raw),
            Compression::Deflated => Decoder::Deflated(DeflateDecoder::new(raw)),
            Compression::Other(method) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("unsupported compression method {method}"),
                ));
            }
        };

        Ok(EntryReader {
            decoder,
            hasher: Hasher::new(),
            expected_crc: entry.crc32,
            expected_size: entry.uncompressed_size,
            read: 0,
        })
    }
}

enum Decoder<'a> {
    Stored(&'a [u8]),
    Deflated(DeflateDecoder<&'a [u8]>),
}

impl Read for Decoder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stored(raw) => raw.read(buf),
            Self::Deflated(inflate) => inflate.read(buf),
        }
    }
}

/// Decompressing reader over one entry's data.
///
/// Reports `InvalidData` if the entry grows past its declared size, or ends
/// with a size or CRC-32 other than the declared one.
pub struct EntryReader<'a> {
    decoder: Decoder<'a>,
    hasher: Hasher,
    expected_crc: u32,
    expected_size: u64,
    read: u64,
}

impl std::fmt::Debug for EntryReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryReader")
            .field("expected_size", &self.expected_size)
            .field("read", &self.read)
            .finish_non_exhaustive()
    }
}

impl Read for EntryReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.decoder.read(buf)?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(0);
            }
            if self.read != self.expected_size {
                return Err(corrupt("entry is shorter than its declared size"));
            }
            if self.hasher.clone().finalize() != self.expected_crc {
                return Err(corrupt("checksum mismatch"));
            }
            return Ok(0);
        }

        self.read += n as u64;
        if self.read > self.expected_size {
            return Err(corrupt("entry is longer than its declared size"));
        }
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Where the central directory sits, as declared by the end records.
struct Layout {
    entry_count: u64,
    cd_size: u64,
    cd_offset: u64,
    /// Actual position of the record that follows the central directory.
    directory_end: u64,
}

/// Scans backwards for the end of central directory record, allowing for a
/// trailing archive comment.
fn find_eocd(data: &[u8]) -> Option<usize> {
    let last = data.len().checked_sub(EOCD_LEN)?;
    let first = last.saturating_sub(MAX_COMMENT_LEN);

    (first..=last).rev().find(|&pos| {
        read_u32(data, pos) == Some(EOCD_SIGNATURE)
            && read_u16(data, pos + 20)
                .is_some_and(|comment| pos + EOCD_LEN + usize::from(comment) <= data.len())
    })
}

fn read_layout(data: &[u8], eocd_pos: usize) -> Result<Layout> {
    let truncated = || invalid("truncated end of central directory");
    let field16 = |at: usize| read_u16(data, eocd_pos + at).ok_or_else(truncated);
    let field32 = |at: usize| read_u32(data, eocd_pos + at).ok_or_else(truncated);

    let disk = field16(4)?;
    let cd_disk = field16(6)?;
    let disk_entries = field16(8)?;
    let entry_count = field16(10)?;
    let cd_size = field32(12)?;
    let cd_offset = field32(16)?;

    let needs_zip64 = entry_count == u16::MAX || cd_size == u32::MAX || cd_offset == u32::MAX;
    if needs_zip64 {
        if let Some(layout) = read_zip64_layout(data, eocd_pos)? {
            return Ok(layout);
        }
    }

    if disk != 0 || cd_disk != 0 || disk_entries != entry_count {
        return Err(invalid("multi-disk archives are not supported"));
    }

    Ok(Layout {
        entry_count: u64::from(entry_count),
        cd_size: u64::from(cd_size),
        cd_offset: u64::from(cd_offset),
        directory_end: eocd_pos as u64,
    })
}

/// Reads the ZIP64 end records that precede the classic one, if present.
fn read_zip64_layout(data: &[u8], eocd_pos: usize) -> Result<Option<Layout>> {
    let Some(locator) = eocd_pos.checked_sub(ZIP64_EOCD_LOCATOR_LEN) else {
        return Ok(None);
    };
    if read_u32(data, locator) != Some(ZIP64_EOCD_LOCATOR_SIGNATURE) {
        return Ok(None);
    }

    let truncated = || invalid("truncated zip64 end of central directory");

    // The locator records an offset relative to the archive start; with
    // prepended data the record sits directly before the locator instead.
    let declared = read_u64(data, locator + 8).ok_or_else(truncated)?;
    let record = usize::try_from(declared)
        .ok()
        .filter(|&pos| read_u32(data, pos) == Some(ZIP64_EOCD_SIGNATURE))
        .or_else(|| {
            locator
                .checked_sub(ZIP64_EOCD_LEN)
                .filter(|&pos| read_u32(data, pos) == Some(ZIP64_EOCD_SIGNATURE))
        })
        .ok_or_else(|| invalid("missing zip64 end of central directory"))?;

    let disk = read_u32(data, record + 16).ok_or_else(truncated)?;
    let cd_disk = read_u32(data, record + 20).ok_or_else(truncated)?;
    let disk_entries = read_u64(data, record + 24).ok_or_else(truncated)?;
    let entry_count = read_u64(data, record + 32).ok_or_else(truncated)?;
    if disk != 0 || cd_disk != 0 || disk_entries != entry_count {
        return Err(invalid("multi-disk archives are not supported"));
    }

    Ok(Some(Layout {
        entry_count,
        cd_size: read_u64(data, record + 40).ok_or_else(truncated)?,
        cd_offset: read_u64(data, record + 48).ok_or_else(truncated)?,
        directory_end: record as u64,
    }))
}

/// Parses the record at `pos`, returning it and the position after it.
fn read_central_header(data: &[u8], pos: usize) -> Option<(DirectoryEntry, usize)> {
    if read_u32(data, pos)? != CENTRAL_HEADER_SIGNATURE {
        return None;
    }

    let name_len = usize::from(read_u16(data, pos + 28)?);
    let extra_len = usize::from(read_u16(data, pos + 30)?);
    let comment_len = usize::from(read_u16(data, pos + 32)?);

    let name_start = pos + CENTRAL_HEADER_LEN;
    let extra_start = name_start + name_len;
    let next = extra_start + extra_len + comment_len;
    let name = data.get(name_start..extra_start)?;
    let extra = data.get(extra_start..extra_start + extra_len)?;
    if next > data.len() {
        return None;
    }

    let mut entry = DirectoryEntry {
        name: String::from_utf8_lossy(name).into_owned(),
        flags: read_u16(data, pos + 8)?,
        compression: Compression::from(read_u16(data, pos + 10)?),
        crc32: read_u32(data, pos + 16)?,
        compressed_size: u64::from(read_u32(data, pos + 20)?),
        uncompressed_size: u64::from(read_u32(data, pos + 24)?),
        header_offset: u64::from(read_u32(data, pos + 42)?),
    };
    apply_zip64_extra(&mut entry, extra)?;

    Some((entry, next))
}

/// Replaces saturated 32-bit fields with their ZIP64 extra field values.
///
/// Values appear in a fixed order and only for the fields that are
/// saturated.
fn apply_zip64_extra(entry: &mut DirectoryEntry, extra: &[u8]) -> Option<()> {
    let mut pos = 0;
    while pos + 4 <= extra.len() {
        let id = read_u16(extra, pos)?;
        let len = usize::from(read_u16(extra, pos + 2)?);
        let field = extra.get(pos + 4..pos + 4 + len)?;
        pos += 4 + len;

        if id != ZIP64_EXTRA_ID {
            continue;
        }

        let mut at = 0;
        let saturated = u64::from(u32::MAX);
        for value in [
            &mut entry.uncompressed_size,
            &mut entry.compressed_size,
            &mut entry.header_offset,
        ] {
            if *value == saturated {
                *value = read_u64(field, at)?;
                at += 8;
            }
        }
        return Some(());
    }
    Some(())
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at.checked_add(2)?)?
        .try_into()
        .ok()
        .map(u16::from_le_bytes)
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at.checked_add(4)?)?
        .try_into()
        .ok()
        .map(u32::from_le_bytes)
}

fn read_u64(data: &[u8], at: usize) -> Option<u64> {
    data.get(at..at.checked_add(8)?)?
        .try_into()
        .ok()
        .map(u64::from_le_bytes)
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| invalid("archive offset out of range"))
}

fn invalid(reason: &str) -> DeskError {
    DeskError::InvalidArchive(format!("failed to open ZIP archive: {reason}"))
}

fn corrupt(reason: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason)
}
