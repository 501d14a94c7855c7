//! Archive inspection without extraction.
//!
//! # Examples
//!
//! ```no_run
//! use filedesk_core::InspectionConfig;
//! use filedesk_core::inspect_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("archive.zip")?;
//! let report = inspect_archive(&data, "archive.zip", &InspectionConfig::default())?;
//! println!("Archive contains {} files", report.total_files);
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod inspect;
pub mod report;

pub use directory::CentralDirectory;
pub use directory::DirectoryEntry;
pub use inspect::Inspector;
pub use inspect::inspect_archive;
pub use report::ArchiveEntry;
pub use report::InspectionReport;
