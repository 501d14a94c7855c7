//! Archive inspection, content sniffing, bundling and mail assembly for
//! uploaded files.
//!
//! `filedesk-core` backs the `filedesk` HTTP service. It lists the entries of
//! an uploaded ZIP archive with their sizes and detected media types, bundles
//! several uploads into one archive, and mails a single upload as an
//! attachment.
//!
//! # Examples
//!
//! ```no_run
//! use filedesk_core::InspectionConfig;
//! use filedesk_core::inspect_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("upload.zip")?;
//! let report = inspect_archive(&data, "upload.zip", &InspectionConfig::default())?;
//! println!("{} files, {} bytes uncompressed", report.total_files, report.total_size);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod creation;
pub mod error;
pub mod inspection;
pub mod mail;
#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use config::BundleConfig;
pub use config::InspectionConfig;
pub use config::MailConfig;
pub use config::SmtpSecurity;
pub use creation::UploadedFile;
pub use creation::bundle_files;
pub use error::DeskError;
pub use error::MailError;
pub use error::Result;
pub use inspection::ArchiveEntry;
pub use inspection::InspectionReport;
pub use inspection::Inspector;
pub use inspection::inspect_archive;
