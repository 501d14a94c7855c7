//! Error types for inspection, bundling and mail operations.

use thiserror::Error;

/// Result type alias using `DeskError`.
pub type Result<T> = std::result::Result<T, DeskError>;

/// Errors produced while assembling or delivering mail.
#[derive(Error, Debug)]
pub enum MailError {
    /// A sender or recipient is not a valid mailbox.
    #[error("invalid email address '{address}': {source}")]
    InvalidAddress {
        /// Address as given.
        address: String,
        /// Parser failure.
        #[source]
        source: lettre::address::AddressError,
    },

    /// The attachment's declared content type is not a valid media type.
    #[error("invalid attachment content type: {0}")]
    InvalidContentType(String),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// Connecting, negotiating TLS, authenticating or delivering failed.
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Credentials would be sent unencrypted to a remote host.
    #[error("refusing to send SMTP credentials to {host} without TLS")]
    InsecureAuth {
        /// Configured SMTP host.
        host: String,
    },

    /// The message has no recipients.
    #[error("no recipients given")]
    NoRecipients,
}

/// Errors that can occur while handling uploaded files.
#[derive(Error, Debug)]
pub enum DeskError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload is not a structurally valid archive.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A single archive entry could not be opened or read.
    ///
    /// Inspection recovers from this error by skipping the entry.
    #[error("failed to read archive entry {path}: {source}")]
    EntryRead {
        /// Stored name of the entry.
        path: String,
        /// Underlying decompression or I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An uploaded file has a content type outside the allow-list.
    #[error("unsupported file format: {file_name} ({content_type})")]
    DisallowedContentType {
        /// Declared name of the uploaded file.
        file_name: String,
        /// Declared content type of the uploaded file.
        content_type: String,
    },

    /// Two uploads to be bundled share a file name.
    #[error("duplicate file name: {file_name}")]
    DuplicateEntry {
        /// The repeated name.
        file_name: String,
    },

    /// Sending mail failed.
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl DeskError {
    /// Returns `true` if this error was caused by the caller's input.
    ///
    /// # Examples
    ///
    /// ```
    /// use filedesk_core::DeskError;
    ///
    /// let err = DeskError::InvalidArchive("missing end of central directory".to_string());
    /// assert!(err.is_client_error());
    ///
    /// let err = DeskError::Io(std::io::Error::other("disk full"));
    /// assert!(!err.is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArchive(_)
                | Self::DisallowedContentType { .. }
                | Self::DuplicateEntry { .. }
                | Self::Mail(
                    MailError::NoRecipients
                        | MailError::InvalidAddress { .. }
                        | MailError::InvalidContentType(_)
                )
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use filedesk_core::DeskError;
    ///
    /// let err = DeskError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::EntryRead { path, .. } => Some(path),
            Self::DisallowedContentType { file_name, .. } | Self::DuplicateEntry { file_name } => {
                Some(file_name)
            }
            _ => None,
        }
    }
}
