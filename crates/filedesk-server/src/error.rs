//! Error-to-response conversion for the HTTP handlers.
//!
//! Converts filedesk-core's typed errors into status codes and short plain
//! text bodies. Server-side failures are logged and answered with a generic
//! message.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use filedesk_core::DeskError;
use filedesk_core::MailError;
use thiserror::Error;
use tracing::debug;
use tracing::error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required multipart field is absent.
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    /// The uploaded archive was not declared as `application/zip`.
    #[error("Invalid file format. Please upload a valid zip file.")]
    NotZip,

    /// The uploaded archive could not be parsed.
    #[error("Invalid zip file")]
    InvalidZip,

    /// The `emails` field held no address.
    #[error("no recipients given in 'emails'")]
    NoRecipients,

    /// No SMTP server is configured.
    #[error("mail delivery is not configured")]
    MailUnavailable,

    /// The multipart body could not be decoded.
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// A core operation failed.
    #[error(transparent)]
    Desk(DeskError),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DeskError> for ApiError {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::InvalidArchive(reason) => {
                debug!(%reason, "rejecting invalid archive");
                Self::InvalidZip
            }
            DeskError::Mail(MailError::NoRecipients) => Self::NoRecipients,
            other => Self::Desk(other),
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::NotZip | Self::InvalidZip | Self::NoRecipients => {
                StatusCode::BAD_REQUEST
            }
            Self::MailUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Multipart(err) => err.status(),
            Self::Desk(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Desk(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            let body = if matches!(self, Self::MailUnavailable) {
                self.to_string()
            } else {
                "Internal Server Error".to_string()
            };
            return (status, body).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
