//! HTTP service for inspecting, bundling and mailing uploaded files.
//!
//! Routes:
//! - `POST /api/archive/information`: list the entries of an uploaded ZIP
//! - `POST /api/archive/files`: bundle uploaded files into a ZIP
//! - `POST /api/mail/file`: mail an uploaded file as an attachment
//! - `GET /api/health`: liveness probe

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
pub mod config;
pub mod error;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::routing::post;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Default upper bound on request bodies (32 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024;

/// Builds the application router.
///
/// `max_upload_size` caps every request body; larger uploads are answered
/// with `413 Payload Too Large` before any handler logic runs.
pub fn router(state: AppState, max_upload_size: usize) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/archive/information", post(api::archive_information))
        .route("/api/archive/files", post(api::archive_files))
        .route("/api/mail/file", post(api::mail_file))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
}
