//! Route handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use filedesk_core::InspectionReport;
use filedesk_core::UploadedFile;
use filedesk_core::bundle_files;
use filedesk_core::config::ZIP_MEDIA_TYPE;
use filedesk_core::mail::Attachment;
use filedesk_core::mail::MailMessage;
use filedesk_core::mail::parse_recipients;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Decoded multipart form: file parts in upload order plus text fields.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<(String, UploadedFile)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.files
                    .push((name, UploadedFile::new(file_name, content_type, data.to_vec())));
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Removes the first file sent under `name`.
    fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }

    fn into_files(self) -> Vec<UploadedFile> {
        self.files.into_iter().map(|(_, file)| file).collect()
    }
}

#[derive(Serialize)]
pub(crate) struct Health {
    ok: bool,
    mail: bool,
}

/// `GET /api/health`
pub(crate) async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        ok: true,
        mail: state.mailer.is_some(),
    })
}

/// `POST /api/archive/information`
///
/// Lists the entries of the uploaded `file` field.
pub(crate) async fn archive_information(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InspectionReport>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file").ok_or(ApiError::MissingField("file"))?;

    if upload.content_type != ZIP_MEDIA_TYPE {
        return Err(ApiError::NotZip);
    }

    let inspector = state.inspector.clone();
    let report = tokio::task::spawn_blocking(move || {
        inspector.inspect(&upload.data, &upload.file_name)
    })
    .await??;

    info!(
        archive = %report.file_name,
        files = report.total_files,
        total_size = report.total_size,
        "inspected archive"
    );
    Ok(Json(report))
}

/// `POST /api/archive/files`
///
/// Bundles every uploaded file into one ZIP archive.
pub(crate) async fn archive_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let files = UploadForm::read(multipart).await?.into_files();
    let count = files.len();

    let config = state.bundle.clone();
    let archive = tokio::task::spawn_blocking(move || bundle_files(&files, &config)).await??;

    info!(files = count, bytes = archive.len(), "bundled uploads");
    Ok((
        [
            (header::CONTENT_TYPE, ZIP_MEDIA_TYPE),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"files.zip\""),
        ],
        archive,
    ))
}

/// `POST /api/mail/file`
///
/// Mails the uploaded `file` field to the addresses in `emails`.
pub(crate) async fn mail_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let mailer = state.mailer.clone().ok_or(ApiError::MailUnavailable)?;

    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("file").ok_or(ApiError::MissingField("file"))?;
    let recipients = form
        .fields
        .get("emails")
        .map(|emails| parse_recipients(emails))
        .unwrap_or_default();

    let attachment = Attachment {
        file_name: upload.file_name,
        content_type: Some(upload.content_type),
        data: upload.data,
    };
    let message = MailMessage::with_attachment(mailer.from, recipients, &attachment)?;

    let recipients = message.recipients.len();
    tokio::task::spawn_blocking(move || mailer.transport.send(&message)).await??;

    info!(file = %attachment.file_name, recipients, "mailed upload");
    Ok(StatusCode::OK)
}
