//! Message assembly for mailing a single uploaded file.

use lettre::Address;
use lettre::Message;
use lettre::message::Body;
use lettre::message::Mailbox;
use lettre::message::MultiPart;
use lettre::message::SinglePart;
use lettre::message::header::ContentTransferEncoding;
use lettre::message::header::ContentType;

use crate::Result;
use crate::error::MailError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub file_name: String,
    /// Declared media type. `application/octet-stream` when `None`.
    pub content_type: Option<String>,
    /// Raw file content.
    pub data: Vec<u8>,
}

/// Envelope plus the assembled MIME message.
#[derive(Debug, Clone)]
pub struct MailMessage {
    /// Envelope sender.
    pub from: String,
    /// Envelope recipients.
    pub recipients: Vec<String>,
    message: Message,
}

impl MailMessage {
    /// Builds a `multipart/mixed` message carrying `attachment`.
    ///
    /// The subject names the file and the body is a short notice followed by
    /// the base64 encoded attachment.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::NoRecipients`] if `recipients` is empty,
    /// [`MailError::InvalidAddress`] if the sender or a recipient is not a
    /// mailbox, and [`MailError::InvalidContentType`] if the attachment's
    /// declared type does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use filedesk_core::mail::Attachment;
    /// use filedesk_core::mail::MailMessage;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let attachment = Attachment {
    ///     file_name: "notes.txt".to_string(),
    ///     content_type: Some("text/plain".to_string()),
    ///     data: b"hello".to_vec(),
    /// };
    /// let message = MailMessage::with_attachment(
    ///     "desk@example.com",
    ///     vec!["alice@example.com".to_string()],
    ///     &attachment,
    /// )?;
    /// let raw = String::from_utf8(message.formatted())?;
    /// assert!(raw.contains("Subject: File notes.txt\r\n"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_attachment(
        from: impl Into<String>,
        recipients: Vec<String>,
        attachment: &Attachment,
    ) -> Result<Self> {
        if recipients.is_empty() {
            return Err(MailError::NoRecipients.into());
        }

        let from = from.into();
        let mut builder = Message::builder().from(mailbox(&from)?);
        for recipient in &recipients {
            builder = builder.to(mailbox(recipient)?);
        }

        let file_name = single_line(&attachment.file_name);
        let declared = attachment
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        let content_type = ContentType::parse(declared)
            .map_err(|_| MailError::InvalidContentType(declared.to_string()))?;
        let body = Body::new_with_encoding(attachment.data.clone(), ContentTransferEncoding::Base64)
            .unwrap_or_else(Body::new);

        let message = builder
            .subject(format!("File {file_name}"))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(String::from("File is attached.")))
                    .singlepart(
                        lettre::message::Attachment::new(file_name).body(body, content_type),
                    ),
            )
            .map_err(MailError::from)?;

        Ok(Self {
            from,
            recipients,
            message,
        })
    }

    /// Returns the assembled message.
    #[must_use]
    pub const fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the message as it goes over the wire.
    #[must_use]
    pub fn formatted(&self) -> Vec<u8> {
        self.message.formatted()
    }
}

fn mailbox(address: &str) -> std::result::Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Address>()
        .map(|address| Mailbox::new(None, address))
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Drops line breaks so a file name cannot start a new header.
fn single_line(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}
