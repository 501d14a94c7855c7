//! Mailing an uploaded file as an attachment.
//!
//! [`MailMessage`] assembles the message, a [`MailTransport`] delivers it.
//! [`SmtpTransport`] is the network implementation; tests and embedders can
//! supply their own.

pub mod message;
pub mod smtp;

pub use message::Attachment;
pub use message::MailMessage;
pub use smtp::MailTransport;
pub use smtp::SmtpTransport;

/// Splits a recipient list on commas, semicolons and whitespace.
///
/// Empty items are dropped; order and duplicates are kept.
///
/// # Examples
///
/// ```
/// use filedesk_core::mail::parse_recipients;
///
/// assert_eq!(
///     parse_recipients("a@example.com, b@example.com;c@example.com"),
///     ["a@example.com", "b@example.com", "c@example.com"]
/// );
/// assert!(parse_recipients(" , ").is_empty());
/// ```
pub fn parse_recipients(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
