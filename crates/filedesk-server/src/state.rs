//! Shared handler state.

use std::sync::Arc;

use filedesk_core::BundleConfig;
use filedesk_core::Inspector;
use filedesk_core::mail::MailTransport;

/// Sender address plus the transport that delivers for it.
#[derive(Clone)]
pub struct Mailer {
    /// Transport used for every message.
    pub transport: Arc<dyn MailTransport>,
    /// Envelope and header sender.
    pub from: String,
}

/// State cloned into every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Archive inspector with its classifier chain.
    pub inspector: Arc<Inspector>,
    /// Allow-list and compression settings for bundling.
    pub bundle: Arc<BundleConfig>,
    /// Mail delivery, absent when no SMTP server is configured.
    pub mailer: Option<Mailer>,
}

impl AppState {
    /// Creates state without mail delivery.
    #[must_use]
    pub fn new(inspector: Inspector, bundle: BundleConfig) -> Self {
        Self {
            inspector: Arc::new(inspector),
            bundle: Arc::new(bundle),
            mailer: None,
        }
    }

    /// Enables mail delivery through `transport`.
    #[must_use]
    pub fn with_mailer(
        mut self,
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
    ) -> Self {
        self.mailer = Some(Mailer {
            transport,
            from: from.into(),
        });
        self
    }
}
