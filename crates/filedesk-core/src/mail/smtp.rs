//! SMTP delivery through `lettre`.

use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::Tls;
use lettre::transport::smtp::client::TlsParameters;
use tracing::info;

use super::message::MailMessage;
use crate::MailConfig;
use crate::Result;
use crate::config::SmtpSecurity;
use crate::error::MailError;

/// Delivers assembled messages.
///
/// Implementations block the calling thread until the message has been
/// accepted or rejected.
pub trait MailTransport: Send + Sync {
    /// Sends `message` to all of its recipients.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeskError::Mail`] if delivery fails.
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// SMTP client transport.
///
/// Opens one connection per message. The connection is secured according to
/// [`MailConfig::security`]; credentials travel in the clear only to a
/// loopback relay.
#[derive(Clone)]
pub struct SmtpTransport {
    inner: lettre::SmtpTransport,
    server: String,
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpTransport")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl SmtpTransport {
    /// Creates a transport for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InsecureAuth`] if credentials are configured with
    /// [`SmtpSecurity::None`] for a non-loopback host, and
    /// [`MailError::Smtp`] if TLS parameters cannot be set up.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config.host.as_str();
        let has_credentials = config.username.is_some();
        if config.security == SmtpSecurity::None && has_credentials && !config.is_loopback() {
            return Err(MailError::InsecureAuth {
                host: host.to_string(),
            }
            .into());
        }

        let builder = match config.security {
            SmtpSecurity::StartTls => lettre::SmtpTransport::starttls_relay(host),
            SmtpSecurity::Tls => lettre::SmtpTransport::relay(host),
            SmtpSecurity::Opportunistic => TlsParameters::new(host.to_string()).map(|params| {
                lettre::SmtpTransport::builder_dangerous(host).tls(Tls::Opportunistic(params))
            }),
            SmtpSecurity::None => Ok(lettre::SmtpTransport::builder_dangerous(host)),
        }
        .map_err(MailError::from)?
        .port(config.port)
        .timeout(Some(config.timeout));

        let builder = match (&config.username, &config.password) {
            (Some(username), password) => builder.credentials(Credentials::new(
                username.clone(),
                password.clone().unwrap_or_default(),
            )),
            (None, _) => builder,
        };

        Ok(Self {
            inner: builder.build(),
            server: config.address(),
        })
    }
}

impl MailTransport for SmtpTransport {
    fn send(&self, message: &MailMessage) -> Result<()> {
        let response =
            lettre::Transport::send(&self.inner, message.message()).map_err(MailError::from)?;
        info!(
            recipients = message.recipients.len(),
            code = %response.code(),
            "mail delivered to {}",
            self.server
        );
        Ok(())
    }
}
