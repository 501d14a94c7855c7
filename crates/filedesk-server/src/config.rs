//! Environment configuration for mail delivery.
//!
//! Read once at startup. Variables:
//! - `SMTP_HOST`: server host; mail is disabled when unset
//! - `SMTP_PORT`: server port (default 587)
//! - `SMTP_SECURITY`: `starttls`, `tls`, `opportunistic` or `none`
//!   (default `tls` on port 465, `starttls` otherwise)
//! - `EMAIL_USERNAME`, `EMAIL_PASSWORD`: login credentials
//! - `MAIL_FROM`: sender address (default `EMAIL_USERNAME`)
//! - `SMTP_TIMEOUT_SECS`: socket timeout (default 30)

use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use filedesk_core::MailConfig;
use filedesk_core::SmtpSecurity;

const DEFAULT_SMTP_PORT: u16 = 587;

/// Loads the mail configuration from the process environment.
pub fn mail_config_from_env() -> Result<Option<MailConfig>> {
    mail_config_from(|key| std::env::var(key).ok())
}

/// Loads the mail configuration through `lookup`.
///
/// Returns `Ok(None)` if no SMTP host is configured. Blank values count as
/// unset.
pub fn mail_config_from<F>(lookup: F) -> Result<Option<MailConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let Some(host) = get("SMTP_HOST") else {
        return Ok(None);
    };

    let port = match get("SMTP_PORT") {
        Some(port) => port
            .trim()
            .parse::<u16>()
            .with_context(|| format!("SMTP_PORT must be a port number, got '{port}'"))?,
        None => DEFAULT_SMTP_PORT,
    };

    let username = get("EMAIL_USERNAME");
    let password = get("EMAIL_PASSWORD");
    if username.is_some() != password.is_some() {
        bail!("EMAIL_USERNAME and EMAIL_PASSWORD must be set together");
    }

    let Some(from) = get("MAIL_FROM").or_else(|| username.clone()) else {
        bail!("MAIL_FROM or EMAIL_USERNAME must be set when SMTP_HOST is set");
    };

    let mut config = MailConfig::new(host.trim(), port, from);
    if let (Some(username), Some(password)) = (username, password) {
        config = config.with_credentials(username, password);
    }
    if let Some(security) = get("SMTP_SECURITY") {
        let security = security
            .parse::<SmtpSecurity>()
            .map_err(anyhow::Error::msg)
            .context("invalid SMTP_SECURITY")?;
        config = config.with_security(security);
    }
    if let Some(secs) = get("SMTP_TIMEOUT_SECS") {
        let secs = secs
            .trim()
            .parse::<u64>()
            .with_context(|| format!("SMTP_TIMEOUT_SECS must be a number, got '{secs}'"))?;
        config.timeout = Duration::from_secs(secs);
    }

    Ok(Some(config))
}
