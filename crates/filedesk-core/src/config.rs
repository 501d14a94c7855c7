//! Configuration for inspection, bundling and mail delivery.

use std::time::Duration;

/// Media type of Office Open XML word-processing documents.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Media type every inspected upload must declare.
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// Configuration for archive inspection.
///
/// # Examples
///
/// ```
/// use filedesk_core::InspectionConfig;
///
/// let config = InspectionConfig::default();
/// assert_eq!(config.sniff_len, 512);
///
/// // Report every entry, including macOS resource forks
/// let keep_all = InspectionConfig {
///     excluded_prefixes: Vec::new(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct InspectionConfig {
    /// Number of leading bytes read from each entry for content sniffing.
    pub sniff_len: usize,

    /// Entries whose path starts with one of these prefixes are left out of
    /// the report and its totals.
    pub excluded_prefixes: Vec<String>,
}

impl Default for InspectionConfig {
    /// Default values:
    /// - `sniff_len`: 512
    /// - `excluded_prefixes`: `["__MACOSX"]`
    fn default() -> Self {
        Self {
            sniff_len: 512,
            excluded_prefixes: vec!["__MACOSX".to_string()],
        }
    }
}

impl InspectionConfig {
    /// Returns `true` if the entry path falls under an excluded prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Configuration for bundling uploads into a single archive.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Declared content types accepted for bundling.
    pub allowed_content_types: Vec<String>,

    /// Deflate level (0-9). `None` uses the zip crate's default.
    pub compression_level: Option<i64>,
}

impl Default for BundleConfig {
    /// Default values:
    /// - `allowed_content_types`: docx, `application/xml`, `image/jpeg`,
    ///   `image/png`
    /// - `compression_level`: `None`
    fn default() -> Self {
        Self {
            allowed_content_types: vec![
                DOCX_MEDIA_TYPE.to_string(),
                "application/xml".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
            compression_level: None,
        }
    }
}

impl BundleConfig {
    /// Returns `true` if `content_type` is on the allow-list.
    ///
    /// Comparison is exact, matching what the client declared.
    #[must_use]
    pub fn allows(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type)
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with `STARTTLS`; fails if the server does
    /// not offer it.
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    Tls,
    /// `STARTTLS` when the server offers it, plaintext otherwise.
    Opportunistic,
    /// No encryption. Credentials are only sent to a loopback host.
    None,
}

impl std::str::FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "opportunistic" => Ok(Self::Opportunistic),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!(
                "unknown SMTP security mode '{other}' (expected starttls, tls, opportunistic or none)"
            )),
        }
    }
}

/// SMTP delivery settings.
///
/// Built once at startup and handed to the transport; nothing in the
/// library reads the environment on its own.
#[derive(Clone)]
pub struct MailConfig {
    /// SMTP server host name.
    pub host: String,

    /// SMTP server port.
    pub port: u16,

    /// Connection security.
    pub security: SmtpSecurity,

    /// Login for SMTP authentication. No authentication when `None`.
    pub username: Option<String>,

    /// Password for SMTP authentication.
    pub password: Option<String>,

    /// Envelope and header sender address.
    pub from: String,

    /// Connection and command timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MailConfig {
    /// Creates a configuration without authentication.
    ///
    /// Port 465 defaults to [`SmtpSecurity::Tls`], every other port to
    /// [`SmtpSecurity::StartTls`].
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, from: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            security: if port == 465 {
                SmtpSecurity::Tls
            } else {
                SmtpSecurity::StartTls
            },
            username: None,
            password: None,
            from: from.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the connection security.
    #[must_use]
    pub const fn with_security(mut self, security: SmtpSecurity) -> Self {
        self.security = security;
        self
    }

    /// Returns `host:port` for logging.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` if the host is a loopback name or address.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        self.host.eq_ignore_ascii_case("localhost")
            || self
                .host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<std::net::IpAddr>()
                .is_ok_and(|ip| ip.is_loopback())
    }
}
