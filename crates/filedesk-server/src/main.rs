//! filedesk - HTTP service for archive inspection, bundling and mailing.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use filedesk_core::BundleConfig;
use filedesk_core::InspectionConfig;
use filedesk_core::Inspector;
use filedesk_core::mail::SmtpTransport;
use filedesk_server::AppState;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut inspection = InspectionConfig {
        sniff_len: cli.sniff_len,
        ..InspectionConfig::default()
    };
    if cli.include_system_entries {
        inspection.excluded_prefixes.clear();
    }

    let mut state = AppState::new(Inspector::new(inspection), BundleConfig::default());
    match filedesk_server::config::mail_config_from_env()? {
        Some(mail) => {
            let transport =
                SmtpTransport::new(&mail).context("failed to set up SMTP transport")?;
            info!(
                server = %mail.address(),
                security = ?mail.security,
                from = %mail.from,
                "mail delivery enabled"
            );
            state = state.with_mailer(Arc::new(transport), mail.from);
        }
        None => warn!("SMTP_HOST not set, /api/mail/file will answer 503"),
    }

    let max_upload_size = usize::try_from(cli.max_upload_size)
        .context("--max-upload-size does not fit in memory on this platform")?;
    let app = filedesk_server::router(state, max_upload_size);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
