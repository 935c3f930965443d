//! Cardioscreen: heart disease risk screening client
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardioscreen::adapters::sanitize::{Redaction, SanitizingMakeWriter};
use cardioscreen::config::{AppConfig, LogMode};
use cardioscreen::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Logs written to the terminal would corrupt the TUI's alternate screen,
    // so an interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => interactive,
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    let redaction = Redaction {
        clinical: !config.log_payloads,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file)
                .with_writer(SanitizingMakeWriter::new(writer, redaction)),
        )
        .init();

    // Settings were read before the subscriber existed.
    config.log_rejected();

    tracing::info!(
        endpoint = %config.api_endpoint,
        timeout_ms = config.request_timeout.as_millis() as u64,
        "Starting Cardioscreen..."
    );

    let mut app = App::new(config)?;
    app.run()?;

    tracing::info!("Cardioscreen shutdown complete.");
    Ok(())
}
