//! Recherche chat
//!
//! Terminal entry point: reads questions from stdin, prints answers to stdout,
//! logs to stderr.

use std::sync::Arc;

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use recherche_chat::backend::{HttpSearchBackend, SearchBackend};
use recherche_chat::config::AppConfig;
use recherche_chat::terminal::{TerminalView, run_session};
use recherche_chat::widget::WidgetSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_json);

    info!(
        name: "config.loaded",
        base_url = %config.backend.base_url,
        authenticated = config.backend.api_key.is_some(),
        timeout_secs = config.backend.timeout_secs,
        "Configuration loaded"
    );

    let backend = Arc::new(HttpSearchBackend::new(&config.backend)?);

    match backend.probe().await {
        Ok(message) => info!(name: "backend.probe.ok", welcome = %message, "Backend reachable"),
        Err(err) => tracing::warn!(
            name: "backend.probe.failed",
            error = %err,
            "Backend not reachable yet; questions will fail until it is"
        ),
    }

    let view = TerminalView::new(std::io::stdout());
    let reader = BufReader::new(tokio::io::stdin());
    let settings = WidgetSettings::from(&config.widget);

    let widget = run_session(reader, view, backend, settings).await?;
    info!(messages = widget.messages().len(), "Bye");
    Ok(())
}

/// Structured logging to stderr (M-LOG-STRUCTURED), filtered by `RUST_LOG`.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
