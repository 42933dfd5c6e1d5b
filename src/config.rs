//! Layered configuration.
//!
//! Priority, lowest to highest: built-in defaults, YAML config file
//! (`--config` / `CONFIG_FILE`, else `./chat.yaml` when present), `CHAT_`
//! prefixed environment variables (`CHAT_BACKEND__BASE_URL`), CLI flags and
//! their dedicated environment variables.

use std::path::Path;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "chat.yaml";

/// Apology shown in place of an answer when a request fails.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Désolé, une erreur est survenue. Veuillez réessayer plus tard.";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the search backend
    #[arg(long, env = "SEARCH_BASE_URL")]
    pub base_url: Option<String>,

    /// API key sent in the X-API-Key header
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Open the chat panel at startup
    #[arg(long)]
    pub open: bool,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
    #[serde(default)]
    pub log_json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub error_message: String,
    #[serde(default)]
    pub greeting: Option<String>,
    pub start_open: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("backend.base_url", "http://127.0.0.1:8000")?
            .set_default("backend.timeout_secs", 30)?
            .set_default("widget.error_message", DEFAULT_ERROR_MESSAGE)?
            .set_default("widget.start_open", false)?
            .set_default("log_json", false)?;

        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::with_name(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
            None => {}
        }

        // E.g. CHAT_BACKEND__TIMEOUT_SECS=10
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // clap already folded the flag-specific env vars into `cli`.
        if let Some(base_url) = &cli.base_url {
            builder = builder.set_override("backend.base_url", base_url.as_str())?;
        }
        if let Some(api_key) = &cli.api_key {
            builder = builder.set_override("backend.api_key", api_key.as_str())?;
        }
        if let Some(timeout) = cli.timeout_secs {
            builder = builder.set_override("backend.timeout_secs", timeout)?;
        }
        if cli.open {
            builder = builder.set_override("widget.start_open", true)?;
        }
        if cli.log_json {
            builder = builder.set_override("log_json", true)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "backend.base_url cannot be empty".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "backend.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.widget.error_message.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "widget.error_message cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
