use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::errors::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    #[serde(default)]
    pub test_admin_url: Option<String>,
}

impl DatabaseConfig {
    const fn default_max_connections() -> u32 {
        10
    }

    const fn default_acquire_timeout_ms() -> u64 {
        3_000
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_bind")]
    pub bind: String,
}

impl ApiConfig {
    fn default_bind() -> String {
        "0.0.0.0:5000".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
        }
    }
}

/// Settings for the GitHub delivery receiver.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Header carrying the event type label.
    #[serde(default = "WebhookConfig::default_event_header")]
    pub event_header: String,
    /// Upper bound for the single best-effort store write per delivery.
    #[serde(default = "WebhookConfig::default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "WebhookConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl WebhookConfig {
    fn default_event_header() -> String {
        "X-GitHub-Event".to_string()
    }

    const fn default_store_timeout_ms() -> u64 {
        5_000
    }

    // GitHub caps delivery payloads at 25 MB.
    const fn default_max_body_bytes() -> usize {
        25 * 1024 * 1024
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            event_header: Self::default_event_header(),
            store_timeout_ms: Self::default_store_timeout_ms(),
            max_body_bytes: Self::default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,
    #[serde(default = "ObservabilityConfig::default_metrics_path")]
    pub metrics_path: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            metrics_path: Self::default_metrics_path(),
            otlp_endpoint: None,
        }
    }
}
