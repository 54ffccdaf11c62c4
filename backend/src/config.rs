//! Configuration management for the bookstore dashboard service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BOOKSTORE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Gemini text generation configuration
    pub gemini: GeminiConfig,

    /// Dashboard query configuration
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key; analysis is disabled when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Upper bound on series buckets queried at the same time
    pub max_concurrent_buckets: usize,

    /// Number of books in the top products ranking
    pub top_products_limit: usize,
}

impl GeminiConfig {
    /// The configured key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BOOKSTORE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BOOKSTORE_ prefix)
            .add_source(
                Environment::with_prefix("BOOKSTORE")
                    .separator("__")
                    .try_parsing(true),
            );

        // The conventional Gemini variable works without the prefix
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            builder = builder.set_override("gemini.api_key", api_key)?;
        }

        builder.build()?.try_deserialize()
    }

    fn defaults(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("gemini.model", "gemini-2.5-pro")?
            .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("gemini.temperature", 0.5)?
            .set_default("gemini.timeout_secs", 60)?
            .set_default("gemini.max_retries", 3)?
            .set_default("gemini.retry_base_delay_ms", 1000)?
            .set_default("dashboard.max_concurrent_buckets", 8)?
            .set_default("dashboard.top_products_limit", 5)
    }
}
