//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `bookshelf.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Book API the page repository talks to.
    pub api: ApiConfig,
    /// Server-rendered page settings.
    pub pages: PagesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Book API client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin of the API, e.g. `http://books.internal:8080`. Defaults to this
    /// server's own listener.
    pub base_url: Option<String>,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Page rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// How long a page waits for its completion event, in milliseconds.
    pub request_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `bookshelf.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("bookshelf.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("BOOKSHELF_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("BOOKSHELF_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("BOOKSHELF_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("BOOKSHELF_API_URL") {
            self.api.base_url = Some(val);
        }
        if let Some(val) = var("BOOKSHELF_REQUEST_TIMEOUT_MS")
            && let Ok(ms) = val.parse()
        {
            self.pages.request_timeout_ms = ms;
        }
        if let Some(val) = var("BOOKSHELF_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "api timeout must be non-zero".to_string(),
            ));
        }
        if self.pages.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "page request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the settings of the HTTP repository client.
    #[must_use]
    pub fn api_client(&self) -> bookshelf_adapter_http_reqwest::Config {
        bookshelf_adapter_http_reqwest::Config {
            base_url: self
                .api
                .base_url
                .clone()
                .unwrap_or_else(|| self.own_api_url()),
            timeout: Duration::from_millis(self.api.timeout_ms),
        }
    }

    /// URL of the API served by this process.
    fn own_api_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            host => host,
        };
        format!("http://{host}:{}", self.server.port)
    }

    /// Return how long a page waits for its completion event.
    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.pages.request_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 5_000,
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "bookshelfd=info,bookshelf=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
