//! Client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::error::HttpRepositoryError;
use crate::repository::HttpBookRepository;

/// Where the API lives and how long a call may take.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the API, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Per-request timeout, connection included.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Build the repository client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpRepositoryError::BaseUrl`] if `base_url` is not an
    /// absolute HTTP(S) URL, or [`HttpRepositoryError::Http`] if the client
    /// cannot be constructed.
    pub fn build(&self) -> Result<HttpBookRepository, HttpRepositoryError> {
        let base_url = parse_base_url(&self.base_url)?;
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(HttpBookRepository::new(client, base_url))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HttpRepositoryError> {
    let invalid = |reason: String| HttpRepositoryError::BaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be a base".to_string()));
    }
    Ok(url)
}
