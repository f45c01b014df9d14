use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{CheckerError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Connection context shared by every request in a run.
///
/// Wraps one [`Client`] (connection pool and cookie jar) bound to a base
/// endpoint. Cloning the underlying client is cheap, but the session itself is
/// meant to be shared behind an `Arc` rather than copied per probe.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base_url: Url,
}

impl Session {
    /// Build a session for `base_url`.
    ///
    /// `max_idle_per_host` should be at least the worker count so that
    /// concurrent probes can reuse pooled connections.
    pub fn new(base_url: &str, timeout: Duration, max_idle_per_host: usize) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|source| CheckerError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .pool_max_idle_per_host(max_idle_per_host)
            .build()?;

        Ok(Session { client, base_url })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolve `path` against the base endpoint.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| CheckerError::InvalidBaseUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })
    }
}
