use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Yahoo rejects requests that carry no browser-like user agent
const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; stockdash/", env!("CARGO_PKG_VERSION"), ")");

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with the default timeouts
    pub fn create_client() -> Client {
        Self::create_client_with(&HttpConfig::default())
    }

    /// Creates a new HTTP client with the configured timeouts.
    ///
    /// Requests are never retried: a failure is terminal for that request.
    pub fn create_client_with(config: &HttpConfig) -> Client {
        Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}
