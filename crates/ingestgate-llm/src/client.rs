//! Shared HTTP client configuration for LLM providers.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 16,
            user_agent: format!("ingestgate-llm/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub fn create_client(config: &HttpClientConfig) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}
