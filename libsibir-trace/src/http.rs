use crate::types::ProbeConfig;
use reqwest::{header, redirect, Client};
use std::time::Duration;
use tracing::warn;

const MAX_REDIRECTS: usize = 10;

/// Builds the shared connection pool used by the prober and the JSON lookups.
///
/// Create it once at startup and hand out clones; the pool closes when the
/// last clone is dropped.
pub fn create_http_pool(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    match header::HeaderValue::from_str(&config.user_agent) {
        Ok(agent) => {
            headers.insert(header::USER_AGENT, agent);
        }
        Err(_) => warn!(user_agent = %config.user_agent, "Ignoring unusable User-Agent"),
    }

    Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
}
