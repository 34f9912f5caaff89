use crate::{
    classify::{classify, CheckOutcome},
    http::create_http_pool,
    platforms::{PlatformEntry, PlatformRegistry},
    types::{ProbeConfig, ProbeResult},
};
use futures::future::join_all;
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Why a single request did not yield a usable status.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Method rejected with HTTP {}", .0.as_u16())]
    Rejected(StatusCode),
}

pub struct Prober {
    client: Client,
    config: ProbeConfig,
}

impl Prober {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = create_http_pool(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Reuses an existing pool instead of opening a new one.
    pub fn with_client(client: Client, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Checks `username` on every platform at once.
    ///
    /// Always returns one result per registry entry, in registry order.
    #[instrument(skip(self, registry), fields(platforms = registry.len()))]
    pub async fn probe(&self, username: &str, registry: &PlatformRegistry) -> Vec<ProbeResult> {
        let checks = registry
            .iter()
            .map(|entry| self.probe_entry(entry, username));
        join_all(checks).await
    }

    async fn probe_entry(&self, entry: &PlatformEntry, username: &str) -> ProbeResult {
        let url = entry.url_for(username);
        let outcome = self.check(&url).await;
        let state = classify(outcome);
        debug!(platform = %entry.name, url = %url, ?state, "Presence check finished");

        ProbeResult {
            platform: entry.name.clone(),
            url,
            outcome: state,
            raw_status: outcome.raw_status(),
            errored: outcome == CheckOutcome::NoResponse,
        }
    }

    /// HEAD first; one GET if HEAD is refused. Never fails.
    pub async fn check(&self, url: &str) -> CheckOutcome {
        let first = match self.request(Method::HEAD, url).await {
            Ok(status) => return CheckOutcome::Status(status.as_u16()),
            Err(e) => e,
        };
        debug!(url = %url, error = %first, "HEAD refused, retrying with GET");

        match self.request(Method::GET, url).await {
            Ok(status) => CheckOutcome::Status(status.as_u16()),
            Err(e) => {
                warn!(url = %url, error = %e, "Presence check got no response");
                CheckOutcome::NoResponse
            }
        }
    }

    async fn request(&self, method: Method, url: &str) -> Result<StatusCode, CheckError> {
        let is_head = method == Method::HEAD;
        let response = self
            .client
            .request(method, url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if is_head && is_head_rejection(status) {
            return Err(CheckError::Rejected(status));
        }
        Ok(status)
    }
}

impl Clone for Prober {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
        }
    }
}

fn is_head_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_method_errors_count_as_head_rejection() {
        assert!(is_head_rejection(StatusCode::METHOD_NOT_ALLOWED));
        assert!(is_head_rejection(StatusCode::NOT_IMPLEMENTED));
        assert!(!is_head_rejection(StatusCode::NOT_FOUND));
        assert!(!is_head_rejection(StatusCode::FORBIDDEN));
        assert!(!is_head_rejection(StatusCode::OK));
    }

    #[tokio::test]
    async fn total_network_failure_still_yields_one_result_per_platform() {
        let registry = PlatformRegistry::from_pairs([
            ("A", "http://127.0.0.1:1/{u}"),
            ("B", "http://127.0.0.1:1/b/{u}"),
            ("C", "http://invalid host/{u}"),
        ]);
        let prober = Prober::with_config(ProbeConfig {
            timeout: std::time::Duration::from_secs(2),
            ..ProbeConfig::default()
        })
        .unwrap();

        let results = prober.probe("alice", &registry).await;

        let names: Vec<_> = results.iter().map(|r| r.platform.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        for result in &results {
            assert!(result.errored);
            assert_eq!(result.raw_status, 0);
            assert!(result.outcome.is_no_response());
        }
    }

    #[tokio::test]
    async fn empty_registry_yields_no_results() {
        let prober = Prober::new().unwrap();
        let results = prober.probe("alice", &PlatformRegistry::empty()).await;
        assert!(results.is_empty());
    }
}
