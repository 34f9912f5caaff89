use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub(crate) const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures of the single-call JSON lookups (GitHub, geolocation).
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Not found or rate limited")]
    NotFound,
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// GETs `url` and decodes a 200 body as JSON.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<T, LookupError> {
    let response = client.get(url).timeout(timeout).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(LookupError::Status(status.as_u16()));
    }
    Ok(response.json::<T>().await?)
}
