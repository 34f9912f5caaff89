use crate::{
    lookup::{fetch_json, LookupError, LOOKUP_TIMEOUT},
    validate::{resolve_target, ValidationError},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;
use tracing::instrument;

const IP_API_URL: &str = "http://ip-api.com";
const IP_API_FIELDS: &str =
    "status,message,continent,country,regionName,city,zip,lat,lon,isp,org,as,query";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeo {
    status: Option<String>,
    message: Option<String>,
    query: Option<String>,
    continent: Option<String>,
    country: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    as_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoInfo {
    pub ip: IpAddr,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub region_name: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub isp: Option<String>,
    pub org: Option<String>,
    pub as_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Clone)]
pub struct GeoClient {
    client: Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, IP_API_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves `target` (IP literal or hostname) and geolocates it.
    pub async fn locate_target(&self, target: &str) -> Result<GeoInfo, GeoError> {
        let ip = resolve_target(target).await?;
        Ok(self.locate(ip).await?)
    }

    #[instrument(skip(self))]
    pub async fn locate(&self, ip: IpAddr) -> Result<GeoInfo, LookupError> {
        let url = format!("{}/json/{}?fields={}", self.base_url, ip, IP_API_FIELDS);
        let raw: RawGeo = fetch_json(&self.client, &url, LOOKUP_TIMEOUT).await?;

        // ip-api signals failure in the body, not the status line.
        if raw.status.as_deref() != Some("success") {
            return Err(LookupError::Upstream(
                raw.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        Ok(GeoInfo {
            ip: raw.query.and_then(|q| q.parse().ok()).unwrap_or(ip),
            continent: raw.continent,
            country: raw.country,
            region_name: raw.region_name,
            city: raw.city,
            zip: raw.zip,
            lat: raw.lat,
            lon: raw.lon,
            isp: raw.isp,
            org: raw.org,
            as_name: raw.as_name,
        })
    }
}
