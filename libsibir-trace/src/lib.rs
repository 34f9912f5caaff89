mod classify;
mod geo;
mod github;
mod http;
mod lookup;
pub mod platforms;
mod prober;
mod types;
pub mod validate;
pub mod whois;

pub use classify::{classify, CheckOutcome};
pub use geo::{GeoClient, GeoError, GeoInfo};
pub use github::{GithubClient, GithubProfile};
pub use http::create_http_pool;
pub use lookup::LookupError;
pub use platforms::{PlatformEntry, PlatformRegistry};
pub use prober::{CheckError, Prober};
pub use types::{PresenceState, ProbeConfig, ProbeResult, DEFAULT_USER_AGENT};
pub use validate::{resolve_target, validate_domain, ValidationError};
pub use whois::{WhoisConfig, WhoisResolver, WhoisSession};

/// Checks `username` against the default platforms with a fresh pool.
pub async fn probe_username(username: &str) -> Result<Vec<ProbeResult>, reqwest::Error> {
    let prober = Prober::new()?;
    Ok(prober.probe(username, &PlatformRegistry::default()).await)
}

/// Validates `domain` and resolves it through the IANA root.
pub async fn resolve_whois(domain: &str) -> Result<String, ValidationError> {
    let domain = validate_domain(domain)?;
    Ok(WhoisResolver::new().resolve_text(&domain).await)
}
