use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use thiserror::Error;
use tokio::net::lookup_host;
use tracing::debug;

const MAX_DOMAIN_LEN: usize = 253;

lazy_static! {
    // Labels are alphanumeric with inner hyphens; the last label is 2+ letters.
    static ref DOMAIN_SHAPE: Regex =
        Regex::new(r"^(?i)(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
            .expect("domain shape regex is valid");
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
    #[error("Invalid IP address or hostname: {0}")]
    InvalidTarget(String),
}

/// Checks the shape of `input` and returns it trimmed and lower-cased.
///
/// This is a syntactic gate only; it says nothing about whether the domain
/// is registered.
pub fn validate_domain(input: &str) -> Result<String, ValidationError> {
    let domain = input.trim();
    if domain.len() > MAX_DOMAIN_LEN || !DOMAIN_SHAPE.is_match(domain) {
        return Err(ValidationError::InvalidDomain(input.to_string()));
    }
    Ok(domain.to_lowercase())
}

/// Parses an IP literal, falling back to a system DNS lookup.
///
/// IPv4 answers are preferred when a hostname resolves to both families.
pub async fn resolve_target(input: &str) -> Result<IpAddr, ValidationError> {
    let target = input.trim();
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }
    if target.is_empty() {
        return Err(ValidationError::InvalidTarget(input.to_string()));
    }

    let addrs: Vec<IpAddr> = match lookup_host((target, 0)).await {
        Ok(addrs) => addrs.map(|a| a.ip()).collect(),
        Err(e) => {
            debug!(target = %target, error = %e, "Hostname resolution failed");
            return Err(ValidationError::InvalidTarget(input.to_string()));
        }
    };

    pick_address(&addrs).ok_or_else(|| ValidationError::InvalidTarget(input.to_string()))
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}
