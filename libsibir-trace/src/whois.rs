//! Two-hop WHOIS resolution: ask the root registry who is authoritative for
//! the domain, then ask that server.
//!
//! The wire protocol is connect, send `<query>\r\n`, read until the server
//! closes. Responses are returned as opaque text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::{collections::HashMap, net::SocketAddr, time::Duration};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};
use tracing::{debug, instrument, warn};

pub const WHOIS_PORT: u16 = 43;
pub const ROOT_WHOIS_SERVER: &str = "whois.iana.org";
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

const READ_CHUNK: usize = 4096;
/// Responses are cut here; the text read so far is returned.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

lazy_static! {
    static ref REFERRAL: Regex =
        Regex::new(r"(?im)^[ \t]*refer:[ \t]*(\S+)").expect("referral regex is valid");
}

#[derive(Debug, Error)]
pub enum WhoisError {
    #[error("connection to {server} failed: {source}")]
    Connect {
        server: String,
        source: std::io::Error,
    },
    #[error("{server} timed out")]
    Timeout { server: String },
    #[error("i/o error talking to {server}: {source}")]
    Io {
        server: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct WhoisConfig {
    pub root_server: String,
    pub port: u16,
    /// Applies to each connect, write and read separately.
    pub timeout: Duration,
    /// Host name to socket address pins, consulted before DNS.
    pub overrides: HashMap<String, SocketAddr>,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            root_server: ROOT_WHOIS_SERVER.to_string(),
            port: WHOIS_PORT,
            timeout: Duration::from_secs(8),
            overrides: HashMap::new(),
        }
    }
}

/// Everything learned during one resolution. Not cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhoisSession {
    pub queried_domain: String,
    /// The `refer:` server named by the root, if any.
    pub referral_server: Option<String>,
    pub authoritative_server: String,
    pub raw_response: String,
}

#[derive(Debug)]
enum State {
    QueryingRoot,
    QueryingAuthoritative {
        target: String,
        referral: Option<String>,
    },
    Done(WhoisSession),
}

#[derive(Debug, Clone, Default)]
pub struct WhoisResolver {
    config: WhoisConfig,
}

impl WhoisResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WhoisConfig) -> Self {
        Self { config }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Routes connections for `host` to `addr` instead of `host:port`.
    pub fn with_override(mut self, host: impl Into<String>, addr: SocketAddr) -> Self {
        self.config.overrides.insert(host.into().to_lowercase(), addr);
        self
    }

    /// Returns the raw WHOIS text for `domain`, or a placeholder describing
    /// the failure.
    pub async fn resolve_text(&self, domain: &str) -> String {
        self.resolve(domain).await.raw_response
    }

    #[instrument(skip(self), fields(root = %self.config.root_server))]
    pub async fn resolve(&self, domain: &str) -> WhoisSession {
        let query = domain.trim().to_lowercase();
        let root = self.config.root_server.as_str();
        let mut state = State::QueryingRoot;

        loop {
            state = match state {
                State::QueryingRoot => match self.query_server(root, &query).await {
                    Ok(response) => {
                        let referral = extract_referral(&response);
                        debug!(referral = ?referral, "Root WHOIS answered");
                        State::QueryingAuthoritative {
                            target: referral.clone().unwrap_or_else(|| root.to_string()),
                            referral,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Root WHOIS query failed, querying root directly");
                        State::QueryingAuthoritative {
                            target: root.to_string(),
                            referral: None,
                        }
                    }
                },
                State::QueryingAuthoritative { target, referral } => {
                    let raw_response = self.query_authoritative(&target, &query).await;
                    State::Done(WhoisSession {
                        queried_domain: query.clone(),
                        referral_server: referral,
                        authoritative_server: target,
                        raw_response,
                    })
                }
                State::Done(session) => return session,
            };
        }
    }

    async fn query_authoritative(&self, target: &str, query: &str) -> String {
        let root = self.config.root_server.as_str();
        let result = match self.query_server(target, query).await {
            Ok(text) if text.trim().is_empty() && !target.eq_ignore_ascii_case(root) => {
                debug!(server = %target, "Empty WHOIS answer, retrying root");
                self.query_server(root, query).await
            }
            other => other,
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "WHOIS resolution failed");
            format!("<whois error: {e}>")
        })
    }

    /// One connect/query/read-to-close exchange.
    async fn query_server(&self, server: &str, query: &str) -> Result<String, WhoisError> {
        let limit = self.config.timeout;
        debug!(server = %server, "Querying WHOIS server");

        let connect = match self.config.overrides.get(&server.to_lowercase()) {
            Some(addr) => timeout(limit, TcpStream::connect(*addr)).await,
            None => timeout(limit, TcpStream::connect((server, self.config.port))).await,
        };
        let mut stream = connect
            .map_err(|_| WhoisError::Timeout {
                server: server.to_string(),
            })?
            .map_err(|source| WhoisError::Connect {
                server: server.to_string(),
                source,
            })?;

        let io_err = |source: std::io::Error| WhoisError::Io {
            server: server.to_string(),
            source,
        };

        timeout(limit, stream.write_all(format!("{query}\r\n").as_bytes()))
            .await
            .map_err(|_| WhoisError::Timeout {
                server: server.to_string(),
            })?
            .map_err(io_err)?;

        let mut response = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match timeout(limit, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    let room = MAX_RESPONSE_BYTES - response.len();
                    response.extend_from_slice(&buf[..n.min(room)]);
                    if response.len() >= MAX_RESPONSE_BYTES {
                        warn!(server = %server, "WHOIS response hit the size cap");
                        break;
                    }
                }
                Ok(Err(source)) => return Err(io_err(source)),
                // A stalled server that already sent something keeps its data.
                Err(_) if !response.is_empty() => break,
                Err(_) => {
                    return Err(WhoisError::Timeout {
                        server: server.to_string(),
                    })
                }
            }
        }

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

/// Finds the `refer:` server in a root registry response.
pub fn extract_referral(response: &str) -> Option<String> {
    REFERRAL
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|server| !server.is_empty())
}

/// Caps `text` at `max` characters for display, appending a marker when cut.
pub fn truncate_for_display(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
