use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresenceState {
    Found,
    NotFound,
    /// `code` is the raw HTTP status, or 0 when no response was obtained.
    Unknown { code: u16 },
}

impl PresenceState {
    pub fn is_found(&self) -> bool {
        matches!(self, PresenceState::Found)
    }

    pub fn is_no_response(&self) -> bool {
        matches!(self, PresenceState::Unknown { code: 0 })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub platform: String,
    pub url: String,
    pub outcome: PresenceState,
    pub raw_status: u16,
    pub errored: bool,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
