use crate::lookup::{fetch_json, LookupError, LOOKUP_TIMEOUT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct RawProfile {
    message: Option<String>,
    login: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    followers: Option<u64>,
    following: Option<u64>,
    public_repos: Option<u64>,
    created_at: Option<String>,
    html_url: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubProfile {
    pub login: String,
    /// Display name, or the login when none is set.
    pub name: String,
    pub bio: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub created_at: Option<String>,
    pub html_url: String,
    pub avatar_url: Option<String>,
}

impl GithubProfile {
    fn from_raw(user: &str, raw: RawProfile) -> Self {
        let login = raw.login.unwrap_or_else(|| user.to_string());
        Self {
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| login.clone()),
            bio: raw.bio.filter(|b| !b.trim().is_empty()),
            followers: raw.followers.unwrap_or(0),
            following: raw.following.unwrap_or(0),
            public_repos: raw.public_repos.unwrap_or(0),
            created_at: raw.created_at,
            html_url: raw
                .html_url
                .unwrap_or_else(|| format!("https://github.com/{user}")),
            avatar_url: raw.avatar_url,
            login,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GITHUB_API_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user: &str) -> Result<GithubProfile, LookupError> {
        let url = format!("{}/users/{}", self.base_url, user);
        let raw: RawProfile = match fetch_json(&self.client, &url, LOOKUP_TIMEOUT).await {
            Ok(raw) => raw,
            Err(LookupError::Status(code)) => {
                debug!(status = code, "GitHub profile unavailable");
                return Err(LookupError::NotFound);
            }
            Err(e) => return Err(e),
        };

        // The API reports errors such as rate limiting through `message`.
        if raw.message.is_some() {
            return Err(LookupError::NotFound);
        }
        Ok(GithubProfile::from_raw(user, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back() {
        let raw: RawProfile = serde_json::from_str(r#"{"login": "octo"}"#).unwrap();
        let profile = GithubProfile::from_raw("octo", raw);
        assert_eq!(profile.name, "octo");
        assert_eq!(profile.bio, None);
        assert_eq!(profile.followers, 0);
        assert_eq!(profile.html_url, "https://github.com/octo");
    }

    #[test]
    fn blank_name_uses_login() {
        let raw: RawProfile =
            serde_json::from_str(r#"{"login": "Octo", "name": "  ", "bio": ""}"#).unwrap();
        let profile = GithubProfile::from_raw("octo", raw);
        assert_eq!(profile.name, "Octo");
        assert_eq!(profile.bio, None);
    }
}
