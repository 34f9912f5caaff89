use libsibir_trace::{PlatformEntry, PlatformRegistry, ProbeConfig, WhoisConfig};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub whois: WhoisSection,
    #[serde(default)]
    pub platforms: PlatformsSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WhoisSection {
    pub root_server: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PlatformsSection {
    #[serde(default)]
    pub extra: Vec<PlatformEntry>,
    #[serde(default)]
    pub skip: Vec<String>,
}

impl Config {
    pub fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::default();
        if let Some(secs) = self.http.timeout_secs.filter(|s| *s > 0) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = self.http.user_agent.as_ref().filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent.clone();
        }
        config
    }

    pub fn whois_config(&self) -> WhoisConfig {
        let mut config = WhoisConfig::default();
        if let Some(root) = self.whois.root_server.as_ref().filter(|r| !r.trim().is_empty()) {
            config.root_server = root.trim().to_lowercase();
        }
        if let Some(secs) = self.whois.timeout_secs.filter(|s| *s > 0) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Default platforms minus `skip`, followed by `extra`.
    pub fn registry(&self) -> PlatformRegistry {
        let mut registry = PlatformRegistry::default();
        for name in &self.platforms.skip {
            registry.remove(name);
        }
        for entry in &self.platforms.extra {
            registry.push(entry.clone());
        }
        registry
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sibir").join("config.toml"))
}

pub fn load_config(explicit: Option<&Path>) -> Config {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(config_path) else {
        return Config::default();
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
            Config::default()
        }
    }
}

pub fn default_config_toml() -> String {
    r#"# SibirTrace (sibir) Configuration

[http]
# Per-request timeout for presence checks and JSON lookups
# timeout_secs = 10
# user_agent = "Mozilla/5.0 ..."

[whois]
# root_server = "whois.iana.org"
# Applies to each connect, write and read
# timeout_secs = 8

[platforms]
# Extra platforms, checked after the built-in ones. {u} is the username.
# extra = [{ name = "GitLab", url = "https://gitlab.com/{u}" }]
extra = []

# Built-in platforms to leave out
# skip = ["TikTok"]
skip = []
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_parses_and_changes_nothing() {
        let config: Config = toml::from_str(&default_config_toml()).unwrap();
        assert_eq!(config.registry(), PlatformRegistry::default());
        assert_eq!(config.probe_config().timeout, Duration::from_secs(10));
        assert_eq!(config.whois_config().root_server, "whois.iana.org");
    }

    #[test]
    fn skip_and_extra_reshape_the_registry() {
        let config: Config = toml::from_str(
            r#"
[platforms]
skip = ["tiktok", "Steam"]
extra = [{ name = "GitLab", url = "https://gitlab.com/{u}" }]
"#,
        )
        .unwrap();

        let names: Vec<_> = config.registry().iter().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            [
                "GitHub", "Twitter", "Reddit", "Instagram", "Twitch", "YouTube", "Spotify",
                "GitLab"
            ]
        );
    }

    #[test]
    fn timeouts_and_root_are_overridable() {
        let config: Config = toml::from_str(
            r#"
[http]
timeout_secs = 4
user_agent = "sibir-test"

[whois]
root_server = " WHOIS.Example.Test "
timeout_secs = 3
"#,
        )
        .unwrap();

        let probe = config.probe_config();
        assert_eq!(probe.timeout, Duration::from_secs(4));
        assert_eq!(probe.user_agent, "sibir-test");
        let whois = config.whois_config();
        assert_eq!(whois.root_server, "whois.example.test");
        assert_eq!(whois.timeout, Duration::from_secs(3));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http\ntimeout_secs = ").unwrap();

        let config = load_config(Some(file.path()));
        assert_eq!(config.registry(), PlatformRegistry::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml")));
        assert!(config.platforms.extra.is_empty());
    }
}
