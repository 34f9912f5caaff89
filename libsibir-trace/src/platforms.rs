use serde::{Deserialize, Serialize};

/// Placeholder substituted with the username in every URL template.
pub const USERNAME_SLOT: &str = "{u}";

const DEFAULT_PLATFORMS: &[(&str, &str)] = &[
    ("GitHub", "https://github.com/{u}"),
    ("Twitter", "https://x.com/{u}"),
    ("Reddit", "https://www.reddit.com/user/{u}"),
    ("TikTok", "https://www.tiktok.com/@{u}"),
    ("Instagram", "https://www.instagram.com/{u}"),
    ("Twitch", "https://www.twitch.tv/{u}"),
    ("Steam", "https://steamcommunity.com/id/{u}"),
    ("YouTube", "https://www.youtube.com/@{u}"),
    ("Spotify", "https://open.spotify.com/user/{u}"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub name: String,
    #[serde(rename = "url")]
    pub url_template: String,
}

impl PlatformEntry {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// The username goes in verbatim; upstream URL rules decide what is valid.
    pub fn url_for(&self, username: &str) -> String {
        self.url_template.replace(USERNAME_SLOT, username)
    }
}

/// Ordered set of platforms. Insertion order is the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRegistry {
    entries: Vec<PlatformEntry>,
}

impl PlatformRegistry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = Self::empty();
        for (name, template) in pairs {
            registry.push(PlatformEntry::new(name, template));
        }
        registry
    }

    /// Appends `entry`, or replaces the entry of the same name where it stands.
    pub fn push(&mut self, entry: PlatformEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(&entry.name))
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PlatformEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&PlatformEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_PLATFORMS.iter().copied())
    }
}

impl<'a> IntoIterator for &'a PlatformRegistry {
    type Item = &'a PlatformEntry;
    type IntoIter = std::slice::Iter<'a, PlatformEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_keeps_display_order() {
        let registry = PlatformRegistry::default();
        let names: Vec<_> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "GitHub", "Twitter", "Reddit", "TikTok", "Instagram", "Twitch", "Steam",
                "YouTube", "Spotify"
            ]
        );
    }

    #[test]
    fn username_is_substituted_verbatim() {
        let entry = PlatformEntry::new("TikTok", "https://www.tiktok.com/@{u}");
        assert_eq!(entry.url_for("some.user_1"), "https://www.tiktok.com/@some.user_1");
        assert_eq!(entry.url_for("a b"), "https://www.tiktok.com/@a b");
    }

    #[test]
    fn push_replaces_existing_name_in_place() {
        let mut registry = PlatformRegistry::from_pairs([
            ("A", "https://a.test/{u}"),
            ("B", "https://b.test/{u}"),
        ]);
        registry.push(PlatformEntry::new("a", "https://new-a.test/{u}"));

        assert_eq!(registry.len(), 2);
        let first = registry.iter().next().unwrap();
        assert_eq!(first.url_template, "https://new-a.test/{u}");
    }

    #[test]
    fn remove_is_case_insensitive() {
        let mut registry = PlatformRegistry::default();
        let removed = registry.remove("tiktok").unwrap();
        assert_eq!(removed.name, "TikTok");
        assert_eq!(registry.len(), 8);
        assert!(registry.get("TikTok").is_none());
        assert!(registry.remove("tiktok").is_none());
    }
}
