//! Meeting URL construction and hash-fragment configuration overrides.
//!
//! Configuration of the application under test happens entirely through
//! parameters appended to the meeting URL. The harness treats the mapping
//! as opaque; keys and values are application-defined. Overrides only take
//! effect at page load, which is why [`crate::fixture::ConferenceFixture`]
//! restarts a session rather than mutating a live one.

use serde::{Deserialize, Serialize};

/// Environment variable holding the base meeting URL for live-browser runs
pub const MEETING_URL_ENV: &str = "REUNIR_MEETING_URL";

/// Default room name when none is configured
pub const DEFAULT_ROOM: &str = "reunir-regression";

/// Ordered string-to-string mapping appended to the meeting URL.
///
/// Insertion order is preserved so generated URLs are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlOverrides {
    pairs: Vec<(String, String)>,
}

impl UrlOverrides {
    /// Create an empty override set (the baseline configuration)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override, replacing any existing value for the key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key, value));
        }
        self
    }

    /// Look up an override value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of overrides
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate over key/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the `key=value&key=value` fragment of a meeting URL.
    ///
    /// Pairs without an `=` are ignored.
    #[must_use]
    pub fn parse_fragment(fragment: &str) -> Self {
        let mut overrides = Self::new();
        for pair in fragment.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                overrides = overrides.with(key, value);
            }
        }
        overrides
    }
}

impl std::fmt::Display for UrlOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, "&")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Base meeting location: server URL plus room name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingConfig {
    /// Conferencing server URL, without a trailing slash
    pub base_url: String,
    /// Room to join
    pub room: String,
}

impl MeetingConfig {
    /// Create a config for the given server and room
    #[must_use]
    pub fn new(base_url: impl Into<String>, room: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            room: room.into(),
        }
    }

    /// Read the base URL from `REUNIR_MEETING_URL` (live-browser runs)
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(MEETING_URL_ENV)
            .ok()
            .map(|url| Self::new(url, DEFAULT_ROOM))
    }

    /// Build the full meeting URL with overrides appended.
    ///
    /// Overrides travel in the URL fragment so that reloading with different
    /// values is always detected by the application.
    #[must_use]
    pub fn meeting_url(&self, overrides: &UrlOverrides) -> String {
        if overrides.is_empty() {
            format!("{}/{}", self.base_url, self.room)
        } else {
            format!("{}/{}#{}", self.base_url, self.room, overrides)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod overrides_tests {
        use super::*;

        #[test]
        fn test_empty_overrides() {
            let overrides = UrlOverrides::new();
            assert!(overrides.is_empty());
            assert_eq!(overrides.to_string(), "");
        }

        #[test]
        fn test_display_joins_pairs_in_order() {
            let overrides = UrlOverrides::new()
                .with("config.disable1On1Mode", "false")
                .with("interfaceConfig.TOOLBAR_TIMEOUT", "250");
            assert_eq!(
                overrides.to_string(),
                "config.disable1On1Mode=false&interfaceConfig.TOOLBAR_TIMEOUT=250"
            );
        }

        #[test]
        fn test_with_replaces_existing_key() {
            let overrides = UrlOverrides::new()
                .with("config.startAudioOnly", "false")
                .with("config.startAudioOnly", "true");
            assert_eq!(overrides.len(), 1);
            assert_eq!(overrides.get("config.startAudioOnly"), Some("true"));
        }

        #[test]
        fn test_parse_fragment_round_trip() {
            let original = UrlOverrides::new()
                .with("config.disable1On1Mode", "false")
                .with("config.alwaysVisibleToolbar", "false");
            let parsed = UrlOverrides::parse_fragment(&original.to_string());
            assert_eq!(parsed, original);
        }

        #[test]
        fn test_parse_fragment_skips_malformed_pairs() {
            let parsed = UrlOverrides::parse_fragment("a=1&garbage&b=2");
            assert_eq!(parsed.len(), 2);
            assert_eq!(parsed.get("a"), Some("1"));
            assert_eq!(parsed.get("b"), Some("2"));
        }

        proptest! {
            #[test]
            fn prop_display_contains_every_pair(
                keys in proptest::collection::vec("[a-zA-Z.]{1,12}", 1..5),
                value in "[a-z0-9]{1,8}",
            ) {
                let mut overrides = UrlOverrides::new();
                for key in &keys {
                    overrides = overrides.with(key.clone(), value.clone());
                }
                let rendered = overrides.to_string();
                for (key, val) in overrides.iter() {
                    let pair = format!("{key}={val}");
                    prop_assert!(rendered.contains(&pair));
                }
                prop_assert_eq!(
                    rendered.matches('&').count(),
                    overrides.len().saturating_sub(1)
                );
            }
        }
    }

    mod meeting_config_tests {
        use super::*;

        #[test]
        fn test_meeting_url_without_overrides_has_no_fragment() {
            let config = MeetingConfig::new("https://meet.example", "room1");
            assert_eq!(
                config.meeting_url(&UrlOverrides::new()),
                "https://meet.example/room1"
            );
        }

        #[test]
        fn test_meeting_url_appends_fragment() {
            let config = MeetingConfig::new("https://meet.example/", "room1");
            let overrides = UrlOverrides::new().with("config.disable1On1Mode", "false");
            assert_eq!(
                config.meeting_url(&overrides),
                "https://meet.example/room1#config.disable1On1Mode=false"
            );
        }

        #[test]
        fn test_trailing_slashes_trimmed() {
            let config = MeetingConfig::new("https://meet.example//", "r");
            assert_eq!(config.base_url, "https://meet.example");
        }
    }
}
