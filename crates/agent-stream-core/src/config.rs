//! Connection configuration.

use serde::{Deserialize, Serialize};

/// Environment variable holding the default base address.
pub const BASE_ADDRESS_ENV: &str = "AGENT_STREAM_BASE_ADDRESS";
/// Environment variable holding a session id to resume.
pub const SESSION_ID_ENV: &str = "AGENT_STREAM_SESSION_ID";
/// Base address used when the environment provides none.
pub const DEFAULT_BASE_ADDRESS: &str = "/api/agent";

/// Where to connect and which session to join.
///
/// Immutable per connection attempt; changing it means reconnecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Absolute `http(s)`/`ws(s)` URL or an origin-relative path.
    pub base_address: String,
    /// Empty means "create a new session".
    #[serde(default)]
    pub session_id: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS.to_string(),
            session_id: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Create a config for a new session at `base_address`.
    #[must_use]
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
            session_id: String::new(),
        }
    }

    /// Read defaults from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup(BASE_ADDRESS_ENV).filter(|v| !v.is_empty()) {
            config.base_address = base;
        }
        if let Some(id) = lookup(SESSION_ID_ENV) {
            config.session_id = id;
        }
        config
    }

    /// Session id to resume, if any.
    #[must_use]
    pub fn session(&self) -> Option<&str> {
        Some(self.session_id.as_str()).filter(|id| !id.is_empty())
    }

    /// Top-level merge: every field set in `patch` replaces ours.
    #[must_use]
    pub fn merged(mut self, patch: ConfigOverride) -> Self {
        if let Some(base_address) = patch.base_address {
            self.base_address = base_address;
        }
        if let Some(session_id) = patch.session_id {
            self.session_id = session_id;
        }
        self
    }
}

/// Partial config passed to `connect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ConfigOverride {
    #[must_use]
    pub fn base_address(base_address: impl Into<String>) -> Self {
        Self {
            base_address: Some(base_address.into()),
            session_id: None,
        }
    }

    #[must_use]
    pub fn session_id(session_id: impl Into<String>) -> Self {
        Self {
            base_address: None,
            session_id: Some(session_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_merge_replaces_only_set_fields() {
        let base = ConnectionConfig {
            base_address: "https://agent.example".into(),
            session_id: "abc".into(),
        };

        let merged = base.clone().merged(ConfigOverride::session_id(""));
        assert_eq!(merged.base_address, "https://agent.example");
        assert_eq!(merged.session(), None);

        let merged = base.clone().merged(ConfigOverride::default());
        assert_eq!(merged, base);

        let merged = base.merged(ConfigOverride::base_address("/other"));
        assert_eq!(merged.base_address, "/other");
        assert_eq!(merged.session(), Some("abc"));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> =
            HashMap::from([(BASE_ADDRESS_ENV, "http://h:1/x"), (SESSION_ID_ENV, "s1")]);
        let config = ConnectionConfig::from_lookup(|k| env.get(k).map(ToString::to_string));
        assert_eq!(config.base_address, "http://h:1/x");
        assert_eq!(config.session(), Some("s1"));

        let config = ConnectionConfig::from_lookup(|_| None);
        assert_eq!(config, ConnectionConfig::default());
        assert_eq!(config.base_address, DEFAULT_BASE_ADDRESS);
    }

    #[test]
    fn test_override_deserializes_partially() {
        let patch: ConfigOverride = serde_json::from_str(r#"{"session_id":"s9"}"#).unwrap();
        assert_eq!(patch, ConfigOverride::session_id("s9"));
    }
}
