// src/config.rs
//! Engine configuration
//!
//! All tunables live in a single [`EngineConfig`] that callers pass into the
//! transform and hook entry points. It can be loaded from TOML:
//!
//! ```toml
//! default_ignore = ["v1, Kind=Event", "apps/v1, Kind=ControllerRevision"]
//! release_name_attempts = 5
//!
//! [status_update]
//! max_attempts = 5
//! backoff_ms = 10
//! ```

use crate::error::{Error, Result};
use crate::model::GroupVersionKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Kinds that are never restored unless the restore disables default ignores
pub const DEFAULT_IGNORED_KINDS: &[&str] = &[
    "v1, Kind=Event",
    "events.k8s.io/v1, Kind=Event",
    "v1, Kind=Endpoints",
    "discovery.k8s.io/v1, Kind=EndpointSlice",
    "apps/v1, Kind=ControllerRevision",
    "coordination.k8s.io/v1, Kind=Lease",
    "v1, Kind=Node",
];

/// Status persistence retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusUpdateConfig {
    /// Attempts at the read-latest/merge-patch cycle before overwriting
    pub max_attempts: u32,
    /// Base delay, doubled on every conflict
    pub backoff_ms: u64,
}

impl Default for StatusUpdateConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_ms: 10,
        }
    }
}

impl StatusUpdateConfig {
    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// GVKs skipped during restore, in `group/version, Kind=Kind` form
    pub default_ignore: Vec<String>,

    /// Status persistence retry behaviour
    pub status_update: StatusUpdateConfig,

    /// Candidate names probed before giving up on a unique release name
    pub release_name_attempts: u32,

    /// Number of trailing characters replaced when generating a release name
    pub release_name_suffix_len: usize,

    /// Maximum owner-reference hops followed from a pod
    pub max_owner_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_ignore: DEFAULT_IGNORED_KINDS.iter().map(|s| s.to_string()).collect(),
            status_update: StatusUpdateConfig::default(),
            release_name_attempts: 5,
            release_name_suffix_len: 4,
            max_owner_depth: 16,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that would make the engine loop zero times
    pub fn validate(&self) -> Result<()> {
        if self.status_update.max_attempts == 0 {
            return Err(Error::Config("status_update.max_attempts must be at least 1".into()));
        }
        if self.release_name_attempts == 0 {
            return Err(Error::Config("release_name_attempts must be at least 1".into()));
        }
        if self.release_name_suffix_len == 0 || self.release_name_suffix_len > 64 {
            return Err(Error::Config("release_name_suffix_len must be between 1 and 64".into()));
        }
        if self.max_owner_depth == 0 {
            return Err(Error::Config("max_owner_depth must be at least 1".into()));
        }
        self.default_ignore_set().map(|_| ())
    }

    /// Parsed default-ignore list
    pub fn default_ignore_set(&self) -> Result<HashSet<GroupVersionKind>> {
        self.default_ignore
            .iter()
            .map(|s| {
                s.parse::<GroupVersionKind>()
                    .map_err(|e| Error::Config(format!("default_ignore entry {:?}: {}", s, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        let ignored = config.default_ignore_set().unwrap();
        assert!(ignored.contains(&GroupVersionKind::new("", "v1", "Event")));
        assert!(ignored.contains(&GroupVersionKind::new("apps", "v1", "ControllerRevision")));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EngineConfig::from_toml_str(
            r#"
            release_name_attempts = 3

            [status_update]
            max_attempts = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.release_name_attempts, 3);
        assert_eq!(config.status_update.max_attempts, 2);
        assert_eq!(config.status_update.backoff_ms, 10);
        assert_eq!(config.max_owner_depth, 16);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = EngineConfig::from_toml_str("release_name_attempts = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_bad_ignore_entry() {
        let err = EngineConfig::from_toml_str(r#"default_ignore = ["not a gvk"]"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = StatusUpdateConfig { max_attempts: 5, backoff_ms: 100 };
        assert_eq!(retry.backoff(0), Duration::from_millis(100));
        assert_eq!(retry.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "max_owner_depth = 4\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_owner_depth, 4);
    }
}
