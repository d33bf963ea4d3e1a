// src/model/gvk.rs

//! Group/Version/Kind identifiers for captured resources
//!
//! The textual form follows the cluster convention:
//! `group/version, Kind=Kind` (core group: `version, Kind=Kind`).
//!
//! Examples:
//! - `v1, Kind=ConfigMap`
//! - `apps/v1, Kind=Deployment`
//! - `batch/v1,Kind=CronJob` (compact form is accepted on input)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully-qualified resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersionKind {
    /// API group, empty for the core group
    #[serde(default)]
    pub group: String,
    /// API version within the group
    pub version: String,
    /// Resource kind
    pub kind: String,
}

impl GroupVersionKind {
    /// Create a new GVK
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Build from an object's `apiVersion` and `kind` fields
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.rsplit_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// The core `v1, Kind=PersistentVolumeClaim` type used for data snapshots
    pub fn persistent_volume_claim() -> Self {
        Self::new("", "v1", "PersistentVolumeClaim")
    }

    /// Parse from `group/version, Kind=Kind`
    pub fn parse(s: &str) -> Result<Self, GvkParseError> {
        let (api_version, kind_part) = s
            .split_once(',')
            .ok_or_else(|| GvkParseError::MissingKind(s.to_string()))?;

        let kind = kind_part
            .trim()
            .strip_prefix("Kind=")
            .ok_or_else(|| GvkParseError::MissingKind(s.to_string()))?
            .trim();
        if kind.is_empty() {
            return Err(GvkParseError::EmptyKind(s.to_string()));
        }

        let api_version = api_version.trim().trim_start_matches('/');
        if api_version.is_empty() {
            return Err(GvkParseError::EmptyVersion(s.to_string()));
        }

        let gvk = Self::from_api_version(api_version, kind);
        if gvk.version.is_empty() || gvk.version.contains(char::is_whitespace) {
            return Err(GvkParseError::InvalidVersion(s.to_string()));
        }
        Ok(gvk)
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

impl FromStr for GroupVersionKind {
    type Err = GvkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupVersionKind::parse(s)
    }
}

/// Errors that can occur when parsing a GVK string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GvkParseError {
    /// Missing `, Kind=` part
    MissingKind(String),
    /// Empty kind after `Kind=`
    EmptyKind(String),
    /// Empty group/version part
    EmptyVersion(String),
    /// Malformed version
    InvalidVersion(String),
}

impl fmt::Display for GvkParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GvkParseError::MissingKind(s) => write!(f, "Missing ', Kind=' in GVK: {}", s),
            GvkParseError::EmptyKind(s) => write!(f, "Empty kind in GVK: {}", s),
            GvkParseError::EmptyVersion(s) => write!(f, "Empty version in GVK: {}", s),
            GvkParseError::InvalidVersion(s) => write!(f, "Invalid version in GVK: {}", s),
        }
    }
}

impl std::error::Error for GvkParseError {}
