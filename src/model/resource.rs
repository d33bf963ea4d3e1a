// src/model/resource.rs

//! Captured resource bodies and their name-only report form

use super::GroupVersionKind;
use serde::{Deserialize, Serialize};

/// Names of every captured object of one GVK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub group_version_kind: GroupVersionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,
}

impl Resource {
    pub fn new(gvk: GroupVersionKind, objects: Vec<String>) -> Self {
        Self {
            group_version_kind: gvk,
            objects,
        }
    }
}

/// Raw object bodies (JSON or YAML) of one GVK captured during backup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub group_version_kind: GroupVersionKind,
    #[serde(default)]
    pub metadata: Vec<String>,
}

impl ComponentMetadata {
    pub fn new(gvk: GroupVersionKind, metadata: Vec<String>) -> Self {
        Self {
            group_version_kind: gvk,
            metadata,
        }
    }

    /// True when no objects were captured
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}
