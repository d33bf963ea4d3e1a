// src/model/restore.rs

//! Restore request: transform rules, exclusions and hooks

use super::{HookComponentStatus, HookConfig, Resource, RestoreApplication, Status};
use serde::{Deserialize, Serialize};

/// Single RFC 6902 operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    /// One of test/add/remove/replace/copy/move
    pub op: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Patch rules for label-selected resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTransform {
    pub transform_name: String,
    /// Target GVK; an empty object list targets every object
    pub resources: Resource,
    pub json_patches: Vec<PatchOp>,
}

/// A `--set` style override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Value overrides for a Helm release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmTransform {
    pub transform_name: String,
    pub release: String,
    #[serde(default)]
    pub set: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformComponents {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub helm: Vec<HelmTransform>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomTransform>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSpec {
    pub restore_namespace: String,
    #[serde(default)]
    pub disable_ignore_resources: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_components: Option<TransformComponents>,
    /// An entry without objects excludes every object of its GVK
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_config: Option<HookConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_application: Option<RestoreApplication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_status: Option<HookComponentStatus>,
}

/// Restore object as seen by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restore {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub spec: RestoreSpec,
    #[serde(default)]
    pub status: RestoreStatus,
}
