// src/model/snapshot.rs

//! Captured application snapshots
//!
//! A [`FullSnapshot`] is built fresh from the snapshot store for every
//! restore and owns at most one custom component, any number of Helm
//! releases and any number of operator instances.

use super::{ComponentMetadata, ObjectReference, Resource, Status};
use crate::helm::Release;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pod and the containers in it that mount a volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodContainers {
    #[serde(default)]
    pub pod_name: String,
    #[serde(default)]
    pub containers: Vec<String>,
}

/// Position of a volume backup in its backup chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupType {
    Full,
    Incremental,
    Mixed,
}

/// A condition recorded while backing up or restoring a volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phase: String,
}

/// CSI snapshot of a persistent volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot: Option<ObjectReference>,
    #[serde(default)]
    pub retry_count: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// One persistent volume's captured state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_type: Option<BackupType>,
    /// Path of the volume image, relative to the snapshot root
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    pub persistent_volume_claim_name: String,
    /// Raw PVC body
    pub persistent_volume_claim_metadata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot: Option<VolumeSnapshotRef>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snapshot_size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(default)]
    pub uploaded: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pod_containers_map: Vec<PodContainers>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl DataSnapshot {
    /// Minimal data snapshot for a PVC body
    pub fn new(pvc_name: impl Into<String>, pvc_metadata: impl Into<String>) -> Self {
        Self {
            persistent_volume_claim_name: pvc_name.into(),
            persistent_volume_claim_metadata: pvc_metadata.into(),
            ..Default::default()
        }
    }
}

/// Backend a Helm release stores its revisions in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelmStorageBackend {
    #[default]
    Secret,
    ConfigMap,
}

impl HelmStorageBackend {
    /// Kind of the storage object holding release revisions
    pub fn kind(&self) -> &'static str {
        match self {
            HelmStorageBackend::Secret => "Secret",
            HelmStorageBackend::ConfigMap => "ConfigMap",
        }
    }
}

impl fmt::Display for HelmStorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Helm major version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelmVersion {
    #[default]
    #[serde(rename = "v3")]
    V3,
}

impl fmt::Display for HelmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelmVersion::V3 => write!(f, "v3"),
        }
    }
}

/// Snapshot of a single Helm release
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelmSnapshot {
    pub release: String,
    /// Name the release is restored under; generated when empty
    pub new_release: String,
    pub revision: i32,
    pub storage_backend: HelmStorageBackend,
    pub version: HelmVersion,
    /// Release storage objects, one raw body per captured revision
    pub metadata: ComponentMetadata,
    /// Resources rendered by the release
    pub release_resources: Vec<ComponentMetadata>,
    pub data_snapshots: Vec<DataSnapshot>,
    pub warnings: Vec<String>,
    /// Re-rendered release after a release-level transform
    pub rendered: Option<Release>,
}

/// Snapshot of one operator instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSnapshot {
    pub operator_id: String,
    /// Raw CRD bodies owned by the operator
    pub crd_metadata: Vec<String>,
    /// Instances of the operator's custom resources
    pub custom_resources: Vec<ComponentMetadata>,
    /// Resources that make up the operator itself
    pub operator_resources: Vec<ComponentMetadata>,
    /// Helm release the operator was installed with, if any
    pub helm: Option<HelmSnapshot>,
    pub data_snapshots: Vec<DataSnapshot>,
    pub warnings: Vec<String>,
}

/// Snapshot of label-selected resources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomSnapshot {
    pub resources: Vec<ComponentMetadata>,
    pub data_snapshots: Vec<DataSnapshot>,
    pub warnings: Vec<String>,
}

/// Everything captured for one application backup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullSnapshot {
    pub custom: Option<CustomSnapshot>,
    pub helm: Vec<HelmSnapshot>,
    pub operators: Vec<OperatorSnapshot>,
}

impl FullSnapshot {
    /// True when the snapshot holds no component at all
    pub fn is_empty(&self) -> bool {
        self.custom.is_none() && self.helm.is_empty() && self.operators.is_empty()
    }
}

/// Name-only report of a custom component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_snapshots: Vec<DataSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Name-only report of a Helm release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmReport {
    pub release: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub new_release: String,
    pub revision: i32,
    /// The release storage objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    pub storage_backend: HelmStorageBackend,
    pub version: HelmVersion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_snapshots: Vec<DataSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Name-only report of an operator instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorReport {
    pub operator_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<HelmReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operator_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_snapshots: Vec<DataSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Name-only report of a whole snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub helm_charts: Vec<HelmReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomReport>,
}
