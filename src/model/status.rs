// src/model/status.rs

//! Restore status shapes persisted on the restore object

use super::{CustomReport, HelmReport, OperatorReport, Resource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of an operation or component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Failed,
    Available,
    Unavailable,
    Error,
    Coalescing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "Pending",
            Status::InProgress => "InProgress",
            Status::Completed => "Completed",
            Status::Failed => "Failed",
            Status::Available => "Available",
            Status::Unavailable => "Unavailable",
            Status::Error => "Error",
            Status::Coalescing => "Coalescing",
        };
        write!(f, "{}", s)
    }
}

/// Phase a restore component is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestorePhase {
    Validation,
    DataRestore,
    MetadataRestore,
    PrimitiveMetadataRestore,
    Unquiesce,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestorePhase::Validation => "Validation",
            RestorePhase::DataRestore => "DataRestore",
            RestorePhase::MetadataRestore => "MetadataRestore",
            RestorePhase::PrimitiveMetadataRestore => "PrimitiveMetadataRestore",
            RestorePhase::Unquiesce => "Unquiesce",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one transform request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformStatus {
    pub transform_name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformed_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl TransformStatus {
    /// A completed status with nothing recorded yet
    pub fn new(transform_name: impl Into<String>) -> Self {
        Self {
            transform_name: transform_name.into(),
            status: Status::Completed,
            transformed_resources: Vec::new(),
            reason: String::new(),
        }
    }

    /// Mark failed and append a reason
    pub fn fail(&mut self, reason: &str) {
        self.status = Status::Failed;
        self.reason.push_str(reason);
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }
}

/// Restore result of one application component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    #[serde(rename = "existingResource", default, skip_serializing_if = "Vec::is_empty")]
    pub existing_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_resources_added: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform_status: Vec<TransformStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<RestorePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_status: Option<Status>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl ComponentStatus {
    /// Fresh status for the validation phase
    pub fn validation() -> Self {
        Self {
            phase: Some(RestorePhase::Validation),
            phase_status: Some(Status::InProgress),
            ..Default::default()
        }
    }

    /// Record a failure and its reason
    pub fn fail(&mut self, reason: impl AsRef<str>) {
        self.phase_status = Some(Status::Failed);
        if !self.reason.is_empty() {
            self.reason.push(' ');
        }
        self.reason.push_str(reason.as_ref());
    }

    pub fn is_failed(&self) -> bool {
        self.phase_status == Some(Status::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<CustomReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComponentStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreHelm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<HelmReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComponentStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOperator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<OperatorReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComponentStatus>,
}

/// Per-component restore results of an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreApplication {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub helm_charts: Vec<RestoreHelm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<RestoreOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<RestoreCustom>,
}

impl RestoreApplication {
    /// Names of every component whose status is Failed
    pub fn failed_components(&self) -> Vec<String> {
        let mut failed = Vec::new();
        if let Some(custom) = &self.custom {
            if custom.status.as_ref().is_some_and(ComponentStatus::is_failed) {
                failed.push("custom".to_string());
            }
        }
        for helm in &self.helm_charts {
            if helm.status.as_ref().is_some_and(ComponentStatus::is_failed) {
                let name = helm.snapshot.as_ref().map(|s| s.release.as_str()).unwrap_or("");
                failed.push(format!("helm/{}", name));
            }
        }
        for op in &self.operators {
            if op.status.as_ref().is_some_and(ComponentStatus::is_failed) {
                let id = op.snapshot.as_ref().map(|s| s.operator_id.as_str()).unwrap_or("");
                failed.push(format!("operator/{}", id));
            }
        }
        failed
    }
}
