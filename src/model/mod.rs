// src/model/mod.rs

//! Shared value types for captured application snapshots
//!
//! These types carry no behaviour beyond parsing and (de)serialization.
//! JSON field names follow the persisted status shapes (camelCase).

mod gvk;
mod hook;
mod resource;
mod restore;
mod snapshot;
mod status;

pub use gvk::{GroupVersionKind, GvkParseError};
pub use hook::{
    ContainerHookStatus, ExecAction, Hook, HookComponentStatus, HookConfig, HookConfiguration,
    HookExecution, HookInfo, HookPriority, HookPriorityStatus, HookSpec, HookTarget,
    LabelSelector, LabelSelectorRequirement, Mode, ObjectReference, Owner, PodHookStatus,
    PodSelector, PrePostHookStatus, SelectorOperator,
};
pub use resource::{ComponentMetadata, Resource};
pub use restore::{
    CustomTransform, HelmTransform, KeyValue, PatchOp, Restore, RestoreSpec, RestoreStatus,
    TransformComponents,
};
pub use snapshot::{
    BackupType, Condition, CustomReport, CustomSnapshot, DataSnapshot, FullSnapshot, HelmReport,
    HelmSnapshot, HelmStorageBackend, HelmVersion, OperatorReport, OperatorSnapshot,
    PodContainers, SnapshotReport, VolumeSnapshotRef,
};
pub use status::{
    ComponentStatus, RestoreApplication, RestoreCustom, RestoreHelm, RestoreOperator,
    RestorePhase, Status, TransformStatus,
};
