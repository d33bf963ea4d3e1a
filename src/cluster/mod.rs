// src/cluster/mod.rs

//! Live cluster collaborators
//!
//! The engine never talks to the cluster API directly. Callers supply
//! implementations of the traits here; objects cross the boundary as
//! unstructured JSON values.
//!
//! - [`ClusterClient`]: get, list and dry-run apply
//! - [`HookLookup`]: hook definition lookup
//! - [`StatusClient`]: optimistic-concurrency status persistence, driven by
//!   [`update_status_with_retry`]

mod object;
mod owner;
mod retry;

pub use object::{
    ObjectMeta, OwnerReference, container_names, object_gvk, object_meta, owner_selector,
    parse_object,
};
pub use owner::find_top_owner;
pub use retry::{StatusClient, update_status_with_retry};

use crate::model::{GroupVersionKind, Hook, LabelSelector};
use serde_json::Value;
use thiserror::Error;

/// Errors reported by cluster collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// Object does not exist
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    /// Write lost an optimistic-concurrency race
    #[error("conflict: {0}")]
    Conflict(String),

    /// Dry-run rejected the object
    #[error("dry-run rejected: {0}")]
    DryRun(String),

    /// Any other API failure
    #[error("api error: {0}")]
    Api(String),
}

impl ClusterError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        ClusterError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClusterError::Conflict(_))
    }
}

/// Read access and dry-run validation against the live cluster
pub trait ClusterClient {
    /// Fetch one object
    fn get(&self, namespace: &str, name: &str, gvk: &GroupVersionKind) -> Result<Value, ClusterError>;

    /// List objects of a GVK in a namespace, optionally filtered by labels
    fn list(
        &self,
        namespace: &str,
        gvk: &GroupVersionKind,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<Value>, ClusterError>;

    /// Validate an object server-side without persisting it
    fn dry_run_apply(&self, namespace: &str, gvk: &GroupVersionKind, object: &Value) -> Result<(), ClusterError>;
}

/// Hook definition lookup
pub trait HookLookup {
    fn get_hook(&self, name: &str, namespace: &str) -> Result<Hook, ClusterError>;
}

/// GVK of pods
pub fn pod_gvk() -> GroupVersionKind {
    GroupVersionKind::new("", "v1", "Pod")
}
