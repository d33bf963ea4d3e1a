// src/lib.rs

//! appsnap: snapshot transform and hook-target resolution
//!
//! Restores of composite cluster applications (Helm releases, operator
//! instances and label-selected resources) start from a captured snapshot
//! tree. This crate reads and writes that tree, rewrites captured metadata
//! before it is restored, and works out which live pods must run pre/post
//! hooks and in what order.
//!
//! # Architecture
//!
//! - Snapshot store: [`store::push`] / [`store::pull`] over a path-addressed
//!   [`store::PathStore`]
//! - Transform engine: [`transform::transform_snapshot`] applies JSON patches
//!   with dry-run validation, honours exclusions and persists status with
//!   optimistic-concurrency retry
//! - Hook resolution: [`hook::HookResolver`] resolves pods and workloads and
//!   buckets hooks into priority slots
//! - Helm support: latest revision selection, unique release naming and
//!   value overrides in [`helm`]
//!
//! The live cluster is never reached directly; callers provide the
//! collaborator traits in [`cluster`] and [`helm`].

pub mod cluster;
pub mod component;
pub mod config;
mod error;
pub mod helm;
pub mod hook;
pub mod model;
pub mod store;
pub mod transform;

pub use cluster::{ClusterClient, ClusterError, HookLookup, StatusClient};
pub use component::{Component, ComponentReport, SnapshotComponent};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use helm::{ReleaseRenderer, ReleaseStorage};
pub use hook::HookResolver;
pub use model::{FullSnapshot, GroupVersionKind, Restore};
pub use store::{LocalStore, PathStore};
pub use transform::{ExcludePolicy, TransformContext, transform_snapshot};
