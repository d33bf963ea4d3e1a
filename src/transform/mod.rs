// src/transform/mod.rs

//! Transform engine
//!
//! Rewrites captured metadata before restore:
//! - [`ExcludePolicy`] decides which objects are left out entirely
//! - [`transform_metadata`] applies JSON patches to captured objects of a GVK
//! - [`transform_data_snapshots`] does the same for PVC bodies and drops
//!   excluded PVCs
//! - [`transform_snapshot`] runs every component and persists the result
//!
//! Every patched object is validated with a server-side dry run before the
//! captured body is replaced. A failing object marks its request Failed but
//! never stops the rest of the batch.

mod app;
mod data;
mod meta;
mod patch;

pub use app::transform_snapshot;
pub use data::transform_data_snapshots;
pub use meta::transform_metadata;
pub use patch::{apply_patch, patch_and_validate};

use crate::cluster::{ClusterClient, object_meta, parse_object};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::helm::{ReleaseRenderer, ReleaseStorage, ReleaseTransformer};
use crate::model::{
    ComponentStatus, CustomTransform, GroupVersionKind, HelmTransform, Resource, RestoreSpec,
    TransformComponents, TransformStatus,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::warn;

/// Which captured objects are left out of a restore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludePolicy {
    pub disable_default_ignore: bool,
    pub default_ignore: HashSet<GroupVersionKind>,
    /// An empty name set excludes every object of the GVK
    pub explicit_excludes: HashMap<GroupVersionKind, BTreeSet<String>>,
}

/// Outcome of checking a GVK against an [`ExcludePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion<'a> {
    /// Every object is excluded
    All,
    /// Only the named objects are excluded
    Named(&'a BTreeSet<String>),
    None,
}

impl ExcludePolicy {
    /// Build from a restore spec and the configured default-ignore list
    pub fn from_restore(spec: &RestoreSpec, config: &EngineConfig) -> Result<Self> {
        let mut explicit_excludes: HashMap<GroupVersionKind, BTreeSet<String>> = HashMap::new();
        let mut exclude_all = HashSet::new();
        for res in &spec.exclude_resources {
            if res.objects.is_empty() {
                exclude_all.insert(res.group_version_kind.clone());
            } else {
                explicit_excludes
                    .entry(res.group_version_kind.clone())
                    .or_default()
                    .extend(res.objects.iter().cloned());
            }
        }
        // an entry without names wins over named entries for the same GVK
        for gvk in exclude_all {
            explicit_excludes.insert(gvk, BTreeSet::new());
        }

        Ok(Self {
            disable_default_ignore: spec.disable_ignore_resources,
            default_ignore: config.default_ignore_set()?,
            explicit_excludes,
        })
    }

    /// True when `gvk` is on the active default-ignore list
    pub fn ignores_by_default(&self, gvk: &GroupVersionKind) -> bool {
        !self.disable_default_ignore && self.default_ignore.contains(gvk)
    }

    pub fn exclusion(&self, gvk: &GroupVersionKind) -> Exclusion<'_> {
        if self.ignores_by_default(gvk) {
            return Exclusion::All;
        }
        match self.explicit_excludes.get(gvk) {
            Some(names) if names.is_empty() => Exclusion::All,
            Some(names) => Exclusion::Named(names),
            None => Exclusion::None,
        }
    }
}

/// Transform requests indexed the way the engine looks them up
#[derive(Debug, Clone, Default)]
pub struct TransformMaps {
    /// Custom transforms by target GVK, in declaration order
    pub custom: HashMap<GroupVersionKind, Vec<CustomTransform>>,
    /// Helm transforms by release name
    pub helm: HashMap<String, HelmTransform>,
}

impl TransformMaps {
    pub fn new(components: &TransformComponents) -> Self {
        let mut custom: HashMap<GroupVersionKind, Vec<CustomTransform>> = HashMap::new();
        for transform in &components.custom {
            custom
                .entry(transform.resources.group_version_kind.clone())
                .or_default()
                .push(transform.clone());
        }
        let helm = components
            .helm
            .iter()
            .map(|t| (t.release.clone(), t.clone()))
            .collect();
        Self { custom, helm }
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.helm.is_empty()
    }
}

/// Collaborators and settings shared by every transform in one restore
pub struct TransformContext<'a> {
    pub cluster: &'a dyn ClusterClient,
    pub releases: &'a dyn ReleaseStorage,
    pub renderer: &'a dyn ReleaseRenderer,
    pub config: &'a EngineConfig,
    /// Namespace objects are restored into
    pub namespace: &'a str,
    /// Location of the backup being restored
    pub backup_location: &'a str,
}

impl<'a> TransformContext<'a> {
    /// Collaborators for a release-level Helm transform
    pub fn release_transformer(&self) -> ReleaseTransformer<'a> {
        ReleaseTransformer {
            storage: self.releases,
            renderer: self.renderer,
            config: self.config,
            namespace: self.namespace,
            backup_location: self.backup_location,
        }
    }
}

/// Result of running transforms over one list of objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutcome {
    /// One entry per request that touched at least one object
    pub statuses: Vec<TransformStatus>,
    pub excluded: Vec<Resource>,
    pub any_failed: bool,
    /// Component-level errors that stopped a variant before its requests ran
    pub reasons: Vec<String>,
}

impl TransformOutcome {
    pub(crate) fn absorb(&mut self, other: TransformOutcome) {
        self.statuses.extend(other.statuses);
        self.excluded = crate::store::merge_resource_list(&self.excluded, &other.excluded);
        self.any_failed |= other.any_failed;
        self.reasons.extend(other.reasons);
    }

    /// Record an error that aborted a whole variant
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.any_failed = true;
        self.reasons.push(reason.into());
    }

    /// Fold into a component status
    pub fn apply_to(&self, status: &mut ComponentStatus) {
        status.transform_status.extend(self.statuses.iter().cloned());
        status.excluded_resources = crate::store::merge_resource_list(&status.excluded_resources, &self.excluded);
        if self.any_failed {
            let mut reason = String::from("transformation failed");
            for r in &self.reasons {
                reason.push_str(": ");
                reason.push_str(r);
            }
            status.fail(reason);
        }
    }
}

/// Name of a captured body, `None` when it cannot be parsed
pub(crate) fn object_name(body: &str) -> Option<String> {
    parse_object(body).and_then(|obj| object_meta(&obj)).map(|m| m.name).ok()
}

/// One captured object a request may apply to
pub(crate) struct Candidate<'a> {
    /// `None` when the body could not be parsed
    pub name: Option<String>,
    pub body: &'a mut String,
}

/// Run every request for `gvk` over `candidates`
///
/// Returns the statuses of requests that touched something, the names
/// excluded along the way and whether anything failed.
pub(crate) fn run_requests(
    cluster: &dyn ClusterClient,
    namespace: &str,
    gvk: &GroupVersionKind,
    requests: &[CustomTransform],
    candidates: &mut [Candidate<'_>],
    excluded_names: Option<&BTreeSet<String>>,
) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();

    for request in requests {
        let targets: HashSet<&str> = request.resources.objects.iter().map(String::as_str).collect();
        let mut status = TransformStatus::new(&request.transform_name);
        let mut transformed = Vec::new();
        let mut to_exclude = Vec::new();
        let mut touched = false;

        for (idx, candidate) in candidates.iter_mut().enumerate() {
            let Some(name) = candidate.name.as_deref() else {
                touched = true;
                status.fail(&format!("Transformation failed for {} object #{}: unparsable body;", gvk, idx));
                continue;
            };

            if excluded_names.is_some_and(|names| names.contains(name)) {
                to_exclude.push(name.to_string());
                continue;
            }
            if !targets.is_empty() && !targets.contains(name) {
                continue;
            }

            touched = true;
            match patch_and_validate(cluster, namespace, gvk, candidate.body.as_str(), &request.json_patches) {
                Ok(patched) => {
                    *candidate.body = patched;
                    transformed.push(name.to_string());
                }
                Err(e) => {
                    warn!("Transform {} failed for {} {}: {}", request.transform_name, gvk, name, e);
                    status.fail(&format!("Transformation failed for {}: {};", name, e));
                }
            }
        }

        if !to_exclude.is_empty() {
            outcome.excluded = crate::store::merge_resource_list(
                &outcome.excluded,
                &[Resource::new(gvk.clone(), to_exclude)],
            );
        }
        if touched {
            if !transformed.is_empty() {
                status.transformed_resources = vec![Resource::new(gvk.clone(), transformed)];
            }
            outcome.any_failed |= status.is_failed();
            outcome.statuses.push(status);
        }
    }

    outcome
}
