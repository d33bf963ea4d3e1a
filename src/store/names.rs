// src/store/names.rs

//! Object name extraction and per-GVK set merging

use crate::cluster::{object_meta, parse_object};
use crate::error::{Error, Result};
use crate::model::{ComponentMetadata, GroupVersionKind, Resource};
use std::collections::{BTreeMap, BTreeSet};

/// Names of every captured object in `meta`, in capture order
///
/// Any unparsable body fails the whole call.
pub fn resource_names(meta: &ComponentMetadata) -> Result<Vec<String>> {
    meta.metadata
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            parse_object(raw)
                .and_then(|obj| object_meta(&obj))
                .map(|m| m.name)
                .map_err(|e| {
                    Error::serialization(
                        format!("{} object #{}", meta.group_version_kind, idx),
                        e,
                    )
                })
        })
        .collect()
}

/// Name-only form of a whole component
pub fn excluded_resource(meta: &ComponentMetadata) -> Result<Resource> {
    Ok(Resource::new(meta.group_version_kind.clone(), resource_names(meta)?))
}

/// Per-GVK union of two resource lists, sorted by GVK then name
pub fn merge_resource_list(a: &[Resource], b: &[Resource]) -> Vec<Resource> {
    let mut by_gvk: BTreeMap<GroupVersionKind, BTreeSet<String>> = BTreeMap::new();
    for res in a.iter().chain(b) {
        by_gvk
            .entry(res.group_version_kind.clone())
            .or_default()
            .extend(res.objects.iter().cloned());
    }
    by_gvk
        .into_iter()
        .map(|(gvk, names)| Resource::new(gvk, names.into_iter().collect()))
        .collect()
}

/// Per-GVK union of two metadata lists; identical bodies are kept once
pub fn merge_comp_meta_lists(a: &[ComponentMetadata], b: &[ComponentMetadata]) -> Vec<ComponentMetadata> {
    let mut by_gvk: BTreeMap<GroupVersionKind, BTreeSet<String>> = BTreeMap::new();
    for meta in a.iter().chain(b) {
        by_gvk
            .entry(meta.group_version_kind.clone())
            .or_default()
            .extend(meta.metadata.iter().cloned());
    }
    by_gvk
        .into_iter()
        .map(|(gvk, bodies)| ComponentMetadata::new(gvk, bodies.into_iter().collect()))
        .collect()
}
