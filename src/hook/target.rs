// src/hook/target.rs

//! Hook target identification
//!
//! Captured pods are checked directly. Captured workloads are resolved to
//! the live pods they control, and only pods whose top-most controller is
//! that very workload count, since several workloads may share labels.

use crate::cluster::{
    ClusterClient, container_names, find_top_owner, object_gvk, object_meta, owner_selector,
    parse_object, pod_gvk,
};
use crate::error::{Error, Result};
use crate::model::{
    ComponentMetadata, ContainerHookStatus, FullSnapshot, GroupVersionKind, HookTarget,
    LabelSelector, Owner, PodHookStatus, PodSelector,
};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Kinds that are pods or own pods
pub const POD_OWNER_KINDS: [&str; 8] = [
    "Pod",
    "Deployment",
    "DaemonSet",
    "StatefulSet",
    "ReplicaSet",
    "ReplicationController",
    "Job",
    "CronJob",
];

/// Kinds whose captured selector may be generated by the API server
const LIVE_SELECTOR_KINDS: [&str; 2] = ["Job", "ReplicationController"];

/// Every captured metadata list that may hold hook targets, in scan order
pub(crate) fn candidate_sources(snapshot: &FullSnapshot) -> Vec<&[ComponentMetadata]> {
    let mut sources: Vec<&[ComponentMetadata]> = Vec::new();
    if let Some(custom) = &snapshot.custom {
        sources.push(&custom.resources);
    }
    for helm in &snapshot.helm {
        sources.push(&helm.release_resources);
    }
    for op in &snapshot.operators {
        sources.push(&op.operator_resources);
        if let Some(helm) = &op.helm {
            sources.push(&helm.release_resources);
        }
    }
    sources
}

/// Compiled pod and container selection of one hook
pub(crate) struct PodMatcher<'a> {
    labels: &'a [LabelSelector],
    name: Option<Regex>,
    container: Option<Regex>,
    container_regex: &'a str,
}

fn compile(pattern: &str, what: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| Error::HookConfig(format!("invalid {} regex {:?}: {}", what, pattern, e)))
}

impl<'a> PodMatcher<'a> {
    pub fn new(selector: &'a PodSelector, container_regex: &'a str) -> Result<Self> {
        if selector.labels.is_empty() && selector.regex.is_empty() {
            return Err(Error::HookConfig(
                "at least one of podSelector.labels and podSelector.regex is required".into(),
            ));
        }
        Ok(Self {
            labels: &selector.labels,
            name: compile(&selector.regex, "pod name")?,
            container: compile(container_regex, "container")?,
            container_regex,
        })
    }

    fn labels_match(&self, labels: &BTreeMap<String, String>) -> bool {
        self.labels.is_empty() || self.labels.iter().any(|s| s.matches(labels))
    }

    fn name_matches(&self, name: &str) -> bool {
        self.name.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Containers of `pod` matching the container regex; none is an error
    pub fn matching_containers(&self, pod: &Value, pod_name: &str) -> Result<Vec<ContainerHookStatus>> {
        let matched: Vec<ContainerHookStatus> = container_names(pod)
            .into_iter()
            .filter(|c| self.container.as_ref().is_none_or(|re| re.is_match(c)))
            .map(ContainerHookStatus::new)
            .collect();
        if matched.is_empty() {
            return Err(Error::NoMatchingContainer {
                regex: self.container_regex.to_string(),
                pod: pod_name.to_string(),
            });
        }
        Ok(matched)
    }

    /// Whether the pods of one candidate select it as a hook target
    ///
    /// Labels are checked against the first pod only; names and containers
    /// against each pod until one matches.
    pub fn is_required(&self, pods: &[Value]) -> Result<bool> {
        let Some(first) = pods.first() else {
            return Ok(false);
        };
        if !self.labels_match(&object_meta(first)?.labels) {
            return Ok(false);
        }
        for pod in pods {
            let name = object_meta(pod)?.name;
            if self.name_matches(&name) {
                self.matching_containers(pod, &name)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Live pods controlled by the captured workload `obj`
fn owned_pods(
    cluster: &dyn ClusterClient,
    namespace: &str,
    gvk: &GroupVersionKind,
    obj: &Value,
    max_owner_depth: usize,
) -> Result<Vec<Value>> {
    let name = object_meta(obj)?.name;

    let mut selector = owner_selector(obj, &gvk.kind)?;
    if selector.is_none() && LIVE_SELECTOR_KINDS.contains(&gvk.kind.as_str()) {
        debug!("Fetching live {} {} for its selector", gvk.kind, name);
        let live = cluster.get(namespace, &name, gvk)?;
        selector = owner_selector(&live, &gvk.kind)?;
    }

    // without a selector every pod is listed and ownership decides
    match &selector {
        Some(sel) => debug!("Listing pods of {} {} with selector {}", gvk.kind, name, sel.to_query()),
        None => debug!("Listing all pods in {} for {} {}", namespace, gvk.kind, name),
    }
    let pods = cluster.list(namespace, &pod_gvk(), selector.as_ref())?;

    let api_version = object_gvk(obj).unwrap_or_else(|| gvk.clone()).api_version();
    let mut owned = Vec::new();
    for pod in pods {
        let top = find_top_owner(cluster, namespace, &pod, max_owner_depth)?;
        let top_api_version = object_gvk(&top).map(|g| g.api_version()).unwrap_or_default();
        if top_api_version == api_version && object_meta(&top)?.name == name {
            owned.push(pod);
        }
    }
    debug!("{} {} controls {} pod(s)", gvk.kind, name, owned.len());
    Ok(owned)
}

/// Targets for one hook across every candidate source
pub(crate) fn identify_targets(
    cluster: &dyn ClusterClient,
    namespace: &str,
    max_owner_depth: usize,
    sources: &[&[ComponentMetadata]],
    matcher: &PodMatcher<'_>,
) -> Result<Vec<HookTarget>> {
    let mut targets = Vec::new();

    for comp in sources.iter().flat_map(|s| s.iter()) {
        let gvk = &comp.group_version_kind;
        if !POD_OWNER_KINDS.contains(&gvk.kind.as_str()) {
            continue;
        }
        info!("Identifying hook targets among {} {} object(s)", comp.metadata.len(), gvk);

        for (idx, raw) in comp.metadata.iter().enumerate() {
            let obj = parse_object(raw).map_err(|e| Error::serialization(format!("{} object #{}", gvk, idx), e))?;
            let name = object_meta(&obj)?.name;

            if gvk.kind == "Pod" {
                if matcher.is_required(std::slice::from_ref(&obj))? {
                    targets.push(HookTarget {
                        owner: None,
                        container_regex: matcher.container_regex.to_string(),
                        pod_hook_status: vec![PodHookStatus {
                            container_hook_status: matcher.matching_containers(&obj, &name)?,
                            pod_name: name,
                        }],
                    });
                }
                continue;
            }

            let pods = owned_pods(cluster, namespace, gvk, &obj, max_owner_depth)?;
            if matcher.is_required(&pods)? {
                targets.push(HookTarget {
                    owner: Some(Owner {
                        group_version_kind: gvk.clone(),
                        name,
                    }),
                    container_regex: matcher.container_regex.to_string(),
                    pod_hook_status: Vec::new(),
                });
            }
        }
    }

    Ok(targets)
}
