// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use appsnap::cluster::{ClusterClient, ClusterError, HookLookup, StatusClient, object_gvk, object_meta};
use appsnap::helm::{Release, ReleaseRenderer, ReleaseStorage};
use appsnap::model::{
    ComponentMetadata, GroupVersionKind, HelmStorageBackend, Hook, LabelSelector, Restore,
};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Install a test subscriber once; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory cluster implementing every collaborator trait
#[derive(Default)]
pub struct FakeCluster {
    /// Live objects keyed by (kind, name)
    pub objects: RefCell<HashMap<(String, String), Value>>,
    /// Object names the dry run rejects
    pub reject: HashSet<String>,
    pub hooks: HashMap<String, Hook>,
    /// Release names already present in release storage
    pub releases: HashSet<String>,
    /// Merge-patch conflicts to report before succeeding
    pub conflicts: Cell<u32>,
    pub fail_overwrite: bool,
    pub merge_calls: Cell<u32>,
    pub overwrite_calls: Cell<u32>,
    pub persisted: RefCell<Option<Restore>>,
    pub dry_runs: Cell<u32>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live object
    pub fn insert(&self, obj: Value) {
        let kind = object_gvk(&obj).map(|g| g.kind).unwrap_or_default();
        let name = object_meta(&obj).map(|m| m.name).unwrap_or_default();
        self.objects.borrow_mut().insert((kind, name), obj);
    }

    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hooks.insert(hook.name.clone(), hook);
        self
    }
}

impl ClusterClient for FakeCluster {
    fn get(&self, _namespace: &str, name: &str, gvk: &GroupVersionKind) -> Result<Value, ClusterError> {
        self.objects
            .borrow()
            .get(&(gvk.kind.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::not_found(gvk.kind.clone(), name))
    }

    fn list(
        &self,
        _namespace: &str,
        gvk: &GroupVersionKind,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<Value>, ClusterError> {
        let mut found: Vec<Value> = self
            .objects
            .borrow()
            .iter()
            .filter(|((kind, _), _)| *kind == gvk.kind)
            .map(|(_, obj)| obj.clone())
            .filter(|obj| {
                let labels = object_meta(obj).map(|m| m.labels).unwrap_or_default();
                selector.is_none_or(|s| s.matches(&labels))
            })
            .collect();
        found.sort_by_key(|obj| object_meta(obj).map(|m| m.name).unwrap_or_default());
        Ok(found)
    }

    fn dry_run_apply(&self, _namespace: &str, _gvk: &GroupVersionKind, object: &Value) -> Result<(), ClusterError> {
        self.dry_runs.set(self.dry_runs.get() + 1);
        let name = object_meta(object).map(|m| m.name).unwrap_or_default();
        if self.reject.contains(&name) {
            return Err(ClusterError::DryRun(format!("admission webhook denied {}", name)));
        }
        Ok(())
    }
}

impl HookLookup for FakeCluster {
    fn get_hook(&self, name: &str, _namespace: &str) -> Result<Hook, ClusterError> {
        self.hooks
            .get(name)
            .cloned()
            .ok_or_else(|| ClusterError::not_found("Hook", name))
    }
}

impl StatusClient<Restore> for FakeCluster {
    fn get_latest(&self, current: &Restore) -> Result<Restore, ClusterError> {
        Ok(self.persisted.borrow().clone().unwrap_or_else(|| current.clone()))
    }

    fn merge_patch_status(&self, _latest: &Restore, desired: &Restore) -> Result<(), ClusterError> {
        self.merge_calls.set(self.merge_calls.get() + 1);
        if self.conflicts.get() > 0 {
            self.conflicts.set(self.conflicts.get() - 1);
            return Err(ClusterError::Conflict("object has been modified".into()));
        }
        *self.persisted.borrow_mut() = Some(desired.clone());
        Ok(())
    }

    fn overwrite_status(&self, desired: &Restore) -> Result<(), ClusterError> {
        self.overwrite_calls.set(self.overwrite_calls.get() + 1);
        if self.fail_overwrite {
            return Err(ClusterError::Api("etcd unavailable".into()));
        }
        *self.persisted.borrow_mut() = Some(desired.clone());
        Ok(())
    }
}

impl ReleaseStorage for FakeCluster {
    fn release_exists(
        &self,
        _backend: HelmStorageBackend,
        name: &str,
        _namespace: &str,
    ) -> Result<bool, ClusterError> {
        Ok(self.releases.contains(name))
    }
}

impl ReleaseRenderer for FakeCluster {
    fn load_dependencies(&self, _release: &mut Release, _revision: i32, _backup_location: &str) -> appsnap::Result<()> {
        Ok(())
    }

    fn render(&self, release: &Release, new_name: &str, namespace: &str) -> appsnap::Result<Release> {
        let mut rendered = release.clone();
        rendered.name = new_name.to_string();
        rendered.namespace = namespace.to_string();
        rendered.manifest = format!("# values: {}", release.config);
        Ok(rendered)
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Owner reference marked as controller
pub fn controller(api_version: &str, kind: &str, name: &str) -> Value {
    json!({"apiVersion": api_version, "kind": kind, "name": name, "uid": format!("uid-{}", name), "controller": true})
}

pub fn pod(name: &str, pod_labels: &[(&str, &str)], containers: &[&str], owner: Option<Value>) -> Value {
    let containers: Vec<Value> = containers.iter().map(|c| json!({"name": c, "image": "busybox"})).collect();
    let owners: Vec<Value> = owner.into_iter().collect();
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name, "labels": labels(pod_labels), "ownerReferences": owners},
        "spec": {"containers": containers}
    })
}

pub fn deployment(name: &str, match_labels: &[(&str, &str)]) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "labels": labels(match_labels)},
        "spec": {"selector": {"matchLabels": labels(match_labels)}, "replicas": 1}
    })
}

pub fn replica_set(name: &str, match_labels: &[(&str, &str)], deployment: &str) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "ReplicaSet",
        "metadata": {"name": name, "ownerReferences": [controller("apps/v1", "Deployment", deployment)]},
        "spec": {"selector": {"matchLabels": labels(match_labels)}}
    })
}

pub fn config_map(name: &str) -> String {
    json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": name}, "data": {"key": "value"}}).to_string()
}

pub fn pvc(name: &str) -> String {
    json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": {"name": name},
        "spec": {"storageClassName": "standard", "resources": {"requests": {"storage": "1Gi"}}}
    })
    .to_string()
}

pub fn gvk(group: &str, version: &str, kind: &str) -> GroupVersionKind {
    GroupVersionKind::new(group, version, kind)
}

pub fn meta_of(gvk: GroupVersionKind, objects: &[Value]) -> ComponentMetadata {
    ComponentMetadata::new(gvk, objects.iter().map(Value::to_string).collect())
}
