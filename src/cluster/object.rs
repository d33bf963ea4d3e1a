// src/cluster/object.rs

//! Accessors over unstructured object bodies

use crate::error::{Error, Result};
use crate::model::{GroupVersionKind, LabelSelector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reference from an object to the object that owns it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub controller: Option<bool>,
}

impl OwnerReference {
    pub fn is_controller(&self) -> bool {
        self.controller == Some(true)
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(&self.api_version, &self.kind)
    }
}

/// The parts of `metadata` the engine reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// The controlling owner, if any
    pub fn controller(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.is_controller())
    }
}

/// Parse a captured object body, JSON or YAML
pub fn parse_object(raw: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(raw).map_err(|yaml_err| {
            Error::serialization(
                "object body",
                format!("not JSON ({}) and not YAML ({})", json_err, yaml_err),
            )
        }),
    }
}

/// Read `metadata` from an object; a missing name is an error
pub fn object_meta(obj: &Value) -> Result<ObjectMeta> {
    let metadata = obj
        .get("metadata")
        .ok_or_else(|| Error::serialization("object", "missing metadata"))?;
    let meta: ObjectMeta = serde_json::from_value(metadata.clone())
        .map_err(|e| Error::serialization("object metadata", e))?;
    if meta.name.is_empty() {
        return Err(Error::serialization("object metadata", "missing metadata.name"));
    }
    Ok(meta)
}

/// GVK from `apiVersion` and `kind`
pub fn object_gvk(obj: &Value) -> Option<GroupVersionKind> {
    let api_version = obj.get("apiVersion")?.as_str()?;
    let kind = obj.get("kind")?.as_str()?;
    Some(GroupVersionKind::from_api_version(api_version, kind))
}

/// Names of a pod's regular containers
pub fn container_names(pod: &Value) -> Vec<String> {
    pod.pointer("/spec/containers")
        .and_then(Value::as_array)
        .map(|containers| {
            containers
                .iter()
                .filter_map(|c| c.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Pod selector declared by a workload, `None` when absent
///
/// ReplicationControllers carry a plain label map; CronJobs carry the
/// selector inside their job template.
pub fn owner_selector(obj: &Value, kind: &str) -> Result<Option<LabelSelector>> {
    let pointer = match kind {
        "CronJob" => "/spec/jobTemplate/spec/selector",
        _ => "/spec/selector",
    };
    let Some(raw) = obj.pointer(pointer).filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    let selector = if kind == "ReplicationController" {
        let labels: BTreeMap<String, String> = serde_json::from_value(raw.clone())
            .map_err(|e| Error::serialization(format!("{} selector", kind), e))?;
        LabelSelector::from_labels(labels)
    } else {
        serde_json::from_value(raw.clone())
            .map_err(|e| Error::serialization(format!("{} selector", kind), e))?
    };

    if selector.is_empty() {
        return Ok(None);
    }
    Ok(Some(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_and_yaml() {
        let json = parse_object(r#"{"metadata":{"name":"a"}}"#).unwrap();
        assert_eq!(object_meta(&json).unwrap().name, "a");

        let yaml = parse_object("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n").unwrap();
        assert_eq!(object_meta(&yaml).unwrap().name, "b");
        assert_eq!(object_gvk(&yaml), Some(GroupVersionKind::new("", "v1", "ConfigMap")));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_object("{not: [valid").is_err());
    }

    #[test]
    fn test_object_meta_requires_name() {
        assert!(object_meta(&json!({"kind": "Pod"})).is_err());
        assert!(object_meta(&json!({"metadata": {"namespace": "x"}})).is_err());
    }

    #[test]
    fn test_controller_reference() {
        let obj = json!({"metadata": {"name": "web-1", "ownerReferences": [
            {"apiVersion": "v1", "kind": "Node", "name": "n"},
            {"apiVersion": "apps/v1", "kind": "ReplicaSet", "name": "web-abc", "controller": true}
        ]}});
        let meta = object_meta(&obj).unwrap();
        let owner = meta.controller().unwrap();
        assert_eq!(owner.name, "web-abc");
        assert_eq!(owner.gvk(), GroupVersionKind::new("apps", "v1", "ReplicaSet"));
    }

    #[test]
    fn test_owner_selector_kinds() {
        let deploy = json!({"spec": {"selector": {"matchLabels": {"app": "web"}}}});
        let sel = owner_selector(&deploy, "Deployment").unwrap().unwrap();
        assert_eq!(sel.match_labels.get("app").map(String::as_str), Some("web"));

        let rc = json!({"spec": {"selector": {"app": "legacy"}}});
        let sel = owner_selector(&rc, "ReplicationController").unwrap().unwrap();
        assert_eq!(sel.match_labels.get("app").map(String::as_str), Some("legacy"));

        let cron = json!({"spec": {"jobTemplate": {"spec": {"selector": {"matchLabels": {"job": "x"}}}}}});
        assert!(owner_selector(&cron, "CronJob").unwrap().is_some());

        let job = json!({"spec": {}});
        assert!(owner_selector(&job, "Job").unwrap().is_none());
    }

    #[test]
    fn test_container_names() {
        let pod = json!({"spec": {"containers": [{"name": "main"}, {"name": "sidecar"}]}});
        assert_eq!(container_names(&pod), vec!["main", "sidecar"]);
        assert!(container_names(&json!({})).is_empty());
    }
}
