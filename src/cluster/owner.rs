// src/cluster/owner.rs

//! Controller owner-chain traversal

use super::{ClusterClient, object_gvk, object_meta};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Follow `controller=true` owner references from `obj` up to the top-most
/// controlling ancestor and return it (or `obj` itself when uncontrolled).
///
/// Fails when an owner cannot be fetched, when the chain loops back on
/// itself, or when it is longer than `max_depth` hops.
pub fn find_top_owner<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    obj: &Value,
    max_depth: usize,
) -> Result<Value> {
    let mut current = obj.clone();
    let mut visited: HashSet<(String, String)> = HashSet::new();

    for hop in 0..=max_depth {
        let meta = object_meta(&current)?;
        let kind = object_gvk(&current).map(|g| g.kind).unwrap_or_default();
        visited.insert((kind, meta.name.clone()));

        let Some(owner) = meta.controller() else {
            return Ok(current);
        };

        let key = (owner.kind.clone(), owner.name.clone());
        if visited.contains(&key) {
            return Err(Error::OwnerChain(format!(
                "owner reference cycle at {} {}",
                owner.kind, owner.name
            )));
        }
        if hop == max_depth {
            break;
        }

        debug!("Following controller of {} to {} {}", meta.name, owner.kind, owner.name);
        current = client
            .get(namespace, &owner.name, &owner.gvk())
            .map_err(|e| {
                Error::OwnerChain(format!(
                    "failed to fetch owner {} {} of {}: {}",
                    owner.kind, owner.name, meta.name, e
                ))
            })?;
    }

    Err(Error::OwnerChain(format!(
        "owner chain longer than {} hops",
        max_depth
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterError;
    use crate::model::{GroupVersionKind, LabelSelector};
    use serde_json::json;
    use std::collections::HashMap;

    struct Objects(HashMap<String, Value>);

    impl ClusterClient for Objects {
        fn get(&self, _ns: &str, name: &str, gvk: &GroupVersionKind) -> std::result::Result<Value, ClusterError> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| ClusterError::not_found(&gvk.kind, name))
        }

        fn list(
            &self,
            _ns: &str,
            _gvk: &GroupVersionKind,
            _selector: Option<&LabelSelector>,
        ) -> std::result::Result<Vec<Value>, ClusterError> {
            Ok(Vec::new())
        }

        fn dry_run_apply(&self, _ns: &str, _gvk: &GroupVersionKind, _obj: &Value) -> std::result::Result<(), ClusterError> {
            Ok(())
        }
    }

    fn obj(kind: &str, name: &str, owner: Option<(&str, &str)>) -> Value {
        let refs = match owner {
            Some((k, n)) => json!([{"apiVersion": "apps/v1", "kind": k, "name": n, "controller": true}]),
            None => json!([]),
        };
        json!({"apiVersion": "apps/v1", "kind": kind, "metadata": {"name": name, "ownerReferences": refs}})
    }

    #[test]
    fn test_walks_to_deployment() {
        let client = Objects(HashMap::from([
            ("web-abc".to_string(), obj("ReplicaSet", "web-abc", Some(("Deployment", "web")))),
            ("web".to_string(), obj("Deployment", "web", None)),
        ]));
        let pod = obj("Pod", "web-abc-1", Some(("ReplicaSet", "web-abc")));
        let top = find_top_owner(&client, "ns", &pod, 16).unwrap();
        assert_eq!(top["metadata"]["name"], "web");
    }

    #[test]
    fn test_uncontrolled_object_is_its_own_top() {
        let client = Objects(HashMap::new());
        let pod = obj("Pod", "lonely", None);
        let top = find_top_owner(&client, "ns", &pod, 16).unwrap();
        assert_eq!(top, pod);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let client = Objects(HashMap::from([
            ("a".to_string(), obj("ReplicaSet", "a", Some(("ReplicaSet", "b")))),
            ("b".to_string(), obj("ReplicaSet", "b", Some(("ReplicaSet", "a")))),
        ]));
        let pod = obj("Pod", "p", Some(("ReplicaSet", "a")));
        let err = find_top_owner(&client, "ns", &pod, 16).unwrap_err();
        assert!(matches!(err, Error::OwnerChain(msg) if msg.contains("cycle")));
    }

    #[test]
    fn test_missing_owner_fails_loudly() {
        let client = Objects(HashMap::new());
        let pod = obj("Pod", "p", Some(("ReplicaSet", "gone")));
        let err = find_top_owner(&client, "ns", &pod, 16).unwrap_err();
        assert!(matches!(err, Error::OwnerChain(msg) if msg.contains("gone")));
    }

    #[test]
    fn test_depth_bound() {
        let client = Objects(HashMap::from([
            ("a".to_string(), obj("ReplicaSet", "a", Some(("Deployment", "b")))),
            ("b".to_string(), obj("Deployment", "b", None)),
        ]));
        let pod = obj("Pod", "p", Some(("ReplicaSet", "a")));
        assert!(find_top_owner(&client, "ns", &pod, 1).is_err());
        assert!(find_top_owner(&client, "ns", &pod, 2).is_ok());
    }
}
