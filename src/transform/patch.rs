// src/transform/patch.rs

//! JSON patch application with dry-run validation

use crate::cluster::{ClusterClient, parse_object};
use crate::error::{Error, Result};
use crate::model::{GroupVersionKind, PatchOp};
use serde_json::{Map, Value};
use tracing::debug;

/// Apply RFC 6902 operations to `doc` in order; nothing is applied on error
pub fn apply_patch(doc: &mut Value, ops: &[PatchOp]) -> Result<()> {
    let raw: Vec<Value> = ops
        .iter()
        .map(|op| {
            let mut entry = Map::new();
            entry.insert("op".into(), Value::String(op.op.clone()));
            entry.insert("path".into(), Value::String(op.path.clone()));
            if !op.from.is_empty() {
                entry.insert("from".into(), Value::String(op.from.clone()));
            }
            if let Some(value) = &op.value {
                entry.insert("value".into(), value.clone());
            }
            Value::Object(entry)
        })
        .collect();

    let patch: json_patch::Patch = serde_json::from_value(Value::Array(raw))
        .map_err(|e| Error::Patch(format!("invalid patch: {}", e)))?;

    let mut patched = doc.clone();
    json_patch::patch(&mut patched, &patch.0).map_err(|e| Error::Patch(e.to_string()))?;
    *doc = patched;
    Ok(())
}

/// Parse `body`, patch it, dry-run the result and return it serialized
pub fn patch_and_validate(
    cluster: &dyn ClusterClient,
    namespace: &str,
    gvk: &GroupVersionKind,
    body: &str,
    ops: &[PatchOp],
) -> Result<String> {
    let mut obj = parse_object(body)?;
    apply_patch(&mut obj, ops)?;
    cluster.dry_run_apply(namespace, gvk, &obj)?;
    debug!("Dry run accepted patched {} in {}", gvk, namespace);
    serde_json::to_string(&obj).map_err(|e| Error::serialization(gvk.to_string(), e))
}
