// src/helm/release.rs

//! Helm release records and their storage-object encoding
//!
//! Helm keeps one Secret or ConfigMap per revision. The release lives in
//! `data.release` as `base64(gzip(json))`; Secret data carries one more
//! base64 layer on top.

use crate::cluster::{object_meta, parse_object};
use crate::error::{Error, Result};
use crate::model::{ComponentMetadata, HelmStorageBackend};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::io::{Read, Write};
use tracing::debug;

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Decoded Helm release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Revision number
    #[serde(default)]
    pub version: i32,
    /// User-supplied values
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub chart: Value,
    #[serde(default)]
    pub manifest: String,
    /// Fields the engine does not interpret (info, hooks, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    /// Chart name from `chart.metadata.name`
    pub fn chart_name(&self) -> Option<&str> {
        self.chart.pointer("/metadata/name").and_then(Value::as_str)
    }
}

/// Decode the release carried by a captured storage object body
pub fn decode_storage_object(raw: &str, backend: HelmStorageBackend) -> Result<Release> {
    let obj = parse_object(raw)?;
    let name = object_meta(&obj).map(|m| m.name).unwrap_or_default();

    let data = obj
        .pointer("/data/release")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Release(format!("{} {} has no data.release", backend, name)))?;

    let encoded = match backend {
        HelmStorageBackend::Secret => BASE64
            .decode(data.trim())
            .map_err(|e| Error::Release(format!("{} {}: {}", backend, name, e)))?,
        HelmStorageBackend::ConfigMap => data.as_bytes().to_vec(),
    };

    decode_release(&encoded).map_err(|e| Error::Release(format!("{} {}: {}", backend, name, e)))
}

/// Decode `base64(gzip?(json))`
pub fn decode_release(encoded: &[u8]) -> Result<Release> {
    let trimmed: Vec<u8> = encoded.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(&trimmed)
        .map_err(|e| Error::Release(format!("invalid base64 release: {}", e)))?;

    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        out
    } else {
        bytes
    };

    serde_json::from_slice(&json).map_err(|e| Error::serialization("helm release", e))
}

/// Encode a release as `base64(gzip(json))`
pub fn encode_release(release: &Release) -> Result<String> {
    let json = serde_json::to_vec(release).map_err(|e| Error::serialization("helm release", e))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(BASE64.encode(encoder.finish()?))
}

/// Name Helm gives the storage object of a release revision
pub fn storage_object_name(release: &str, revision: i32) -> String {
    format!("sh.helm.release.v1.{}.v{}", release, revision)
}

/// Build the Secret/ConfigMap body Helm would store for `release`
pub fn storage_object(release: &Release, backend: HelmStorageBackend) -> Result<Value> {
    let encoded = encode_release(release)?;
    let data = match backend {
        HelmStorageBackend::Secret => BASE64.encode(encoded),
        HelmStorageBackend::ConfigMap => encoded,
    };
    Ok(json!({
        "apiVersion": "v1",
        "kind": backend.kind(),
        "metadata": {
            "name": storage_object_name(&release.name, release.version),
            "namespace": release.namespace,
            "labels": {
                "name": release.name,
                "owner": "helm",
                "version": release.version.to_string(),
            },
        },
        "data": { "release": data },
    }))
}

/// Highest revision among the captured storage objects and its release
///
/// Ties keep the first object seen.
pub fn latest_revision_and_release(meta: &ComponentMetadata, backend: HelmStorageBackend) -> Result<(i32, Release)> {
    let mut latest: Option<(i32, Release)> = None;
    for raw in &meta.metadata {
        let release = decode_storage_object(raw, backend)?;
        let revision = release.version;
        match &latest {
            Some((best, _)) if revision <= *best => {}
            _ => latest = Some((revision, release)),
        }
    }

    let (revision, release) =
        latest.ok_or_else(|| Error::Release("no release revisions captured".into()))?;
    debug!("Latest captured revision of {} is {}", release.name, revision);
    Ok((revision, release))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str, version: i32) -> Release {
        Release {
            name: name.to_string(),
            namespace: "apps".to_string(),
            version,
            config: json!({"replicas": 1}),
            chart: json!({"metadata": {"name": "mysql", "version": "1.2.3"}}),
            manifest: "---\nkind: Service\n".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_secret_round_trip() {
        let rel = release("db", 2);
        let obj = storage_object(&rel, HelmStorageBackend::Secret).unwrap();
        assert_eq!(obj["metadata"]["name"], "sh.helm.release.v1.db.v2");
        let decoded = decode_storage_object(&obj.to_string(), HelmStorageBackend::Secret).unwrap();
        assert_eq!(decoded, rel);
        assert_eq!(decoded.chart_name(), Some("mysql"));
    }

    #[test]
    fn test_configmap_round_trip() {
        let rel = release("db", 1);
        let obj = storage_object(&rel, HelmStorageBackend::ConfigMap).unwrap();
        let decoded = decode_storage_object(&obj.to_string(), HelmStorageBackend::ConfigMap).unwrap();
        assert_eq!(decoded.version, 1);
    }

    #[test]
    fn test_uncompressed_release_decodes() {
        let encoded = BASE64.encode(serde_json::to_vec(&release("raw", 4)).unwrap());
        let decoded = decode_release(encoded.as_bytes()).unwrap();
        assert_eq!(decoded.name, "raw");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let encoded = BASE64.encode(br#"{"name":"x","version":1,"info":{"status":"deployed"}}"#);
        let decoded = decode_release(encoded.as_bytes()).unwrap();
        assert_eq!(decoded.extra["info"]["status"], "deployed");
    }

    #[test]
    fn test_missing_data_release() {
        let err = decode_storage_object(r#"{"metadata":{"name":"s"},"data":{}}"#, HelmStorageBackend::Secret)
            .unwrap_err();
        assert!(matches!(err, Error::Release(_)));
    }

    #[test]
    fn test_latest_revision_first_seen_wins_ties() {
        let backend = HelmStorageBackend::Secret;
        let mut first = release("db", 3);
        first.manifest = "first".into();
        let mut second = release("db", 3);
        second.manifest = "second".into();
        let meta = ComponentMetadata::new(
            crate::model::GroupVersionKind::new("", "v1", "Secret"),
            vec![
                storage_object(&release("db", 1), backend).unwrap().to_string(),
                storage_object(&first, backend).unwrap().to_string(),
                storage_object(&second, backend).unwrap().to_string(),
            ],
        );
        let (rev, rel) = latest_revision_and_release(&meta, backend).unwrap();
        assert_eq!(rev, 3);
        assert_eq!(rel.manifest, "first");
    }

    #[test]
    fn test_latest_revision_empty_is_error() {
        let meta = ComponentMetadata::default();
        assert!(latest_revision_and_release(&meta, HelmStorageBackend::Secret).is_err());
    }
}
