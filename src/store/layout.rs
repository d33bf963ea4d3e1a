// src/store/layout.rs

//! Directory and file names of the snapshot tree
//!
//! ```text
//! <root>/custom/metadata-snapshot/metadata.json
//! <root>/custom/data-snapshot/<pvc>/{pvc.json,pod-container.json}
//! <root>/helm/<release>/release-config.json
//! <root>/helm/<release>/metadata-snapshot/metadata.json
//! <root>/helm/<release>/data-snapshot/<pvc>/...
//! <root>/operator/<id>/metadata-snapshot/{metadata,resource-metadata,crd-metadata}.json
//! <root>/operator/<id>/helm/<release>/...
//! <root>/operator/<id>/data-snapshot/<pvc>/...
//! ```

use crate::model::{HelmStorageBackend, HelmVersion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CUSTOM_DIR: &str = "custom";
pub const HELM_DIR: &str = "helm";
pub const OPERATOR_DIR: &str = "operator";
pub const METADATA_SNAPSHOT_DIR: &str = "metadata-snapshot";
pub const DATA_SNAPSHOT_DIR: &str = "data-snapshot";

pub const METADATA_FILE: &str = "metadata.json";
pub const RESOURCE_METADATA_FILE: &str = "resource-metadata.json";
pub const CRD_METADATA_FILE: &str = "crd-metadata.json";
pub const RELEASE_CONFIG_FILE: &str = "release-config.json";
pub const PVC_FILE: &str = "pvc.json";
pub const POD_CONTAINER_FILE: &str = "pod-container.json";

pub fn custom_dir(root: &Path) -> PathBuf {
    root.join(CUSTOM_DIR)
}

/// `<parent>/helm/<release>`; `parent` is a snapshot root or an operator dir
pub fn helm_dir(parent: &Path, release: &str) -> PathBuf {
    parent.join(HELM_DIR).join(release)
}

pub fn operator_dir(root: &Path, operator_id: &str) -> PathBuf {
    root.join(OPERATOR_DIR).join(operator_id)
}

/// Contents of `release-config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    pub helm_version: HelmVersion,
    pub storage_backend: HelmStorageBackend,
    /// Stored as a decimal string
    pub revision: String,
}
