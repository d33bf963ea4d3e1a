// src/store/pull.rs

//! Reading snapshots back from the store

use super::layout::{
    CRD_METADATA_FILE, DATA_SNAPSHOT_DIR, HELM_DIR, METADATA_FILE, METADATA_SNAPSHOT_DIR,
    OPERATOR_DIR, POD_CONTAINER_FILE, PVC_FILE, RELEASE_CONFIG_FILE, RESOURCE_METADATA_FILE,
    ReleaseConfig, custom_dir, helm_dir, operator_dir,
};
use super::{PathStore, read_json};
use crate::component::SnapshotComponent;
use crate::error::{Error, Result};
use crate::model::{
    ComponentMetadata, CustomSnapshot, DataSnapshot, FullSnapshot, HelmSnapshot, OperatorSnapshot,
    PodContainers,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rebuild a [`FullSnapshot`] from the tree at `root`
///
/// Missing component directories are skipped; a malformed file anywhere
/// fails the whole pull.
pub fn pull<S: PathStore + ?Sized>(store: &S, root: &Path) -> Result<FullSnapshot> {
    if !store.exists(root) {
        return Err(Error::LocationNotFound(root.display().to_string()));
    }

    let mut full = FullSnapshot::default();

    let custom = custom_dir(root);
    if store.exists(&custom) {
        full.custom = Some(CustomSnapshot::pull(store, &custom, root)?);
    }

    let helm_root = root.join(HELM_DIR);
    if store.exists(&helm_root) {
        for release in store.list_child_dirs(&helm_root)? {
            full.helm.push(HelmSnapshot::pull(store, &helm_dir(root, &release), root)?);
        }
    }

    let operator_root = root.join(OPERATOR_DIR);
    if store.exists(&operator_root) {
        for id in store.list_child_dirs(&operator_root)? {
            full.operators.push(OperatorSnapshot::pull(store, &operator_dir(root, &id), root)?);
        }
    }

    info!(
        "Pulled snapshot from {:?} (custom: {}, helm: {}, operators: {})",
        root,
        full.custom.is_some(),
        full.helm.len(),
        full.operators.len()
    );
    Ok(full)
}

/// Read a custom component from `dir`
pub fn pull_custom<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<CustomSnapshot> {
    let meta_path = dir.join(METADATA_SNAPSHOT_DIR).join(METADATA_FILE);
    let resources = read_optional::<_, Vec<ComponentMetadata>>(store, &meta_path)?.unwrap_or_else(|| {
        warn!("No custom metadata at {:?}", meta_path);
        Vec::new()
    });

    let data_snapshots = pull_data_snapshots(store, &dir.join(DATA_SNAPSHOT_DIR), root)?;
    debug!("Pulled custom component from {:?}", dir);
    Ok(CustomSnapshot {
        resources,
        data_snapshots,
        warnings: Vec::new(),
    })
}

/// Read a Helm release from `dir`; `release-config.json` is mandatory
pub fn pull_helm<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<HelmSnapshot> {
    let release = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let config_path = dir.join(RELEASE_CONFIG_FILE);
    if !store.exists(&config_path) {
        return Err(Error::MissingArtifact(config_path.display().to_string()));
    }
    let config: ReleaseConfig = read_json(store, &config_path)?;
    let revision = config
        .revision
        .trim()
        .parse::<i32>()
        .map_err(|e| Error::serialization(format!("{} revision", config_path.display()), e))?;

    let meta_dir = dir.join(METADATA_SNAPSHOT_DIR);
    let metadata_path = meta_dir.join(METADATA_FILE);
    let metadata = read_optional::<_, ComponentMetadata>(store, &metadata_path)?.unwrap_or_else(|| {
        warn!("No release metadata for helm release {} at {:?}", release, metadata_path);
        ComponentMetadata::default()
    });
    let release_resources =
        read_optional::<_, Vec<ComponentMetadata>>(store, &meta_dir.join(RESOURCE_METADATA_FILE))?
            .unwrap_or_default();

    let data_snapshots = pull_data_snapshots(store, &dir.join(DATA_SNAPSHOT_DIR), root)?;
    debug!("Pulled helm release {} revision {} from {:?}", release, revision, dir);

    Ok(HelmSnapshot {
        release,
        new_release: String::new(),
        revision,
        storage_backend: config.storage_backend,
        version: config.helm_version,
        metadata,
        release_resources,
        data_snapshots,
        warnings: Vec::new(),
        rendered: None,
    })
}

/// Read an operator instance from `dir`
pub fn pull_operator<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<OperatorSnapshot> {
    let operator_id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let meta_dir = dir.join(METADATA_SNAPSHOT_DIR);
    let operator_resources = read_optional(store, &meta_dir.join(METADATA_FILE))?.unwrap_or_default();
    let custom_resources = read_optional(store, &meta_dir.join(RESOURCE_METADATA_FILE))?.unwrap_or_default();
    let crd_metadata = read_optional(store, &meta_dir.join(CRD_METADATA_FILE))?.unwrap_or_default();

    let mut helm = None;
    let helm_root = dir.join(HELM_DIR);
    if store.exists(&helm_root) {
        let releases = store.list_child_dirs(&helm_root)?;
        if releases.len() > 1 {
            warn!(
                "Operator {} has {} helm releases, using {}",
                operator_id,
                releases.len(),
                releases[0]
            );
        }
        if let Some(release) = releases.first() {
            helm = Some(HelmSnapshot::pull(store, &helm_dir(dir, release), root)?);
        }
    }

    let data_snapshots = pull_data_snapshots(store, &dir.join(DATA_SNAPSHOT_DIR), root)?;
    debug!("Pulled operator {} from {:?}", operator_id, dir);

    Ok(OperatorSnapshot {
        operator_id,
        crd_metadata,
        custom_resources,
        operator_resources,
        helm,
        data_snapshots,
        warnings: Vec::new(),
    })
}

fn pull_data_snapshots<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<Vec<DataSnapshot>> {
    if !store.exists(dir) {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();
    for pvc in store.list_child_dirs(dir)? {
        let pvc_dir = dir.join(&pvc);
        let pvc_path = pvc_dir.join(PVC_FILE);
        if !store.exists(&pvc_path) {
            return Err(Error::MissingArtifact(pvc_path.display().to_string()));
        }
        let metadata = String::from_utf8(store.read_file(&pvc_path)?)
            .map_err(|e| Error::serialization(pvc_path.display().to_string(), e))?;
        let pod_containers_map: Vec<PodContainers> =
            read_optional(store, &pvc_dir.join(POD_CONTAINER_FILE))?.unwrap_or_default();

        let location = pvc_dir
            .strip_prefix(root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| pvc_dir.display().to_string());

        snapshots.push(DataSnapshot {
            location,
            pod_containers_map,
            ..DataSnapshot::new(pvc, metadata)
        });
    }
    Ok(snapshots)
}

/// `None` when the file is absent, an error when it is present but malformed
fn read_optional<S, T>(store: &S, path: &Path) -> Result<Option<T>>
where
    S: PathStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    if !store.exists(path) {
        return Ok(None);
    }
    read_json(store, path).map(Some)
}
