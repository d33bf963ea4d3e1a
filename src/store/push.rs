// src/store/push.rs

//! Writing snapshots to the store

use super::layout::{
    CRD_METADATA_FILE, DATA_SNAPSHOT_DIR, METADATA_FILE, METADATA_SNAPSHOT_DIR, POD_CONTAINER_FILE,
    PVC_FILE, RELEASE_CONFIG_FILE, RESOURCE_METADATA_FILE, ReleaseConfig, custom_dir, helm_dir,
    operator_dir,
};
use super::{PathStore, write_json};
use crate::component::SnapshotComponent;
use crate::error::{Error, Result};
use crate::model::{CustomSnapshot, DataSnapshot, FullSnapshot, HelmSnapshot, OperatorSnapshot};
use std::path::Path;
use tracing::{debug, info};

/// Write every present component of `full` under `root`
pub fn push<S: PathStore + ?Sized>(store: &S, full: &FullSnapshot, root: &Path) -> Result<()> {
    if full.is_empty() {
        return Err(Error::EmptySnapshot);
    }
    store.mkdir(root)?;

    if let Some(custom) = &full.custom {
        custom.push(store, &custom_dir(root))?;
    }
    for helm in &full.helm {
        helm.push(store, &helm_dir(root, &helm.release))?;
    }
    for operator in &full.operators {
        operator.push(store, &operator_dir(root, &operator.operator_id))?;
    }

    info!(
        "Pushed snapshot to {:?} (custom: {}, helm: {}, operators: {})",
        root,
        full.custom.is_some(),
        full.helm.len(),
        full.operators.len()
    );
    Ok(())
}

/// Write a custom component into `dir`
pub fn push_custom<S: PathStore + ?Sized>(store: &S, custom: &CustomSnapshot, dir: &Path) -> Result<()> {
    let meta_dir = dir.join(METADATA_SNAPSHOT_DIR);
    store.mkdir(&meta_dir)?;
    write_json(store, &meta_dir.join(METADATA_FILE), &custom.resources)?;
    push_data_snapshots(store, &custom.data_snapshots, &dir.join(DATA_SNAPSHOT_DIR))?;
    debug!("Pushed custom component to {:?}", dir);
    Ok(())
}

/// Write a Helm release into `dir` (`.../helm/<release>`)
pub fn push_helm<S: PathStore + ?Sized>(store: &S, helm: &HelmSnapshot, dir: &Path) -> Result<()> {
    store.mkdir(dir)?;
    let config = ReleaseConfig {
        helm_version: helm.version,
        storage_backend: helm.storage_backend,
        revision: helm.revision.to_string(),
    };
    write_json(store, &dir.join(RELEASE_CONFIG_FILE), &config)?;

    let meta_dir = dir.join(METADATA_SNAPSHOT_DIR);
    store.mkdir(&meta_dir)?;
    write_json(store, &meta_dir.join(METADATA_FILE), &helm.metadata)?;
    if !helm.release_resources.is_empty() {
        write_json(store, &meta_dir.join(RESOURCE_METADATA_FILE), &helm.release_resources)?;
    }

    push_data_snapshots(store, &helm.data_snapshots, &dir.join(DATA_SNAPSHOT_DIR))?;
    debug!("Pushed helm release {} revision {} to {:?}", helm.release, helm.revision, dir);
    Ok(())
}

/// Write an operator instance into `dir` (`.../operator/<id>`)
pub fn push_operator<S: PathStore + ?Sized>(store: &S, operator: &OperatorSnapshot, dir: &Path) -> Result<()> {
    let meta_dir = dir.join(METADATA_SNAPSHOT_DIR);
    store.mkdir(&meta_dir)?;
    write_json(store, &meta_dir.join(METADATA_FILE), &operator.operator_resources)?;
    write_json(store, &meta_dir.join(RESOURCE_METADATA_FILE), &operator.custom_resources)?;
    write_json(store, &meta_dir.join(CRD_METADATA_FILE), &operator.crd_metadata)?;

    if let Some(helm) = &operator.helm {
        helm.push(store, &helm_dir(dir, &helm.release))?;
    }

    push_data_snapshots(store, &operator.data_snapshots, &dir.join(DATA_SNAPSHOT_DIR))?;
    debug!("Pushed operator {} to {:?}", operator.operator_id, dir);
    Ok(())
}

/// One directory per PVC holding its raw body and pod-container map
fn push_data_snapshots<S: PathStore + ?Sized>(store: &S, snapshots: &[DataSnapshot], dir: &Path) -> Result<()> {
    for snapshot in snapshots {
        let pvc_dir = dir.join(&snapshot.persistent_volume_claim_name);
        store.mkdir(&pvc_dir)?;
        store.write_file(
            &pvc_dir.join(PVC_FILE),
            snapshot.persistent_volume_claim_metadata.as_bytes(),
        )?;
        write_json(store, &pvc_dir.join(POD_CONTAINER_FILE), &snapshot.pod_containers_map)?;
    }
    Ok(())
}
