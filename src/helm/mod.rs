// src/helm/mod.rs

//! Helm release support
//!
//! - Decoding captured release storage objects ([`decode_storage_object`])
//! - Picking the latest captured revision ([`latest_revision_and_release`])
//! - Generating unused release names ([`unique_release_name`])
//! - Applying `--set` overrides and re-rendering a release
//!   ([`transform_release`])
//!
//! Chart rendering and dependency fetching belong to the caller and are
//! reached through [`ReleaseRenderer`].

mod naming;
mod release;
pub mod strvals;

pub use naming::{candidate_release_name, unique_release_name};
pub use release::{
    Release, decode_release, decode_storage_object, encode_release, latest_revision_and_release,
    storage_object, storage_object_name,
};
pub use strvals::{SetParseError, apply_set_values};

use crate::cluster::ClusterError;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{HelmSnapshot, HelmStorageBackend, HelmTransform};
use tracing::info;

/// Probes the live release storage backend
pub trait ReleaseStorage {
    fn release_exists(
        &self,
        backend: HelmStorageBackend,
        name: &str,
        namespace: &str,
    ) -> std::result::Result<bool, ClusterError>;
}

/// Chart dependency loading and rendering
pub trait ReleaseRenderer {
    /// Load the dependency sub-charts captured with `revision`
    fn load_dependencies(&self, release: &mut Release, revision: i32, backup_location: &str) -> Result<()>;

    /// Render `release` with its current values under a new name
    fn render(&self, release: &Release, new_name: &str, namespace: &str) -> Result<Release>;
}

/// Collaborators and settings for a release-level transform
pub struct ReleaseTransformer<'a> {
    pub storage: &'a dyn ReleaseStorage,
    pub renderer: &'a dyn ReleaseRenderer,
    pub config: &'a EngineConfig,
    pub namespace: &'a str,
    pub backup_location: &'a str,
}

/// Apply `transform`'s overrides to the latest captured revision of
/// `helm` and re-render it, storing the result in `helm.rendered`
pub fn transform_release(ctx: &ReleaseTransformer<'_>, helm: &mut HelmSnapshot, transform: &HelmTransform) -> Result<()> {
    if helm.new_release.is_empty() {
        helm.new_release =
            unique_release_name(ctx.storage, &helm.release, ctx.namespace, helm.storage_backend, ctx.config)?;
    }

    let (revision, mut release) = latest_revision_and_release(&helm.metadata, helm.storage_backend)?;
    ctx.renderer.load_dependencies(&mut release, revision, ctx.backup_location)?;
    apply_set_values(&mut release.config, &transform.set)?;

    let rendered = ctx.renderer.render(&release, &helm.new_release, ctx.namespace)?;
    info!(
        "Rendered release {} (chart {}) revision {} as {} ({})",
        helm.release,
        release.chart_name().unwrap_or("unknown"),
        revision,
        helm.new_release,
        transform.transform_name
    );
    helm.rendered = Some(rendered);
    Ok(())
}
