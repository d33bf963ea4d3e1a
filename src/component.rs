// src/component.rs

//! Application components
//!
//! Custom, Helm and Operator snapshots share one capability set: they can be
//! pushed to and pulled from the store, reduced to a name-only report and
//! transformed for restore. [`Component`] is the closed set of kinds a
//! [`FullSnapshot`] is made of.

use crate::error::{Error, Result};
use crate::model::{
    CustomReport, CustomSnapshot, FullSnapshot, HelmReport, HelmSnapshot, OperatorReport,
    OperatorSnapshot, Resource, SnapshotReport, TransformStatus,
};
use crate::store::{
    PathStore, excluded_resource, pull_custom, pull_helm, pull_operator, push_custom, push_helm,
    push_operator,
};
use crate::transform::{
    ExcludePolicy, TransformContext, TransformMaps, TransformOutcome, transform_data_snapshots,
    transform_metadata,
};
use std::path::Path;
use tracing::warn;

/// Operations every component kind supports
pub trait SnapshotComponent: Sized {
    type Report;

    /// Write the component into its own directory
    fn push<S: PathStore + ?Sized>(&self, store: &S, dir: &Path) -> Result<()>;

    /// Read the component back from `dir`; `root` is the snapshot root
    fn pull<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<Self>;

    /// Name-only form of the component
    fn convert_to_report(&self) -> Result<Self::Report>;

    /// Run the transforms that apply to this kind
    ///
    /// Returns `None` when nothing in `maps` concerns the component.
    fn transform(
        &mut self,
        ctx: &TransformContext<'_>,
        policy: &ExcludePolicy,
        maps: &TransformMaps,
    ) -> Option<TransformOutcome>;
}

fn reports(resources: &[crate::model::ComponentMetadata]) -> Result<Vec<Resource>> {
    resources.iter().map(excluded_resource).collect()
}

impl SnapshotComponent for CustomSnapshot {
    type Report = CustomReport;

    fn push<S: PathStore + ?Sized>(&self, store: &S, dir: &Path) -> Result<()> {
        push_custom(store, self, dir)
    }

    fn pull<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<Self> {
        pull_custom(store, dir, root)
    }

    fn convert_to_report(&self) -> Result<CustomReport> {
        Ok(CustomReport {
            resources: reports(&self.resources)?,
            data_snapshots: self.data_snapshots.clone(),
            warnings: self.warnings.clone(),
        })
    }

    fn transform(
        &mut self,
        ctx: &TransformContext<'_>,
        policy: &ExcludePolicy,
        maps: &TransformMaps,
    ) -> Option<TransformOutcome> {
        if maps.custom.is_empty() {
            return None;
        }

        let mut outcome =
            transform_data_snapshots(ctx.cluster, ctx.namespace, &mut self.data_snapshots, policy, &maps.custom);
        outcome.absorb(transform_metadata(
            ctx.cluster,
            ctx.namespace,
            &mut self.resources,
            policy,
            &maps.custom,
        ));
        Some(outcome)
    }
}

impl SnapshotComponent for HelmSnapshot {
    type Report = HelmReport;

    fn push<S: PathStore + ?Sized>(&self, store: &S, dir: &Path) -> Result<()> {
        push_helm(store, self, dir)
    }

    fn pull<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<Self> {
        pull_helm(store, dir, root)
    }

    fn convert_to_report(&self) -> Result<HelmReport> {
        let resource = if self.metadata.is_empty() {
            None
        } else {
            Some(excluded_resource(&self.metadata)?)
        };
        Ok(HelmReport {
            release: self.release.clone(),
            new_release: self.new_release.clone(),
            revision: self.revision,
            resource,
            resources: reports(&self.release_resources)?,
            storage_backend: self.storage_backend,
            version: self.version,
            data_snapshots: self.data_snapshots.clone(),
            warnings: self.warnings.clone(),
        })
    }

    fn transform(
        &mut self,
        ctx: &TransformContext<'_>,
        policy: &ExcludePolicy,
        maps: &TransformMaps,
    ) -> Option<TransformOutcome> {
        let release_transform = maps.helm.get(&self.release);
        let run_data = !maps.custom.is_empty();
        if !run_data && release_transform.is_none() {
            return None;
        }

        let mut outcome = TransformOutcome::default();
        if run_data {
            outcome.absorb(transform_data_snapshots(
                ctx.cluster,
                ctx.namespace,
                &mut self.data_snapshots,
                policy,
                &maps.custom,
            ));
        }

        if let Some(transform) = release_transform {
            let mut status = TransformStatus::new(&transform.transform_name);
            if let Err(e) = crate::helm::transform_release(&ctx.release_transformer(), self, transform) {
                warn!("Release transform {} failed for {}: {}", transform.transform_name, self.release, e);
                status.fail(&e.to_string());
                outcome.any_failed = true;
            }
            outcome.statuses.push(status);
        }
        Some(outcome)
    }
}

impl SnapshotComponent for OperatorSnapshot {
    type Report = OperatorReport;

    fn push<S: PathStore + ?Sized>(&self, store: &S, dir: &Path) -> Result<()> {
        push_operator(store, self, dir)
    }

    fn pull<S: PathStore + ?Sized>(store: &S, dir: &Path, root: &Path) -> Result<Self> {
        pull_operator(store, dir, root)
    }

    fn convert_to_report(&self) -> Result<OperatorReport> {
        Ok(OperatorReport {
            operator_id: self.operator_id.clone(),
            custom_resources: reports(&self.custom_resources)?,
            helm: self.helm.as_ref().map(HelmSnapshot::convert_to_report).transpose()?,
            operator_resources: reports(&self.operator_resources)?,
            data_snapshots: self.data_snapshots.clone(),
            warnings: self.warnings.clone(),
        })
    }

    fn transform(
        &mut self,
        ctx: &TransformContext<'_>,
        policy: &ExcludePolicy,
        maps: &TransformMaps,
    ) -> Option<TransformOutcome> {
        if maps.is_empty() {
            return None;
        }

        let mut outcome =
            transform_data_snapshots(ctx.cluster, ctx.namespace, &mut self.data_snapshots, policy, &maps.custom);
        outcome.absorb(transform_metadata(
            ctx.cluster,
            ctx.namespace,
            &mut self.operator_resources,
            policy,
            &maps.custom,
        ));
        if let Some(helm) = self.helm.as_mut() {
            if let Some(nested) = helm.transform(ctx, policy, maps) {
                outcome.absorb(nested);
            }
        }
        Some(outcome)
    }
}

/// One component of a [`FullSnapshot`]
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Custom(CustomSnapshot),
    Helm(HelmSnapshot),
    Operator(OperatorSnapshot),
}

/// Report of one [`Component`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentReport {
    Custom(CustomReport),
    Helm(HelmReport),
    Operator(OperatorReport),
}

impl Component {
    /// Identity used in status and error messages
    pub fn name(&self) -> String {
        match self {
            Component::Custom(_) => "custom".to_string(),
            Component::Helm(helm) => format!("helm/{}", helm.release),
            Component::Operator(op) => format!("operator/{}", op.operator_id),
        }
    }

    pub fn convert_to_report(&self) -> Result<ComponentReport> {
        Ok(match self {
            Component::Custom(c) => ComponentReport::Custom(c.convert_to_report()?),
            Component::Helm(h) => ComponentReport::Helm(h.convert_to_report()?),
            Component::Operator(o) => ComponentReport::Operator(o.convert_to_report()?),
        })
    }

    pub fn transform(
        &mut self,
        ctx: &TransformContext<'_>,
        policy: &ExcludePolicy,
        maps: &TransformMaps,
    ) -> Option<TransformOutcome> {
        match self {
            Component::Custom(c) => c.transform(ctx, policy, maps),
            Component::Helm(h) => h.transform(ctx, policy, maps),
            Component::Operator(o) => o.transform(ctx, policy, maps),
        }
    }
}

impl FullSnapshot {
    /// Split into components: custom first, then releases, then operators
    pub fn into_components(self) -> Vec<Component> {
        let mut components = Vec::with_capacity(1 + self.helm.len() + self.operators.len());
        components.extend(self.custom.map(Component::Custom));
        components.extend(self.helm.into_iter().map(Component::Helm));
        components.extend(self.operators.into_iter().map(Component::Operator));
        components
    }

    /// Reassemble from components; a second custom component is rejected
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Result<Self> {
        let mut full = FullSnapshot::default();
        for component in components {
            match component {
                Component::Custom(c) => {
                    if full.custom.is_some() {
                        return Err(Error::Config("snapshot holds more than one custom component".into()));
                    }
                    full.custom = Some(c);
                }
                Component::Helm(h) => full.helm.push(h),
                Component::Operator(o) => full.operators.push(o),
            }
        }
        Ok(full)
    }

    /// Name-only form of every component
    pub fn convert_to_report(&self) -> Result<SnapshotReport> {
        Ok(SnapshotReport {
            helm_charts: self.helm.iter().map(HelmSnapshot::convert_to_report).collect::<Result<_>>()?,
            operators: self
                .operators
                .iter()
                .map(OperatorSnapshot::convert_to_report)
                .collect::<Result<_>>()?,
            custom: self.custom.as_ref().map(CustomSnapshot::convert_to_report).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentMetadata, DataSnapshot, GroupVersionKind};

    fn cm(name: &str) -> String {
        format!(r#"{{"apiVersion":"v1","kind":"ConfigMap","metadata":{{"name":"{}"}}}}"#, name)
    }

    fn snapshot() -> FullSnapshot {
        FullSnapshot {
            custom: Some(CustomSnapshot {
                resources: vec![ComponentMetadata::new(
                    GroupVersionKind::new("", "v1", "ConfigMap"),
                    vec![cm("a"), cm("b")],
                )],
                ..Default::default()
            }),
            helm: vec![HelmSnapshot {
                release: "db".into(),
                revision: 2,
                data_snapshots: vec![DataSnapshot::new("data-db-0", "{}")],
                ..Default::default()
            }],
            operators: vec![OperatorSnapshot {
                operator_id: "etcd".into(),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_components_round_trip_order() {
        let full = snapshot();
        let components = full.clone().into_components();
        let names: Vec<String> = components.iter().map(Component::name).collect();
        assert_eq!(names, vec!["custom", "helm/db", "operator/etcd"]);
        assert_eq!(FullSnapshot::from_components(components).unwrap(), full);
    }

    #[test]
    fn test_two_custom_components_rejected() {
        let components = vec![
            Component::Custom(CustomSnapshot::default()),
            Component::Custom(CustomSnapshot::default()),
        ];
        assert!(FullSnapshot::from_components(components).is_err());
    }

    #[test]
    fn test_convert_to_report_names_only() {
        let report = snapshot().convert_to_report().unwrap();
        let custom = report.custom.unwrap();
        assert_eq!(custom.resources[0].objects, vec!["a", "b"]);
        assert_eq!(report.helm_charts[0].release, "db");
        assert!(report.helm_charts[0].resource.is_none());
        assert_eq!(report.helm_charts[0].data_snapshots.len(), 1);
        assert_eq!(report.operators[0].operator_id, "etcd");
    }
}
