// src/transform/app.rs

//! Whole-application transform and status persistence

use super::{ExcludePolicy, TransformContext, TransformMaps, TransformOutcome};
use crate::cluster::{StatusClient, update_status_with_retry};
use crate::component::{Component, ComponentReport};
use crate::error::{Error, Result};
use crate::model::{
    ComponentStatus, CustomReport, FullSnapshot, HelmReport, OperatorReport, Restore,
    RestoreApplication, RestoreCustom, RestoreHelm, RestoreOperator,
};
use tracing::{debug, info, warn};

/// Transform every component of `full` for `restore`
///
/// Component failures never stop sibling components. The accumulated
/// status is persisted on `restore` before the call reports
/// [`Error::TransformFailed`] for the components that failed.
pub fn transform_snapshot(
    full: &mut FullSnapshot,
    ctx: &TransformContext<'_>,
    restore: &mut Restore,
    status_client: &dyn StatusClient<Restore>,
) -> Result<()> {
    let Some(components) = restore.spec.transform_components.as_ref() else {
        debug!("Restore {} has no transforms", restore.name);
        return Ok(());
    };
    let maps = TransformMaps::new(components);
    let policy = ExcludePolicy::from_restore(&restore.spec, ctx.config)?;

    let mut app = restore.status.restore_application.take().unwrap_or_default();
    let mut failed = Vec::new();

    let mut transformed = Vec::new();
    for mut component in std::mem::take(full).into_components() {
        if let Some(outcome) = component.transform(ctx, &policy, &maps) {
            if outcome.any_failed {
                failed.push(component.name());
            }
            record(&mut app, &component, &outcome);
        }
        transformed.push(component);
    }
    *full = FullSnapshot::from_components(transformed)?;

    restore.status.restore_application = Some(app);
    update_status_with_retry(status_client, &*restore, &ctx.config.status_update)?;

    if !failed.is_empty() {
        warn!("Restore {}: transformation failed for {}", restore.name, failed.join(", "));
        return Err(Error::TransformFailed { components: failed });
    }
    info!("Restore {}: transforms applied", restore.name);
    Ok(())
}

fn record(app: &mut RestoreApplication, component: &Component, outcome: &TransformOutcome) {
    let report = component.convert_to_report().unwrap_or_else(|e| {
        warn!("Could not report {}: {}", component.name(), e);
        identity_report(component)
    });

    let status = match report {
        ComponentReport::Custom(report) => {
            let entry = app.custom.get_or_insert_with(RestoreCustom::default);
            entry.snapshot = Some(report);
            &mut entry.status
        }
        ComponentReport::Helm(report) => {
            let pos = app
                .helm_charts
                .iter()
                .position(|h| h.snapshot.as_ref().is_some_and(|s| s.release == report.release));
            let i = pos.unwrap_or_else(|| {
                app.helm_charts.push(RestoreHelm::default());
                app.helm_charts.len() - 1
            });
            let entry = &mut app.helm_charts[i];
            entry.snapshot = Some(report);
            &mut entry.status
        }
        ComponentReport::Operator(report) => {
            let pos = app
                .operators
                .iter()
                .position(|o| o.snapshot.as_ref().is_some_and(|s| s.operator_id == report.operator_id));
            let i = pos.unwrap_or_else(|| {
                app.operators.push(RestoreOperator::default());
                app.operators.len() - 1
            });
            let entry = &mut app.operators[i];
            entry.snapshot = Some(report);
            &mut entry.status
        }
    };
    outcome.apply_to(status.get_or_insert_with(ComponentStatus::validation));
}

/// Report carrying only the identity of `component`
fn identity_report(component: &Component) -> ComponentReport {
    match component {
        Component::Custom(_) => ComponentReport::Custom(CustomReport::default()),
        Component::Helm(helm) => ComponentReport::Helm(HelmReport {
            release: helm.release.clone(),
            new_release: helm.new_release.clone(),
            revision: helm.revision,
            storage_backend: helm.storage_backend,
            version: helm.version,
            ..Default::default()
        }),
        Component::Operator(op) => ComponentReport::Operator(OperatorReport {
            operator_id: op.operator_id.clone(),
            ..Default::default()
        }),
    }
}
