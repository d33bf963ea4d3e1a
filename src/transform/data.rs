// src/transform/data.rs

//! PVC transforms over data snapshots

use super::{Candidate, ExcludePolicy, Exclusion, TransformOutcome, run_requests};
use crate::cluster::ClusterClient;
use crate::model::{CustomTransform, DataSnapshot, GroupVersionKind, Resource};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Apply PVC transforms to `snapshots` and drop excluded entries
///
/// PVCs are keyed by their captured claim name. Transformed and untouched
/// entries keep everything but their PVC body.
pub fn transform_data_snapshots(
    cluster: &dyn ClusterClient,
    namespace: &str,
    snapshots: &mut Vec<DataSnapshot>,
    policy: &ExcludePolicy,
    transforms: &HashMap<GroupVersionKind, Vec<CustomTransform>>,
) -> TransformOutcome {
    let gvk = GroupVersionKind::persistent_volume_claim();
    let mut outcome = TransformOutcome::default();
    if snapshots.is_empty() {
        return outcome;
    }

    // PVCs honour the default-ignore list too, not only explicit excludes
    let excluded_names = match policy.exclusion(&gvk) {
        Exclusion::All => {
            let names: Vec<String> = snapshots.iter().map(|ds| ds.persistent_volume_claim_name.clone()).collect();
            info!("Excluding {} PVC(s) from restore", names.len());
            outcome.excluded = vec![Resource::new(gvk, names)];
            snapshots.clear();
            return outcome;
        }
        Exclusion::Named(names) => Some(names),
        Exclusion::None => None,
    };

    let Some(requests) = transforms.get(&gvk).filter(|r| !r.is_empty()) else {
        return outcome;
    };
    debug!("Running {} transform(s) on {} PVC(s)", requests.len(), snapshots.len());

    {
        let mut candidates: Vec<Candidate<'_>> = snapshots
            .iter_mut()
            .map(|ds| Candidate {
                name: Some(ds.persistent_volume_claim_name.clone()),
                body: &mut ds.persistent_volume_claim_metadata,
            })
            .collect();
        outcome = run_requests(cluster, namespace, &gvk, requests, &mut candidates, excluded_names);
    }

    let dropped: HashSet<&str> = outcome
        .excluded
        .iter()
        .flat_map(|res| res.objects.iter().map(String::as_str))
        .collect();
    if !dropped.is_empty() {
        snapshots.retain(|ds| !dropped.contains(ds.persistent_volume_claim_name.as_str()));
        info!("Dropped {} excluded PVC(s)", dropped.len());
    }

    outcome
}
