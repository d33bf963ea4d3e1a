// src/transform/meta.rs

//! Metadata transforms over GVK-grouped captured objects

use super::{Candidate, ExcludePolicy, Exclusion, TransformOutcome, object_name, run_requests};
use crate::cluster::ClusterClient;
use crate::model::{ComponentMetadata, CustomTransform, GroupVersionKind};
use crate::store::{excluded_resource, merge_resource_list};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Apply `transforms` to every captured object in `resources`
///
/// Objects of wholly excluded GVKs are reported and left alone. A wholly
/// excluded GVK whose names cannot be read is recorded as a failure and the
/// remaining GVKs are still processed.
pub fn transform_metadata(
    cluster: &dyn ClusterClient,
    namespace: &str,
    resources: &mut [ComponentMetadata],
    policy: &ExcludePolicy,
    transforms: &HashMap<GroupVersionKind, Vec<CustomTransform>>,
) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();

    for comp in resources.iter_mut() {
        let gvk = comp.group_version_kind.clone();

        let excluded_names = match policy.exclusion(&gvk) {
            Exclusion::All => {
                match excluded_resource(comp) {
                    Ok(excluded) => {
                        info!("Excluding {} {} object(s) from restore", excluded.objects.len(), gvk);
                        outcome.excluded = merge_resource_list(&outcome.excluded, &[excluded]);
                    }
                    Err(e) => {
                        warn!("Cannot list excluded {} objects: {}", gvk, e);
                        outcome.fail(e.to_string());
                    }
                }
                continue;
            }
            Exclusion::Named(names) => Some(names),
            Exclusion::None => None,
        };

        let Some(requests) = transforms.get(&gvk).filter(|r| !r.is_empty()) else {
            continue;
        };
        debug!("Running {} transform(s) on {} {} object(s)", requests.len(), comp.metadata.len(), gvk);

        let mut candidates: Vec<Candidate<'_>> = comp
            .metadata
            .iter_mut()
            .map(|body| Candidate {
                name: object_name(body.as_str()),
                body,
            })
            .collect();

        outcome.absorb(run_requests(
            cluster,
            namespace,
            &gvk,
            requests,
            &mut candidates,
            excluded_names,
        ));
    }

    outcome
}
