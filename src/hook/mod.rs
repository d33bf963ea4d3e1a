// src/hook/mod.rs

//! Hook target resolution
//!
//! Turns a [`HookConfig`] and a captured snapshot into the
//! [`HookComponentStatus`] the hook executor works from: which pods or
//! workloads each hook runs against, with which settings, in which order.
//!
//! Resolution only reads from the cluster. Running it twice against an
//! unchanged cluster gives the same result.

mod priority;
mod target;

pub use priority::bucket;
pub use target::POD_OWNER_KINDS;

use crate::cluster::{ClusterClient, HookLookup};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{FullSnapshot, HookComponentStatus, HookConfig};
use priority::hook_priority;
use target::{PodMatcher, candidate_sources, identify_targets};
use tracing::{debug, info};

/// Resolves hook targets against the live cluster
pub struct HookResolver<'a> {
    cluster: &'a dyn ClusterClient,
    hooks: &'a dyn HookLookup,
    max_owner_depth: usize,
}

impl<'a> HookResolver<'a> {
    pub fn new(cluster: &'a dyn ClusterClient, hooks: &'a dyn HookLookup) -> Self {
        Self {
            cluster,
            hooks,
            max_owner_depth: EngineConfig::default().max_owner_depth,
        }
    }

    /// Take limits from an engine config
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.max_owner_depth = config.max_owner_depth;
        self
    }

    /// Resolve every hook in `config` for an operation in `namespace`
    ///
    /// A hook that matches nothing fails the whole call.
    pub fn resolve(
        &self,
        snapshot: &FullSnapshot,
        config: &HookConfig,
        namespace: &str,
    ) -> Result<HookComponentStatus> {
        info!("Resolving {} hook(s) in {} mode for {}", config.hooks.len(), config.mode, namespace);
        let sources = candidate_sources(snapshot);

        let mut resolved = Vec::with_capacity(config.hooks.len());
        for info in &config.hooks {
            let matcher = PodMatcher::new(&info.pod_selector, &info.container_regex)?;
            let targets = identify_targets(self.cluster, namespace, self.max_owner_depth, &sources, &matcher)?;
            if targets.is_empty() {
                return Err(Error::NoHookTargets {
                    hook: info.hook.name.clone(),
                    mode: config.mode.to_string(),
                });
            }

            let hook_ns = if info.hook.namespace.is_empty() {
                namespace
            } else {
                info.hook.namespace.as_str()
            };
            let hook = self.hooks.get_hook(&info.hook.name, hook_ns)?;
            debug!("Hook {} resolved to {} target(s)", info.hook.name, targets.len());
            resolved.push(hook_priority(info, &hook, targets));
        }

        Ok(HookComponentStatus {
            pod_ready_wait_seconds: config.pod_ready_wait_seconds,
            hook_priority_statuses: bucket(config.mode, resolved)?,
        })
    }

    /// Like [`resolve`](Self::resolve); no config gives an empty status
    pub fn resolve_optional(
        &self,
        snapshot: &FullSnapshot,
        config: Option<&HookConfig>,
        namespace: &str,
    ) -> Result<HookComponentStatus> {
        match config {
            Some(config) => self.resolve(snapshot, config, namespace),
            None => {
                debug!("No hooks configured for {}", namespace);
                Ok(HookComponentStatus::default())
            }
        }
    }
}
