// src/hook/priority.rs

//! Priority bucketing of resolved hooks

use crate::error::{Error, Result};
use crate::model::{Hook, HookConfiguration, HookInfo, HookPriority, HookPriorityStatus, HookTarget, Mode};

/// Pair a hook definition's settings with its resolved targets
pub(crate) fn hook_priority(info: &HookInfo, hook: &Hook, targets: Vec<HookTarget>) -> HookPriority {
    HookPriority {
        hook: info.hook.clone(),
        pre_hook_conf: HookConfiguration::from(&hook.spec.pre),
        post_hook_conf: HookConfiguration::from(&hook.spec.post),
        hook_target: targets,
    }
}

/// Group resolved hooks into execution slots
///
/// Sequential mode gives every hook its own slot numbered by position.
/// Parallel mode puts them all in slot 0.
pub fn bucket(mode: Mode, hooks: Vec<HookPriority>) -> Result<Vec<HookPriorityStatus>> {
    match mode {
        Mode::Sequential => hooks
            .into_iter()
            .enumerate()
            .map(|(i, hook)| {
                let priority = u8::try_from(i)
                    .map_err(|_| Error::HookConfig(format!("too many sequential hooks: {}", i + 1)))?;
                Ok(HookPriorityStatus {
                    priority,
                    hooks: vec![hook],
                })
            })
            .collect(),
        Mode::Parallel => Ok(vec![HookPriorityStatus { priority: 0, hooks }]),
    }
}
