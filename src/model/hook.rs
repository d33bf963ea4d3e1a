// src/model/hook.rs

//! Hook configuration and the priority-ordered hook status handed to the
//! hook executor

use super::GroupVersionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to a named object
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ObjectReference {
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// How hooks of different priorities are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Sequential,
    Parallel,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sequential => write!(f, "Sequential"),
            Mode::Parallel => write!(f, "Parallel"),
        }
    }
}

/// Operator of a label selector requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

impl LabelSelectorRequirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            SelectorOperator::In => value.is_some_and(|v| self.values.contains(v)),
            SelectorOperator::NotIn => value.is_none_or(|v| !self.values.contains(v)),
            SelectorOperator::Exists => value.is_some(),
            SelectorOperator::DoesNotExist => value.is_none(),
        }
    }
}

/// Label query over pods; all terms are ANDed, an empty selector matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    /// Selector from a plain label map
    pub fn from_labels(labels: BTreeMap<String, String>) -> Self {
        Self {
            match_labels: labels,
            match_expressions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }

    /// Check whether a label set satisfies this selector
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels.iter().all(|(k, v)| labels.get(k) == Some(v))
            && self.match_expressions.iter().all(|req| req.matches(labels))
    }

    /// Render as a `key=value,key in (a,b)` query string
    pub fn to_query(&self) -> String {
        let mut terms: Vec<String> = self
            .match_labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        for req in &self.match_expressions {
            let term = match req.operator {
                SelectorOperator::In => format!("{} in ({})", req.key, req.values.join(",")),
                SelectorOperator::NotIn => format!("{} notin ({})", req.key, req.values.join(",")),
                SelectorOperator::Exists => req.key.clone(),
                SelectorOperator::DoesNotExist => format!("!{}", req.key),
            };
            terms.push(term);
        }
        terms.join(",")
    }
}

/// Pods a hook applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSelector {
    /// Any matching selector selects the pod
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelSelector>,
    /// Pod name regex
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub regex: String,
}

/// One configured hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInfo {
    pub hook: ObjectReference,
    pub pod_selector: PodSelector,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_regex: String,
}

/// Hooks to run around a backup or restore
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_ready_wait_seconds: Option<u16>,
    pub hooks: Vec<HookInfo>,
}

/// Command run inside a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAction {
    #[serde(default)]
    pub command: Vec<String>,
}

/// Pre or post half of a hook definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookExecution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_action: Option<ExecAction>,
    #[serde(default)]
    pub ignore_failure: bool,
    #[serde(default)]
    pub max_retry_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpec {
    #[serde(default)]
    pub pre: HookExecution,
    #[serde(default)]
    pub post: HookExecution,
}

/// Hook definition object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub spec: HookSpec,
}

/// Execution settings copied from a hook definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfiguration {
    #[serde(default)]
    pub max_retry_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u16>,
    #[serde(default)]
    pub ignore_failure: bool,
}

impl From<&HookExecution> for HookConfiguration {
    fn from(exec: &HookExecution) -> Self {
        Self {
            max_retry_count: exec.max_retry_count,
            timeout_seconds: exec.timeout_seconds,
            ignore_failure: exec.ignore_failure,
        }
    }
}

/// Pod-owning workload a hook target is resolved through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub group_version_kind: GroupVersionKind,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrePostHookStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<super::Status>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exit_status: String,
    #[serde(default)]
    pub retry_count: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerHookStatus {
    pub container_name: String,
    #[serde(default)]
    pub pre_hook_status: PrePostHookStatus,
    #[serde(default)]
    pub post_hook_status: PrePostHookStatus,
}

impl ContainerHookStatus {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodHookStatus {
    pub pod_name: String,
    pub container_hook_status: Vec<ContainerHookStatus>,
}

/// A pod, or a workload whose pods are resolved at execution time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_regex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pod_hook_status: Vec<PodHookStatus>,
}

/// One hook with its settings and resolved targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookPriority {
    pub hook: ObjectReference,
    pub pre_hook_conf: HookConfiguration,
    pub post_hook_conf: HookConfiguration,
    pub hook_target: Vec<HookTarget>,
}

/// Hooks sharing an execution slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPriorityStatus {
    pub priority: u8,
    pub hooks: Vec<HookPriority>,
}

/// Hook plan for the hook executor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookComponentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_ready_wait_seconds: Option<u16>,
    #[serde(rename = "hookPriorityStatus", default, skip_serializing_if = "Vec::is_empty")]
    pub hook_priority_statuses: Vec<HookPriorityStatus>,
}
