// tests/hooks.rs

//! Hook target resolution and priority scheduling tests.

mod common;

use appsnap::hook::HookResolver;
use appsnap::model::{
    CustomSnapshot, FullSnapshot, Hook, HookConfig, HookExecution, HookInfo, HookSpec,
    LabelSelector, Mode, ObjectReference, PodSelector,
};
use appsnap::{EngineConfig, Error};
use common::{FakeCluster, controller, deployment, gvk, labels, meta_of, pod, replica_set};
use serde_json::json;

fn hook(name: &str) -> Hook {
    Hook {
        name: name.into(),
        namespace: "app".into(),
        spec: HookSpec {
            pre: HookExecution {
                max_retry_count: 3,
                timeout_seconds: Some(60),
                ..Default::default()
            },
            post: HookExecution {
                ignore_failure: true,
                ..Default::default()
            },
        },
    }
}

fn info(hook: &str, selector_labels: &[(&str, &str)], regex: &str, container_regex: &str) -> HookInfo {
    let labels_sel = if selector_labels.is_empty() {
        vec![]
    } else {
        vec![LabelSelector::from_labels(labels(selector_labels))]
    };
    HookInfo {
        hook: ObjectReference::named(hook, "app"),
        pod_selector: PodSelector {
            labels: labels_sel,
            regex: regex.into(),
        },
        container_regex: container_regex.into(),
    }
}

/// `web` runs one pod through a ReplicaSet; `api` selects the same labels
/// but controls no pods; `db-0` is a captured bare pod.
fn cluster() -> FakeCluster {
    let cluster = FakeCluster::new().with_hook(hook("quiesce")).with_hook(hook("flush"));
    cluster.insert(deployment("web", &[("app", "web")]));
    cluster.insert(replica_set("web-5d8f", &[("app", "web")], "web"));
    cluster.insert(pod(
        "web-5d8f-x1",
        &[("app", "web")],
        &["nginx", "log-shipper"],
        Some(controller("apps/v1", "ReplicaSet", "web-5d8f")),
    ));
    cluster.insert(deployment("api", &[("app", "web")]));
    cluster.insert(pod("db-0", &[("app", "db")], &["postgres"], None));
    cluster
}

fn snapshot() -> FullSnapshot {
    FullSnapshot {
        custom: Some(CustomSnapshot {
            resources: vec![
                meta_of(
                    gvk("apps", "v1", "Deployment"),
                    &[deployment("web", &[("app", "web")]), deployment("api", &[("app", "web")])],
                ),
                meta_of(gvk("", "v1", "Pod"), &[pod("db-0", &[("app", "db")], &["postgres"], None)]),
                meta_of(gvk("", "v1", "Service"), &[json!({"apiVersion": "v1", "kind": "Service", "metadata": {"name": "web"}})]),
            ],
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn test_sequential_slots_per_hook() {
    common::init_tracing();
    let cluster = cluster();
    let config = HookConfig {
        mode: Mode::Sequential,
        pod_ready_wait_seconds: Some(120),
        hooks: vec![info("quiesce", &[("app", "web")], "", "nginx"), info("flush", &[("app", "db")], "", "")],
    };

    let status = HookResolver::new(&cluster, &cluster)
        .resolve(&snapshot(), &config, "app")
        .unwrap();

    assert_eq!(status.pod_ready_wait_seconds, Some(120));
    assert_eq!(status.hook_priority_statuses.len(), 2);
    for (i, slot) in status.hook_priority_statuses.iter().enumerate() {
        assert_eq!(slot.priority as usize, i);
        assert_eq!(slot.hooks.len(), 1);
    }

    let quiesce = &status.hook_priority_statuses[0].hooks[0];
    assert_eq!(quiesce.hook.name, "quiesce");
    assert_eq!(quiesce.pre_hook_conf.max_retry_count, 3);
    assert_eq!(quiesce.pre_hook_conf.timeout_seconds, Some(60));
    assert!(quiesce.post_hook_conf.ignore_failure);
    // api shares web's selector but controls no pods
    assert_eq!(quiesce.hook_target.len(), 1);
    let owner = quiesce.hook_target[0].owner.as_ref().unwrap();
    assert_eq!(owner.name, "web");
    assert_eq!(owner.group_version_kind, gvk("apps", "v1", "Deployment"));
    assert_eq!(quiesce.hook_target[0].container_regex, "nginx");
    assert!(quiesce.hook_target[0].pod_hook_status.is_empty());

    let flush = &status.hook_priority_statuses[1].hooks[0];
    assert!(flush.hook_target[0].owner.is_none());
    let pod_status = &flush.hook_target[0].pod_hook_status[0];
    assert_eq!(pod_status.pod_name, "db-0");
    assert_eq!(pod_status.container_hook_status[0].container_name, "postgres");
}

#[test]
fn test_parallel_single_slot() {
    let cluster = cluster();
    let config = HookConfig {
        mode: Mode::Parallel,
        pod_ready_wait_seconds: None,
        hooks: vec![info("quiesce", &[("app", "web")], "", ""), info("flush", &[], "^db-", "")],
    };

    let status = HookResolver::new(&cluster, &cluster)
        .resolve(&snapshot(), &config, "app")
        .unwrap();

    assert_eq!(status.hook_priority_statuses.len(), 1);
    assert_eq!(status.hook_priority_statuses[0].priority, 0);
    let names: Vec<&str> = status.hook_priority_statuses[0]
        .hooks
        .iter()
        .map(|h| h.hook.name.as_str())
        .collect();
    assert_eq!(names, vec!["quiesce", "flush"]);
}

#[test]
fn test_zero_targets_fails_whole_call() {
    let cluster = cluster();
    let config = HookConfig {
        mode: Mode::Sequential,
        pod_ready_wait_seconds: None,
        hooks: vec![info("quiesce", &[("app", "web")], "", ""), info("flush", &[("app", "cache")], "", "")],
    };

    let err = HookResolver::new(&cluster, &cluster)
        .resolve(&snapshot(), &config, "app")
        .unwrap_err();
    assert!(matches!(err, Error::NoHookTargets { ref hook, ref mode } if hook == "flush" && mode == "Sequential"));
    assert_eq!(err.to_string(), "no matching resources found for hook flush, mode Sequential");
}

#[test]
fn test_selector_required() {
    let cluster = cluster();
    let config = HookConfig {
        hooks: vec![info("quiesce", &[], "", "")],
        ..Default::default()
    };
    let err = HookResolver::new(&cluster, &cluster)
        .resolve(&snapshot(), &config, "app")
        .unwrap_err();
    assert!(matches!(err, Error::HookConfig(_)));
}

#[test]
fn test_no_matching_container() {
    let cluster = cluster();
    let config = HookConfig {
        hooks: vec![info("quiesce", &[("app", "web")], "", "^mysql$")],
        ..Default::default()
    };
    let err = HookResolver::new(&cluster, &cluster)
        .resolve(&snapshot(), &config, "app")
        .unwrap_err();
    assert!(matches!(err, Error::NoMatchingContainer { ref pod, .. } if pod == "web-5d8f-x1"));
}

#[test]
fn test_missing_owner_fails_loudly() {
    let cluster = cluster();
    cluster.insert(deployment("orphaned", &[("app", "orphan")]));
    cluster.insert(pod(
        "orphan-1",
        &[("app", "orphan")],
        &["main"],
        Some(controller("apps/v1", "ReplicaSet", "gone")),
    ));
    let mut full = snapshot();
    full.custom.as_mut().unwrap().resources.push(meta_of(
        gvk("apps", "v1", "Deployment"),
        &[deployment("orphaned", &[("app", "orphan")])],
    ));
    let config = HookConfig {
        hooks: vec![info("quiesce", &[("app", "orphan")], "", "")],
        ..Default::default()
    };

    let err = HookResolver::new(&cluster, &cluster)
        .resolve(&full, &config, "app")
        .unwrap_err();
    assert!(matches!(err, Error::OwnerChain(_)));
}

#[test]
fn test_job_selector_fetched_live() {
    let cluster = cluster();
    cluster.insert(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {"name": "migrate"},
        "spec": {"selector": {"matchLabels": {"controller-uid": "1234"}}}
    }));
    cluster.insert(pod(
        "migrate-abcde",
        &[("controller-uid", "1234"), ("job-name", "migrate")],
        &["migrate"],
        Some(controller("batch/v1", "Job", "migrate")),
    ));
    let captured_job = json!({"apiVersion": "batch/v1", "kind": "Job", "metadata": {"name": "migrate"}, "spec": {}});
    let full = FullSnapshot {
        custom: Some(CustomSnapshot {
            resources: vec![meta_of(gvk("batch", "v1", "Job"), &[captured_job])],
            ..Default::default()
        }),
        ..Default::default()
    };
    let config = HookConfig {
        hooks: vec![info("quiesce", &[("job-name", "migrate")], "", "")],
        ..Default::default()
    };

    let status = HookResolver::new(&cluster, &cluster)
        .with_config(&EngineConfig::default())
        .resolve(&full, &config, "app")
        .unwrap();
    let target = &status.hook_priority_statuses[0].hooks[0].hook_target[0];
    assert_eq!(target.owner.as_ref().unwrap().name, "migrate");
}

#[test]
fn test_resolution_is_idempotent() {
    let cluster = cluster();
    let config = HookConfig {
        mode: Mode::Parallel,
        pod_ready_wait_seconds: Some(30),
        hooks: vec![info("quiesce", &[("app", "web")], "", "")],
    };
    let resolver = HookResolver::new(&cluster, &cluster);
    let first = resolver.resolve(&snapshot(), &config, "app").unwrap();
    let second = resolver.resolve(&snapshot(), &config, "app").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_hook_config_is_empty() {
    let cluster = cluster();
    let status = HookResolver::new(&cluster, &cluster)
        .resolve_optional(&snapshot(), None, "app")
        .unwrap();
    assert!(status.hook_priority_statuses.is_empty());
    assert!(status.pod_ready_wait_seconds.is_none());
}

/// `nightly` runs pods through a Job and declares no selector; `adhoc` is
/// an unrelated Job whose pod carries the same labels.
fn cron_cluster(with_nightly_pod: bool) -> FakeCluster {
    let cluster = FakeCluster::new().with_hook(hook("quiesce"));
    cluster.insert(json!({
        "apiVersion": "batch/v1",
        "kind": "CronJob",
        "metadata": {"name": "nightly"},
        "spec": {"schedule": "0 2 * * *", "jobTemplate": {"spec": {}}}
    }));
    cluster.insert(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {"name": "nightly-123", "ownerReferences": [controller("batch/v1", "CronJob", "nightly")]},
        "spec": {}
    }));
    cluster.insert(json!({"apiVersion": "batch/v1", "kind": "Job", "metadata": {"name": "adhoc"}, "spec": {}}));
    cluster.insert(pod(
        "adhoc-report-x",
        &[("app", "report")],
        &["other"],
        Some(controller("batch/v1", "Job", "adhoc")),
    ));
    if with_nightly_pod {
        cluster.insert(pod(
            "nightly-123-a",
            &[("app", "report")],
            &["report"],
            Some(controller("batch/v1", "Job", "nightly-123")),
        ));
    }
    cluster
}

fn cron_snapshot() -> FullSnapshot {
    let captured = json!({
        "apiVersion": "batch/v1",
        "kind": "CronJob",
        "metadata": {"name": "nightly"},
        "spec": {"schedule": "0 2 * * *", "jobTemplate": {"spec": {}}}
    });
    FullSnapshot {
        custom: Some(CustomSnapshot {
            resources: vec![meta_of(gvk("batch", "v1", "CronJob"), &[captured])],
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn test_cronjob_without_selector_keeps_only_owned_pods() {
    common::init_tracing();
    let cluster = cron_cluster(true);
    let config = HookConfig {
        hooks: vec![info("quiesce", &[("app", "report")], "", "^report$")],
        ..Default::default()
    };

    // adhoc-report-x lists first; had it been kept its container would not match
    let status = HookResolver::new(&cluster, &cluster)
        .resolve(&cron_snapshot(), &config, "app")
        .unwrap();
    let targets = &status.hook_priority_statuses[0].hooks[0].hook_target;
    assert_eq!(targets.len(), 1);
    let owner = targets[0].owner.as_ref().unwrap();
    assert_eq!(owner.name, "nightly");
    assert_eq!(owner.group_version_kind, gvk("batch", "v1", "CronJob"));
}

#[test]
fn test_cronjob_ignores_foreign_pods() {
    let cluster = cron_cluster(false);
    let config = HookConfig {
        hooks: vec![info("quiesce", &[("app", "report")], "", "")],
        ..Default::default()
    };
    let err = HookResolver::new(&cluster, &cluster)
        .resolve(&cron_snapshot(), &config, "app")
        .unwrap_err();
    assert!(matches!(err, Error::NoHookTargets { ref hook, .. } if hook == "quiesce"));
}
