//! Resource discovery
//!
//! Lists the Kubernetes resources belonging to a Dataset's runtime, in
//! four independent categories fanned out concurrently: workload sets,
//! fuse daemon sets, storage, and configuration. Every category failure
//! degrades to a warning; discovery itself never fails the mapping.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use tracing::{debug, warn};

use crate::graph::{MappingWarning, OwnerInfo, ResourceNode, ResourceStatus};
use crate::kube::ClusterQueries;
use crate::mapper::warnings::{codes, warn_of};
use crate::mapper::Options;
use crate::models::{kinds, labels, release_selector, Component, ResourcePhase, WarningLevel};

/// Raw discovery output, before assembly
#[derive(Debug, Default)]
pub(crate) struct Discovered {
    /// Top-level nodes in category order
    pub nodes: Vec<ResourceNode>,
    /// Pods attributed to their owning StatefulSet, by workload name
    pub pods_by_workload: BTreeMap<String, Vec<ResourceNode>>,
    pub warnings: Vec<MappingWarning>,
}

/// Discover all resources correlated to `name` via the release label.
///
/// Categories run concurrently; an optional per-category deadline turns
/// a slow API server into a fetch-failure warning instead of a hang.
pub(crate) async fn discover(
    queries: &dyn ClusterQueries,
    name: &str,
    namespace: &str,
    opts: &Options,
) -> Discovered {
    let selector = release_selector(name);
    debug!(%selector, namespace, "starting resource discovery");

    let (workloads, daemon_sets, storage, configs) = tokio::join!(
        bounded(
            opts.deadline,
            "StatefulSets",
            codes::STS_LIST_FAILED,
            discover_stateful_sets(queries, namespace, &selector, opts.include_pods),
        ),
        bounded(
            opts.deadline,
            "DaemonSets",
            codes::DS_LIST_FAILED,
            discover_daemon_sets(queries, namespace, &selector),
        ),
        bounded(
            opts.deadline,
            "storage resources",
            codes::PVC_LIST_FAILED,
            discover_storage(queries, namespace, &selector, opts.include_storage),
        ),
        bounded(
            opts.deadline,
            "configuration resources",
            codes::CM_LIST_FAILED,
            discover_configs(queries, namespace, &selector, opts.include_configs),
        ),
    );

    let ((sts_nodes, pods_by_workload), sts_warnings) = workloads;
    let (ds_nodes, ds_warnings) = daemon_sets;
    let (storage_nodes, storage_warnings) = storage;
    let (config_nodes, config_warnings) = configs;

    let mut nodes = sts_nodes;
    nodes.extend(ds_nodes);
    nodes.extend(storage_nodes);
    nodes.extend(config_nodes);

    let mut warnings = sts_warnings;
    warnings.extend(ds_warnings);
    warnings.extend(storage_warnings);
    warnings.extend(config_warnings);

    Discovered {
        nodes,
        pods_by_workload,
        warnings,
    }
}

/// Run a discovery category under an optional deadline. On timeout the
/// category contributes nothing but a fetch-failure warning.
async fn bounded<T, F>(
    deadline: Option<Duration>,
    what: &str,
    code: &str,
    fut: F,
) -> (T, Vec<MappingWarning>)
where
    T: Default,
    F: Future<Output = (T, Vec<MappingWarning>)>,
{
    let Some(limit) = deadline else {
        return fut.await;
    };
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => out,
        Err(_) => {
            warn!(what, ?limit, "discovery category timed out");
            (
                T::default(),
                vec![warn_of(
                    WarningLevel::Warning,
                    code,
                    format!("Timed out listing {} after {:?}", what, limit),
                )],
            )
        }
    }
}

type WorkloadOutput = (Vec<ResourceNode>, BTreeMap<String, Vec<ResourceNode>>);

async fn discover_stateful_sets(
    queries: &dyn ClusterQueries,
    namespace: &str,
    selector: &str,
    include_pods: bool,
) -> (WorkloadOutput, Vec<MappingWarning>) {
    let mut warnings = Vec::new();

    let sets = match queries.list_stateful_sets(namespace, selector).await {
        Ok(sets) => sets,
        Err(err) => {
            warnings.push(warn_of(
                WarningLevel::Warning,
                codes::STS_LIST_FAILED,
                format!("Failed to list StatefulSets: {}", err),
            ));
            return ((Vec::new(), BTreeMap::new()), warnings);
        }
    };

    let pods = if include_pods {
        match queries.list_pods(namespace, selector).await {
            Ok(pods) => pods,
            Err(err) => {
                warnings.push(warn_of(
                    WarningLevel::Warning,
                    codes::POD_LIST_FAILED,
                    format!("Failed to list Pods: {}", err),
                ));
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let mut nodes = Vec::new();
    let mut pods_by_workload: BTreeMap<String, Vec<ResourceNode>> = BTreeMap::new();

    for set in &sets {
        let name = set.metadata.name.clone().unwrap_or_default();
        let desired = set.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);
        let ready = set
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0);

        nodes.push(ResourceNode {
            kind: kinds::STATEFUL_SET.to_string(),
            api_version: Some("apps/v1".to_string()),
            name: name.clone(),
            namespace: set.metadata.namespace.clone(),
            component: component_of(&set.metadata),
            status: ResourceStatus {
                phase: if ready >= desired {
                    ResourcePhase::Ready
                } else {
                    ResourcePhase::NotReady
                },
                ready: Some(format!("{}/{}", ready, desired)),
                message: None,
                age: age_of(&set.metadata),
            },
            owner: owner_of(&set.metadata),
            labels: filtered_labels(&set.metadata),
            details: BTreeMap::new(),
            children: Vec::new(),
        });

        let owned: Vec<ResourceNode> = pods
            .iter()
            .filter(|pod| pod_belongs_to(pod, &name))
            .map(pod_node)
            .collect();
        if !owned.is_empty() {
            pods_by_workload.insert(name, owned);
        }
    }

    ((nodes, pods_by_workload), warnings)
}

async fn discover_daemon_sets(
    queries: &dyn ClusterQueries,
    namespace: &str,
    selector: &str,
) -> (Vec<ResourceNode>, Vec<MappingWarning>) {
    let sets = match queries.list_daemon_sets(namespace, selector).await {
        Ok(sets) => sets,
        Err(err) => {
            return (
                Vec::new(),
                vec![warn_of(
                    WarningLevel::Warning,
                    codes::DS_LIST_FAILED,
                    format!("Failed to list DaemonSets: {}", err),
                )],
            );
        }
    };

    let nodes = sets
        .iter()
        .map(|set| {
            let (ready, desired) = set
                .status
                .as_ref()
                .map(|s| (s.number_ready, s.desired_number_scheduled))
                .unwrap_or((0, 0));
            ResourceNode {
                kind: kinds::DAEMON_SET.to_string(),
                api_version: Some("apps/v1".to_string()),
                name: set.metadata.name.clone().unwrap_or_default(),
                namespace: set.metadata.namespace.clone(),
                component: component_of(&set.metadata),
                status: ResourceStatus {
                    phase: if ready >= desired {
                        ResourcePhase::Ready
                    } else {
                        ResourcePhase::NotReady
                    },
                    ready: Some(format!("{}/{}", ready, desired)),
                    message: None,
                    age: age_of(&set.metadata),
                },
                owner: owner_of(&set.metadata),
                labels: filtered_labels(&set.metadata),
                details: BTreeMap::new(),
                children: Vec::new(),
            }
        })
        .collect();

    (nodes, Vec::new())
}

async fn discover_storage(
    queries: &dyn ClusterQueries,
    namespace: &str,
    selector: &str,
    enabled: bool,
) -> (Vec<ResourceNode>, Vec<MappingWarning>) {
    if !enabled {
        return (Vec::new(), Vec::new());
    }

    let mut warnings = Vec::new();
    let claims = match queries.list_pvcs(namespace, selector).await {
        Ok(claims) => claims,
        Err(err) => {
            warnings.push(warn_of(
                WarningLevel::Warning,
                codes::PVC_LIST_FAILED,
                format!("Failed to list PersistentVolumeClaims: {}", err),
            ));
            return (Vec::new(), warnings);
        }
    };

    // Bound claims name their volume; fetch those PVs concurrently
    let fetches = claims.iter().map(|claim| async move {
        let volume_name = claim
            .spec
            .as_ref()
            .and_then(|s| s.volume_name.clone())
            .filter(|name| !name.is_empty());
        let volume = match &volume_name {
            Some(name) => Some(queries.get_pv(name).await),
            None => None,
        };
        (claim, volume_name, volume)
    });

    let mut nodes = Vec::new();
    for (claim, volume_name, volume) in join_all(fetches).await {
        nodes.push(pvc_node(claim));
        match volume {
            Some(Ok(volume)) => nodes.push(pv_node(&volume, claim)),
            Some(Err(err)) => warnings.push(warn_of(
                WarningLevel::Warning,
                codes::PV_GET_FAILED,
                format!(
                    "Failed to get PersistentVolume {}: {}",
                    volume_name.as_deref().unwrap_or(""),
                    err
                ),
            )),
            None => {}
        }
    }

    (nodes, warnings)
}

async fn discover_configs(
    queries: &dyn ClusterQueries,
    namespace: &str,
    selector: &str,
    enabled: bool,
) -> (Vec<ResourceNode>, Vec<MappingWarning>) {
    if !enabled {
        return (Vec::new(), Vec::new());
    }

    let mut nodes = Vec::new();
    let mut warnings = Vec::new();

    match queries.list_config_maps(namespace, selector).await {
        Ok(maps) => {
            for map in &maps {
                let mut details = BTreeMap::new();
                let keys = map.data.as_ref().map(|d| d.len()).unwrap_or(0);
                details.insert("keys".to_string(), keys.to_string());
                nodes.push(ResourceNode {
                    kind: kinds::CONFIG_MAP.to_string(),
                    api_version: Some("v1".to_string()),
                    name: map.metadata.name.clone().unwrap_or_default(),
                    namespace: map.metadata.namespace.clone(),
                    component: Component::Config,
                    status: ResourceStatus {
                        phase: ResourcePhase::Ready,
                        ready: None,
                        message: None,
                        age: age_of(&map.metadata),
                    },
                    owner: owner_of(&map.metadata),
                    labels: filtered_labels(&map.metadata),
                    details,
                    children: Vec::new(),
                });
            }
        }
        Err(err) => warnings.push(warn_of(
            WarningLevel::Warning,
            codes::CM_LIST_FAILED,
            format!("Failed to list ConfigMaps: {}", err),
        )),
    }

    match queries.list_secrets(namespace, selector).await {
        Ok(secrets) => {
            for secret in &secrets {
                // Key count and type only; secret contents never enter
                // the graph.
                let mut details = BTreeMap::new();
                let keys = secret.data.as_ref().map(|d| d.len()).unwrap_or(0);
                details.insert("keys".to_string(), keys.to_string());
                if let Some(kind) = &secret.type_ {
                    details.insert("type".to_string(), kind.clone());
                }
                nodes.push(ResourceNode {
                    kind: kinds::SECRET.to_string(),
                    api_version: Some("v1".to_string()),
                    name: secret.metadata.name.clone().unwrap_or_default(),
                    namespace: secret.metadata.namespace.clone(),
                    component: Component::Config,
                    status: ResourceStatus {
                        phase: ResourcePhase::Ready,
                        ready: None,
                        message: None,
                        age: age_of(&secret.metadata),
                    },
                    owner: owner_of(&secret.metadata),
                    labels: filtered_labels(&secret.metadata),
                    details,
                    children: Vec::new(),
                });
            }
        }
        Err(err) => warnings.push(warn_of(
            WarningLevel::Warning,
            codes::SECRET_LIST_FAILED,
            format!("Failed to list Secrets: {}", err),
        )),
    }

    (nodes, warnings)
}

fn pvc_node(claim: &PersistentVolumeClaim) -> ResourceNode {
    let phase = match claim.status.as_ref().and_then(|s| s.phase.as_deref()) {
        Some("Bound") => ResourcePhase::Bound,
        Some("Pending") => ResourcePhase::Pending,
        _ => ResourcePhase::NotBound,
    };

    let mut details = BTreeMap::new();
    if let Some(volume) = claim.spec.as_ref().and_then(|s| s.volume_name.as_ref()) {
        details.insert("volumeName".to_string(), volume.clone());
    }
    if let Some(capacity) = claim
        .status
        .as_ref()
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
    {
        details.insert("capacity".to_string(), capacity.0.clone());
    }

    ResourceNode {
        kind: kinds::PVC.to_string(),
        api_version: Some("v1".to_string()),
        name: claim.metadata.name.clone().unwrap_or_default(),
        namespace: claim.metadata.namespace.clone(),
        component: Component::Storage,
        status: ResourceStatus {
            phase,
            ready: None,
            message: None,
            age: age_of(&claim.metadata),
        },
        owner: owner_of(&claim.metadata),
        labels: filtered_labels(&claim.metadata),
        details,
        children: Vec::new(),
    }
}

fn pv_node(volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> ResourceNode {
    let phase = match volume.status.as_ref().and_then(|s| s.phase.as_deref()) {
        Some("Bound") => ResourcePhase::Bound,
        Some("Pending") => ResourcePhase::Pending,
        Some("Failed") => ResourcePhase::Failed,
        _ => ResourcePhase::NotBound,
    };

    let mut details = BTreeMap::new();
    if let Some(capacity) = volume
        .spec
        .as_ref()
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
    {
        details.insert("capacity".to_string(), capacity.0.clone());
    }

    ResourceNode {
        kind: kinds::PV.to_string(),
        api_version: Some("v1".to_string()),
        name: volume.metadata.name.clone().unwrap_or_default(),
        // PersistentVolumes are cluster-scoped
        namespace: None,
        component: Component::Storage,
        status: ResourceStatus {
            phase,
            ready: None,
            message: None,
            age: age_of(&volume.metadata),
        },
        owner: Some(OwnerInfo {
            kind: kinds::PVC.to_string(),
            name: claim.metadata.name.clone().unwrap_or_default(),
            uid: claim.metadata.uid.clone(),
        }),
        labels: filtered_labels(&volume.metadata),
        details,
        children: Vec::new(),
    }
}

/// A pod belongs to a workload when an owner reference names it, or as a
/// fallback when the pod name extends the workload name. The fallback
/// covers controllers that manage pods without direct owner references.
fn pod_belongs_to(pod: &Pod, workload: &str) -> bool {
    if let Some(refs) = &pod.metadata.owner_references {
        if refs.iter().any(|r| r.name == workload) {
            return true;
        }
    }
    pod.metadata
        .name
        .as_deref()
        .is_some_and(|name| name.starts_with(&format!("{}-", workload)))
}

fn pod_node(pod: &Pod) -> ResourceNode {
    let phase_str = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");

    let (ready_count, total) = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| {
            (
                statuses.iter().filter(|c| c.ready).count(),
                statuses.len(),
            )
        })
        .unwrap_or((0, 0));

    ResourceNode {
        kind: kinds::POD.to_string(),
        api_version: Some("v1".to_string()),
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone(),
        component: component_of(&pod.metadata),
        status: ResourceStatus {
            phase: ResourcePhase::from_pod_phase(phase_str),
            ready: (total > 0).then(|| format!("{}/{}", ready_count, total)),
            message: Some(phase_str.to_string()),
            age: age_of(&pod.metadata),
        },
        owner: owner_of(&pod.metadata),
        labels: filtered_labels(&pod.metadata),
        details: BTreeMap::new(),
        children: Vec::new(),
    }
}

fn component_of(meta: &ObjectMeta) -> Component {
    meta.labels
        .as_ref()
        .and_then(|l| l.get(labels::ROLE))
        .map(|role| Component::from_role_label(role))
        .unwrap_or(Component::Unknown)
}

/// Keep only the discovery-relevant label keys
fn filtered_labels(meta: &ObjectMeta) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Some(all) = &meta.labels {
        for key in labels::FILTERED {
            if let Some(value) = all.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
    }
    out
}

fn owner_of(meta: &ObjectMeta) -> Option<OwnerInfo> {
    let first = meta.owner_references.as_ref()?.first()?;
    Some(OwnerInfo {
        kind: first.kind.clone(),
        name: first.name.clone(),
        uid: Some(first.uid.clone()),
    })
}

fn age_of(meta: &ObjectMeta) -> Option<String> {
    meta.creation_timestamp.as_ref().map(format_age)
}

fn format_age(created: &Time) -> String {
    let secs = Utc::now()
        .signed_duration_since(created.0)
        .num_seconds()
        .max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}
