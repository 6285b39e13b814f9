//! Warning vocabulary and the post-assembly detector
//!
//! Codes are a stable machine-readable contract; messages are for
//! humans and may change. The detector runs over the assembled graph
//! only, so every rule here is a pure function of graph state.

use crate::graph::{MappingWarning, ResourceNode, RuntimeNode};
use crate::models::{kinds, labels, Component, ResourcePhase, RuntimeKind, WarningLevel};

/// Stable warning codes
pub mod codes {
    pub const DATASET_NOT_FOUND: &str = "DATASET_NOT_FOUND";
    pub const RUNTIME_NOT_BOUND: &str = "RUNTIME_NOT_BOUND";
    pub const UNKNOWN_RUNTIME_TYPE: &str = "UNKNOWN_RUNTIME_TYPE";
    pub const MASTER_MISSING: &str = "MASTER_MISSING";
    pub const WORKER_MISSING: &str = "WORKER_MISSING";
    pub const FUSE_MISSING: &str = "FUSE_MISSING";
    pub const PODS_NOT_READY: &str = "PODS_NOT_READY";
    pub const ORPHANED_RESOURCE: &str = "ORPHANED_RESOURCE";
    pub const PV_NOT_BOUND: &str = "PV_NOT_BOUND";
    pub const STS_LIST_FAILED: &str = "STS_LIST_FAILED";
    pub const DS_LIST_FAILED: &str = "DS_LIST_FAILED";
    pub const POD_LIST_FAILED: &str = "POD_LIST_FAILED";
    pub const PVC_LIST_FAILED: &str = "PVC_LIST_FAILED";
    pub const PV_GET_FAILED: &str = "PV_GET_FAILED";
    pub const CM_LIST_FAILED: &str = "CM_LIST_FAILED";
    pub const SECRET_LIST_FAILED: &str = "SECRET_LIST_FAILED";
}

pub(crate) fn warn_of(
    level: WarningLevel,
    code: &str,
    message: impl Into<String>,
) -> MappingWarning {
    MappingWarning {
        level,
        code: code.to_string(),
        message: message.into(),
        resource: None,
        suggestion: None,
    }
}

/// Detect issues in the assembled graph.
///
/// Component-missing rules are gated on the runtime's component matrix:
/// a kind that deploys no master never raises MASTER_MISSING, and with
/// no bound runtime there is no expectation to check at all.
pub(crate) fn detect(
    resources: &[ResourceNode],
    runtime: Option<&RuntimeNode>,
) -> Vec<MappingWarning> {
    let mut out = Vec::new();

    if let Some(runtime) = runtime {
        let matrix = runtime.kind.components();
        let present =
            |component: Component| resources.iter().any(|r| r.component == component);

        if matrix.has_master && !present(Component::Master) {
            out.push(MappingWarning {
                level: WarningLevel::Error,
                code: codes::MASTER_MISSING.to_string(),
                message: format!(
                    "No master StatefulSet found for {} runtime",
                    runtime.kind
                ),
                resource: Some(runtime.name.clone()),
                suggestion: Some(
                    "Check the runtime controller logs for scheduling failures".to_string(),
                ),
            });
        }
        if matrix.has_worker && !present(Component::Worker) {
            out.push(MappingWarning {
                level: WarningLevel::Error,
                code: codes::WORKER_MISSING.to_string(),
                message: format!(
                    "No worker StatefulSet found for {} runtime",
                    runtime.kind
                ),
                resource: Some(runtime.name.clone()),
                suggestion: Some(
                    "Check the runtime controller logs for scheduling failures".to_string(),
                ),
            });
        }
        if matrix.has_fuse && !present(Component::Fuse) {
            out.push(MappingWarning {
                level: WarningLevel::Warning,
                code: codes::FUSE_MISSING.to_string(),
                message: format!("No fuse DaemonSet found for {} runtime", runtime.kind),
                resource: Some(runtime.name.clone()),
                suggestion: Some(
                    "Fuse may start lazily on first mount when webhook injection is enabled"
                        .to_string(),
                ),
            });
        }
    }

    for node in resources {
        check_node(node, &mut out);
        for child in &node.children {
            check_readiness(child, &mut out);
        }
    }

    out
}

fn check_node(node: &ResourceNode, out: &mut Vec<MappingWarning>) {
    check_readiness(node, out);

    // Workloads carrying the release label but not owned by a recognized
    // runtime CR are likely leftovers from a deleted runtime. Storage and
    // configuration objects legitimately lack runtime owners, so the rule
    // is limited to workload kinds.
    if (node.kind == kinds::STATEFUL_SET || node.kind == kinds::DAEMON_SET)
        && node.labels.contains_key(labels::RELEASE)
    {
        let owned_by_runtime = node
            .owner
            .as_ref()
            .is_some_and(|o| RuntimeKind::from_cr_kind(&o.kind).is_some());
        if !owned_by_runtime {
            out.push(MappingWarning {
                level: WarningLevel::Warning,
                code: codes::ORPHANED_RESOURCE.to_string(),
                message: format!(
                    "{} {} carries the release label but has no runtime owner",
                    node.kind, node.name
                ),
                resource: Some(node.name.clone()),
                suggestion: Some(
                    "Verify whether this is left over from a deleted runtime".to_string(),
                ),
            });
        }
    }

    if (node.kind == kinds::PVC || node.kind == kinds::PV)
        && node.status.phase != ResourcePhase::Bound
    {
        out.push(MappingWarning {
            level: WarningLevel::Warning,
            code: codes::PV_NOT_BOUND.to_string(),
            message: format!("{} {} is not bound", node.kind, node.name),
            resource: Some(node.name.clone()),
            suggestion: Some("Check the volume provisioner and storage class".to_string()),
        });
    }
}

fn check_readiness(node: &ResourceNode, out: &mut Vec<MappingWarning>) {
    if node.status.phase != ResourcePhase::NotReady
        && node.status.phase != ResourcePhase::Failed
    {
        return;
    }
    let counts = node
        .status
        .ready
        .as_ref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    out.push(MappingWarning {
        level: WarningLevel::Warning,
        code: codes::PODS_NOT_READY.to_string(),
        message: format!("{} {} is not ready{}", node.kind, node.name, counts),
        resource: Some(node.name.clone()),
        suggestion: Some("Inspect the pod events and container logs".to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{OwnerInfo, ResourceStatus};
    use crate::models::ResourcePhase;
    use std::collections::BTreeMap;

    fn runtime(kind: RuntimeKind) -> RuntimeNode {
        RuntimeNode {
            name: "demo-data".to_string(),
            namespace: "default".to_string(),
            kind,
            master_phase: None,
            worker_phase: None,
            fuse_phase: None,
            master_ready: None,
            worker_ready: None,
            fuse_ready: None,
            conditions: Vec::new(),
        }
    }

    fn node(kind: &str, name: &str, component: Component, phase: ResourcePhase) -> ResourceNode {
        let mut labels_map = BTreeMap::new();
        labels_map.insert(labels::RELEASE.to_string(), "demo-data".to_string());
        ResourceNode {
            kind: kind.to_string(),
            api_version: None,
            name: name.to_string(),
            namespace: Some("default".to_string()),
            component,
            status: ResourceStatus {
                phase,
                ready: None,
                message: None,
                age: None,
            },
            owner: Some(OwnerInfo {
                kind: "AlluxioRuntime".to_string(),
                name: "demo-data".to_string(),
                uid: None,
            }),
            labels: labels_map,
            details: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    fn full_set() -> Vec<ResourceNode> {
        vec![
            node(
                kinds::STATEFUL_SET,
                "demo-data-master",
                Component::Master,
                ResourcePhase::Ready,
            ),
            node(
                kinds::STATEFUL_SET,
                "demo-data-worker",
                Component::Worker,
                ResourcePhase::Ready,
            ),
            node(
                kinds::DAEMON_SET,
                "demo-data-fuse",
                Component::Fuse,
                ResourcePhase::Ready,
            ),
        ]
    }

    #[test]
    fn test_healthy_graph_is_clean() {
        let warnings = detect(&full_set(), Some(&runtime(RuntimeKind::Alluxio)));
        assert!(warnings.is_empty(), "unexpected: {:?}", warnings);
    }

    #[test]
    fn test_missing_components_gated_on_matrix() {
        // No resources at all: alluxio expects everything
        let warnings = detect(&[], Some(&runtime(RuntimeKind::Alluxio)));
        let codes_found: Vec<&str> = warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(
            codes_found,
            vec![
                codes::MASTER_MISSING,
                codes::WORKER_MISSING,
                codes::FUSE_MISSING
            ]
        );

        // juicefs has no master
        let warnings = detect(&[], Some(&runtime(RuntimeKind::Juicefs)));
        assert!(!warnings.iter().any(|w| w.code == codes::MASTER_MISSING));
        assert!(warnings.iter().any(|w| w.code == codes::WORKER_MISSING));

        // thin only expects fuse
        let warnings = detect(&[], Some(&runtime(RuntimeKind::Thin)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, codes::FUSE_MISSING);
    }

    #[test]
    fn test_no_runtime_means_no_component_expectations() {
        let warnings = detect(&[], None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fuse_missing_is_warning_level() {
        let resources = vec![
            node(
                kinds::STATEFUL_SET,
                "demo-data-master",
                Component::Master,
                ResourcePhase::Ready,
            ),
            node(
                kinds::STATEFUL_SET,
                "demo-data-worker",
                Component::Worker,
                ResourcePhase::Ready,
            ),
        ];
        let warnings = detect(&resources, Some(&runtime(RuntimeKind::Alluxio)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, codes::FUSE_MISSING);
        assert_eq!(warnings[0].level, WarningLevel::Warning);
    }

    #[test]
    fn test_not_ready_workload_and_child_pod() {
        let mut resources = full_set();
        resources[1].status.phase = ResourcePhase::NotReady;
        resources[1].status.ready = Some("1/2".to_string());
        resources[1].children.push(node(
            kinds::POD,
            "demo-data-worker-1",
            Component::Worker,
            ResourcePhase::Pending,
        ));
        resources[1].children.push(node(
            kinds::POD,
            "demo-data-worker-0",
            Component::Worker,
            ResourcePhase::Failed,
        ));

        let warnings = detect(&resources, Some(&runtime(RuntimeKind::Alluxio)));
        let not_ready: Vec<&MappingWarning> = warnings
            .iter()
            .filter(|w| w.code == codes::PODS_NOT_READY)
            .collect();
        // The workload itself and the failed pod; the pending pod is not
        // flagged, pending is a normal transient state
        assert_eq!(not_ready.len(), 2);
        assert!(not_ready[0].message.contains("(1/2)"));
        assert!(warnings.iter().all(|w| w.level == WarningLevel::Warning));
    }

    #[test]
    fn test_orphaned_workload() {
        let mut orphan = node(
            kinds::STATEFUL_SET,
            "demo-data-worker",
            Component::Worker,
            ResourcePhase::Ready,
        );
        orphan.owner = None;
        let warnings = detect(&[orphan], None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, codes::ORPHANED_RESOURCE);
        assert_eq!(warnings[0].level, WarningLevel::Warning);
    }

    #[test]
    fn test_unlabeled_workload_is_not_flagged() {
        let mut stray = node(
            kinds::STATEFUL_SET,
            "other-app",
            Component::Unknown,
            ResourcePhase::Ready,
        );
        stray.owner = None;
        stray.labels.clear();
        let warnings = detect(&[stray], None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_non_runtime_owner_is_orphaned() {
        let mut stray = node(
            kinds::DAEMON_SET,
            "demo-data-fuse",
            Component::Fuse,
            ResourcePhase::Ready,
        );
        stray.owner = Some(OwnerInfo {
            kind: "Deployment".to_string(),
            name: "something-else".to_string(),
            uid: None,
        });
        let warnings = detect(&[stray], None);
        assert!(warnings.iter().any(|w| w.code == codes::ORPHANED_RESOURCE));
    }

    #[test]
    fn test_storage_objects_never_orphaned() {
        let mut pvc = node(
            kinds::PVC,
            "demo-data",
            Component::Storage,
            ResourcePhase::Bound,
        );
        pvc.owner = None;
        let warnings = detect(&[pvc], None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unbound_claim() {
        let pvc = node(
            kinds::PVC,
            "demo-data",
            Component::Storage,
            ResourcePhase::NotBound,
        );
        let warnings = detect(&[pvc], None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, codes::PV_NOT_BOUND);
    }
}
