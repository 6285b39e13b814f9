//! Runtime CR parsing
//!
//! All runtime kinds expose a common status shape (phases plus
//! current/desired counts per component), so one parser covers the whole
//! family. Fields that the controller has not populated read as absent.

use kube::core::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;

use crate::graph::RuntimeNode;
use crate::mapper::fields::{i64_at, parse_conditions, str_at};
use crate::models::RuntimeKind;

/// Parse a Runtime object into its graph snapshot
pub(crate) fn parse_runtime(obj: &DynamicObject, kind: RuntimeKind) -> RuntimeNode {
    let status = obj.data.get("status").cloned().unwrap_or(Value::Null);

    RuntimeNode {
        name: obj.name_any(),
        namespace: obj.namespace().unwrap_or_default(),
        kind,
        master_phase: str_at(&status, &["masterPhase"]).map(str::to_string),
        worker_phase: str_at(&status, &["workerPhase"]).map(str::to_string),
        fuse_phase: str_at(&status, &["fusePhase"]).map(str::to_string),
        master_ready: ready_pair(
            &status,
            "currentMasterNumberScheduled",
            "desiredMasterNumberScheduled",
        ),
        worker_ready: ready_pair(
            &status,
            "currentWorkerNumberScheduled",
            "desiredWorkerNumberScheduled",
        ),
        fuse_ready: ready_pair(
            &status,
            "currentFuseNumberScheduled",
            "desiredFuseNumberScheduled",
        ),
        conditions: parse_conditions(&status),
    }
}

/// Format "current/desired" for a component. Emitted only when the
/// desired count is known and positive, so absent components (no master
/// on juicefs, no workers scheduled yet) produce no pair at all.
fn ready_pair(status: &Value, current_key: &str, desired_key: &str) -> Option<String> {
    let desired = i64_at(status, &[desired_key]).unwrap_or(0);
    if desired <= 0 {
        return None;
    }
    let current = i64_at(status, &[current_key]).unwrap_or(0);
    Some(format!("{}/{}", current, desired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runtime_object(status: Value) -> DynamicObject {
        let resource = crate::kube::queries::runtime_resource(RuntimeKind::Alluxio);
        let mut obj = DynamicObject::new("demo-data", &resource).within("default");
        obj.data = json!({ "status": status });
        obj
    }

    #[test]
    fn test_parse_full_status() {
        let obj = runtime_object(json!({
            "masterPhase": "Ready",
            "workerPhase": "PartialReady",
            "fusePhase": "Ready",
            "currentMasterNumberScheduled": 1,
            "desiredMasterNumberScheduled": 1,
            "currentWorkerNumberScheduled": 1,
            "desiredWorkerNumberScheduled": 2,
            "currentFuseNumberScheduled": 3,
            "desiredFuseNumberScheduled": 3,
            "conditions": [
                { "type": "MasterReady", "status": "True" }
            ],
        }));

        let node = parse_runtime(&obj, RuntimeKind::Alluxio);
        assert_eq!(node.name, "demo-data");
        assert_eq!(node.kind, RuntimeKind::Alluxio);
        assert_eq!(node.master_phase.as_deref(), Some("Ready"));
        assert_eq!(node.worker_phase.as_deref(), Some("PartialReady"));
        assert_eq!(node.master_ready.as_deref(), Some("1/1"));
        assert_eq!(node.worker_ready.as_deref(), Some("1/2"));
        assert_eq!(node.fuse_ready.as_deref(), Some("3/3"));
        assert_eq!(node.conditions.len(), 1);
    }

    #[test]
    fn test_zero_desired_suppresses_ready_pair() {
        let obj = runtime_object(json!({
            "workerPhase": "Ready",
            "currentMasterNumberScheduled": 0,
            "desiredMasterNumberScheduled": 0,
            "currentWorkerNumberScheduled": 2,
            "desiredWorkerNumberScheduled": 2,
        }));

        let node = parse_runtime(&obj, RuntimeKind::Juicefs);
        assert!(node.master_ready.is_none());
        assert_eq!(node.worker_ready.as_deref(), Some("2/2"));
        assert!(node.fuse_ready.is_none());
    }

    #[test]
    fn test_empty_status() {
        let resource = crate::kube::queries::runtime_resource(RuntimeKind::Thin);
        let obj = DynamicObject::new("demo-data", &resource).within("default");
        let node = parse_runtime(&obj, RuntimeKind::Thin);
        assert!(node.master_phase.is_none());
        assert!(node.master_ready.is_none());
        assert!(node.conditions.is_empty());
    }
}
