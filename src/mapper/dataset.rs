//! Dataset CR parsing
//!
//! Turns the dynamic Dataset object into a `DatasetNode` snapshot and
//! extracts the declared runtime binding. Parsing is tolerant: only name
//! and namespace are required, every status field degrades to absent.

use kube::core::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;

use crate::graph::DatasetNode;
use crate::mapper::fields::{parse_conditions, seq_at, str_at};
use crate::models::DatasetPhase;

/// Declared runtime binding from `status.runtimes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeBinding {
    pub runtime_type: String,
    pub name: String,
    pub namespace: String,
}

/// Parse a Dataset object into its graph snapshot plus the declared
/// runtime binding, if the status carries one.
///
/// Only the first `status.runtimes` entry is considered; Fluid writes at
/// most one binding there in practice.
pub(crate) fn parse_dataset(obj: &DynamicObject) -> (DatasetNode, Option<RuntimeBinding>) {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let status = obj.data.get("status").cloned().unwrap_or(Value::Null);

    let node = DatasetNode {
        phase: DatasetPhase::parse(str_at(&status, &["phase"])),
        ufs_total: str_at(&status, &["ufsTotal"]).map(str::to_string),
        cached: str_at(&status, &["cacheStates", "cached"]).map(str::to_string),
        cached_percentage: str_at(&status, &["cacheStates", "cachedPercentage"])
            .map(str::to_string),
        conditions: parse_conditions(&status),
        mount_points: mount_points(&obj.data),
        name: name.clone(),
        namespace: namespace.clone(),
    };

    let binding = runtime_binding(&status, &name, &namespace);
    (node, binding)
}

/// Placeholder node for a Dataset that could not be fetched. Carries the
/// requested identity so the graph still names what was asked for.
pub(crate) fn missing_dataset(name: &str, namespace: &str) -> DatasetNode {
    DatasetNode {
        name: name.to_string(),
        namespace: namespace.to_string(),
        phase: DatasetPhase::NotBound,
        ufs_total: None,
        cached: None,
        cached_percentage: None,
        conditions: Vec::new(),
        mount_points: Vec::new(),
    }
}

fn mount_points(data: &Value) -> Vec<String> {
    let Some(mounts) = seq_at(data, &["spec", "mounts"]) else {
        return Vec::new();
    };
    mounts
        .iter()
        .filter_map(|m| str_at(m, &["mountPoint"]))
        .map(str::to_string)
        .collect()
}

fn runtime_binding(status: &Value, dataset_name: &str, namespace: &str) -> Option<RuntimeBinding> {
    let first = seq_at(status, &["runtimes"])?.first()?;
    Some(RuntimeBinding {
        runtime_type: str_at(first, &["type"])?.to_string(),
        // Binding entries may omit name/namespace; the 1:1 convention
        // makes the Dataset's own identity the fallback.
        name: str_at(first, &["name"])
            .unwrap_or(dataset_name)
            .to_string(),
        namespace: str_at(first, &["namespace"])
            .unwrap_or(namespace)
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ApiResource;
    use serde_json::json;

    fn dataset_object(status: Value) -> DynamicObject {
        let resource = crate::kube::queries::dataset_resource();
        let mut obj = DynamicObject::new("demo-data", &resource).within("default");
        obj.data = json!({
            "spec": {
                "mounts": [
                    { "mountPoint": "s3://example-bucket/data", "name": "data" },
                    { "name": "no-mount-point" },
                ]
            },
            "status": status,
        });
        obj
    }

    #[test]
    fn test_parse_bound_dataset() {
        let obj = dataset_object(json!({
            "phase": "Bound",
            "ufsTotal": "100GiB",
            "cacheStates": { "cached": "25GiB", "cachedPercentage": "25%" },
            "runtimes": [
                { "name": "demo-data", "namespace": "default", "type": "alluxio" }
            ],
            "conditions": [
                { "type": "Ready", "status": "True" }
            ],
        }));

        let (node, binding) = parse_dataset(&obj);
        assert_eq!(node.name, "demo-data");
        assert_eq!(node.namespace, "default");
        assert_eq!(node.phase, DatasetPhase::Bound);
        assert_eq!(node.ufs_total.as_deref(), Some("100GiB"));
        assert_eq!(node.cached.as_deref(), Some("25GiB"));
        assert_eq!(node.cached_percentage.as_deref(), Some("25%"));
        assert_eq!(node.mount_points, vec!["s3://example-bucket/data"]);
        assert_eq!(node.conditions.len(), 1);

        let binding = binding.unwrap();
        assert_eq!(binding.runtime_type, "alluxio");
        assert_eq!(binding.name, "demo-data");
        assert_eq!(binding.namespace, "default");
    }

    #[test]
    fn test_parse_unbound_dataset_without_status() {
        let resource = crate::kube::queries::dataset_resource();
        let obj = DynamicObject::new("fresh", &resource).within("default");

        let (node, binding) = parse_dataset(&obj);
        assert_eq!(node.phase, DatasetPhase::NotBound);
        assert!(node.ufs_total.is_none());
        assert!(node.mount_points.is_empty());
        assert!(binding.is_none());
    }

    #[test]
    fn test_binding_identity_fallback() {
        let obj = dataset_object(json!({
            "phase": "Bound",
            "runtimes": [ { "type": "juicefs" } ],
        }));
        let (_, binding) = parse_dataset(&obj);
        let binding = binding.unwrap();
        assert_eq!(binding.runtime_type, "juicefs");
        assert_eq!(binding.name, "demo-data");
        assert_eq!(binding.namespace, "default");
    }

    #[test]
    fn test_binding_without_type_is_ignored() {
        let obj = dataset_object(json!({
            "phase": "Bound",
            "runtimes": [ { "name": "demo-data" } ],
        }));
        let (_, binding) = parse_dataset(&obj);
        assert!(binding.is_none());
    }

    #[test]
    fn test_missing_dataset_placeholder() {
        let node = missing_dataset("ghost", "default");
        assert_eq!(node.name, "ghost");
        assert_eq!(node.phase, DatasetPhase::NotBound);
        assert!(node.conditions.is_empty());
    }

    #[test]
    fn test_api_resource_shape() {
        let resource: ApiResource = crate::kube::queries::dataset_resource();
        assert_eq!(resource.kind, "Dataset");
        assert_eq!(resource.plural, "datasets");
    }
}
