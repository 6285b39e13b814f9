//! Output data model for the resource mapper
//!
//! These types represent the mapping result in a structured,
//! machine-readable form. The serialized field names are a stable
//! contract for downstream consumers; `runtime` is optional (an absent
//! runtime is a valid state, distinct from a present-but-unhealthy one),
//! `resources` and `warnings` are always present.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Component, DatasetPhase, ResourcePhase, RuntimeKind, WarningLevel};

/// The main output structure: the complete mapping of a Fluid Dataset to
/// its underlying Kubernetes resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraph {
    /// The root Dataset CR
    pub dataset: DatasetNode,

    /// The bound Runtime CR, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeNode>,

    /// All discovered Kubernetes resources, in discovery order:
    /// StatefulSets, DaemonSets, storage, configuration. Pods appear only
    /// nested under their owning workload set.
    pub resources: Vec<ResourceNode>,

    /// Issues detected during mapping
    pub warnings: Vec<MappingWarning>,

    /// Mapping execution metadata
    pub metadata: GraphMetadata,
}

/// Snapshot of the Dataset custom resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetNode {
    pub name: String,
    pub namespace: String,

    /// Current lifecycle phase
    pub phase: DatasetPhase,

    /// Total size of the underlying filesystem (free-form size string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ufs_total: Option<String>,

    /// Amount of data currently cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<String>,

    /// Percentage of data cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_percentage: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionBrief>,

    /// Configured mount points
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mount_points: Vec<String>,
}

/// Snapshot of the bound Runtime custom resource. Name and namespace are
/// always equal to the Dataset's (1:1 binding by shared identity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeNode {
    pub name: String,
    pub namespace: String,

    #[serde(rename = "type")]
    pub kind: RuntimeKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuse_phase: Option<String>,

    /// Ready/desired master instances (e.g. "1/1"); only emitted when the
    /// desired count is known and non-zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_ready: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_ready: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuse_ready: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionBrief>,
}

/// A discovered Kubernetes resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Kubernetes kind (StatefulSet, DaemonSet, Pod, ...)
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub name: String,

    /// Absent for cluster-scoped kinds (PersistentVolume)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Which Fluid component this resource belongs to
    pub component: Component,

    pub status: ResourceStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerInfo>,

    /// Selected relevant labels (release/app/role/component)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Additional resource-specific details (counts only, never contents)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,

    /// Resources owned by this one (pods under their workload set)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceNode>,
}

/// Health status of a discovered resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    pub phase: ResourcePhase,

    /// Ready/desired count for workloads (e.g. "2/3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// Ownership link from a subordinate object to its controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Simplified view of a Kubernetes condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionBrief {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// An issue detected during the mapping process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingWarning {
    pub level: WarningLevel,

    /// Stable machine-readable code
    pub code: String,

    pub message: String,

    /// Name of the affected resource, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Remediation guidance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Metadata about one mapping invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    /// When the mapping was performed
    pub mapped_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Revision of the mapping logic that produced this graph
    pub version: String,

    /// True when the graph was built from mock data
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mock_mode: bool,
}

impl ResourceGraph {
    /// A graph is healthy if and only if it contains no error-level
    /// warnings. Derived, never stored.
    pub fn is_healthy(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| w.level == WarningLevel::Error)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All top-level resources of a specific kind
    pub fn resources_by_kind(&self, kind: &str) -> Vec<&ResourceNode> {
        self.resources.iter().filter(|r| r.kind == kind).collect()
    }

    /// All top-level resources attributed to a component
    pub fn resources_by_component(&self, component: Component) -> Vec<&ResourceNode> {
        self.resources
            .iter()
            .filter(|r| r.component == component)
            .collect()
    }

    /// Brief one-line summary of the graph
    pub fn summary(&self) -> String {
        match &self.runtime {
            Some(runtime) => format!(
                "Dataset: {} -> {} Runtime",
                self.dataset.name, runtime.kind
            ),
            None => format!("Dataset: {} (No Runtime)", self.dataset.name),
        }
    }
}
