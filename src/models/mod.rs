//! Domain model: runtime kinds, component roles, phases, and the static
//! label vocabulary used for discovery.

mod runtime_kind;

pub use runtime_kind::{ComponentMatrix, RuntimeKind};

use serde::{Deserialize, Serialize};

/// Standard Fluid labels used for discovery and filtering
pub mod labels {
    /// Primary correlation label: equal to the Dataset/Runtime name
    pub const RELEASE: &str = "release";
    pub const APP: &str = "app";
    /// Role label carrying the `<type>-<role>` vocabulary value
    pub const ROLE: &str = "role";
    pub const COMPONENT: &str = "component";

    /// Label keys retained on graph nodes; everything else is dropped
    pub const FILTERED: [&str; 4] = [RELEASE, APP, ROLE, COMPONENT];
}

/// Kubernetes kind names as they appear on graph nodes
pub mod kinds {
    pub const STATEFUL_SET: &str = "StatefulSet";
    pub const DAEMON_SET: &str = "DaemonSet";
    pub const POD: &str = "Pod";
    pub const PVC: &str = "PersistentVolumeClaim";
    pub const PV: &str = "PersistentVolume";
    pub const CONFIG_MAP: &str = "ConfigMap";
    pub const SECRET: &str = "Secret";
}

/// Build the release label selector for a Dataset/Runtime name
pub fn release_selector(name: &str) -> String {
    format!("{}={}", labels::RELEASE, name)
}

/// Structural role of a discovered resource within the runtime deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Master,
    Worker,
    Fuse,
    Storage,
    Config,
    Unknown,
}

impl Component {
    /// Classify a `role` label value against the known `<type>-<role>`
    /// vocabulary. Exact equality only: a role that merely contains
    /// "master" as a substring is not a master.
    pub fn from_role_label(role: &str) -> Self {
        for kind in RuntimeKind::all() {
            for (component, suffix) in [
                (Component::Master, "master"),
                (Component::Worker, "worker"),
                (Component::Fuse, "fuse"),
            ] {
                if role == format!("{}-{}", kind.as_str(), suffix) {
                    return component;
                }
            }
        }
        Component::Unknown
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Master => "master",
            Component::Worker => "worker",
            Component::Fuse => "fuse",
            Component::Storage => "storage",
            Component::Config => "config",
            Component::Unknown => "unknown",
        }
    }
}

/// Lifecycle phase of a discovered resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourcePhase {
    Ready,
    NotReady,
    Pending,
    Failed,
    Unknown,
    Bound,
    NotBound,
}

impl ResourcePhase {
    /// Map a pod `status.phase` string onto a resource phase
    pub fn from_pod_phase(phase: &str) -> Self {
        match phase {
            "Running" | "Succeeded" => ResourcePhase::Ready,
            "Pending" => ResourcePhase::Pending,
            "Failed" => ResourcePhase::Failed,
            _ => ResourcePhase::Unknown,
        }
    }
}

/// Lifecycle phase of a Dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetPhase {
    Bound,
    NotBound,
    Pending,
    Failed,
}

impl DatasetPhase {
    /// Parse a Dataset `status.phase`. Absent or unrecognized values
    /// default to `NotBound` (a dataset the controller has not yet
    /// reconciled carries no phase at all).
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Bound") => DatasetPhase::Bound,
            Some("Pending") => DatasetPhase::Pending,
            Some("Failed") => DatasetPhase::Failed,
            _ => DatasetPhase::NotBound,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetPhase::Bound => "Bound",
            DatasetPhase::NotBound => "NotBound",
            DatasetPhase::Pending => "Pending",
            DatasetPhase::Failed => "Failed",
        }
    }
}

/// Severity of a mapping warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Info,
    Warning,
    Error,
}
