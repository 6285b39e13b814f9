//! Mock cluster fixture for demos and testing
//!
//! Serves canned deployment shapes for a handful of named scenarios so
//! the mapper can run without a cluster (`--mock`). Fixture values mirror
//! a typical small Alluxio deployment: one master, two workers, three
//! fuse pods, one PVC/PV pair, three ConfigMaps and one Secret.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::apps::v1::{
    DaemonSet, DaemonSetStatus, StatefulSet, StatefulSetSpec, StatefulSetStatus,
};
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolume, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeClaimStatus, PersistentVolumeStatus, Pod, PodStatus, Secret,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use k8s_openapi::ByteString;
use kube::core::DynamicObject;
use serde_json::json;

use super::queries::{dataset_resource, runtime_resource, ClusterQueries, QueryError};
use crate::models::RuntimeKind;

/// Named demo scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Fully healthy deployment
    Healthy,
    /// Some workers and fuse pods not ready
    PartialReady,
    /// Dataset without a bound runtime
    MissingRuntime,
    /// Fuse DaemonSet absent
    MissingFuse,
    /// Worker pods in failed state
    FailedPods,
    /// Workloads stripped of their owner references
    Orphaned,
    /// Multiple datasets in the namespace (for `list`)
    Multiple,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Healthy => "healthy",
            Scenario::PartialReady => "partial-ready",
            Scenario::MissingRuntime => "missing-runtime",
            Scenario::MissingFuse => "missing-fuse",
            Scenario::FailedPods => "failed-pods",
            Scenario::Orphaned => "orphaned",
            Scenario::Multiple => "multiple",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Scenario::Healthy,
            Scenario::PartialReady,
            Scenario::MissingRuntime,
            Scenario::MissingFuse,
            Scenario::FailedPods,
            Scenario::Orphaned,
            Scenario::Multiple,
        ]
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::all()
            .iter()
            .copied()
            .find(|sc| sc.as_str() == s)
            .ok_or_else(|| format!("unknown scenario: {}", s))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixture implementation of [`ClusterQueries`]
pub struct MockCluster {
    scenario: Scenario,
    /// Reference time captured at construction; all fixture timestamps
    /// derive from it so repeated queries return identical objects
    base: DateTime<Utc>,
}

impl MockCluster {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            base: Utc::now(),
        }
    }

    /// The mock ignores real selector semantics and just recovers the
    /// release name from a `release=<name>` selector
    fn release_from_selector(label_selector: &str) -> String {
        label_selector
            .strip_prefix("release=")
            .unwrap_or("demo-data")
            .to_string()
    }
}

fn hours_ago(base: DateTime<Utc>, hours: i64) -> Time {
    Time(base - Duration::hours(hours))
}

fn transition_time(base: DateTime<Utc>) -> String {
    (base - Duration::hours(1)).to_rfc3339()
}

fn fluid_labels(release: &str, role: Option<&str>) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("release".to_string(), release.to_string());
    labels.insert("app".to_string(), "alluxio".to_string());
    if let Some(role) = role {
        labels.insert("role".to_string(), role.to_string());
    }
    labels
}

fn runtime_owner(release: &str) -> OwnerReference {
    OwnerReference {
        api_version: "data.fluid.io/v1alpha1".to_string(),
        kind: "AlluxioRuntime".to_string(),
        name: release.to_string(),
        uid: "mock-uid-runtime".to_string(),
        ..Default::default()
    }
}

fn mock_dataset(
    base: DateTime<Utc>,
    name: &str,
    namespace: &str,
    phase: &str,
    bound: bool,
) -> DynamicObject {
    let mut obj = DynamicObject::new(name, &dataset_resource());
    obj.metadata.namespace = Some(namespace.to_string());
    obj.metadata.creation_timestamp = Some(hours_ago(base, 24));

    let mut status = json!({
        "phase": phase,
        "conditions": [{
            "type": "Ready",
            "status": "True",
            "reason": "DatasetReady",
            "message": "Dataset is ready",
            "lastTransitionTime": transition_time(base),
        }],
    });
    if bound {
        status["ufsTotal"] = json!("100Gi");
        status["cacheStates"] = json!({
            "cacheCapacity": "50Gi",
            "cached": "25Gi",
            "cachedPercentage": "50%",
        });
        status["runtimes"] = json!([{
            "name": name,
            "namespace": namespace,
            "type": "alluxio",
        }]);
    }

    obj.data = json!({
        "spec": {
            "mounts": [{ "mountPoint": "s3://example-bucket/data", "name": "data" }],
        },
        "status": status,
    });
    obj
}

fn mock_stateful_set(
    base: DateTime<Utc>,
    name: &str,
    namespace: &str,
    release: &str,
    role: &str,
    replicas: i32,
    ready: i32,
    owned: bool,
) -> StatefulSet {
    StatefulSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(fluid_labels(release, Some(role))),
            creation_timestamp: Some(hours_ago(base, 24)),
            owner_references: owned.then(|| vec![runtime_owner(release)]),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(replicas),
            ..Default::default()
        }),
        status: Some(StatefulSetStatus {
            replicas,
            ready_replicas: Some(ready),
            ..Default::default()
        }),
    }
}

fn mock_daemon_set(
    base: DateTime<Utc>,
    name: &str,
    namespace: &str,
    release: &str,
    role: &str,
    desired: i32,
    ready: i32,
    owned: bool,
) -> DaemonSet {
    DaemonSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(fluid_labels(release, Some(role))),
            creation_timestamp: Some(hours_ago(base, 24)),
            owner_references: owned.then(|| vec![runtime_owner(release)]),
            ..Default::default()
        },
        spec: None,
        status: Some(DaemonSetStatus {
            desired_number_scheduled: desired,
            current_number_scheduled: ready,
            number_ready: ready,
            ..Default::default()
        }),
    }
}

fn mock_pod(
    base: DateTime<Utc>,
    name: &str,
    namespace: &str,
    release: &str,
    role: &str,
    phase: &str,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(fluid_labels(release, Some(role))),
            creation_timestamp: Some(hours_ago(base, 1)),
            ..Default::default()
        },
        spec: None,
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
    }
}

// Stable suffixes standing in for the hash DaemonSet pods carry
const FUSE_POD_SUFFIXES: [&str; 3] = ["a1b2c", "d3e4f", "g5h6i"];

#[async_trait]
impl ClusterQueries for MockCluster {
    async fn get_dataset(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<DynamicObject, QueryError> {
        if self.scenario == Scenario::MissingRuntime {
            return Ok(mock_dataset(self.base, name, namespace, "NotBound", false));
        }
        Ok(mock_dataset(self.base, name, namespace, "Bound", true))
    }

    async fn list_datasets(&self, namespace: &str) -> Result<Vec<DynamicObject>, QueryError> {
        if self.scenario == Scenario::Multiple {
            return Ok(["dataset-alpha", "dataset-beta", "dataset-gamma"]
                .iter()
                .map(|name| mock_dataset(self.base, name, namespace, "Bound", true))
                .collect());
        }
        Ok(vec![mock_dataset(
            self.base,
            "demo-data",
            namespace,
            "Bound",
            true,
        )])
    }

    async fn get_runtime(
        &self,
        runtime_type: &str,
        name: &str,
        namespace: &str,
    ) -> Result<DynamicObject, QueryError> {
        let kind = RuntimeKind::parse_optional(runtime_type)
            .ok_or_else(|| QueryError::UnknownRuntimeType(runtime_type.to_string()))?;
        if self.scenario == Scenario::MissingRuntime {
            return Err(QueryError::NotFound {
                kind: kind.cr_kind().to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        let mut worker_phase = "Ready";
        let mut fuse_phase = "Ready";
        let mut worker_current = 2;
        let mut fuse_current = 3;
        match self.scenario {
            Scenario::PartialReady => {
                worker_phase = "PartialReady";
                worker_current = 1;
            }
            Scenario::MissingFuse => {
                fuse_phase = "NotReady";
                fuse_current = 0;
            }
            Scenario::FailedPods => {
                worker_phase = "Failed";
                worker_current = 0;
            }
            _ => {}
        }

        let mut obj = DynamicObject::new(name, &runtime_resource(kind));
        obj.metadata.namespace = Some(namespace.to_string());
        obj.metadata.creation_timestamp = Some(hours_ago(self.base, 24));
        obj.data = json!({
            "spec": {
                "replicas": 2,
                "master": { "replicas": 1 },
                "worker": { "replicas": 2 },
            },
            "status": {
                "masterPhase": "Ready",
                "workerPhase": worker_phase,
                "fusePhase": fuse_phase,
                "currentMasterNumberScheduled": 1,
                "desiredMasterNumberScheduled": 1,
                "currentWorkerNumberScheduled": worker_current,
                "desiredWorkerNumberScheduled": 2,
                "currentFuseNumberScheduled": fuse_current,
                "desiredFuseNumberScheduled": 3,
                "conditions": [{
                    "type": "Ready",
                    "status": "True",
                    "reason": "RuntimeReady",
                    "message": "Runtime is ready",
                    "lastTransitionTime": transition_time(self.base),
                }],
            },
        });
        Ok(obj)
    }

    async fn list_stateful_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<StatefulSet>, QueryError> {
        let release = Self::release_from_selector(label_selector);
        let owned = self.scenario != Scenario::Orphaned;

        let worker_ready = match self.scenario {
            Scenario::PartialReady => 1,
            Scenario::FailedPods => 0,
            _ => 2,
        };

        Ok(vec![
            mock_stateful_set(
                self.base,
                &format!("{}-master", release),
                namespace,
                &release,
                "alluxio-master",
                1,
                1,
                owned,
            ),
            mock_stateful_set(
                self.base,
                &format!("{}-worker", release),
                namespace,
                &release,
                "alluxio-worker",
                2,
                worker_ready,
                owned,
            ),
        ])
    }

    async fn list_daemon_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DaemonSet>, QueryError> {
        if self.scenario == Scenario::MissingFuse {
            return Ok(Vec::new());
        }
        let release = Self::release_from_selector(label_selector);
        let owned = self.scenario != Scenario::Orphaned;
        let ready = if self.scenario == Scenario::PartialReady {
            2
        } else {
            3
        };
        Ok(vec![mock_daemon_set(
            self.base,
            &format!("{}-fuse", release),
            namespace,
            &release,
            "alluxio-fuse",
            3,
            ready,
            owned,
        )])
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, QueryError> {
        let release = Self::release_from_selector(label_selector);
        let mut pods = vec![mock_pod(
            self.base,
            &format!("{}-master-0", release),
            namespace,
            &release,
            "alluxio-master",
            "Running",
        )];

        for i in 0..2 {
            let phase = match self.scenario {
                Scenario::FailedPods => "Failed",
                Scenario::PartialReady if i == 1 => "Pending",
                _ => "Running",
            };
            pods.push(mock_pod(
                self.base,
                &format!("{}-worker-{}", release, i),
                namespace,
                &release,
                "alluxio-worker",
                phase,
            ));
        }

        if self.scenario != Scenario::MissingFuse {
            let fuse_count = if self.scenario == Scenario::PartialReady {
                2
            } else {
                3
            };
            for suffix in FUSE_POD_SUFFIXES.iter().take(fuse_count) {
                pods.push(mock_pod(
                    self.base,
                    &format!("{}-fuse-{}", release, suffix),
                    namespace,
                    &release,
                    "alluxio-fuse",
                    "Running",
                ));
            }
        }

        Ok(pods)
    }

    async fn list_pvcs(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, QueryError> {
        let release = Self::release_from_selector(label_selector);
        Ok(vec![PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(release.clone()),
                namespace: Some(namespace.to_string()),
                labels: Some(fluid_labels(&release, None)),
                creation_timestamp: Some(hours_ago(self.base, 24)),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                volume_name: Some(format!("{}-pv", release)),
                ..Default::default()
            }),
            status: Some(PersistentVolumeClaimStatus {
                phase: Some("Bound".to_string()),
                ..Default::default()
            }),
        }])
    }

    async fn get_pv(&self, name: &str) -> Result<PersistentVolume, QueryError> {
        Ok(PersistentVolume {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                creation_timestamp: Some(hours_ago(self.base, 24)),
                ..Default::default()
            },
            spec: None,
            status: Some(PersistentVolumeStatus {
                phase: Some("Bound".to_string()),
                ..Default::default()
            }),
        })
    }

    async fn list_config_maps(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<ConfigMap>, QueryError> {
        let release = Self::release_from_selector(label_selector);
        Ok(["config", "master-config", "worker-config"]
            .iter()
            .map(|suffix| {
                let mut data = BTreeMap::new();
                data.insert(
                    "alluxio-site.properties".to_string(),
                    format!("alluxio.master.hostname={}-master-0", release),
                );
                ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(format!("{}-{}", release, suffix)),
                        namespace: Some(namespace.to_string()),
                        labels: Some(fluid_labels(&release, None)),
                        creation_timestamp: Some(hours_ago(self.base, 24)),
                        ..Default::default()
                    },
                    data: Some(data),
                    ..Default::default()
                }
            })
            .collect())
    }

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, QueryError> {
        let release = Self::release_from_selector(label_selector);
        let mut data = BTreeMap::new();
        data.insert(
            "access-key".to_string(),
            ByteString(b"mock-access-key".to_vec()),
        );
        Ok(vec![Secret {
            metadata: ObjectMeta {
                name: Some(format!("{}-secret", release)),
                namespace: Some(namespace.to_string()),
                labels: Some(fluid_labels(&release, None)),
                creation_timestamp: Some(hours_ago(self.base, 24)),
                ..Default::default()
            },
            type_: Some("Opaque".to_string()),
            data: Some(data),
            ..Default::default()
        }])
    }

    fn cluster_name(&self) -> String {
        "mock-cluster".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_repeated_queries_return_identical_fixtures() {
        let mock = MockCluster::new(Scenario::Healthy);

        let first = mock.get_dataset("demo-data", "default").await.unwrap();
        let second = mock.get_dataset("demo-data", "default").await.unwrap();
        assert_eq!(first.data, second.data);
        assert_eq!(
            first.metadata.creation_timestamp,
            second.metadata.creation_timestamp
        );

        let runtime_a = mock.get_runtime("alluxio", "demo-data", "default").await.unwrap();
        let runtime_b = mock.get_runtime("alluxio", "demo-data", "default").await.unwrap();
        assert_eq!(runtime_a.data, runtime_b.data);
    }

    #[tokio::test]
    async fn test_workload_fixtures_are_stable_across_calls() {
        let mock = MockCluster::new(Scenario::Healthy);
        let first = mock.list_stateful_sets("default", "release=demo-data").await.unwrap();
        let second = mock.list_stateful_sets("default", "release=demo-data").await.unwrap();
        assert_eq!(first, second);

        let pods_a = mock.list_pods("default", "release=demo-data").await.unwrap();
        let pods_b = mock.list_pods("default", "release=demo-data").await.unwrap();
        assert_eq!(pods_a, pods_b);
    }
}
