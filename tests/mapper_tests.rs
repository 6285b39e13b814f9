//! End-to-end mapping tests over the mock cluster scenarios

use std::time::Duration;

use fluidmap::kube::{MockCluster, Scenario};
use fluidmap::mapper::warnings::codes;
use fluidmap::models::kinds;
use fluidmap::{
    Component, DatasetPhase, Mapper, Options, ResourceGraph, RuntimeKind, WarningLevel,
};

async fn map_scenario(scenario: Scenario) -> ResourceGraph {
    map_scenario_with(scenario, &mock_options()).await
}

async fn map_scenario_with(scenario: Scenario, opts: &Options) -> ResourceGraph {
    let mapper = Mapper::new(MockCluster::new(scenario));
    mapper
        .map_from_dataset("demo-data", "default", opts)
        .await
        .expect("mapping should not fail against the mock")
}

fn mock_options() -> Options {
    Options {
        mock_mode: true,
        ..Options::default()
    }
}

fn codes_of(graph: &ResourceGraph) -> Vec<&str> {
    graph.warnings.iter().map(|w| w.code.as_str()).collect()
}

#[tokio::test]
async fn healthy_scenario_maps_full_deployment_with_no_warnings() {
    let graph = map_scenario(Scenario::Healthy).await;

    assert!(graph.warnings.is_empty(), "unexpected: {:?}", graph.warnings);
    assert!(graph.is_healthy());

    assert_eq!(graph.dataset.name, "demo-data");
    assert_eq!(graph.dataset.phase, DatasetPhase::Bound);
    assert_eq!(graph.dataset.ufs_total.as_deref(), Some("100Gi"));
    assert_eq!(graph.dataset.mount_points, vec!["s3://example-bucket/data"]);

    let runtime = graph.runtime.as_ref().expect("runtime should resolve");
    assert_eq!(runtime.kind, RuntimeKind::Alluxio);
    assert_eq!(runtime.master_ready.as_deref(), Some("1/1"));
    assert_eq!(runtime.worker_ready.as_deref(), Some("2/2"));
    assert_eq!(runtime.fuse_ready.as_deref(), Some("3/3"));

    // 2 StatefulSets + 1 DaemonSet + PVC + PV + 3 ConfigMaps + 1 Secret
    assert_eq!(graph.resources.len(), 9);
    assert_eq!(graph.resources_by_kind(kinds::STATEFUL_SET).len(), 2);
    assert_eq!(graph.resources_by_kind(kinds::DAEMON_SET).len(), 1);
    assert_eq!(graph.resources_by_kind(kinds::PVC).len(), 1);
    assert_eq!(graph.resources_by_kind(kinds::PV).len(), 1);
    assert_eq!(graph.resources_by_kind(kinds::CONFIG_MAP).len(), 3);
    assert_eq!(graph.resources_by_kind(kinds::SECRET).len(), 1);
}

#[tokio::test]
async fn pods_nest_only_under_stateful_sets() {
    let graph = map_scenario(Scenario::Healthy).await;

    // No pod appears as a top-level resource
    assert!(graph.resources_by_kind(kinds::POD).is_empty());

    let master = graph
        .resources
        .iter()
        .find(|r| r.name == "demo-data-master")
        .expect("master StatefulSet");
    assert_eq!(master.component, Component::Master);
    assert_eq!(master.children.len(), 1);
    assert_eq!(master.children[0].name, "demo-data-master-0");
    assert_eq!(master.children[0].kind, kinds::POD);

    let worker = graph
        .resources
        .iter()
        .find(|r| r.name == "demo-data-worker")
        .expect("worker StatefulSet");
    assert_eq!(worker.children.len(), 2);

    // Fuse pods belong to the DaemonSet, which carries no children
    let fuse = graph
        .resources
        .iter()
        .find(|r| r.name == "demo-data-fuse")
        .expect("fuse DaemonSet");
    assert_eq!(fuse.component, Component::Fuse);
    assert!(fuse.children.is_empty());
}

#[tokio::test]
async fn partial_ready_degrades_to_warnings_only() {
    let graph = map_scenario(Scenario::PartialReady).await;

    let not_ready: Vec<_> = graph
        .warnings
        .iter()
        .filter(|w| w.code == codes::PODS_NOT_READY)
        .collect();
    // The worker StatefulSet (1/2) and the fuse DaemonSet (2/3)
    assert!(not_ready.len() >= 2, "got: {:?}", graph.warnings);
    assert!(not_ready.iter().all(|w| w.level == WarningLevel::Warning));
    assert!(graph.is_healthy());

    let runtime = graph.runtime.as_ref().expect("runtime should resolve");
    assert_eq!(runtime.worker_phase.as_deref(), Some("PartialReady"));
    assert_eq!(runtime.worker_ready.as_deref(), Some("1/2"));
}

#[tokio::test]
async fn missing_runtime_is_the_normal_unbound_state() {
    let graph = map_scenario(Scenario::MissingRuntime).await;

    assert_eq!(graph.dataset.phase, DatasetPhase::NotBound);
    assert!(graph.runtime.is_none());
    // An unbound dataset expects nothing, so its missing runtime is not
    // itself a warning
    assert!(!codes_of(&graph).contains(&codes::RUNTIME_NOT_BOUND));
    assert!(!codes_of(&graph).contains(&codes::MASTER_MISSING));
    assert!(graph.is_healthy());
}

#[tokio::test]
async fn missing_fuse_raises_exactly_one_warning() {
    let graph = map_scenario(Scenario::MissingFuse).await;

    assert_eq!(graph.warnings.len(), 1, "got: {:?}", graph.warnings);
    assert_eq!(graph.warnings[0].code, codes::FUSE_MISSING);
    assert_eq!(graph.warnings[0].level, WarningLevel::Warning);
    assert!(graph.is_healthy());

    assert!(graph.resources_by_kind(kinds::DAEMON_SET).is_empty());
    let runtime = graph.runtime.as_ref().expect("runtime should resolve");
    assert_eq!(runtime.fuse_ready.as_deref(), Some("0/3"));
}

#[tokio::test]
async fn failed_pods_flag_workload_and_children() {
    let graph = map_scenario(Scenario::FailedPods).await;

    let not_ready: Vec<_> = graph
        .warnings
        .iter()
        .filter(|w| w.code == codes::PODS_NOT_READY)
        .collect();
    // The worker StatefulSet (0/2) plus its two failed pods
    assert_eq!(not_ready.len(), 3, "got: {:?}", graph.warnings);
    assert!(not_ready
        .iter()
        .any(|w| w.resource.as_deref() == Some("demo-data-worker-0")));
    assert!(not_ready
        .iter()
        .any(|w| w.resource.as_deref() == Some("demo-data-worker")));
}

#[tokio::test]
async fn orphaned_workloads_are_flagged_per_resource() {
    let graph = map_scenario(Scenario::Orphaned).await;

    let orphaned: Vec<_> = graph
        .warnings
        .iter()
        .filter(|w| w.code == codes::ORPHANED_RESOURCE)
        .collect();
    // Both StatefulSets and the DaemonSet lost their owner references
    assert_eq!(orphaned.len(), 3, "got: {:?}", graph.warnings);
    assert!(orphaned.iter().all(|w| w.level == WarningLevel::Warning));
    assert!(graph.is_healthy());
}

#[tokio::test]
async fn discovery_toggles_narrow_the_graph() {
    let opts = Options {
        include_pods: false,
        include_storage: false,
        include_configs: false,
        mock_mode: true,
        ..Options::default()
    };
    let graph = map_scenario_with(Scenario::Healthy, &opts).await;

    // Workload sets only
    assert_eq!(graph.resources.len(), 3);
    assert!(graph.resources.iter().all(|r| r.children.is_empty()));
    assert!(graph.resources_by_kind(kinds::PVC).is_empty());
    assert!(graph.resources_by_kind(kinds::CONFIG_MAP).is_empty());
    assert!(graph.is_healthy());
}

#[tokio::test]
async fn deadline_leaves_fast_discovery_untouched() {
    let opts = Options {
        deadline: Some(Duration::from_secs(5)),
        mock_mode: true,
        ..Options::default()
    };
    let graph = map_scenario_with(Scenario::Healthy, &opts).await;
    assert_eq!(graph.resources.len(), 9);
    assert!(graph.warnings.is_empty());
}

#[tokio::test]
async fn mapping_is_deterministic_modulo_metadata() {
    let first = map_scenario(Scenario::PartialReady).await;
    let second = map_scenario(Scenario::PartialReady).await;

    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.runtime, second.runtime);
    assert_eq!(first.resources, second.resources);
    assert_eq!(first.warnings, second.warnings);
}

#[tokio::test]
async fn healthy_means_exactly_no_error_level_warnings() {
    for scenario in Scenario::all() {
        let graph = map_scenario(*scenario).await;
        let has_errors = graph
            .warnings
            .iter()
            .any(|w| w.level == WarningLevel::Error);
        assert_eq!(
            graph.is_healthy(),
            !has_errors,
            "scenario {} disagrees",
            scenario
        );
    }
}

#[tokio::test]
async fn multiple_datasets_listing() {
    let mapper = Mapper::new(MockCluster::new(Scenario::Multiple));
    let datasets = mapper.list_datasets("default").await.unwrap();
    assert_eq!(datasets.len(), 3);
    assert_eq!(datasets[0].name, "dataset-alpha");
    assert!(datasets.iter().all(|d| d.phase == DatasetPhase::Bound));
}

#[tokio::test]
async fn single_dataset_listing() {
    let mapper = Mapper::new(MockCluster::new(Scenario::Healthy));
    let datasets = mapper.list_datasets("default").await.unwrap();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].name, "demo-data");
    assert_eq!(datasets[0].cached.as_deref(), Some("25Gi"));
}
