//! Mapping pipeline
//!
//! `Mapper` drives the four stages: resolve the Dataset, resolve its
//! bound Runtime, discover correlated resources, then assemble the graph
//! and run the warning detector over it. Only a Dataset fetch transport
//! failure aborts the mapping; everything downstream degrades to
//! warnings on the graph.

pub(crate) mod assemble;
pub(crate) mod dataset;
pub(crate) mod discovery;
pub(crate) mod fields;
pub(crate) mod runtime;
pub mod warnings;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::graph::{DatasetNode, GraphMetadata, MappingWarning, ResourceGraph, RuntimeNode};
use crate::kube::{ClusterQueries, QueryError};
use crate::models::{DatasetPhase, RuntimeKind, WarningLevel};

pub use dataset::RuntimeBinding;
use dataset::{missing_dataset, parse_dataset};
use runtime::parse_runtime;
use warnings::{codes, warn_of};

/// Revision of the mapping logic, stamped into graph metadata
pub const MAPPER_VERSION: &str = "1.0.0";

/// Mapping options
#[derive(Debug, Clone)]
pub struct Options {
    pub include_pods: bool,
    pub include_storage: bool,
    pub include_configs: bool,
    /// Per-category discovery deadline; `None` waits indefinitely
    pub deadline: Option<Duration>,
    /// Marks the produced graph as built from mock data
    pub mock_mode: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include_pods: true,
            include_storage: true,
            include_configs: true,
            deadline: None,
            mock_mode: false,
        }
    }
}

/// Maps a Fluid Dataset to its underlying Kubernetes resources
pub struct Mapper {
    queries: Box<dyn ClusterQueries>,
}

impl Mapper {
    pub fn new(queries: impl ClusterQueries + 'static) -> Self {
        Self {
            queries: Box::new(queries),
        }
    }

    /// Map a Dataset to its full resource graph.
    ///
    /// A missing Dataset produces a graph carrying a DATASET_NOT_FOUND
    /// error warning rather than a `Err`: the caller asked a valid
    /// question and gets a graph-shaped answer. Only transport failures
    /// on the Dataset fetch itself abort.
    pub async fn map_from_dataset(
        &self,
        name: &str,
        namespace: &str,
        opts: &Options,
    ) -> Result<ResourceGraph, QueryError> {
        let started = Instant::now();
        let mapped_at = Utc::now();
        info!(name, namespace, "mapping dataset");

        let (dataset_node, binding) = match self.resolve_dataset(name, namespace).await {
            Ok(resolved) => resolved,
            Err(QueryError::NotFound { .. }) => {
                let warning = MappingWarning {
                    level: WarningLevel::Error,
                    code: codes::DATASET_NOT_FOUND.to_string(),
                    message: format!("Dataset {}/{} not found", namespace, name),
                    resource: Some(name.to_string()),
                    suggestion: Some("Check the dataset name and namespace".to_string()),
                };
                return Ok(ResourceGraph {
                    dataset: missing_dataset(name, namespace),
                    runtime: None,
                    resources: Vec::new(),
                    warnings: vec![warning],
                    metadata: self.metadata(mapped_at, started, opts),
                });
            }
            Err(other) => return Err(other),
        };
        debug!(phase = dataset_node.phase.as_str(), "resolved dataset");

        let mut resolution_warnings = Vec::new();
        let runtime_node = match dataset_node.phase {
            DatasetPhase::Bound => match binding {
                Some(ref binding) => match self.resolve_runtime(binding).await {
                    Ok(node) => Some(node),
                    Err(QueryError::UnknownRuntimeType(tag)) => {
                        resolution_warnings.push(warn_of(
                            WarningLevel::Warning,
                            codes::UNKNOWN_RUNTIME_TYPE,
                            format!("Dataset is bound to unrecognized runtime type {:?}", tag),
                        ));
                        None
                    }
                    Err(err) => {
                        resolution_warnings.push(warn_of(
                            WarningLevel::Warning,
                            codes::RUNTIME_NOT_BOUND,
                            format!("Failed to resolve bound runtime: {}", err),
                        ));
                        None
                    }
                },
                None => {
                    resolution_warnings.push(warn_of(
                        WarningLevel::Warning,
                        codes::RUNTIME_NOT_BOUND,
                        "Dataset is Bound but reports no runtime binding",
                    ));
                    None
                }
            },
            // A dataset the controller has not bound yet has nothing to
            // expect; absence of a runtime is the normal state.
            DatasetPhase::NotBound => None,
            phase => {
                resolution_warnings.push(warn_of(
                    WarningLevel::Warning,
                    codes::RUNTIME_NOT_BOUND,
                    format!("Dataset phase is {}; no runtime is bound", phase.as_str()),
                ));
                None
            }
        };

        let discovered = discovery::discover(self.queries.as_ref(), name, namespace, opts).await;

        let mut graph = assemble::assemble(
            dataset_node,
            runtime_node,
            discovered,
            self.metadata(mapped_at, started, opts),
        );

        let mut all_warnings = resolution_warnings;
        all_warnings.append(&mut graph.warnings);
        all_warnings.extend(warnings::detect(&graph.resources, graph.runtime.as_ref()));
        graph.warnings = all_warnings;

        info!(
            resources = graph.resources.len(),
            warnings = graph.warnings.len(),
            healthy = graph.is_healthy(),
            "mapping complete"
        );
        Ok(graph)
    }

    /// Resolve a Dataset to its snapshot and declared runtime binding
    pub async fn resolve_dataset(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<(DatasetNode, Option<RuntimeBinding>), QueryError> {
        let object = self.queries.get_dataset(name, namespace).await?;
        Ok(parse_dataset(&object))
    }

    /// Resolve a runtime binding to its Runtime snapshot
    pub async fn resolve_runtime(
        &self,
        binding: &RuntimeBinding,
    ) -> Result<RuntimeNode, QueryError> {
        let object = self
            .queries
            .get_runtime(&binding.runtime_type, &binding.name, &binding.namespace)
            .await?;
        let kind = RuntimeKind::parse_optional(&binding.runtime_type)
            .unwrap_or(RuntimeKind::Unknown);
        Ok(parse_runtime(&object, kind))
    }

    /// List all Datasets in a namespace as bare snapshots
    pub async fn list_datasets(&self, namespace: &str) -> Result<Vec<DatasetNode>, QueryError> {
        let objects = self.queries.list_datasets(namespace).await?;
        Ok(objects
            .iter()
            .map(|object| parse_dataset(object).0)
            .collect())
    }

    fn metadata(&self, mapped_at: DateTime<Utc>, started: Instant, opts: &Options) -> GraphMetadata {
        GraphMetadata {
            mapped_at,
            duration: Some(format!("{:?}", started.elapsed())),
            cluster_name: Some(self.queries.cluster_name()),
            version: MAPPER_VERSION.to_string(),
            mock_mode: opts.mock_mode,
        }
    }
}
