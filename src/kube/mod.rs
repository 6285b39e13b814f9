//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! query interface used by the mapper.

pub mod mock;
pub mod queries;

pub use mock::{MockCluster, Scenario};
pub use queries::{ApiClient, ClusterQueries, QueryError};

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize a query client against the current cluster
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// An explicit kubeconfig path overrides all of the above.
pub async fn create_client(kubeconfig_path: Option<&str>) -> Result<ApiClient> {
    let (config, context_name) = match kubeconfig_path {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig at {}", path))?;
            let context_name = kubeconfig.current_context.clone();
            let config =
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .context("Failed to build config from kubeconfig")?;
            (config, context_name)
        }
        None => {
            let config = Config::infer()
                .await
                .context("Failed to load Kubernetes configuration")?;
            (config, current_context())
        }
    };

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    let cluster_name = context_name.unwrap_or_else(|| "unknown".to_string());
    Ok(ApiClient::new(client, cluster_name))
}

/// Get the current kubeconfig context name, used as the cluster
/// identifier in graph metadata
fn current_context() -> Option<String> {
    let kubeconfig_path = std::env::var("KUBECONFIG").ok().or_else(|| {
        let home = std::env::var("HOME").ok()?;
        Some(format!("{}/.kube/config", home))
    })?;

    let contents = std::fs::read_to_string(&kubeconfig_path).ok()?;
    for line in contents.lines() {
        if line.trim().starts_with("current-context:") {
            if let Some(context) = line.split(':').nth(1) {
                return Some(context.trim().to_string());
            }
        }
    }
    None
}
