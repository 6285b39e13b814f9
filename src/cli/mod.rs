//! Command-line interface
//!
//! Two commands: `dataset <name>` maps one Dataset to its resource
//! graph, `list` enumerates Datasets in a namespace. `--mock` swaps the
//! real cluster for a scenario fixture so everything works offline.

mod logging;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::kube::{self, ClusterQueries, MockCluster, Scenario};
use crate::mapper::{Mapper, Options, MAPPER_VERSION};
use crate::render;

#[derive(Parser, Debug)]
#[command(name = "fluidmap")]
#[command(version = MAPPER_VERSION)]
#[command(about = "Map Fluid Datasets to their underlying Kubernetes resources", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Command,

    /// Kubernetes namespace
    #[arg(short = 'n', long, global = true, default_value = "default")]
    namespace: String,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum, default_value = "tree")]
    output: OutputFormat,

    /// Use mock data (no cluster required)
    #[arg(long, global = true)]
    mock: bool,

    /// Mock scenario: healthy, partial-ready, missing-runtime,
    /// missing-fuse, failed-pods, orphaned, multiple
    #[arg(long, global = true, default_value = "healthy")]
    scenario: Scenario,

    /// Path to kubeconfig file
    #[arg(long, global = true)]
    kubeconfig: Option<String>,

    /// Skip individual pods
    #[arg(long, global = true)]
    no_pods: bool,

    /// Skip PVCs and PVs
    #[arg(long, global = true)]
    no_storage: bool,

    /// Skip ConfigMaps and Secrets
    #[arg(long, global = true)]
    no_configs: bool,

    /// Per-category discovery timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map resources for a Dataset
    Dataset {
        /// Dataset name
        name: String,
    },
    /// List all Datasets in the namespace
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Tree,
    Json,
    Wide,
}

/// Run the CLI; the returned code is the process exit code. An unhealthy
/// graph maps to exit code 1 so scripts can gate on dataset health.
pub async fn run() -> Result<i32> {
    let args = Args::parse();
    logging::init(args.debug);

    match &args.command {
        Command::Dataset { name } => map_dataset(&args, name).await,
        Command::List => list_datasets(&args).await,
    }
}

async fn build_mapper(args: &Args) -> Result<Mapper> {
    if args.mock {
        eprintln!(
            "Using mock data, scenario: {} (no cluster connection)",
            args.scenario
        );
        return Ok(Mapper::new(MockCluster::new(args.scenario)));
    }
    let client = kube::create_client(args.kubeconfig.as_deref())
        .await
        .context("Failed to create Kubernetes client (use --mock to run without a cluster)")?;
    debug!(cluster = %client.cluster_name(), "connected");
    Ok(Mapper::new(client))
}

async fn map_dataset(args: &Args, name: &str) -> Result<i32> {
    let opts = Options {
        include_pods: !args.no_pods,
        include_storage: !args.no_storage,
        include_configs: !args.no_configs,
        deadline: args.timeout.map(Duration::from_secs),
        mock_mode: args.mock,
    };

    let mapper = build_mapper(args).await?;
    let graph = mapper
        .map_from_dataset(name, &args.namespace, &opts)
        .await
        .context("Mapping failed")?;

    match args.output {
        OutputFormat::Json => println!("{}", render::render_json(&graph)?),
        OutputFormat::Wide => print!("{}", render::render_wide(&graph)),
        OutputFormat::Tree => print!("{}", render::render_tree(&graph)),
    }

    Ok(if graph.is_healthy() { 0 } else { 1 })
}

async fn list_datasets(args: &Args) -> Result<i32> {
    let mapper = build_mapper(args).await?;
    let datasets = mapper
        .list_datasets(&args.namespace)
        .await
        .context("Failed to list datasets")?;

    if datasets.is_empty() {
        println!("No datasets found in namespace {}", args.namespace);
        return Ok(0);
    }

    println!(
        "{:<30} {:<10} {:<12} {:<12} {:<8}",
        "NAME", "PHASE", "UFS TOTAL", "CACHED", "CACHED%"
    );
    for dataset in &datasets {
        println!(
            "{:<30} {:<10} {:<12} {:<12} {:<8}",
            dataset.name,
            dataset.phase.as_str(),
            dataset.ufs_total.as_deref().unwrap_or("-"),
            dataset.cached.as_deref().unwrap_or("-"),
            dataset.cached_percentage.as_deref().unwrap_or("-")
        );
    }
    Ok(0)
}
