//! Graph assembly
//!
//! Pure construction: takes the resolved snapshots and raw discovery
//! output and produces the final tree shape. Pods nest under their
//! owning StatefulSet; workload sets and standalone resources stay
//! top-level in discovery order.

use crate::graph::{DatasetNode, GraphMetadata, ResourceGraph, RuntimeNode};
use crate::mapper::discovery::Discovered;
use crate::models::kinds;

pub(crate) fn assemble(
    dataset: DatasetNode,
    runtime: Option<RuntimeNode>,
    discovered: Discovered,
    metadata: GraphMetadata,
) -> ResourceGraph {
    let Discovered {
        mut nodes,
        mut pods_by_workload,
        warnings,
    } = discovered;

    for node in &mut nodes {
        if node.kind == kinds::STATEFUL_SET {
            if let Some(pods) = pods_by_workload.remove(&node.name) {
                node.children = pods;
            }
        }
    }

    // Pods whose workload set was not discovered have nowhere to nest;
    // surface them top-level rather than dropping them.
    for (_, pods) in pods_by_workload {
        nodes.extend(pods);
    }

    ResourceGraph {
        dataset,
        runtime,
        resources: nodes,
        warnings,
        metadata,
    }
}
