//! Output rendering
//!
//! Pure formatting over a finished graph: a component-grouped tree for
//! humans, a wide table for scanning, and pretty JSON for machines.

use std::fmt::Write;

use crate::graph::{ResourceGraph, ResourceNode};
use crate::models::{Component, DatasetPhase, ResourcePhase, WarningLevel};

const RULE_WIDTH: usize = 60;
const TABLE_WIDTH: usize = 100;

pub fn render_json(graph: &ResourceGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

pub fn render_tree(graph: &ResourceGraph) -> String {
    let mut out = String::new();
    let rule = "─".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Resource Map for Dataset: {}/{}",
        graph.dataset.namespace, graph.dataset.name
    );
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} Dataset: {} ({})",
        dataset_icon(graph.dataset.phase),
        graph.dataset.name,
        graph.dataset.phase.as_str()
    );
    if let Some(ufs_total) = &graph.dataset.ufs_total {
        let _ = write!(out, "   UFS Total: {}", ufs_total);
        if let Some(cached) = &graph.dataset.cached {
            let _ = write!(
                out,
                " | Cached: {} ({})",
                cached,
                graph.dataset.cached_percentage.as_deref().unwrap_or("?")
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "│");
    match &graph.runtime {
        Some(runtime) => {
            let _ = writeln!(out, "└── Runtime: {} ({})", runtime.name, runtime.kind);
            render_entries(&mut out, component_entries(graph));
        }
        None => {
            let _ = writeln!(out, "└── ⚠ No Runtime bound");
        }
    }

    if !graph.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Warnings ({})", graph.warnings.len());
        let _ = writeln!(out, "{}", rule);
        for warning in &graph.warnings {
            let _ = writeln!(
                out,
                "{} [{}] {}",
                level_icon(warning.level),
                warning.code,
                warning.message
            );
            if let Some(suggestion) = &warning.suggestion {
                let _ = writeln!(out, "   hint: {}", suggestion);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Summary: {} resources mapped in {}",
        graph.resources.len(),
        graph.metadata.duration.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "Status: {}",
        if graph.is_healthy() {
            "HEALTHY"
        } else {
            "UNHEALTHY"
        }
    );
    let _ = writeln!(out, "{}", rule);

    out
}

/// Tree plus a flat detail table of all top-level resources
pub fn render_wide(graph: &ResourceGraph) -> String {
    let mut out = render_tree(graph);
    let rule = "─".repeat(TABLE_WIDTH);

    let _ = writeln!(out);
    let _ = writeln!(out, "Detailed Resource List:");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:<20} {:<30} {:<15} {:<10} {:<15}",
        "KIND", "NAME", "COMPONENT", "STATUS", "AGE"
    );
    let _ = writeln!(out, "{}", rule);
    for resource in &graph.resources {
        let _ = writeln!(
            out,
            "{:<20} {:<30} {:<15} {:<10} {:<15}",
            resource.kind,
            truncate(&resource.name, 28),
            resource.component.as_str(),
            resource
                .status
                .ready
                .as_deref()
                .unwrap_or_else(|| phase_label(resource.status.phase)),
            resource.status.age.as_deref().unwrap_or("")
        );
    }
    let _ = writeln!(out, "{}", rule);

    out
}

/// One branch under the runtime line, with optional sub-lines
struct TreeEntry {
    text: String,
    children: Vec<String>,
}

fn component_entries(graph: &ResourceGraph) -> Vec<TreeEntry> {
    let mut entries = Vec::new();
    let matrix = graph
        .runtime
        .as_ref()
        .map(|r| r.kind.components())
        .unwrap_or_else(|| crate::models::RuntimeKind::Unknown.components());

    for component in [Component::Master, Component::Worker, Component::Fuse] {
        let nodes = graph.resources_by_component(component);
        if nodes.is_empty() {
            let expected = match component {
                Component::Master => matrix.has_master,
                Component::Worker => matrix.has_worker,
                _ => matrix.has_fuse,
            };
            if expected {
                entries.push(missing_entry(component));
            }
            continue;
        }
        for node in nodes {
            entries.push(workload_entry(node));
        }
    }

    let storage = graph.resources_by_component(Component::Storage);
    if !storage.is_empty() {
        entries.push(group_entry("Storage", &storage));
    }
    let configs = graph.resources_by_component(Component::Config);
    if !configs.is_empty() {
        entries.push(group_entry("Configuration", &configs));
    }

    entries
}

fn workload_entry(node: &ResourceNode) -> TreeEntry {
    let ready = node
        .status
        .ready
        .as_ref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    let children = node
        .children
        .iter()
        .map(|pod| {
            format!(
                "{} Pod: {} ({})",
                phase_icon(pod.status.phase),
                pod.name,
                pod.status.message.as_deref().unwrap_or("Unknown")
            )
        })
        .collect();
    TreeEntry {
        text: format!(
            "{} {}: {}{}",
            phase_icon(node.status.phase),
            node.kind,
            node.name,
            ready
        ),
        children,
    }
}

fn missing_entry(component: Component) -> TreeEntry {
    let text = match component {
        Component::Fuse => "⚠ Fuse: Not deployed (on-demand)".to_string(),
        Component::Master => "✗ Master: MISSING".to_string(),
        _ => "✗ Worker: MISSING".to_string(),
    };
    TreeEntry {
        text,
        children: Vec::new(),
    }
}

fn group_entry(title: &str, nodes: &[&ResourceNode]) -> TreeEntry {
    TreeEntry {
        text: title.to_string(),
        children: nodes
            .iter()
            .map(|node| {
                format!(
                    "{} {}: {}",
                    phase_icon(node.status.phase),
                    node.kind,
                    node.name
                )
            })
            .collect(),
    }
}

fn render_entries(out: &mut String, entries: Vec<TreeEntry>) {
    let count = entries.len();
    for (index, entry) in entries.into_iter().enumerate() {
        let last = index + 1 == count;
        let branch = if last { "└──" } else { "├──" };
        let _ = writeln!(out, "    {} {}", branch, entry.text);

        let child_indent = if last { "        " } else { "    │   " };
        let child_count = entry.children.len();
        for (child_index, child) in entry.children.into_iter().enumerate() {
            let child_branch = if child_index + 1 == child_count {
                "└──"
            } else {
                "├──"
            };
            let _ = writeln!(out, "{}{} {}", child_indent, child_branch, child);
        }
    }
}

fn dataset_icon(phase: DatasetPhase) -> &'static str {
    match phase {
        DatasetPhase::Bound => "✓",
        DatasetPhase::NotBound | DatasetPhase::Pending => "⚠",
        DatasetPhase::Failed => "✗",
    }
}

fn phase_icon(phase: ResourcePhase) -> &'static str {
    match phase {
        ResourcePhase::Ready | ResourcePhase::Bound => "✓",
        ResourcePhase::NotReady | ResourcePhase::Pending | ResourcePhase::NotBound => "⚠",
        ResourcePhase::Failed => "✗",
        ResourcePhase::Unknown => "?",
    }
}

fn phase_label(phase: ResourcePhase) -> &'static str {
    match phase {
        ResourcePhase::Ready => "Ready",
        ResourcePhase::NotReady => "NotReady",
        ResourcePhase::Pending => "Pending",
        ResourcePhase::Failed => "Failed",
        ResourcePhase::Unknown => "Unknown",
        ResourcePhase::Bound => "Bound",
        ResourcePhase::NotBound => "NotBound",
    }
}

fn level_icon(level: WarningLevel) -> &'static str {
    match level {
        WarningLevel::Error => "✗",
        WarningLevel::Warning => "⚠",
        WarningLevel::Info => "ℹ",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(2)).collect();
    format!("{}..", kept)
}
