//! fluidmap - map Fluid Datasets to their underlying Kubernetes resources
//!
//! A Fluid Dataset is backed by a runtime CR (AlluxioRuntime,
//! JuiceFSRuntime, ...) whose controller deploys StatefulSets,
//! DaemonSets, volumes, and configuration objects. This crate resolves a
//! Dataset to its bound runtime, discovers everything correlated by the
//! release label, and assembles it all into one annotated resource graph
//! with health warnings.

pub mod cli;
pub mod graph;
pub mod kube;
pub mod mapper;
pub mod models;
pub mod render;

pub use graph::{MappingWarning, ResourceGraph, ResourceNode};
pub use mapper::{Mapper, Options, MAPPER_VERSION};
pub use models::{Component, DatasetPhase, ResourcePhase, RuntimeKind, WarningLevel};
