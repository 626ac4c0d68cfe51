//! Wharf - project generation for native application workspaces
//!
//! This crate turns a loaded workspace graph (projects, targets, packages,
//! schemes) into project-file descriptors, and answers selection queries
//! over the graph for the build and test commands.

pub mod core;
pub mod generator;
pub mod inspector;
pub mod ops;
pub mod project_file;
pub mod util;

/// Test fixtures and collaborator doubles for Wharf unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{Graph, GraphTraverser, Project, Scheme, Target, Workspace};
pub use generator::{ProjectDescriptor, ProjectDescriptorGenerator};
pub use inspector::BuildGraphInspector;
pub use util::config::Config;
