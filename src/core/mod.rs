//! Core data structures for Wharf.
//!
//! This module contains the immutable input model of generation:
//! - Projects, targets and their settings
//! - Packages and schemes
//! - The workspace and the graph traversal surface over it

pub mod graph;
pub mod package;
pub mod project;
pub mod scheme;
pub mod settings;
pub mod target;
pub mod workspace;

pub use graph::{Graph, GraphTarget, GraphTraverser};
pub use package::{Package, Requirement};
pub use project::Project;
pub use scheme::{
    BuildAction, RunAction, Scheme, TargetReference, TestAction, TestIdentifier, TestPlan,
    TestableTarget,
};
pub use settings::{BuildConfiguration, Configuration, SettingValue, Settings, SettingsDictionary, Variant};
pub use target::{Product, Target, TargetDependency};
pub use workspace::{Workspace, GENERATED_MARKER};
