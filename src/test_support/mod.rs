//! Test utilities and doubles for Wharf unit tests.
//!
//! Each generator collaborator has a double here so the orchestration
//! (ordering, stitching, error propagation) can be tested on its own.

pub mod fixtures;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::core::graph::GraphTraverser;
use crate::core::project::Project;
use crate::core::target::Target;
use crate::generator::attributes::KnownAssetTagsFetching;
use crate::generator::config::ConfigGenerating;
use crate::generator::file_elements::ProjectFileElements;
use crate::generator::target::{TargetGenerating, TargetGenerator};
use crate::project_file::{ObjectId, ProjectFile};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Asset tag fetcher that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAssetTagsFetcher;

impl KnownAssetTagsFetching for FailingAssetTagsFetcher {
    fn fetch(&self, _project: &Project) -> Result<BTreeSet<String>> {
        bail!("asset catalog could not be read")
    }
}

/// Asset tag fetcher returning a fixed set.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetTagsFetcher {
    tags: BTreeSet<String>,
}

impl StaticAssetTagsFetcher {
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        StaticAssetTagsFetcher {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl KnownAssetTagsFetching for StaticAssetTagsFetcher {
    fn fetch(&self, _project: &Project) -> Result<BTreeSet<String>> {
        Ok(self.tags.clone())
    }
}

/// Config generator that fails for every project.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingConfigGenerator;

impl FailingConfigGenerator {
    pub const MESSAGE: &'static str = "malformed build settings";
}

impl ConfigGenerating for FailingConfigGenerator {
    fn generate_project_config(
        &self,
        _project: &Project,
        _file: &ProjectFile,
        _elements: &ProjectFileElements,
    ) -> Result<ObjectId> {
        bail!(Self::MESSAGE)
    }

    fn generate_target_config(
        &self,
        _target: &Target,
        _project: &Project,
        _file: &ProjectFile,
        _elements: &ProjectFileElements,
    ) -> Result<ObjectId> {
        bail!(Self::MESSAGE)
    }
}

/// Target generator that fails for every target.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTargetGenerator;

impl FailingTargetGenerator {
    pub const MESSAGE: &'static str = "target generation failed";
}

impl TargetGenerating for FailingTargetGenerator {
    fn generate_target(
        &self,
        _target: &Target,
        _project: &Project,
        _file: &ProjectFile,
        _elements: &ProjectFileElements,
        _graph: &dyn GraphTraverser,
    ) -> Result<ObjectId> {
        bail!(Self::MESSAGE)
    }

    fn generate_target_dependencies(
        &self,
        _project: &Project,
        _native_targets: &BTreeMap<String, ObjectId>,
        _file: &ProjectFile,
        _graph: &dyn GraphTraverser,
    ) -> Result<()> {
        Ok(())
    }
}

/// Target generator that records the order targets are generated in and
/// delegates to the production generator.
#[derive(Debug, Clone, Default)]
pub struct RecordingTargetGenerator {
    inner: TargetGenerator,
    generated: Arc<Mutex<Vec<String>>>,
}

impl RecordingTargetGenerator {
    /// Names of the targets generated so far, in call order.
    pub fn generated(&self) -> Vec<String> {
        self.generated.lock().unwrap().clone()
    }
}

impl TargetGenerating for RecordingTargetGenerator {
    fn generate_target(
        &self,
        target: &Target,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
        graph: &dyn GraphTraverser,
    ) -> Result<ObjectId> {
        self.generated.lock().unwrap().push(target.name.clone());
        self.inner.generate_target(target, project, file, elements, graph)
    }

    fn generate_target_dependencies(
        &self,
        project: &Project,
        native_targets: &BTreeMap<String, ObjectId>,
        file: &ProjectFile,
        graph: &dyn GraphTraverser,
    ) -> Result<()> {
        self.inner
            .generate_target_dependencies(project, native_targets, file, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_graph_resolves_dependencies() {
        use crate::core::target::{Product, TargetDependency};

        let kit = Project::new("Kit", "/ws/Kit").with_targets([Target::new("Kit", Product::Framework)]);
        let app = Project::new("App", "/ws/App").with_targets([
            Target::new("App", Product::App).with_dependencies([
                TargetDependency::Target { name: "Core".into() },
                TargetDependency::Project {
                    path: "/ws/Kit".into(),
                    target: "Kit".into(),
                },
                TargetDependency::Target { name: "Ghost".into() },
            ]),
            Target::new("Core", Product::Framework),
        ]);
        let graph = FixtureGraph::new("WS", "/ws").with_project(app).with_project(kit);

        let deps = graph.direct_local_target_dependencies(std::path::Path::new("/ws/App"), "App");
        let names: Vec<_> = deps.iter().map(|d| d.target.name.as_str()).collect();
        assert_eq!(names, vec!["Core", "Kit"]);
    }
}
