//! Native target generation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::graph::GraphTraverser;
use crate::core::project::Project;
use crate::core::target::Target;
use crate::generator::config::{ConfigGenerating, ConfigGenerator};
use crate::generator::file_elements::ProjectFileElements;
use crate::project_file::{
    keys, BuildFile, BuildPhase, NativeTarget, Object, ObjectId, ProjectFile,
    TargetDependencyObject,
};

/// Produces native target objects and the dependency edges between them.
pub trait TargetGenerating: Sync {
    /// Generate one target's native object and return its id.
    fn generate_target(
        &self,
        target: &Target,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
        graph: &dyn GraphTraverser,
    ) -> Result<ObjectId>;

    /// Wire dependency edges among already generated native targets.
    fn generate_target_dependencies(
        &self,
        project: &Project,
        native_targets: &BTreeMap<String, ObjectId>,
        file: &ProjectFile,
        graph: &dyn GraphTraverser,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetGenerator {
    config: ConfigGenerator,
}

impl TargetGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_phase<'a>(
        &self,
        target: &Target,
        phase: &str,
        paths: impl Iterator<Item = (&'a Path, Option<&'a String>)>,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
    ) -> Result<ObjectId> {
        let mut files = Vec::new();
        for (path, flags) in paths {
            let file_ref = elements
                .file_reference(path, &project.source_root)
                .with_context(|| {
                    format!(
                        "no file element registered for `{}` of target `{}`",
                        path.display(),
                        target.name
                    )
                })?;
            let settings = flags.map(|f| BTreeMap::from([("COMPILER_FLAGS".to_string(), f.clone())]));
            let id = file.objects.add(
                &keys::build_file(&target.name, phase, path),
                Object::BuildFile(BuildFile {
                    file_ref: file_ref.clone(),
                    settings,
                }),
            );
            files.push(id);
        }

        let phase_object = BuildPhase { files };
        let object = if phase == "sources" {
            Object::SourcesBuildPhase(phase_object)
        } else {
            Object::ResourcesBuildPhase(phase_object)
        };
        Ok(file.objects.add(&keys::build_phase(&target.name, phase), object))
    }
}

impl TargetGenerating for TargetGenerator {
    fn generate_target(
        &self,
        target: &Target,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
        _graph: &dyn GraphTraverser,
    ) -> Result<ObjectId> {
        tracing::debug!("generating target `{}`", target.name);

        let configuration_list = self
            .config
            .generate_target_config(target, project, file, elements)?;

        let sources = self.build_phase(
            target,
            "sources",
            target
                .sources
                .iter()
                .map(|s| (s.path.as_path(), s.compiler_flags.as_ref())),
            project,
            file,
            elements,
        )?;
        let resources = self.build_phase(
            target,
            "resources",
            target.resources.iter().map(|r| (r.path.as_path(), None)),
            project,
            file,
            elements,
        )?;

        let native = NativeTarget {
            name: target.name.clone(),
            product_name: target.product_name().to_string(),
            product_type: target.product.product_type().to_string(),
            build_configuration_list: configuration_list,
            build_phases: vec![sources, resources],
            dependencies: Vec::new(),
            product: elements.product(&target.name).cloned(),
        };
        Ok(file
            .objects
            .add(&keys::native_target(&target.name), Object::NativeTarget(native)))
    }

    fn generate_target_dependencies(
        &self,
        project: &Project,
        native_targets: &BTreeMap<String, ObjectId>,
        file: &ProjectFile,
        graph: &dyn GraphTraverser,
    ) -> Result<()> {
        for (name, native_id) in native_targets {
            let mut edges = Vec::new();
            for dependency in graph.direct_local_target_dependencies(&project.path, name) {
                if dependency.path != project.path {
                    tracing::debug!(
                        "target `{}` depends on `{}` in another project",
                        name,
                        dependency.target.name
                    );
                    continue;
                }
                let Some(dependency_id) = native_targets.get(&dependency.target.name) else {
                    continue;
                };
                let edge = file.objects.add(
                    &keys::target_dependency(name, &dependency.target.name),
                    Object::TargetDependency(TargetDependencyObject {
                        name: dependency.target.name.clone(),
                        target: dependency_id.clone(),
                    }),
                );
                edges.push(edge);
            }

            if !edges.is_empty() {
                file.objects.update(native_id, |object| {
                    if let Some(native) = object.as_native_target_mut() {
                        native.dependencies = edges;
                    }
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::Graph;
    use crate::core::target::{Product, TargetDependency};
    use crate::core::workspace::Workspace;
    use crate::generator::file_elements::ProjectGroups;
    use crate::project_file::FormatProfile;

    #[test]
    fn test_generate_target_with_phases_and_dependencies() {
        let project = Project::new("App", "/ws/App").with_targets([
            Target::new("App", Product::App)
                .with_sources(["Sources/main.swift"])
                .with_dependencies([TargetDependency::Target { name: "Core".into() }]),
            Target::new("Core", Product::Framework).with_sources(["Core/Core.swift"]),
        ]);
        let graph = Graph::new(Workspace::new("WS", "/ws").with_projects(["/ws/App"]), [project.clone()]);

        let file = ProjectFile::new(FormatProfile::RECENT, "scope");
        let mut elements = ProjectFileElements::new(ProjectGroups::generate(&file));
        elements.generate_project_files(&project, &file);

        let generator = TargetGenerator::new();
        let mut native_targets = BTreeMap::new();
        for target in &project.targets {
            let id = generator
                .generate_target(target, &project, &file, &elements, &graph)
                .unwrap();
            native_targets.insert(target.name.clone(), id);
        }
        generator
            .generate_target_dependencies(&project, &native_targets, &file, &graph)
            .unwrap();

        let app = file.objects.get(&native_targets["App"]).unwrap();
        let app = app.as_native_target().unwrap();
        assert_eq!(app.product_type, "com.apple.product-type.application");
        assert_eq!(app.build_phases.len(), 2);
        assert_eq!(app.dependencies.len(), 1);
        assert!(app.product.is_some());

        let core = file.objects.get(&native_targets["Core"]).unwrap();
        assert!(core.as_native_target().unwrap().dependencies.is_empty());
    }

    #[test]
    fn test_unregistered_source_fails() {
        let project = Project::new("App", "/ws/App");
        let target = Target::new("App", Product::App).with_sources(["Sources/main.swift"]);
        let graph = Graph::new(Workspace::new("WS", "/ws"), [project.clone()]);

        let file = ProjectFile::new(FormatProfile::RECENT, "scope");
        let elements = ProjectFileElements::new(ProjectGroups::generate(&file));

        let err = TargetGenerator::new()
            .generate_target(&target, &project, &file, &elements, &graph)
            .unwrap_err();
        assert!(err.to_string().contains("main.swift"));
    }
}
