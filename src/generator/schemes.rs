//! Scheme descriptor generation.

use anyhow::Result;

use crate::core::graph::GraphTraverser;
use crate::core::project::Project;
use crate::core::scheme::{Scheme, TargetReference};
use crate::generator::descriptor::{
    BuildableReference, GeneratedProject, SchemeDescriptor, TestableReference,
};
use crate::project_file::{keys, scope_for, ObjectId};

/// Produces scheme descriptors for a project's declared schemes.
pub trait SchemeDescriptorsGenerating: Sync {
    fn generate_project_schemes(
        &self,
        project: &Project,
        generated: &GeneratedProject,
        graph: &dyn GraphTraverser,
    ) -> Result<Vec<SchemeDescriptor>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeDescriptorsGenerator;

impl SchemeDescriptorsGenerating for SchemeDescriptorsGenerator {
    fn generate_project_schemes(
        &self,
        project: &Project,
        generated: &GeneratedProject,
        graph: &dyn GraphTraverser,
    ) -> Result<Vec<SchemeDescriptor>> {
        let mut schemes: Vec<&Scheme> = project.schemes.iter().collect();
        schemes.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(schemes
            .into_iter()
            .map(|scheme| scheme_descriptor(scheme, project, generated, graph))
            .collect())
    }
}

fn scheme_descriptor(
    scheme: &Scheme,
    project: &Project,
    generated: &GeneratedProject,
    graph: &dyn GraphTraverser,
) -> SchemeDescriptor {
    let resolve = |reference: &TargetReference| buildable_reference(reference, project, generated, graph);

    let build_entries = scheme.build_targets().iter().filter_map(resolve).collect();

    let (testables, test_plans, test_configuration) = match &scheme.test_action {
        Some(action) => {
            let testables = action
                .targets
                .iter()
                .filter_map(|testable| {
                    resolve(&testable.target).map(|reference| TestableReference {
                        reference,
                        skipped: testable.is_skipped,
                        parallelizable: testable.is_parallelizable,
                    })
                })
                .collect();
            let plans = action
                .test_plans
                .iter()
                .map(|plan| {
                    pathdiff::diff_paths(&plan.path, &project.path).unwrap_or_else(|| plan.path.clone())
                })
                .collect();
            (testables, plans, Some(action.configuration.clone()))
        }
        None => (Vec::new(), Vec::new(), None),
    };

    let launch = scheme.run_executable().and_then(resolve);

    SchemeDescriptor {
        name: scheme.name.clone(),
        shared: scheme.shared,
        build_entries,
        testables,
        test_plans,
        test_configuration,
        launch,
        launch_configuration: scheme.run_action.as_ref().map(|a| a.configuration.clone()),
        launch_arguments: scheme
            .run_action
            .as_ref()
            .map(|a| a.arguments.clone())
            .unwrap_or_default(),
    }
}

/// Resolve a target reference into a buildable reference.
///
/// Targets of the project being generated use their generated ids; targets
/// of other projects use the id their own generation derives.
fn buildable_reference(
    reference: &TargetReference,
    project: &Project,
    generated: &GeneratedProject,
    graph: &dyn GraphTraverser,
) -> Option<BuildableReference> {
    let Some(target) = graph.target(&reference.project_path, &reference.name) else {
        tracing::debug!(
            "scheme references unknown target `{}` at {}",
            reference.name,
            reference.project_path.display()
        );
        return None;
    };

    let blueprint_identifier = if target.path == project.path {
        generated.targets.get(&target.target.name)?.clone()
    } else {
        ObjectId::derive(
            &scope_for(&target.project.xcodeproj_path),
            &keys::native_target(&target.target.name),
        )
    };

    let container = pathdiff::diff_paths(&target.project.xcodeproj_path, &project.path)
        .unwrap_or_else(|| target.project.xcodeproj_path.clone());

    Some(BuildableReference {
        referenced_container: format!("container:{}", container.display()),
        blueprint_identifier,
        buildable_name: target.target.output_filename(),
        blueprint_name: target.target.name.clone(),
    })
}
