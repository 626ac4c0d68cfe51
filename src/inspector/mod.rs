//! Build graph inspection.
//!
//! Read-only selection queries over a loaded graph: which scheme builds,
//! tests or runs what, and which arguments to hand the build tool. Queries
//! that find nothing return `None` or an empty list, never an error.

pub mod arguments;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::graph::{GraphTarget, GraphTraverser};
use crate::core::project::Project;
use crate::core::scheme::{Scheme, TestIdentifier, TestPlan, TestableTarget};
use crate::core::settings::Settings;
use crate::core::target::Target;
use crate::core::workspace::GENERATED_MARKER;

pub use arguments::{render, skip_signing_arguments, test_selection_arguments, BuildArgument};

/// The action a testable target is being selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestActionKind {
    Build,
    Test,
}

/// Stateless query component over a graph traverser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildGraphInspector;

impl BuildGraphInspector {
    pub fn new() -> Self {
        BuildGraphInspector
    }

    /// Arguments for building `target`.
    ///
    /// The configuration argument comes first when the requested
    /// configuration exists, followed by the signing overrides when
    /// `skip_signing` is set.
    pub fn build_arguments(
        &self,
        project: &Project,
        target: &Target,
        configuration: Option<&str>,
        skip_signing: bool,
    ) -> Vec<BuildArgument> {
        let mut arguments = Vec::new();

        if let Some(name) = configuration {
            let settings = effective_settings(project, target);
            if settings.configuration(name).is_some() {
                arguments.push(BuildArgument::Configuration(name.to_string()));
            } else {
                tracing::warn!(
                    "couldn't find configuration `{}` for target `{}`, using the scheme's default",
                    name,
                    target.name
                );
            }
        }

        if skip_signing {
            arguments.extend(skip_signing_arguments());
        }

        arguments
    }

    /// The first target of the scheme's build action.
    pub fn buildable_target<'g>(
        &self,
        scheme: &Scheme,
        graph: &'g dyn GraphTraverser,
    ) -> Option<GraphTarget<'g>> {
        let reference = scheme.build_targets().first()?;
        graph.target(&reference.project_path, &reference.name)
    }

    /// Select the target a test run of `scheme` is about.
    ///
    /// The first applicable source wins, even when it has no matching entry:
    /// 1. the test plan named `test_plan`, if the scheme has it
    /// 2. every test plan, flattened, when selecting for a build
    /// 3. the scheme's default test plan
    /// 4. the test action's directly declared targets
    pub fn testable_target<'g>(
        &self,
        scheme: &Scheme,
        test_plan: Option<&str>,
        test_targets: &[TestIdentifier],
        skip_test_targets: &[TestIdentifier],
        action: TestActionKind,
        graph: &'g dyn GraphTraverser,
    ) -> Option<GraphTarget<'g>> {
        let test_action = scheme.test_action.as_ref()?;
        let included = |entry: &&TestableTarget| is_included(entry, test_targets, skip_test_targets);

        let named = test_plan.and_then(|name| test_action.test_plans.iter().find(|p| p.name == name));

        let entry = if let Some(plan) = named {
            plan.test_targets.iter().find(included)
        } else if action == TestActionKind::Build && !test_action.test_plans.is_empty() {
            test_action
                .test_plans
                .iter()
                .flat_map(|plan: &TestPlan| plan.test_targets.iter())
                .find(included)
        } else if let Some(plan) = test_action.default_test_plan() {
            plan.test_targets.iter().find(included)
        } else {
            test_action.targets.iter().find(included)
        };

        let entry = entry?;
        graph.target(&entry.target.project_path, &entry.target.name)
    }

    /// Schemes with a non-empty build action, sorted by name.
    pub fn buildable_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        sorted(graph.schemes().into_iter().filter(|s| s.has_build_targets()))
    }

    /// Buildable schemes of the projects owning a root target.
    pub fn buildable_entry_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        let entry_projects: BTreeSet<&Path> = graph.root_targets().iter().map(|t| t.path).collect();

        sorted(
            entry_projects
                .into_iter()
                .filter_map(|path| graph.project(path))
                .flat_map(|project| project.schemes.iter())
                .filter(|s| s.has_build_targets()),
        )
    }

    /// Schemes with something to test, sorted by name.
    pub fn testable_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        sorted(graph.schemes().into_iter().filter(|s| s.has_tests()))
    }

    /// Schemes dedicated to a single test bundle: the scheme builds exactly
    /// that bundle and has something to test.
    pub fn test_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        let schemes = graph
            .all_targets()
            .into_iter()
            .filter(|t| t.target.product.is_test_bundle())
            .flat_map(|test_target| {
                test_target.project.schemes.iter().filter(move |scheme| {
                    matches!(
                        scheme.build_targets(),
                        [only] if only.project_path == test_target.path && only.name == test_target.target.name
                    )
                })
            })
            .filter(|s| s.has_tests());

        sorted(schemes)
    }

    /// Schemes with a run action executable, sorted by name.
    pub fn runnable_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        sorted(graph.schemes().into_iter().filter(|s| s.run_executable().is_some()))
    }

    /// The scheme's run action executable.
    pub fn runnable_target<'g>(
        &self,
        scheme: &Scheme,
        graph: &'g dyn GraphTraverser,
    ) -> Option<GraphTarget<'g>> {
        let executable = scheme.run_executable()?;
        graph.target(&executable.project_path, &executable.name)
    }

    /// Generated workspace-level schemes, sorted by name.
    pub fn workspace_schemes<'g>(&self, graph: &'g dyn GraphTraverser) -> Vec<&'g Scheme> {
        let marker = graph.workspace().scheme_marker();
        sorted(
            graph
                .workspace()
                .schemes
                .iter()
                .filter(|s| s.name.contains(&marker)),
        )
    }

    /// Find a generated workspace bundle under `directory`.
    ///
    /// Returns the first `*.xcworkspace` directory, in sorted walk order,
    /// that contains the generated marker file.
    pub fn workspace_path(&self, directory: &Path) -> Result<Option<PathBuf>> {
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry.with_context(|| {
                format!("failed to scan for workspaces in {}", directory.display())
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let is_workspace = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == "xcworkspace");
            if is_workspace && entry.path().join(GENERATED_MARKER).is_file() {
                return Ok(Some(entry.into_path()));
            }
        }
        Ok(None)
    }
}

/// Target configurations when the target overrides any, else the
/// project's.
fn effective_settings<'a>(project: &'a Project, target: &'a Target) -> &'a Settings {
    target
        .settings
        .as_ref()
        .filter(|settings| !settings.configurations.is_empty())
        .unwrap_or(&project.settings)
}

fn is_included(
    entry: &TestableTarget,
    test_targets: &[TestIdentifier],
    skip_test_targets: &[TestIdentifier],
) -> bool {
    if entry.is_skipped {
        return false;
    }
    let name = entry.target.name.as_str();
    if !test_targets.is_empty() {
        return test_targets.iter().any(|id| id.target == name);
    }
    !skip_test_targets.iter().any(|id| id.target == name)
}

fn sorted<'g>(schemes: impl Iterator<Item = &'g Scheme>) -> Vec<&'g Scheme> {
    let mut schemes: Vec<&Scheme> = schemes.collect();
    schemes.sort_by(|a, b| a.name.cmp(&b.name));
    schemes
}
