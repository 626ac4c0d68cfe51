//! Test fixtures for common test scenarios.
//!
//! `FixtureGraph` is a graph traverser built straight from project values,
//! without the dependency graph the live model maintains.
//! `write_shop_workspace` lays out a small on-disk workspace.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::graph::{GraphTarget, GraphTraverser};
use crate::core::project::Project;
use crate::core::target::TargetDependency;
use crate::core::workspace::Workspace;

/// In-memory graph traverser over a fixed set of projects.
#[derive(Debug, Clone)]
pub struct FixtureGraph {
    workspace: Workspace,
    projects: BTreeMap<PathBuf, Project>,
}

impl FixtureGraph {
    /// Create an empty workspace.
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        FixtureGraph {
            workspace: Workspace::new(name, path),
            projects: BTreeMap::new(),
        }
    }

    /// Create a graph whose entry projects are the ones `workspace` lists.
    pub fn from_workspace(workspace: Workspace, projects: impl IntoIterator<Item = Project>) -> Self {
        FixtureGraph {
            workspace,
            projects: projects.into_iter().map(|p| (p.path.clone(), p)).collect(),
        }
    }

    /// Add a project and list it as an entry project.
    pub fn with_project(mut self, project: Project) -> Self {
        self.workspace.projects.push(project.path.clone());
        self.projects.insert(project.path.clone(), project);
        self
    }
}

impl GraphTraverser for FixtureGraph {
    fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn projects(&self) -> Vec<&Project> {
        self.projects.values().collect()
    }

    fn project(&self, path: &Path) -> Option<&Project> {
        self.projects.get(path)
    }

    fn direct_local_target_dependencies(&self, path: &Path, name: &str) -> Vec<GraphTarget<'_>> {
        let Some(target) = self.project(path).and_then(|p| p.target(name)) else {
            return Vec::new();
        };

        let mut dependencies: Vec<GraphTarget<'_>> = target
            .dependencies
            .iter()
            .filter_map(|dependency| match dependency {
                TargetDependency::Target { name } => self.target(path, name),
                TargetDependency::Project { path, target } => self.target(path, target),
                _ => None,
            })
            .collect();
        dependencies.sort_by(|a, b| a.key().cmp(&b.key()));
        dependencies
    }
}

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Write the "Shop" workspace under `root`.
///
/// - `App` (listed): `App` depends on `Kit/Kit`; `AppTests` is hosted by
///   `App`; one local package at `../Shared` and one remote package
/// - `Kit` (reached only through `App`'s dependency): one framework
pub fn write_shop_workspace(root: &Path) {
    write(
        root,
        "Wharf.toml",
        r#"[workspace]
name = "Shop"
projects = ["App"]

[[workspace.schemes]]
name = "Shop-Workspace"
build = ["App:App"]
"#,
    );

    write(
        root,
        "App/Wharf.toml",
        r#"[project]
name = "App"
organization = "Acme"

[[packages]]
path = "../Shared"

[[packages]]
url = "https://github.com/acme/log"
requirement = { up_to_next_major = "1.0.0" }

[[targets]]
name = "App"
product = "app"
bundle_id = "com.acme.app"
sources = ["Sources/**/*.swift"]
resources = ["Resources/en.lproj/*.strings"]
dependencies = [{ type = "project", path = "../Kit", target = "Kit" }]

[[targets]]
name = "AppTests"
product = "unit_tests"
sources = ["Tests/**/*.swift"]
dependencies = [{ type = "target", name = "App" }]

[targets.settings.base]
TEST_TARGET_NAME = "App"

[[schemes]]
name = "App"
build = ["App", "../Kit:Kit"]
test = ["AppTests"]
run = "App"
"#,
    );
    write(root, "App/Sources/AppDelegate.swift", "");
    write(root, "App/Tests/AppTests.swift", "");
    write(root, "App/Resources/en.lproj/Localizable.strings", "");

    write(
        root,
        "Kit/Wharf.toml",
        r#"[project]
name = "Kit"

[[targets]]
name = "Kit"
product = "framework"
sources = ["Sources/*.swift"]
"#,
    );
    write(root, "Kit/Sources/Kit.swift", "");

    write(root, "Shared/Package.swift", "");
}
