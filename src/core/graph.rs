//! Graph traversal over a workspace's projects, targets and schemes.
//!
//! `GraphTraverser` is the read-only query surface the generator and the
//! inspector work against. `Graph` is the live model produced by the loading
//! stage; tests use a lighter fixture implementation.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::project::Project;
use crate::core::scheme::Scheme;
use crate::core::target::{Target, TargetDependency};
use crate::core::workspace::Workspace;

/// A target together with the project that owns it.
#[derive(Debug, Clone, Copy)]
pub struct GraphTarget<'a> {
    pub path: &'a Path,
    pub target: &'a Target,
    pub project: &'a Project,
}

impl<'a> GraphTarget<'a> {
    pub fn new(project: &'a Project, target: &'a Target) -> Self {
        GraphTarget {
            path: &project.path,
            target,
            project,
        }
    }

    /// Ordering key: project path, then target name.
    pub fn key(&self) -> (&'a Path, &'a str) {
        (self.path, self.target.name.as_str())
    }
}

impl PartialEq for GraphTarget<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GraphTarget<'_> {}

/// Read-only queries over a workspace-wide dependency graph.
pub trait GraphTraverser: Sync {
    /// The workspace being traversed.
    fn workspace(&self) -> &Workspace;

    /// Every project in the graph, sorted by path.
    fn projects(&self) -> Vec<&Project>;

    /// Get a project by directory.
    fn project(&self, path: &Path) -> Option<&Project>;

    /// Targets in the same workspace that the given target depends on
    /// directly, sorted by project path and name.
    fn direct_local_target_dependencies(&self, path: &Path, name: &str) -> Vec<GraphTarget<'_>>;

    fn name(&self) -> &str {
        &self.workspace().name
    }

    fn path(&self) -> &Path {
        self.workspace().path()
    }

    /// Resolve a target by project path and name.
    fn target(&self, path: &Path, name: &str) -> Option<GraphTarget<'_>> {
        let project = self.project(path)?;
        let target = project.target(name)?;
        Some(GraphTarget::new(project, target))
    }

    /// Every target of every project.
    fn all_targets(&self) -> Vec<GraphTarget<'_>> {
        let mut targets: Vec<GraphTarget<'_>> = self
            .projects()
            .into_iter()
            .flat_map(|project| project.targets.iter().map(move |t| GraphTarget::new(project, t)))
            .collect();
        targets.sort_by(|a, b| a.key().cmp(&b.key()));
        targets
    }

    /// Targets of the projects the workspace lists as entry points.
    fn root_targets(&self) -> Vec<GraphTarget<'_>> {
        let workspace = self.workspace();
        self.all_targets()
            .into_iter()
            .filter(|t| workspace.contains_project(t.path))
            .collect()
    }

    /// Workspace schemes followed by every project's schemes.
    fn schemes(&self) -> Vec<&Scheme> {
        let mut schemes: Vec<&Scheme> = self.workspace().schemes.iter().collect();
        for project in self.projects() {
            schemes.extend(project.schemes.iter());
        }
        schemes
    }
}

/// Node key of the target dependency graph.
type TargetKey = (PathBuf, String);

/// The live workspace graph.
#[derive(Debug, Clone)]
pub struct Graph {
    workspace: Workspace,

    projects: BTreeMap<PathBuf, Project>,

    /// Target dependency edges (dependent -> dependency)
    dependencies: DiGraph<TargetKey, ()>,

    /// Map from target key to node index
    target_to_node: HashMap<TargetKey, NodeIndex>,
}

impl Graph {
    /// Build the graph, wiring target dependencies between known targets.
    ///
    /// Dependencies on targets that do not exist are dropped; package and
    /// SDK dependencies are not part of the target graph.
    pub fn new(workspace: Workspace, projects: impl IntoIterator<Item = Project>) -> Self {
        let projects: BTreeMap<PathBuf, Project> =
            projects.into_iter().map(|p| (p.path.clone(), p)).collect();

        let mut dependencies = DiGraph::new();
        let mut target_to_node = HashMap::new();

        for project in projects.values() {
            for target in &project.targets {
                let key = (project.path.clone(), target.name.clone());
                let node = dependencies.add_node(key.clone());
                target_to_node.insert(key, node);
            }
        }

        for project in projects.values() {
            for target in &project.targets {
                let from = target_to_node[&(project.path.clone(), target.name.clone())];
                for dep in &target.dependencies {
                    let key = match dep {
                        TargetDependency::Target { name } => (project.path.clone(), name.clone()),
                        TargetDependency::Project { path, target } => (path.clone(), target.clone()),
                        TargetDependency::Package { .. } | TargetDependency::Sdk { .. } => continue,
                    };
                    match target_to_node.get(&key) {
                        Some(&to) => {
                            if !dependencies.contains_edge(from, to) {
                                dependencies.add_edge(from, to, ());
                            }
                        }
                        None => tracing::debug!(
                            "dropping dependency of `{}` on unknown target `{}`",
                            target.name,
                            key.1
                        ),
                    }
                }
            }
        }

        Graph {
            workspace,
            projects,
            dependencies,
            target_to_node,
        }
    }

    /// Number of target dependency edges.
    pub fn edge_count(&self) -> usize {
        self.dependencies.edge_count()
    }
}

impl GraphTraverser for Graph {
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
        let Some(&node) = self.target_to_node.get(&(path.to_path_buf(), name.to_string())) else {
            return Vec::new();
        };

        let mut deps: Vec<GraphTarget<'_>> = self
            .dependencies
            .neighbors(node)
            .filter_map(|n| {
                let (dep_path, dep_name) = &self.dependencies[n];
                self.target(dep_path, dep_name)
            })
            .collect();
        deps.sort_by(|a, b| a.key().cmp(&b.key()));
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::Product;

    fn sample_graph() -> Graph {
        let kit = Project::new("Kit", "/ws/Kit").with_targets([Target::new("Kit", Product::Framework)]);
        let app = Project::new("App", "/ws/App").with_targets([
            Target::new("App", Product::App).with_dependencies([
                TargetDependency::Target { name: "Core".into() },
                TargetDependency::Project {
                    path: "/ws/Kit".into(),
                    target: "Kit".into(),
                },
                TargetDependency::Target { name: "Missing".into() },
                TargetDependency::Sdk { name: "UIKit.framework".into() },
            ]),
            Target::new("Core", Product::StaticLibrary),
        ]);
        let workspace = Workspace::new("Shop", "/ws").with_projects(["/ws/App"]);
        Graph::new(workspace, [kit, app])
    }

    #[test]
    fn test_direct_dependencies_are_sorted_and_resolved() {
        let graph = sample_graph();
        let deps = graph.direct_local_target_dependencies(Path::new("/ws/App"), "App");
        let keys: Vec<_> = deps.iter().map(|d| d.key()).collect();
        assert_eq!(
            keys,
            vec![(Path::new("/ws/App"), "Core"), (Path::new("/ws/Kit"), "Kit")]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_root_targets_only_include_workspace_projects() {
        let graph = sample_graph();
        let roots: Vec<_> = graph.root_targets().iter().map(|t| t.target.name.clone()).collect();
        assert_eq!(roots, vec!["App", "Core"]);
        assert_eq!(graph.all_targets().len(), 3);
    }

    #[test]
    fn test_target_lookup() {
        let graph = sample_graph();
        assert!(graph.target(Path::new("/ws/Kit"), "Kit").is_some());
        assert!(graph.target(Path::new("/ws/Kit"), "App").is_none());
        assert!(graph.target(Path::new("/ws/Nope"), "Kit").is_none());
    }
}
