//! Loading a workspace graph from manifests.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::graph::Graph;
use crate::core::project::Project;
use crate::core::target::TargetDependency;
use crate::core::workspace::Workspace;
use crate::ops::manifest::{Manifest, MANIFEST_NAME};
use crate::util::errors::ManifestError;

/// Load the workspace rooted at `path` into a graph.
///
/// Projects reached only through cross-project target dependencies are
/// loaded too, but only the projects the workspace lists are entry points.
pub fn load_graph(path: &Path) -> Result<Graph> {
    let root = std::fs::canonicalize(path)
        .with_context(|| format!("failed to resolve workspace path: {}", path.display()))?;
    let manifest_path = root.join(MANIFEST_NAME);
    if !manifest_path.is_file() {
        return Err(ManifestError::NotFound(root).into());
    }

    let manifest = Manifest::load(&manifest_path)?;

    let mut projects: BTreeMap<PathBuf, Project> = BTreeMap::new();
    let workspace = match manifest.workspace {
        Some(ws) => Workspace::new(ws.name, &root)
            .with_projects(ws.projects)
            .with_schemes(ws.schemes),
        None => {
            let project = manifest.into_project()?;
            let workspace = Workspace::new(project.name.clone(), &root).with_projects([root.clone()]);
            projects.insert(root.clone(), project);
            workspace
        }
    };

    let mut queue: VecDeque<PathBuf> = workspace.projects.iter().cloned().collect();
    while let Some(dir) = queue.pop_front() {
        if !projects.contains_key(&dir) {
            let project = load_project(&dir)?;
            projects.insert(dir.clone(), project);
        }
        let Some(project) = projects.get(&dir) else {
            continue;
        };

        for target in &project.targets {
            for dependency in &target.dependencies {
                if let TargetDependency::Project { path, .. } = dependency {
                    if !projects.contains_key(path) && !queue.contains(path) {
                        tracing::debug!(
                            "loading `{}` for a dependency of `{}`",
                            path.display(),
                            target.name
                        );
                        queue.push_back(path.clone());
                    }
                }
            }
        }
    }

    tracing::debug!("loaded {} projects from {}", projects.len(), root.display());

    Ok(Graph::new(workspace, projects.into_values()))
}

fn load_project(dir: &Path) -> Result<Project> {
    let manifest_path = dir.join(MANIFEST_NAME);
    if !manifest_path.is_file() {
        return Err(ManifestError::MissingProject(dir.to_path_buf()).into());
    }
    Manifest::load(&manifest_path)?.into_project()
}
