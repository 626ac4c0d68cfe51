//! Workspace - the set of projects generated together.
//!
//! A Workspace names the entry projects of the graph and carries the
//! workspace-level schemes.

use std::path::{Path, PathBuf};

use crate::core::scheme::Scheme;

/// Name of the marker file written into generated workspace bundles.
pub const GENERATED_MARKER: &str = ".wharf-generated";

/// A workspace containing the entry projects and workspace schemes.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub name: String,

    /// Directory containing the workspace manifest
    pub path: PathBuf,

    /// Where the generated workspace bundle is written
    pub xcworkspace_path: PathBuf,

    /// Directories of the projects listed by the workspace
    pub projects: Vec<PathBuf>,

    pub schemes: Vec<Scheme>,
}

impl Workspace {
    /// Create a workspace rooted at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        let xcworkspace_path = path.join(format!("{}.xcworkspace", name));

        Workspace {
            name,
            path,
            xcworkspace_path,
            projects: Vec::new(),
            schemes: Vec::new(),
        }
    }

    pub fn with_projects(mut self, projects: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = Scheme>) -> Self {
        self.schemes = schemes.into_iter().collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Substring shared by the names of generated workspace schemes.
    pub fn scheme_marker(&self) -> String {
        format!("{}-Workspace", self.name)
    }

    /// Check if a project directory is one of the entry projects.
    pub fn contains_project(&self, path: &Path) -> bool {
        self.projects.iter().any(|p| p == path)
    }
}
