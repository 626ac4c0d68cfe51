//! Project - one logical project of the workspace.

use std::path::{Path, PathBuf};

use crate::core::package::Package;
use crate::core::scheme::Scheme;
use crate::core::settings::Settings;
use crate::core::target::Target;

/// Regions recorded when a project declares none.
pub const DEFAULT_KNOWN_REGIONS: [&str; 2] = ["en", "Base"];

/// An immutable project model, as produced by the loading stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Project name
    pub name: String,

    /// Directory containing the project manifest
    pub path: PathBuf,

    /// Root that source paths are relative to
    pub source_root: PathBuf,

    /// Where the generated project bundle is written
    pub xcodeproj_path: PathBuf,

    pub targets: Vec<Target>,

    pub schemes: Vec<Scheme>,

    pub settings: Settings,

    pub packages: Vec<Package>,

    pub organization_name: Option<String>,

    pub class_prefix: Option<String>,

    pub development_region: Option<String>,

    /// Known regions declared by the project (empty means default)
    pub default_known_regions: Vec<String>,

    pub last_upgrade_check: Option<String>,
}

impl Project {
    /// Create an empty project rooted at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        let xcodeproj_path = path.join(format!("{}.xcodeproj", name));

        Project {
            source_root: path.clone(),
            xcodeproj_path,
            name,
            path,
            targets: Vec::new(),
            schemes: Vec::new(),
            settings: Settings::default(),
            packages: Vec::new(),
            organization_name: None,
            class_prefix: None,
            development_region: None,
            default_known_regions: Vec::new(),
            last_upgrade_check: None,
        }
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    pub fn with_packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        self.packages = packages.into_iter().collect();
        self
    }

    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = Scheme>) -> Self {
        self.schemes = schemes.into_iter().collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Targets ordered by name.
    pub fn sorted_targets(&self) -> Vec<&Target> {
        let mut targets: Vec<&Target> = self.targets.iter().collect();
        targets.sort_by(|a, b| a.name.cmp(&b.name));
        targets
    }

    /// File name of the generated project bundle.
    pub fn xcodeproj_name(&self) -> String {
        self.xcodeproj_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.xcodeproj", self.name))
    }

    /// Known regions before discovered regions are added.
    pub fn known_regions(&self) -> Vec<String> {
        if self.default_known_regions.is_empty() {
            DEFAULT_KNOWN_REGIONS.iter().map(|r| r.to_string()).collect()
        } else {
            self.default_known_regions.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::Product;

    #[test]
    fn test_new_project_paths() {
        let project = Project::new("App", "/ws/App");
        assert_eq!(project.xcodeproj_path, PathBuf::from("/ws/App/App.xcodeproj"));
        assert_eq!(project.xcodeproj_name(), "App.xcodeproj");
        assert_eq!(project.source_root, project.path);
    }

    #[test]
    fn test_sorted_targets() {
        let project = Project::new("App", "/ws/App").with_targets([
            Target::new("Zeta", Product::Framework),
            Target::new("App", Product::App),
        ]);
        let names: Vec<_> = project.sorted_targets().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Zeta"]);
        assert!(project.target("Zeta").is_some());
    }

    #[test]
    fn test_known_regions_default() {
        let mut project = Project::new("App", "/ws/App");
        assert_eq!(project.known_regions(), vec!["en", "Base"]);
        project.default_known_regions = vec!["fr".into()];
        assert_eq!(project.known_regions(), vec!["fr"]);
    }
}
