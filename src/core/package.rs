//! Package - a local or remote package dependency of a project.
//!
//! Local packages are identified by their filesystem path and remote
//! packages by their repository URL.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Version requirement of a remote package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    UpToNextMajor(String),
    UpToNextMinor(String),
    Range { from: String, to: String },
    Exact(String),
    Branch(String),
    Revision(String),
}

impl Requirement {
    /// Translate into the project file's requirement grammar.
    pub fn to_project_file(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        let mut put = |key: &str, value: &str| {
            entries.insert(key.to_string(), value.to_string());
        };

        match self {
            Requirement::UpToNextMajor(version) => {
                put("kind", "upToNextMajorVersion");
                put("minimumVersion", version);
            }
            Requirement::UpToNextMinor(version) => {
                put("kind", "upToNextMinorVersion");
                put("minimumVersion", version);
            }
            Requirement::Range { from, to } => {
                put("kind", "versionRange");
                put("minimumVersion", from);
                put("maximumVersion", to);
            }
            Requirement::Exact(version) => {
                put("kind", "exactVersion");
                put("version", version);
            }
            Requirement::Branch(branch) => {
                put("kind", "branch");
                put("branch", branch);
            }
            Requirement::Revision(revision) => {
                put("kind", "revision");
                put("revision", revision);
            }
        }

        entries
    }

    /// Versions mentioned by this requirement (branch/revision have none).
    pub fn versions(&self) -> Vec<&str> {
        match self {
            Requirement::UpToNextMajor(v) | Requirement::UpToNextMinor(v) | Requirement::Exact(v) => {
                vec![v.as_str()]
            }
            Requirement::Range { from, to } => vec![from.as_str(), to.as_str()],
            Requirement::Branch(_) | Requirement::Revision(_) => Vec::new(),
        }
    }
}

/// A package dependency declared by a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Package {
    /// Package checked out on disk
    Local { path: PathBuf },

    /// Package fetched from a repository
    Remote { url: String, requirement: Requirement },
}

impl Package {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Package::Local { path: path.into() }
    }

    pub fn remote(url: impl Into<String>, requirement: Requirement) -> Self {
        Package::Remote {
            url: url.into(),
            requirement,
        }
    }

    /// Identity used for deduplication and ordering.
    pub fn identity(&self) -> String {
        match self {
            Package::Local { path } => path.to_string_lossy().into_owned(),
            Package::Remote { url, .. } => url.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Package::Local { .. })
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Package::Local { path } => write!(f, "{} (local)", path.display()),
            Package::Remote { url, .. } => write!(f, "{} (remote)", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(Package::local("../Shared").identity(), "../Shared");
        assert_eq!(
            Package::remote(
                "https://github.com/acme/kit",
                Requirement::UpToNextMajor("1.0.0".into())
            )
            .identity(),
            "https://github.com/acme/kit"
        );
    }

    #[test]
    fn test_requirement_grammar() {
        let range = Requirement::Range {
            from: "1.2.0".into(),
            to: "2.0.0".into(),
        }
        .to_project_file();
        assert_eq!(range["kind"], "versionRange");
        assert_eq!(range["minimumVersion"], "1.2.0");
        assert_eq!(range["maximumVersion"], "2.0.0");

        let branch = Requirement::Branch("main".into()).to_project_file();
        assert_eq!(branch["kind"], "branch");
        assert_eq!(branch["branch"], "main");
        assert!(Requirement::Branch("main".into()).versions().is_empty());
    }
}
