//! Schemes - named bundles of build, test and run actions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reference to a target in some project of the workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetReference {
    /// Directory of the owning project
    pub project_path: PathBuf,

    /// Target name
    pub name: String,
}

impl TargetReference {
    pub fn new(project_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        TargetReference {
            project_path: project_path.into(),
            name: name.into(),
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

/// A scheme's build action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildAction {
    pub targets: Vec<TargetReference>,
}

/// A test target entry of a test action or test plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestableTarget {
    pub target: TargetReference,
    pub is_skipped: bool,
    pub is_parallelizable: bool,
}

impl TestableTarget {
    pub fn new(target: TargetReference) -> Self {
        TestableTarget {
            target,
            is_skipped: false,
            is_parallelizable: false,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.is_skipped = true;
        self
    }
}

/// A named, reusable collection of testable targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub name: String,
    pub path: PathBuf,
    pub test_targets: Vec<TestableTarget>,
    pub is_default: bool,
}

/// A scheme's test action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAction {
    /// Directly declared test targets (used when no test plans exist)
    pub targets: Vec<TestableTarget>,

    pub test_plans: Vec<TestPlan>,

    pub configuration: String,
}

impl Default for TestAction {
    fn default() -> Self {
        TestAction {
            targets: Vec::new(),
            test_plans: Vec::new(),
            configuration: "Debug".to_string(),
        }
    }
}

impl TestAction {
    /// Check if the action has anything to test.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.test_plans.is_empty()
    }

    pub fn default_test_plan(&self) -> Option<&TestPlan> {
        self.test_plans.iter().find(|plan| plan.is_default)
    }
}

/// A scheme's run action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAction {
    pub configuration: String,
    pub executable: Option<TargetReference>,
    pub arguments: Vec<String>,
}

/// A named, user-facing bundle of actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub name: String,
    pub shared: bool,
    pub build_action: Option<BuildAction>,
    pub test_action: Option<TestAction>,
    pub run_action: Option<RunAction>,
}

impl Scheme {
    pub fn new(name: impl Into<String>) -> Self {
        Scheme {
            name: name.into(),
            shared: true,
            build_action: None,
            test_action: None,
            run_action: None,
        }
    }

    pub fn with_build_action(mut self, targets: impl IntoIterator<Item = TargetReference>) -> Self {
        self.build_action = Some(BuildAction {
            targets: targets.into_iter().collect(),
        });
        self
    }

    pub fn with_test_action(mut self, action: TestAction) -> Self {
        self.test_action = Some(action);
        self
    }

    pub fn with_run_action(mut self, executable: Option<TargetReference>) -> Self {
        self.run_action = Some(RunAction {
            configuration: "Debug".to_string(),
            executable,
            arguments: Vec::new(),
        });
        self
    }

    /// Targets listed by the build action, empty if there is none.
    pub fn build_targets(&self) -> &[TargetReference] {
        self.build_action
            .as_ref()
            .map(|action| action.targets.as_slice())
            .unwrap_or_default()
    }

    pub fn has_build_targets(&self) -> bool {
        !self.build_targets().is_empty()
    }

    pub fn has_tests(&self) -> bool {
        self.test_action
            .as_ref()
            .is_some_and(|action| !action.is_empty())
    }

    pub fn run_executable(&self) -> Option<&TargetReference> {
        self.run_action.as_ref().and_then(|action| action.executable.as_ref())
    }
}

/// Error parsing a test identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TestIdentifierError {
    #[error("test identifier is empty")]
    Empty,

    #[error("invalid test identifier `{0}`: expected Target[/Class[/method]]")]
    Malformed(String),
}

/// Selects a test target, optionally narrowed to a class or method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestIdentifier {
    pub target: String,
    pub class: Option<String>,
    pub method: Option<String>,
}

impl TestIdentifier {
    pub fn target(name: impl Into<String>) -> Self {
        TestIdentifier {
            target: name.into(),
            class: None,
            method: None,
        }
    }
}

impl FromStr for TestIdentifier {
    type Err = TestIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TestIdentifierError::Empty);
        }

        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(TestIdentifierError::Malformed(s.to_string()));
        }

        Ok(TestIdentifier {
            target: parts[0].to_string(),
            class: parts.get(1).map(|p| p.to_string()),
            method: parts.get(2).map(|p| p.to_string()),
        })
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(class) = &self.class {
            write!(f, "/{}", class)?;
        }
        if let Some(method) = &self.method {
            write!(f, "/{}", method)?;
        }
        Ok(())
    }
}
