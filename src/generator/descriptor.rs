//! Descriptors produced by generation.
//!
//! Descriptors are plain values: nothing here touches the filesystem. An
//! external writer turns them into files on disk.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::project_file::{ObjectId, ProjectFile};

/// The project file of one project together with its native targets.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedProject {
    /// File name of the project bundle
    pub name: String,

    /// Path of the project bundle
    pub path: PathBuf,

    pub project_file: ProjectFile,

    /// Target name -> native target object
    pub targets: BTreeMap<String, ObjectId>,
}

/// An entry of the embedded workspace data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkspaceDataElement {
    /// Reference to the enclosing project itself
    SelfReference,
}

/// Workspace data embedded in every generated project bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceData {
    pub children: Vec<WorkspaceDataElement>,
}

impl WorkspaceData {
    /// A workspace whose only entry is the enclosing project.
    pub fn self_referencing() -> Self {
        WorkspaceData {
            children: vec![WorkspaceDataElement::SelfReference],
        }
    }
}

/// The contents of a generated project bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XcodeProjDescriptor {
    pub workspace_data: WorkspaceData,
    pub project_file: ProjectFile,
}

/// A target as referenced from a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildableReference {
    /// `container:<relative path to project bundle>`
    pub referenced_container: String,
    pub blueprint_identifier: ObjectId,
    pub buildable_name: String,
    pub blueprint_name: String,
}

/// A test entry of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestableReference {
    pub reference: BuildableReference,
    pub skipped: bool,
    pub parallelizable: bool,
}

/// A fully resolved scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeDescriptor {
    pub name: String,
    pub shared: bool,
    pub build_entries: Vec<BuildableReference>,
    pub testables: Vec<TestableReference>,

    /// Test plan paths, relative to the project directory
    pub test_plans: Vec<PathBuf>,
    pub test_configuration: Option<String>,
    pub launch: Option<BuildableReference>,
    pub launch_configuration: Option<String>,
    pub launch_arguments: Vec<String>,
}

/// A filesystem side effect to apply after writing descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffectDescriptor {
    File { path: PathBuf, contents: Vec<u8> },
    Directory { path: PathBuf },
}

/// The final artifact of generating one project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Directory of the logical project
    pub path: PathBuf,

    /// Path of the generated project bundle
    pub xcodeproj_path: PathBuf,

    pub xcodeproj: XcodeProjDescriptor,

    pub scheme_descriptors: Vec<SchemeDescriptor>,

    /// Always empty at this layer; the writer materializes side effects
    pub side_effect_descriptors: Vec<SideEffectDescriptor>,
}
