//! In-memory project-file object graph.
//!
//! This is the structure the generator produces and an external writer
//! persists. The textual grammar of the file is not modelled here.

pub mod arena;
pub mod object;

use serde::Serialize;

pub use arena::ObjectArena;
pub use object::{
    AttributeValue, Attributes, BuildConfigurationObject, BuildFile, BuildPhase,
    ConfigurationList, FileReference, Group, LocalPackageReference, NativeTarget, Object,
    ObjectId, ProjectObject, RemotePackageReference, SourceTree, TargetDependencyObject,
};

/// Scope object ids of a project bundle are derived in.
pub fn scope_for(xcodeproj_path: &std::path::Path) -> String {
    xcodeproj_path.display().to_string()
}

/// Object and archive versions written into the project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatProfile {
    pub object_version: u32,
    pub archive_version: u32,
    pub compatibility_version: &'static str,
}

impl FormatProfile {
    /// The format profile every project is generated with.
    pub const RECENT: FormatProfile = FormatProfile {
        object_version: 77,
        archive_version: 1,
        compatibility_version: "Xcode 14.0",
    };
}

/// A project file: format versions, a root object and the object arena.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub archive_version: u32,
    pub object_version: u32,
    pub root_object: Option<ObjectId>,
    pub objects: ObjectArena,
}

impl ProjectFile {
    pub fn new(profile: FormatProfile, scope: impl Into<String>) -> Self {
        ProjectFile {
            archive_version: profile.archive_version,
            object_version: profile.object_version,
            root_object: None,
            objects: ObjectArena::new(scope),
        }
    }

    /// The root project object, if registered.
    pub fn root_project(&self) -> Option<ProjectObject> {
        let root = self.root_object.as_ref()?;
        match self.objects.get(root)? {
            Object::Project(project) => Some(project),
            _ => None,
        }
    }

    /// Patch the root project object.
    pub fn update_root_project<R>(&self, f: impl FnOnce(&mut ProjectObject) -> R) -> Option<R> {
        let root = self.root_object.as_ref()?;
        self.objects
            .update(root, |object| object.as_project_mut().map(f))
            .flatten()
    }
}

/// Semantic keys objects are registered under.
///
/// Keys only need to be unique within one project file; ids of objects in
/// other project files can be derived from the same keys and that file's
/// scope.
pub mod keys {
    use std::fmt;
    use std::path::Path;

    pub const ROOT_PROJECT: &str = "project";
    pub const PROJECT_CONFIGURATION_LIST: &str = "project:configuration-list";
    pub const MAIN_GROUP: &str = "group:main";
    pub const PRODUCTS_GROUP: &str = "group:products";
    pub const FRAMEWORKS_GROUP: &str = "group:frameworks";
    pub const PACKAGES_GROUP: &str = "group:packages";

    /// Configurations are identified by name and variant.
    pub fn project_configuration(name: &str, variant: impl fmt::Display) -> String {
        format!("project:configuration:{}:{}", name, variant)
    }

    /// Directory groups are keyed apart from the fixed groups.
    pub fn group(path: &Path) -> String {
        format!("group:path:{}", path.display())
    }

    pub fn file(path: &Path) -> String {
        format!("file:{}", path.display())
    }

    pub fn product(target: &str) -> String {
        format!("product:{}", target)
    }

    pub fn native_target(target: &str) -> String {
        format!("target:{}", target)
    }

    pub fn target_configuration_list(target: &str) -> String {
        format!("target:{}:configuration-list", target)
    }

    pub fn target_configuration(target: &str, name: &str, variant: impl fmt::Display) -> String {
        format!("target:{}:configuration:{}:{}", target, name, variant)
    }

    pub fn build_phase(target: &str, phase: &str) -> String {
        format!("target:{}:phase:{}", target, phase)
    }

    pub fn build_file(target: &str, phase: &str, path: &Path) -> String {
        format!("target:{}:phase:{}:file:{}", target, phase, path.display())
    }

    pub fn target_dependency(target: &str, dependency: &str) -> String {
        format!("target:{}:dependency:{}", target, dependency)
    }

    pub fn local_package(identity: &str) -> String {
        format!("package:local:{}", identity)
    }

    pub fn local_package_folder(identity: &str) -> String {
        format!("package:local:{}:folder", identity)
    }

    pub fn remote_package(identity: &str) -> String {
        format!("package:remote:{}", identity)
    }
}
