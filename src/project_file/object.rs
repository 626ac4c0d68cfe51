//! Objects of the project-file graph.
//!
//! Objects reference each other by `ObjectId`; ownership lives in the
//! arena, never in the objects themselves.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::settings::SettingsDictionary;

/// Stable identifier of an object in the project file.
///
/// Ids are 24 upper-case hex characters derived from the owning project
/// file's scope and a semantic key, so the same model always produces the
/// same ids regardless of creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Derive the id of `key` within `scope`.
    pub fn derive(scope: &str, key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(scope.as_bytes());
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        ObjectId(hex::encode_upper(&digest[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a file element's path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceTree {
    #[serde(rename = "<group>")]
    Group,
    #[serde(rename = "SOURCE_ROOT")]
    SourceRoot,
    #[serde(rename = "BUILT_PRODUCTS_DIR")]
    BuiltProductsDir,
    #[serde(rename = "SDKROOT")]
    SdkRoot,
}

/// A value in the project or target attributes dictionaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Array(Vec<String>),
    Reference(ObjectId),
}

impl AttributeValue {
    pub fn as_reference(&self) -> Option<&ObjectId> {
        match self {
            AttributeValue::Reference(id) => Some(id),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
    pub children: Vec<ObjectId>,
}

impl Group {
    pub fn named(name: impl Into<String>) -> Self {
        Group {
            name: Some(name.into()),
            path: None,
            source_tree: SourceTree::Group,
            children: Vec::new(),
        }
    }

    pub fn at_path(path: impl Into<String>) -> Self {
        Group {
            name: None,
            path: Some(path.into()),
            source_tree: SourceTree::Group,
            children: Vec::new(),
        }
    }

    /// Display name: explicit name, else path.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().or(self.path.as_deref()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub name: Option<String>,
    pub path: String,
    pub source_tree: SourceTree,
    pub last_known_file_type: Option<String>,
    pub explicit_file_type: Option<String>,
}

impl FileReference {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectObject {
    pub name: String,
    pub build_configuration_list: ObjectId,
    pub compatibility_version: String,
    pub development_region: String,
    pub has_scanned_for_encodings: bool,
    pub known_regions: Vec<String>,
    pub main_group: ObjectId,
    pub products_group: Option<ObjectId>,
    pub project_dir_path: String,
    pub targets: Vec<ObjectId>,
    pub attributes: Attributes,
    pub target_attributes: BTreeMap<ObjectId, Attributes>,
    pub package_references: Vec<ObjectId>,
    pub local_package_references: Vec<ObjectId>,
}

impl ProjectObject {
    /// Merge attributes into a target's attribute dictionary.
    pub fn set_target_attributes(&mut self, target: &ObjectId, attributes: Attributes) {
        self.target_attributes
            .entry(target.clone())
            .or_default()
            .extend(attributes);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTarget {
    pub name: String,
    pub product_name: String,
    pub product_type: String,
    pub build_configuration_list: ObjectId,
    pub build_phases: Vec<ObjectId>,
    pub dependencies: Vec<ObjectId>,
    pub product: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationList {
    pub build_configurations: Vec<ObjectId>,
    pub default_configuration_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigurationObject {
    pub name: String,
    pub build_settings: SettingsDictionary,
    pub base_configuration_reference: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFile {
    pub file_ref: ObjectId,
    pub settings: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPhase {
    pub files: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetDependencyObject {
    pub name: String,
    pub target: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPackageReference {
    pub relative_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePackageReference {
    pub repository_url: String,
    pub requirement: BTreeMap<String, String>,
}

/// Any object stored in the project file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "isa")]
pub enum Object {
    #[serde(rename = "PBXGroup")]
    Group(Group),
    #[serde(rename = "PBXFileReference")]
    FileReference(FileReference),
    #[serde(rename = "PBXProject")]
    Project(ProjectObject),
    #[serde(rename = "PBXNativeTarget")]
    NativeTarget(NativeTarget),
    #[serde(rename = "XCConfigurationList")]
    ConfigurationList(ConfigurationList),
    #[serde(rename = "XCBuildConfiguration")]
    BuildConfiguration(BuildConfigurationObject),
    #[serde(rename = "PBXBuildFile")]
    BuildFile(BuildFile),
    #[serde(rename = "PBXSourcesBuildPhase")]
    SourcesBuildPhase(BuildPhase),
    #[serde(rename = "PBXResourcesBuildPhase")]
    ResourcesBuildPhase(BuildPhase),
    #[serde(rename = "PBXTargetDependency")]
    TargetDependency(TargetDependencyObject),
    #[serde(rename = "XCLocalSwiftPackageReference")]
    LocalPackageReference(LocalPackageReference),
    #[serde(rename = "XCRemoteSwiftPackageReference")]
    RemotePackageReference(RemotePackageReference),
}

impl Object {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Object::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Object::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_file_reference(&self) -> Option<&FileReference> {
        match self {
            Object::FileReference(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectObject> {
        match self {
            Object::Project(project) => Some(project),
            _ => None,
        }
    }

    pub fn as_project_mut(&mut self) -> Option<&mut ProjectObject> {
        match self {
            Object::Project(project) => Some(project),
            _ => None,
        }
    }

    pub fn as_native_target(&self) -> Option<&NativeTarget> {
        match self {
            Object::NativeTarget(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_native_target_mut(&mut self) -> Option<&mut NativeTarget> {
        match self {
            Object::NativeTarget(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_configuration_list(&self) -> Option<&ConfigurationList> {
        match self {
            Object::ConfigurationList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_build_configuration(&self) -> Option<&BuildConfigurationObject> {
        match self {
            Object::BuildConfiguration(config) => Some(config),
            _ => None,
        }
    }

    /// The object's `isa` tag.
    pub fn isa(&self) -> &'static str {
        match self {
            Object::Group(_) => "PBXGroup",
            Object::FileReference(_) => "PBXFileReference",
            Object::Project(_) => "PBXProject",
            Object::NativeTarget(_) => "PBXNativeTarget",
            Object::ConfigurationList(_) => "XCConfigurationList",
            Object::BuildConfiguration(_) => "XCBuildConfiguration",
            Object::BuildFile(_) => "PBXBuildFile",
            Object::SourcesBuildPhase(_) => "PBXSourcesBuildPhase",
            Object::ResourcesBuildPhase(_) => "PBXResourcesBuildPhase",
            Object::TargetDependency(_) => "PBXTargetDependency",
            Object::LocalPackageReference(_) => "XCLocalSwiftPackageReference",
            Object::RemotePackageReference(_) => "XCRemoteSwiftPackageReference",
        }
    }

    /// Name used to order group children.
    pub fn sort_name(&self) -> Option<&str> {
        match self {
            Object::Group(group) => Some(group.display_name()),
            Object::FileReference(file) => Some(file.display_name()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_stable_and_scoped() {
        let a = ObjectId::derive("/ws/App/App.xcodeproj", "target:App");
        let b = ObjectId::derive("/ws/App/App.xcodeproj", "target:App");
        let c = ObjectId::derive("/ws/Kit/Kit.xcodeproj", "target:App");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 24);
        assert!(a.as_str().chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_lowercase()));
    }

    #[test]
    fn test_target_attributes_merge() {
        let id = ObjectId::derive("scope", "x");
        let mut project = ProjectObject {
            name: "App".into(),
            build_configuration_list: id.clone(),
            compatibility_version: "Xcode 14.0".into(),
            development_region: "en".into(),
            has_scanned_for_encodings: false,
            known_regions: Vec::new(),
            main_group: id.clone(),
            products_group: None,
            project_dir_path: String::new(),
            targets: Vec::new(),
            attributes: Attributes::new(),
            target_attributes: BTreeMap::new(),
            package_references: Vec::new(),
            local_package_references: Vec::new(),
        };

        project.set_target_attributes(&id, Attributes::from([("A".to_string(), "1".into())]));
        project.set_target_attributes(&id, Attributes::from([("B".to_string(), "2".into())]));
        assert_eq!(project.target_attributes[&id].len(), 2);
    }
}
