//! Project file element registry.
//!
//! Builds the group/file-reference tree for a project's sources, resources,
//! configuration files and products, and remembers where each
//! project-relative path landed so later passes can reference it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use crate::core::project::Project;
use crate::project_file::{keys, FileReference, Group, Object, ObjectId, ProjectFile, SourceTree};

/// The fixed top-level groups of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroups {
    pub main: ObjectId,
    pub products: ObjectId,
    pub frameworks: ObjectId,
}

impl ProjectGroups {
    /// Create the main group and its auxiliary groups.
    pub fn generate(file: &ProjectFile) -> Self {
        let products = file
            .objects
            .add(keys::PRODUCTS_GROUP, Object::Group(Group::named("Products")));
        let frameworks = file
            .objects
            .add(keys::FRAMEWORKS_GROUP, Object::Group(Group::named("Frameworks")));

        let mut main_group = Group {
            name: None,
            path: None,
            source_tree: SourceTree::Group,
            children: Vec::new(),
        };
        main_group.children.push(frameworks.clone());
        main_group.children.push(products.clone());
        let main = file.objects.add(keys::MAIN_GROUP, Object::Group(main_group));

        ProjectGroups {
            main,
            products,
            frameworks,
        }
    }

    /// Top-level groups kept at the end of the main group, in order.
    fn trailing(&self, packages: &ObjectId) -> [ObjectId; 3] {
        [packages.clone(), self.frameworks.clone(), self.products.clone()]
    }
}

/// Registry of the file elements generated for one project.
#[derive(Debug, Clone)]
pub struct ProjectFileElements {
    groups: ProjectGroups,

    /// Project-relative path -> file reference
    files: BTreeMap<PathBuf, ObjectId>,

    /// Project-relative directory -> group
    group_paths: BTreeMap<PathBuf, ObjectId>,

    /// Target name -> product reference
    products: BTreeMap<String, ObjectId>,

    /// Regions discovered from localized (`*.lproj`) directories
    known_regions: BTreeSet<String>,
}

impl ProjectFileElements {
    pub fn new(groups: ProjectGroups) -> Self {
        ProjectFileElements {
            groups,
            files: BTreeMap::new(),
            group_paths: BTreeMap::new(),
            products: BTreeMap::new(),
            known_regions: BTreeSet::new(),
        }
    }

    pub fn groups(&self) -> &ProjectGroups {
        &self.groups
    }

    /// Register every file implied by the project's targets and settings.
    pub fn generate_project_files(&mut self, project: &Project, file: &ProjectFile) {
        let mut paths: BTreeSet<PathBuf> = project.settings.xcconfig_paths().cloned().collect();

        for target in project.sorted_targets() {
            paths.extend(target.sources.iter().map(|s| s.path.clone()));
            paths.extend(target.resources.iter().map(|r| r.path.clone()));
            if let Some(settings) = &target.settings {
                paths.extend(settings.xcconfig_paths().cloned());
            }

            self.add_product(&target.name, &target.output_filename(), file);
        }

        for path in paths {
            let relative = relative_to_root(&path, &project.source_root);
            self.add_file(&relative, file);
        }
    }

    /// Register a product reference for a target.
    fn add_product(&mut self, target: &str, filename: &str, file: &ProjectFile) {
        let product = FileReference {
            name: None,
            path: filename.to_string(),
            source_tree: SourceTree::BuiltProductsDir,
            last_known_file_type: None,
            explicit_file_type: Some(file_type(Path::new(filename)).to_string()),
        };
        let id = file
            .objects
            .add(&keys::product(target), Object::FileReference(product));
        append_child(file, &self.groups.products, &id);
        self.products.insert(target.to_string(), id);
    }

    /// Register a file, creating its parent groups on demand.
    fn add_file(&mut self, relative: &Path, file: &ProjectFile) {
        if self.files.contains_key(relative) {
            return;
        }

        // Files outside the source root hang directly off the main group.
        if relative.components().any(|c| matches!(c, Component::ParentDir | Component::RootDir)) {
            let id = file.objects.add(
                &keys::file(relative),
                Object::FileReference(FileReference {
                    name: relative.file_name().map(|n| n.to_string_lossy().into_owned()),
                    path: relative.to_string_lossy().into_owned(),
                    source_tree: SourceTree::SourceRoot,
                    last_known_file_type: Some(file_type(relative).to_string()),
                    explicit_file_type: None,
                }),
            );
            append_child(file, &self.groups.main, &id);
            self.files.insert(relative.to_path_buf(), id);
            return;
        }

        let parent = match relative.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.add_group(parent, file),
            _ => self.groups.main.clone(),
        };

        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = file.objects.add(
            &keys::file(relative),
            Object::FileReference(FileReference {
                name: None,
                path: name,
                source_tree: SourceTree::Group,
                last_known_file_type: Some(file_type(relative).to_string()),
                explicit_file_type: None,
            }),
        );
        append_child(file, &parent, &id);
        self.files.insert(relative.to_path_buf(), id);
    }

    /// Get or create the group for a project-relative directory.
    fn add_group(&mut self, dir: &Path, file: &ProjectFile) -> ObjectId {
        if let Some(id) = self.group_paths.get(dir) {
            return id.clone();
        }

        let parent = match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.add_group(parent, file),
            _ => self.groups.main.clone(),
        };

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(region) = name.strip_suffix(".lproj") {
            self.known_regions.insert(region.to_string());
        }

        let id = file
            .objects
            .add(&keys::group(dir), Object::Group(Group::at_path(name)));
        append_child(file, &parent, &id);
        self.group_paths.insert(dir.to_path_buf(), id.clone());
        id
    }

    /// File reference registered for a path (absolute or project-relative).
    pub fn file_reference(&self, path: &Path, source_root: &Path) -> Option<&ObjectId> {
        self.files.get(&relative_to_root(path, source_root))
    }

    /// Product reference registered for a target.
    pub fn product(&self, target: &str) -> Option<&ObjectId> {
        self.products.get(target)
    }

    /// Regions discovered while registering files.
    pub fn known_regions(&self) -> &BTreeSet<String> {
        &self.known_regions
    }

    /// Remove groups left without children, then order every group's
    /// children by name. Auxiliary top-level groups stay last in the main
    /// group. Returns the ids of the removed groups.
    pub fn finalize_groups(&self, file: &ProjectFile) -> Vec<ObjectId> {
        let mut removed = Vec::new();

        loop {
            let empty = file.objects.ids_where(|object| {
                object.as_group().is_some_and(|g| g.children.is_empty())
            });
            let empty: Vec<ObjectId> = empty.into_iter().filter(|id| *id != self.groups.main).collect();
            if empty.is_empty() {
                break;
            }

            for id in &empty {
                file.objects.remove(id);
            }
            for parent in file.objects.ids_where(|object| object.as_group().is_some()) {
                file.objects.update(&parent, |object| {
                    if let Some(group) = object.as_group_mut() {
                        group.children.retain(|child| !empty.contains(child));
                    }
                });
            }
            removed.extend(empty);
        }

        let packages = file.objects.id_for(keys::PACKAGES_GROUP);
        let trailing = self.groups.trailing(&packages);
        let snapshot = file.objects.snapshot();
        let sort_name = |id: &ObjectId| {
            snapshot
                .get(id)
                .and_then(|o| o.sort_name())
                .unwrap_or_default()
                .to_string()
        };

        for (id, object) in &snapshot {
            let Some(group) = object.as_group() else {
                continue;
            };
            let mut children = group.children.clone();
            if *id == self.groups.main {
                let (mut leading, rest): (Vec<_>, Vec<_>) =
                    children.into_iter().partition(|c| !trailing.contains(c));
                leading.sort_by_key(|c| sort_name(c));
                leading.extend(trailing.iter().filter(|t| rest.contains(*t)).cloned());
                children = leading;
            } else {
                children.sort_by_key(|c| sort_name(c));
            }
            file.objects.update(id, |object| {
                if let Some(group) = object.as_group_mut() {
                    group.children = children;
                }
            });
        }

        removed
    }
}

/// Append a child to a group if it is not already present.
pub(crate) fn append_child(file: &ProjectFile, group: &ObjectId, child: &ObjectId) {
    file.objects.update(group, |object| {
        if let Some(group) = object.as_group_mut() {
            if !group.children.contains(child) {
                group.children.push(child.clone());
            }
        }
    });
}

/// Express a path relative to the source root when it is absolute.
pub(crate) fn relative_to_root(path: &Path, source_root: &Path) -> PathBuf {
    if path.is_absolute() {
        pathdiff::diff_paths(path, source_root).unwrap_or_else(|| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}

/// File type identifier for a path, from its extension.
pub fn file_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "swift" => "sourcecode.swift",
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "c" => "sourcecode.c.c",
        "cpp" | "cc" => "sourcecode.cpp.cpp",
        "h" => "sourcecode.c.h",
        "png" => "image.png",
        "xcassets" => "folder.assetcatalog",
        "storyboard" => "file.storyboard",
        "xib" => "file.xib",
        "strings" => "text.plist.strings",
        "xcconfig" => "text.xcconfig",
        "json" => "text.json",
        "plist" => "text.plist.xml",
        "app" => "wrapper.application",
        "framework" => "wrapper.framework",
        "xctest" => "wrapper.cfbundle",
        "bundle" => "wrapper.plug-in",
        "appex" => "wrapper.app-extension",
        "a" => "archive.ar",
        "dylib" => "compiled.mach-o.dylib",
        "" => "compiled.mach-o.executable",
        _ => "file",
    }
}
