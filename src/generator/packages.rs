//! Package reference resolution.
//!
//! Deduplicates a project's local and remote packages into reference
//! objects and attaches them to the root project object in key order.

use std::collections::BTreeMap;

use crate::core::package::Package;
use crate::core::project::Project;
use crate::generator::file_elements::{append_child, relative_to_root, ProjectFileElements};
use crate::project_file::{
    keys, FileReference, Group, LocalPackageReference, Object, ObjectId, ProjectFile,
    RemotePackageReference, SourceTree,
};

/// Package references created for a project, keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReferences {
    /// Relative path -> local package reference
    pub local: BTreeMap<String, ObjectId>,

    /// Repository URL -> remote package reference
    pub remote: BTreeMap<String, ObjectId>,
}

/// Create package references and attach them to the root project object.
pub fn generate_package_references(
    project: &Project,
    file: &ProjectFile,
    elements: &ProjectFileElements,
) -> PackageReferences {
    let mut references = PackageReferences::default();

    for package in &project.packages {
        match package {
            Package::Local { path } => {
                let relative = relative_to_root(path, &project.source_root);
                let key = relative.to_string_lossy().into_owned();
                if references.local.contains_key(&key) {
                    tracing::debug!("skipping duplicate local package `{}`", key);
                    continue;
                }

                let name = relative
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| key.clone());
                let folder = file.objects.add(
                    &keys::local_package_folder(&key),
                    Object::FileReference(FileReference {
                        name: Some(name),
                        path: key.clone(),
                        source_tree: SourceTree::Group,
                        last_known_file_type: Some("folder".to_string()),
                        explicit_file_type: None,
                    }),
                );
                let packages_group = packages_group(file, elements);
                append_child(file, &packages_group, &folder);

                let reference = file.objects.add(
                    &keys::local_package(&key),
                    Object::LocalPackageReference(LocalPackageReference {
                        relative_path: key.clone(),
                    }),
                );
                references.local.insert(key, reference);
            }
            Package::Remote { url, requirement } => {
                if references.remote.contains_key(url) {
                    tracing::debug!("skipping duplicate remote package `{}`", url);
                    continue;
                }

                let reference = file.objects.add(
                    &keys::remote_package(url),
                    Object::RemotePackageReference(RemotePackageReference {
                        repository_url: url.clone(),
                        requirement: requirement.to_project_file(),
                    }),
                );
                references.remote.insert(url.clone(), reference);
            }
        }
    }

    // BTreeMap values come out sorted by key.
    let remote: Vec<ObjectId> = references.remote.values().cloned().collect();
    let local: Vec<ObjectId> = references.local.values().cloned().collect();
    file.update_root_project(|root| {
        root.package_references = remote;
        root.local_package_references = local;
    });

    references
}

/// Get the "Packages" group, creating it under the main group if absent.
fn packages_group(file: &ProjectFile, elements: &ProjectFileElements) -> ObjectId {
    let id = file.objects.id_for(keys::PACKAGES_GROUP);
    if !file.objects.contains(&id) {
        file.objects
            .add(keys::PACKAGES_GROUP, Object::Group(Group::named("Packages")));
        append_child(file, &elements.groups().main, &id);
    }
    id
}
