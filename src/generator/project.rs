//! Project descriptor generation.
//!
//! Compiles one logical project into a project-file object graph. The
//! passes run in a fixed order, and later passes patch objects created by
//! earlier ones through the arena rather than holding references to them.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::graph::GraphTraverser;
use crate::core::project::Project;
use crate::core::target::Target;
use crate::generator::attributes::{
    KnownAssetTagsFetcher, KnownAssetTagsFetching, ProjectAttributeBuilder,
};
use crate::generator::config::{ConfigGenerating, ConfigGenerator};
use crate::generator::descriptor::{
    GeneratedProject, ProjectDescriptor, WorkspaceData, XcodeProjDescriptor,
};
use crate::generator::file_elements::{ProjectFileElements, ProjectGroups};
use crate::generator::packages::generate_package_references;
use crate::generator::schemes::{SchemeDescriptorsGenerating, SchemeDescriptorsGenerator};
use crate::generator::target::{TargetGenerating, TargetGenerator};
use crate::project_file::{
    keys, scope_for, AttributeValue, Attributes, FormatProfile, Object, ObjectId, ProjectFile,
    ProjectObject,
};
use crate::util::config::Config;

/// Build setting naming the host target of a test bundle.
pub const TEST_TARGET_NAME: &str = "TEST_TARGET_NAME";

/// Target attribute pointing a test bundle at its host target.
pub const TEST_TARGET_ID: &str = "TestTargetID";

/// Knobs that shape generation but not its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Upper bound on targets generated concurrently
    pub max_concurrency: usize,

    /// Generate targets on a worker pool
    pub parallel_targets: bool,

    /// Development region for projects that declare none
    pub default_development_region: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            max_concurrency: rayon::current_num_threads(),
            parallel_targets: true,
            default_development_region: "en".to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        GeneratorOptions {
            max_concurrency: config.generation.max_concurrency.unwrap_or(defaults.max_concurrency),
            parallel_targets: config.generation.parallel_targets.unwrap_or(defaults.parallel_targets),
            default_development_region: config
                .generation
                .default_development_region
                .clone()
                .unwrap_or(defaults.default_development_region),
        }
    }
}

/// The format profile projects are written with.
///
/// TODO: derive the profile from the installed toolchain version instead of
/// always using the most recent one.
pub fn determine_format_profile() -> FormatProfile {
    FormatProfile::RECENT
}

/// Orchestrates the collaborators that generate a project descriptor.
pub struct ProjectDescriptorGenerator {
    target_generator: Box<dyn TargetGenerating>,
    config_generator: Box<dyn ConfigGenerating>,
    scheme_generator: Box<dyn SchemeDescriptorsGenerating>,
    asset_tags_fetcher: Box<dyn KnownAssetTagsFetching>,
    options: GeneratorOptions,
}

impl Default for ProjectDescriptorGenerator {
    fn default() -> Self {
        ProjectDescriptorGenerator {
            target_generator: Box::new(TargetGenerator::new()),
            config_generator: Box::new(ConfigGenerator),
            scheme_generator: Box::new(SchemeDescriptorsGenerator),
            asset_tags_fetcher: Box::new(KnownAssetTagsFetcher),
            options: GeneratorOptions::default(),
        }
    }
}

impl ProjectDescriptorGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        ProjectDescriptorGenerator {
            options,
            ..Self::default()
        }
    }

    pub fn with_target_generator(mut self, generator: impl TargetGenerating + 'static) -> Self {
        self.target_generator = Box::new(generator);
        self
    }

    pub fn with_config_generator(mut self, generator: impl ConfigGenerating + 'static) -> Self {
        self.config_generator = Box::new(generator);
        self
    }

    pub fn with_scheme_generator(
        mut self,
        generator: impl SchemeDescriptorsGenerating + 'static,
    ) -> Self {
        self.scheme_generator = Box::new(generator);
        self
    }

    pub fn with_asset_tags_fetcher(mut self, fetcher: impl KnownAssetTagsFetching + 'static) -> Self {
        self.asset_tags_fetcher = Box::new(fetcher);
        self
    }

    /// Generate the descriptor of one project.
    ///
    /// Fails only when a collaborator fails; the collaborator's error is
    /// returned as is.
    pub fn generate(&self, project: &Project, graph: &dyn GraphTraverser) -> Result<ProjectDescriptor> {
        let span = tracing::debug_span!("generate_project", project = %project.name);
        let _enter = span.enter();

        let profile = determine_format_profile();

        let workspace_data = WorkspaceData::self_referencing();
        let mut file = ProjectFile::new(profile, scope_for(&project.xcodeproj_path));
        let mut elements = ProjectFileElements::new(ProjectGroups::generate(&file));

        elements.generate_project_files(project, &file);

        let configuration_list = self
            .config_generator
            .generate_project_config(project, &file, &elements)?;

        let root = self.generate_root_object(project, &file, &elements, configuration_list, profile);
        file.root_object = Some(root);

        let native_targets = self.generate_targets(project, &file, &elements, graph)?;
        let target_ids: Vec<ObjectId> = native_targets.values().cloned().collect();
        file.update_root_project(|root| root.targets = target_ids);
        self.target_generator
            .generate_target_dependencies(project, &native_targets, &file, graph)?;

        stitch_test_target_identities(project, &native_targets, &file);

        generate_package_references(project, &file, &elements);

        let generated = GeneratedProject {
            name: project.xcodeproj_name(),
            path: project.xcodeproj_path.clone(),
            project_file: file,
            targets: native_targets,
        };
        let scheme_descriptors = self
            .scheme_generator
            .generate_project_schemes(project, &generated, graph)?;

        let removed = elements.finalize_groups(&generated.project_file);
        if removed.contains(&elements.groups().products) {
            generated
                .project_file
                .update_root_project(|root| root.products_group = None);
        }

        tracing::debug!(
            "generated {} objects for `{}`",
            generated.project_file.objects.len(),
            project.name
        );

        Ok(ProjectDescriptor {
            path: project.path.clone(),
            xcodeproj_path: project.xcodeproj_path.clone(),
            xcodeproj: XcodeProjDescriptor {
                workspace_data,
                project_file: generated.project_file,
            },
            scheme_descriptors,
            side_effect_descriptors: Vec::new(),
        })
    }

    fn generate_root_object(
        &self,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
        configuration_list: ObjectId,
        profile: FormatProfile,
    ) -> ObjectId {
        let mut known_regions: BTreeSet<String> = project.known_regions().into_iter().collect();
        known_regions.extend(elements.known_regions().iter().cloned());

        let development_region = project
            .development_region
            .clone()
            .unwrap_or_else(|| self.options.default_development_region.clone());

        let attributes = ProjectAttributeBuilder::new(self.asset_tags_fetcher.as_ref()).build(project);

        let root = ProjectObject {
            name: project.name.clone(),
            build_configuration_list: configuration_list,
            compatibility_version: profile.compatibility_version.to_string(),
            development_region,
            has_scanned_for_encodings: false,
            known_regions: known_regions.into_iter().collect(),
            main_group: elements.groups().main.clone(),
            products_group: Some(elements.groups().products.clone()),
            project_dir_path: String::new(),
            targets: Vec::new(),
            attributes,
            target_attributes: BTreeMap::new(),
            package_references: Vec::new(),
            local_package_references: Vec::new(),
        };
        file.objects.add(keys::ROOT_PROJECT, Object::Project(root))
    }

    /// Generate native targets in name order.
    ///
    /// Targets may be generated concurrently; results are collected in the
    /// sorted input order, never in completion order.
    fn generate_targets(
        &self,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
        graph: &dyn GraphTraverser,
    ) -> Result<BTreeMap<String, ObjectId>> {
        let targets = project.sorted_targets();
        let generate = |target: &&Target| -> Result<(String, ObjectId)> {
            let id = self
                .target_generator
                .generate_target(target, project, file, elements, graph)?;
            Ok((target.name.clone(), id))
        };

        let generated: Vec<(String, ObjectId)> =
            if self.options.parallel_targets && targets.len() > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.options.max_concurrency.max(1))
                    .build()
                    .context("failed to start target generation workers")?;
                pool.install(|| targets.par_iter().map(generate).collect::<Result<Vec<_>>>())?
            } else {
                targets.iter().map(generate).collect::<Result<Vec<_>>>()?
            };

        Ok(generated.into_iter().collect())
    }
}

/// Point each test bundle at the host target named by its
/// `TEST_TARGET_NAME` setting. Bundles without the setting, or naming a
/// target that does not exist, are left alone.
fn stitch_test_target_identities(
    project: &Project,
    native_targets: &BTreeMap<String, ObjectId>,
    file: &ProjectFile,
) {
    for target in project.sorted_targets() {
        if !target.product.is_test_bundle() {
            continue;
        }
        let Some(test_id) = native_targets.get(&target.name) else {
            continue;
        };
        let Some(host_name) = test_target_name(file, test_id) else {
            continue;
        };
        let Some(host_id) = native_targets.get(&host_name) else {
            tracing::debug!(
                "`{}` names missing host target `{}`",
                target.name,
                host_name
            );
            continue;
        };

        let attributes = Attributes::from([(
            TEST_TARGET_ID.to_string(),
            AttributeValue::Reference(host_id.clone()),
        )]);
        file.update_root_project(|root| root.set_target_attributes(test_id, attributes));
    }
}

/// First `TEST_TARGET_NAME` defined across a native target's configurations.
fn test_target_name(file: &ProjectFile, native_id: &ObjectId) -> Option<String> {
    let native = file.objects.get(native_id)?;
    let list = file
        .objects
        .get(&native.as_native_target()?.build_configuration_list)?;

    list.as_configuration_list()?
        .build_configurations
        .iter()
        .find_map(|id| {
            let object = file.objects.get(id)?;
            let value = object.as_build_configuration()?.build_settings.get(TEST_TARGET_NAME)?;
            value.as_str().map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::core::package::{Package, Requirement};
    use crate::core::settings::{Settings, SettingsDictionary};
    use crate::core::target::{Product, ResourceFile};
    use crate::test_support::{
        FailingConfigGenerator, FixtureGraph, RecordingTargetGenerator, StaticAssetTagsFetcher,
    };

    fn test_settings(host: &str) -> Settings {
        let mut base = SettingsDictionary::new();
        base.insert(TEST_TARGET_NAME.to_string(), host.into());
        Settings::with_base(base)
    }

    fn app_project() -> Project {
        Project::new("App", "/ws/App")
            .with_targets([
                Target::new("AppTests", Product::UnitTests)
                    .with_sources(["Tests/AppTests.swift"])
                    .with_settings(test_settings("App")),
                Target::new("App", Product::App).with_sources(["Sources/App.swift"]),
            ])
            .with_packages([Package::local("../Shared")])
    }

    fn generate(project: &Project) -> ProjectDescriptor {
        let graph = FixtureGraph::new("WS", "/ws").with_project(project.clone());
        ProjectDescriptorGenerator::default()
            .generate(project, &graph)
            .unwrap()
    }

    fn root(descriptor: &ProjectDescriptor) -> ProjectObject {
        descriptor.xcodeproj.project_file.root_project().unwrap()
    }

    #[test]
    fn test_end_to_end_app_with_tests_and_local_package() {
        let project = app_project();
        let descriptor = generate(&project);
        let file = &descriptor.xcodeproj.project_file;
        let root = root(&descriptor);

        assert_eq!(root.targets.len(), 2);
        let app_id = file.objects.id_for(&keys::native_target("App"));
        let tests_id = file.objects.id_for(&keys::native_target("AppTests"));
        assert_eq!(root.targets, vec![app_id.clone(), tests_id.clone()]);

        let stitched = &root.target_attributes[&tests_id][TEST_TARGET_ID];
        assert_eq!(stitched.as_reference(), Some(&app_id));
        assert!(file.objects.get(&app_id).unwrap().as_native_target().is_some());

        assert_eq!(root.local_package_references.len(), 1);
        let local = file.objects.get(&root.local_package_references[0]).unwrap();
        assert_eq!(
            local,
            Object::LocalPackageReference(crate::project_file::LocalPackageReference {
                relative_path: "../Shared".into()
            })
        );
        let packages_groups = file.objects.ids_where(|o| {
            o.as_group().is_some_and(|g| g.name.as_deref() == Some("Packages"))
        });
        assert_eq!(packages_groups.len(), 1);

        assert_eq!(root.attributes["BuildIndependentTargetsInParallel"], "YES".into());
        assert!(descriptor.side_effect_descriptors.is_empty());
        assert_eq!(descriptor.xcodeproj_path, Path::new("/ws/App/App.xcodeproj"));
    }

    #[test]
    fn test_source_directory_named_main_keeps_main_group() {
        let project = Project::new("App", "/ws/App")
            .with_targets([Target::new("App", Product::App).with_sources(["main/App.swift"])]);
        let descriptor = generate(&project);
        let file = &descriptor.xcodeproj.project_file;
        let root = root(&descriptor);

        let main = file.objects.get(&root.main_group).unwrap();
        let main = main.as_group().unwrap();
        assert_eq!(main.path, None);
        assert!(!main.children.contains(&root.main_group));

        let dir = file.objects.id_for(&keys::group(Path::new("main")));
        assert_ne!(dir, root.main_group);
        assert!(main.children.contains(&dir));
        assert_eq!(file.objects.get(&dir).unwrap().as_group().unwrap().path.as_deref(), Some("main"));
    }

    #[test]
    fn test_source_directory_named_packages_keeps_packages_group() {
        let project = Project::new("App", "/ws/App")
            .with_targets([Target::new("App", Product::App).with_sources(["packages/Feature.swift"])])
            .with_packages([Package::local("../Shared")]);
        let descriptor = generate(&project);
        let file = &descriptor.xcodeproj.project_file;
        let root = root(&descriptor);

        let packages_groups = file.objects.ids_where(|o| {
            o.as_group().is_some_and(|g| g.name.as_deref() == Some("Packages"))
        });
        assert_eq!(packages_groups.len(), 1);

        let folder = file.objects.id_for(&keys::local_package_folder("../Shared"));
        let packages = file.objects.get(&packages_groups[0]).unwrap();
        assert_eq!(packages.as_group().unwrap().children, vec![folder.clone()]);

        let dir = file.objects.id_for(&keys::group(Path::new("packages")));
        let dir = file.objects.get(&dir).unwrap();
        assert!(!dir.as_group().unwrap().children.contains(&folder));

        let main = file.objects.get(&root.main_group).unwrap();
        assert!(main.as_group().unwrap().children.contains(&packages_groups[0]));
    }

    #[test]
    fn test_stitching_skips_missing_host() {
        let project = Project::new("App", "/ws/App").with_targets([
            Target::new("UITests", Product::UiTests).with_settings(test_settings("Ghost")),
            Target::new("Plain", Product::UnitTests),
        ]);
        let descriptor = generate(&project);
        assert!(root(&descriptor).target_attributes.is_empty());
    }

    #[test]
    fn test_ui_test_bundle_is_stitched() {
        let project = Project::new("App", "/ws/App").with_targets([
            Target::new("App", Product::App),
            Target::new("AppUITests", Product::UiTests).with_settings(test_settings("App")),
        ]);
        let descriptor = generate(&project);
        let file = &descriptor.xcodeproj.project_file;
        let tests_id = file.objects.id_for(&keys::native_target("AppUITests"));
        let app_id = file.objects.id_for(&keys::native_target("App"));
        assert_eq!(
            root(&descriptor).target_attributes[&tests_id][TEST_TARGET_ID],
            AttributeValue::Reference(app_id)
        );
    }

    #[test]
    fn test_output_is_independent_of_declaration_order() {
        let project = app_project().with_packages([
            Package::remote("https://github.com/b/beta", Requirement::Exact("2.0.0".into())),
            Package::local("../Kit"),
            Package::remote("https://github.com/a/alpha", Requirement::Exact("1.0.0".into())),
        ]);
        let mut reordered = project.clone();
        reordered.targets.reverse();
        reordered.packages.reverse();

        let first = generate(&project);
        let second = generate(&reordered);

        assert_eq!(
            first.xcodeproj.project_file.objects.snapshot(),
            second.xcodeproj.project_file.objects.snapshot()
        );
        assert_eq!(
            serde_json::to_string(&first.xcodeproj).unwrap(),
            serde_json::to_string(&second.xcodeproj).unwrap()
        );
    }

    #[test]
    fn test_targets_generated_in_name_order_when_sequential() {
        let recorder = RecordingTargetGenerator::default();
        let generator = ProjectDescriptorGenerator::new(GeneratorOptions {
            parallel_targets: false,
            ..GeneratorOptions::default()
        })
        .with_target_generator(recorder.clone());

        let project = Project::new("App", "/ws/App").with_targets([
            Target::new("Charlie", Product::Framework),
            Target::new("Alpha", Product::App),
            Target::new("Bravo", Product::StaticLibrary),
        ]);
        let graph = FixtureGraph::new("WS", "/ws").with_project(project.clone());
        generator.generate(&project, &graph).unwrap();

        assert_eq!(recorder.generated(), vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn test_parallel_generation_matches_sequential() {
        let targets: Vec<Target> = (0..16)
            .map(|i| Target::new(format!("Target{:02}", i), Product::Framework))
            .collect();
        let project = Project::new("App", "/ws/App").with_targets(targets);
        let graph = FixtureGraph::new("WS", "/ws").with_project(project.clone());

        let parallel = ProjectDescriptorGenerator::new(GeneratorOptions {
            max_concurrency: 4,
            ..GeneratorOptions::default()
        })
        .generate(&project, &graph)
        .unwrap();
        let sequential = ProjectDescriptorGenerator::new(GeneratorOptions {
            parallel_targets: false,
            ..GeneratorOptions::default()
        })
        .generate(&project, &graph)
        .unwrap();

        assert_eq!(
            parallel.xcodeproj.project_file.objects.snapshot(),
            sequential.xcodeproj.project_file.objects.snapshot()
        );
    }

    #[test]
    fn test_known_regions_default_and_union() {
        let project = Project::new("App", "/ws/App").with_targets([Target::new("App", Product::App)
            .with_resources([
                ResourceFile::new("Resources/en.lproj/Localizable.strings"),
                ResourceFile::new("Resources/Base.lproj/Main.storyboard"),
            ])]);
        assert_eq!(root(&generate(&project)).known_regions, vec!["Base", "en"]);

        let mut localized = project.clone();
        localized.targets[0]
            .resources
            .push(ResourceFile::new("Resources/fr.lproj/Localizable.strings"));
        assert_eq!(root(&generate(&localized)).known_regions, vec!["Base", "en", "fr"]);

        let empty = Project::new("Empty", "/ws/Empty");
        assert_eq!(root(&generate(&empty)).known_regions, vec!["Base", "en"]);
    }

    #[test]
    fn test_project_metadata_and_empty_project() {
        let mut project = Project::new("Empty", "/ws/Empty");
        project.development_region = Some("fr".into());
        project.class_prefix = Some("ACM".into());

        let descriptor = generate(&project);
        let root = root(&descriptor);
        assert_eq!(root.development_region, "fr");
        assert_eq!(root.attributes["CLASSPREFIX"], "ACM".into());
        assert!(root.targets.is_empty());
        assert!(root.package_references.is_empty());
        // Products and Frameworks are empty and pruned
        assert_eq!(root.products_group, None);
        assert!(descriptor.scheme_descriptors.is_empty());
        assert_eq!(descriptor.xcodeproj.project_file.object_version, 77);
    }

    #[test]
    fn test_asset_tags_from_injected_fetcher() {
        let generator =
            ProjectDescriptorGenerator::default().with_asset_tags_fetcher(StaticAssetTagsFetcher::new(["odr"]));
        let project = Project::new("App", "/ws/App");
        let graph = FixtureGraph::new("WS", "/ws").with_project(project.clone());
        let descriptor = generator.generate(&project, &graph).unwrap();
        assert_eq!(
            root(&descriptor).attributes["KnownAssetTags"],
            AttributeValue::Array(vec!["odr".into()])
        );
    }

    #[test]
    fn test_collaborator_failure_propagates_unchanged() {
        let generator = ProjectDescriptorGenerator::default().with_config_generator(FailingConfigGenerator);
        let project = app_project();
        let graph = FixtureGraph::new("WS", "/ws").with_project(project.clone());

        let err = generator.generate(&project, &graph).unwrap_err();
        assert_eq!(err.to_string(), FailingConfigGenerator::MESSAGE);
    }
}
