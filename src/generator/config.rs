//! Build configuration list generation.
//!
//! Settings are merged with a fixed precedence, later sources winning:
//! variant defaults, then the settings base, then the configuration's own
//! bundle.

use std::collections::BTreeSet;

use anyhow::{bail, Result};

use crate::core::project::Project;
use crate::core::settings::{
    merge_settings, BuildConfiguration, Configuration, SettingsDictionary, Variant,
};
use crate::core::target::Target;
use crate::generator::file_elements::ProjectFileElements;
use crate::project_file::{
    keys, BuildConfigurationObject, ConfigurationList, Object, ObjectId, ProjectFile,
};

/// Produces configuration list objects for projects and targets.
pub trait ConfigGenerating: Sync {
    /// Generate the project-level configuration list.
    fn generate_project_config(
        &self,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
    ) -> Result<ObjectId>;

    /// Generate a target's configuration list.
    fn generate_target_config(
        &self,
        target: &Target,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
    ) -> Result<ObjectId>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigGenerator;

impl ConfigGenerating for ConfigGenerator {
    fn generate_project_config(
        &self,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
    ) -> Result<ObjectId> {
        let mut configurations = Vec::new();

        for (key, configuration) in &project.settings.configurations {
            let mut settings = variant_defaults(key.variant);
            merge_settings(&mut settings, &project.settings.base);
            if let Some(configuration) = configuration {
                merge_settings(&mut settings, &configuration.settings);
            }
            validate_settings(&settings, &key.name)?;

            let id = file.objects.add(
                &keys::project_configuration(&key.name, key.variant),
                Object::BuildConfiguration(BuildConfigurationObject {
                    name: key.name.clone(),
                    build_settings: settings,
                    base_configuration_reference: base_reference(
                        configuration.as_ref(),
                        project,
                        elements,
                    ),
                }),
            );
            configurations.push(id);
        }

        let list = ConfigurationList {
            build_configurations: configurations,
            default_configuration_name: project
                .settings
                .default_configuration()
                .map(|c| c.name.clone()),
        };
        Ok(file
            .objects
            .add(keys::PROJECT_CONFIGURATION_LIST, Object::ConfigurationList(list)))
    }

    fn generate_target_config(
        &self,
        target: &Target,
        project: &Project,
        file: &ProjectFile,
        elements: &ProjectFileElements,
    ) -> Result<ObjectId> {
        let overrides = target
            .settings
            .as_ref()
            .filter(|settings| !settings.configurations.is_empty());

        let mut names: BTreeSet<&BuildConfiguration> = project.settings.configurations.keys().collect();
        if let Some(overrides) = overrides {
            names.extend(overrides.configurations.keys());
        }

        let mut configurations = Vec::new();
        for key in names {
            let mut settings = target_defaults(target);
            if let Some(target_settings) = &target.settings {
                merge_settings(&mut settings, &target_settings.base);
            }
            let configuration = overrides.and_then(|o| o.configurations.get(key)).and_then(Option::as_ref);
            if let Some(configuration) = configuration {
                merge_settings(&mut settings, &configuration.settings);
            }
            validate_settings(&settings, &key.name)?;

            let id = file.objects.add(
                &keys::target_configuration(&target.name, &key.name, key.variant),
                Object::BuildConfiguration(BuildConfigurationObject {
                    name: key.name.clone(),
                    build_settings: settings,
                    base_configuration_reference: base_reference(configuration, project, elements),
                }),
            );
            configurations.push(id);
        }

        let list = ConfigurationList {
            build_configurations: configurations,
            default_configuration_name: project
                .settings
                .default_configuration()
                .map(|c| c.name.clone()),
        };
        Ok(file.objects.add(
            &keys::target_configuration_list(&target.name),
            Object::ConfigurationList(list),
        ))
    }
}

fn base_reference(
    configuration: Option<&Configuration>,
    project: &Project,
    elements: &ProjectFileElements,
) -> Option<ObjectId> {
    let path = configuration?.xcconfig.as_ref()?;
    elements.file_reference(path, &project.source_root).cloned()
}

fn variant_defaults(variant: Variant) -> SettingsDictionary {
    let pairs: &[(&str, &str)] = match variant {
        Variant::Debug => &[
            ("DEBUG_INFORMATION_FORMAT", "dwarf"),
            ("ONLY_ACTIVE_ARCH", "YES"),
            ("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG"),
            ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
            ("GCC_OPTIMIZATION_LEVEL", "0"),
        ],
        Variant::Release => &[
            ("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym"),
            ("SWIFT_COMPILATION_MODE", "wholemodule"),
            ("SWIFT_OPTIMIZATION_LEVEL", "-O"),
            ("VALIDATE_PRODUCT", "YES"),
        ],
    };
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), (*v).into()))
        .collect()
}

fn target_defaults(target: &Target) -> SettingsDictionary {
    let mut settings = SettingsDictionary::new();
    settings.insert("PRODUCT_NAME".to_string(), target.product_name().into());
    if let Some(bundle_id) = &target.bundle_id {
        settings.insert("PRODUCT_BUNDLE_IDENTIFIER".to_string(), bundle_id.as_str().into());
    }
    settings
}

fn validate_settings(settings: &SettingsDictionary, configuration: &str) -> Result<()> {
    for key in settings.keys() {
        if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '=') {
            bail!(
                "invalid build setting key `{}` in configuration `{}`",
                key,
                configuration
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Settings;
    use crate::core::target::Product;
    use crate::generator::file_elements::ProjectGroups;
    use crate::project_file::FormatProfile;

    fn settings(pairs: &[(&str, &str)]) -> SettingsDictionary {
        pairs.iter().map(|(k, v)| (k.to_string(), (*v).into())).collect()
    }

    fn generate(project: &Project) -> (ProjectFile, ProjectFileElements) {
        let file = ProjectFile::new(FormatProfile::RECENT, "scope");
        let mut elements = ProjectFileElements::new(ProjectGroups::generate(&file));
        elements.generate_project_files(project, &file);
        (file, elements)
    }

    fn build_settings(file: &ProjectFile, list: &ObjectId) -> Vec<(String, SettingsDictionary)> {
        let snapshot = file.objects.snapshot();
        snapshot[list]
            .as_configuration_list()
            .unwrap()
            .build_configurations
            .iter()
            .map(|id| {
                let config = snapshot[id].as_build_configuration().unwrap();
                (config.name.clone(), config.build_settings.clone())
            })
            .collect()
    }

    #[test]
    fn test_project_config_precedence() {
        let mut project = Project::new("App", "/ws/App");
        project.settings = Settings::with_base(settings(&[("SWIFT_OPTIMIZATION_LEVEL", "-Osize")]))
            .with_configuration(BuildConfiguration::debug(), None)
            .with_configuration(
                BuildConfiguration::release(),
                Some(Configuration::with_settings(settings(&[("SWIFT_OPTIMIZATION_LEVEL", "-O")]))),
            );
        let (file, elements) = generate(&project);

        let list = ConfigGenerator
            .generate_project_config(&project, &file, &elements)
            .unwrap();
        let configs = build_settings(&file, &list);

        assert_eq!(configs[0].0, "Debug");
        assert_eq!(configs[0].1["SWIFT_OPTIMIZATION_LEVEL"].as_str(), Some("-Osize"));
        assert_eq!(configs[0].1["ONLY_ACTIVE_ARCH"].as_str(), Some("YES"));
        assert_eq!(configs[1].0, "Release");
        assert_eq!(configs[1].1["SWIFT_OPTIMIZATION_LEVEL"].as_str(), Some("-O"));
    }

    #[test]
    fn test_xcconfig_becomes_base_reference() {
        let mut project = Project::new("App", "/ws/App");
        project.settings = Settings::with_base(SettingsDictionary::new()).with_configuration(
            BuildConfiguration::debug(),
            Some(Configuration {
                settings: SettingsDictionary::new(),
                xcconfig: Some("Configs/Debug.xcconfig".into()),
            }),
        );
        let (file, elements) = generate(&project);

        let list = ConfigGenerator
            .generate_project_config(&project, &file, &elements)
            .unwrap();
        let snapshot = file.objects.snapshot();
        let config_id = &snapshot[&list].as_configuration_list().unwrap().build_configurations[0];
        let config = snapshot[config_id].as_build_configuration().unwrap();
        assert!(config.base_configuration_reference.is_some());
    }

    #[test]
    fn test_target_config_falls_back_to_project_configurations() {
        let project = Project::new("App", "/ws/App");
        let target = Target::new("AppTests", Product::UnitTests).with_settings(
            Settings::with_base(settings(&[("TEST_TARGET_NAME", "App")])),
        );
        let (file, elements) = generate(&project);

        let list = ConfigGenerator
            .generate_target_config(&target, &project, &file, &elements)
            .unwrap();
        let configs = build_settings(&file, &list);

        let names: Vec<_> = configs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Debug", "Release"]);
        for (_, settings) in &configs {
            assert_eq!(settings["TEST_TARGET_NAME"].as_str(), Some("App"));
            assert_eq!(settings["PRODUCT_NAME"].as_str(), Some("AppTests"));
        }
    }

    #[test]
    fn test_same_name_different_variants_are_distinct() {
        let mut project = Project::new("App", "/ws/App");
        project.settings = Settings::with_base(SettingsDictionary::new())
            .with_configuration(
                BuildConfiguration::new("Staging", Variant::Debug),
                Some(Configuration::with_settings(settings(&[("MARK", "debug")]))),
            )
            .with_configuration(
                BuildConfiguration::new("Staging", Variant::Release),
                Some(Configuration::with_settings(settings(&[("MARK", "release")]))),
            );
        let (file, elements) = generate(&project);

        let list = ConfigGenerator
            .generate_project_config(&project, &file, &elements)
            .unwrap();
        let snapshot = file.objects.snapshot();
        let ids = &snapshot[&list].as_configuration_list().unwrap().build_configurations;
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let marks: Vec<_> = build_settings(&file, &list)
            .into_iter()
            .map(|(_, settings)| settings["MARK"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(marks, vec!["debug", "release"]);

        let target = Target::new("App", Product::App);
        let list = ConfigGenerator
            .generate_target_config(&target, &project, &file, &elements)
            .unwrap();
        let list = file.objects.get(&list).unwrap();
        let ids = &list.as_configuration_list().unwrap().build_configurations;
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_invalid_setting_key_fails() {
        let mut project = Project::new("App", "/ws/App");
        project.settings = Settings::with_base(settings(&[("BAD KEY", "1")]))
            .with_configuration(BuildConfiguration::debug(), None);
        let (file, elements) = generate(&project);

        let err = ConfigGenerator
            .generate_project_config(&project, &file, &elements)
            .unwrap_err();
        assert!(err.to_string().contains("BAD KEY"));
    }
}
