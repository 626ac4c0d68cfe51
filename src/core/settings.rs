//! Build settings and configurations.
//!
//! Settings are layered: a base dictionary shared by every configuration,
//! plus an optional bundle per named configuration. Configurations are keyed
//! by `(name, variant)` so "Debug" and a custom "Beta" debug variant can
//! coexist.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Array(Vec<String>),
}

impl SettingValue {
    /// Get the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            SettingValue::Array(_) => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::Array(value)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::Array(values) => write!(f, "{}", values.join(" ")),
        }
    }
}

/// Ordered build settings dictionary.
pub type SettingsDictionary = BTreeMap<String, SettingValue>;

/// Merge `other` into `base`; keys in `other` win.
pub fn merge_settings(base: &mut SettingsDictionary, other: &SettingsDictionary) {
    for (key, value) in other {
        base.insert(key.clone(), value.clone());
    }
}

/// The variant of a build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Debug,
    Release,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Debug => write!(f, "debug"),
            Variant::Release => write!(f, "release"),
        }
    }
}

/// Identity of a build configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub name: String,
    pub variant: Variant,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>, variant: Variant) -> Self {
        BuildConfiguration {
            name: name.into(),
            variant,
        }
    }

    /// The stock "Debug" configuration.
    pub fn debug() -> Self {
        Self::new("Debug", Variant::Debug)
    }

    /// The stock "Release" configuration.
    pub fn release() -> Self {
        Self::new("Release", Variant::Release)
    }
}

/// Settings attached to one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub settings: SettingsDictionary,

    /// Base configuration file, relative to the project directory
    #[serde(default)]
    pub xcconfig: Option<PathBuf>,
}

impl Configuration {
    pub fn with_settings(settings: SettingsDictionary) -> Self {
        Configuration {
            settings,
            xcconfig: None,
        }
    }
}

/// A layered settings set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Settings shared by every configuration
    pub base: SettingsDictionary,

    /// Per-configuration bundles
    pub configurations: BTreeMap<BuildConfiguration, Option<Configuration>>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut configurations = BTreeMap::new();
        configurations.insert(BuildConfiguration::debug(), None);
        configurations.insert(BuildConfiguration::release(), None);
        Settings {
            base: SettingsDictionary::new(),
            configurations,
        }
    }
}

impl Settings {
    /// Settings with a base dictionary and no configurations.
    pub fn with_base(base: SettingsDictionary) -> Self {
        Settings {
            base,
            configurations: BTreeMap::new(),
        }
    }

    /// Add or replace a configuration.
    pub fn with_configuration(
        mut self,
        configuration: BuildConfiguration,
        settings: Option<Configuration>,
    ) -> Self {
        self.configurations.insert(configuration, settings);
        self
    }

    /// Find a configuration by name.
    pub fn configuration(&self, name: &str) -> Option<(&BuildConfiguration, Option<&Configuration>)> {
        self.configurations
            .iter()
            .find(|(key, _)| key.name == name)
            .map(|(key, value)| (key, value.as_ref()))
    }

    /// The configuration used when none is requested: the first debug one,
    /// falling back to the first configuration of any variant.
    pub fn default_configuration(&self) -> Option<&BuildConfiguration> {
        self.configurations
            .keys()
            .find(|key| key.variant == Variant::Debug)
            .or_else(|| self.configurations.keys().next())
    }

    /// Every base configuration file referenced by these settings.
    pub fn xcconfig_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.configurations
            .values()
            .filter_map(|config| config.as_ref().and_then(|c| c.xcconfig.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_have_debug_and_release() {
        let settings = Settings::default();
        let names: Vec<_> = settings.configurations.keys().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Debug", "Release"]);
        assert_eq!(settings.default_configuration(), Some(&BuildConfiguration::debug()));
    }

    #[test]
    fn test_configuration_lookup_by_name() {
        let settings = Settings::with_base(SettingsDictionary::new()).with_configuration(
            BuildConfiguration::new("Beta", Variant::Release),
            Some(Configuration::default()),
        );

        assert!(settings.configuration("Beta").is_some());
        assert!(settings.configuration("Debug").is_none());
        // Only a release variant is present
        assert_eq!(settings.default_configuration().unwrap().name, "Beta");
    }

    #[test]
    fn test_merge_settings_later_wins() {
        let mut base = SettingsDictionary::new();
        base.insert("SWIFT_VERSION".into(), "5.0".into());
        base.insert("ENABLE_BITCODE".into(), "NO".into());

        let mut other = SettingsDictionary::new();
        other.insert("SWIFT_VERSION".into(), "6.0".into());

        merge_settings(&mut base, &other);
        assert_eq!(base["SWIFT_VERSION"].as_str(), Some("6.0"));
        assert_eq!(base["ENABLE_BITCODE"].as_str(), Some("NO"));
    }
}
