//! Wharf.toml manifest parsing and validation.
//!
//! A workspace root holds a manifest with a `[workspace]` section listing
//! project directories. Every project directory holds a manifest with a
//! `[project]` section. A lone project manifest is a workspace of one.
//!
//! Paths in a manifest are relative to the directory containing it.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::package::{Package, Requirement};
use crate::core::project::Project;
use crate::core::scheme::{RunAction, Scheme, TargetReference, TestAction, TestPlan, TestableTarget};
use crate::core::settings::{BuildConfiguration, Configuration, Settings, SettingsDictionary, Variant};
use crate::core::target::{
    OnDemandResourcesTags, Product, ResourceFile, SourceFile, Target, TargetDependency,
};
use crate::util::errors::ManifestError;

/// File name of workspace and project manifests.
pub const MANIFEST_NAME: &str = "Wharf.toml";

/// The `[workspace]` section, with paths made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceManifest {
    pub name: String,

    /// Directories of the listed projects
    pub projects: Vec<PathBuf>,

    pub schemes: Vec<Scheme>,
}

/// A parsed Wharf.toml.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub workspace: Option<WorkspaceManifest>,

    pub project: Option<Project>,

    /// Directory containing the manifest
    pub manifest_dir: PathBuf,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    workspace: Option<RawWorkspace>,

    #[serde(default)]
    project: Option<RawProject>,

    #[serde(default)]
    settings: Option<RawSettings>,

    #[serde(default)]
    packages: Vec<RawPackage>,

    #[serde(default)]
    targets: Vec<RawTarget>,

    #[serde(default)]
    schemes: Vec<RawScheme>,
}

#[derive(Debug, Deserialize)]
struct RawWorkspace {
    name: String,

    #[serde(default)]
    projects: Vec<PathBuf>,

    #[serde(default)]
    schemes: Vec<RawScheme>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,

    #[serde(default)]
    organization: Option<String>,

    #[serde(default)]
    class_prefix: Option<String>,

    #[serde(default)]
    development_region: Option<String>,

    #[serde(default)]
    known_regions: Vec<String>,

    #[serde(default)]
    last_upgrade_check: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    base: SettingsDictionary,

    /// Absent means the stock Debug and Release configurations for
    /// projects, and no override for targets
    #[serde(default)]
    configurations: Option<Vec<RawConfiguration>>,
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    name: String,

    #[serde(default)]
    variant: Option<String>,

    #[serde(default)]
    settings: SettingsDictionary,

    #[serde(default)]
    xcconfig: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(default)]
    path: Option<PathBuf>,

    #[serde(default)]
    url: Option<String>,

    #[serde(default)]
    requirement: Option<Requirement>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    name: String,

    product: Product,

    #[serde(default)]
    product_name: Option<String>,

    #[serde(default)]
    bundle_id: Option<String>,

    #[serde(default)]
    sources: Vec<RawSource>,

    #[serde(default)]
    resources: Vec<RawResource>,

    #[serde(default)]
    settings: Option<RawSettings>,

    #[serde(default)]
    dependencies: Vec<TargetDependency>,

    #[serde(default)]
    on_demand_resources: Option<OnDemandResourcesTags>,
}

/// Source glob, optionally with per-file compiler flags.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSource {
    Glob(String),
    Detailed {
        glob: String,
        #[serde(default)]
        compiler_flags: Option<String>,
    },
}

/// Resource glob, optionally tagged for on-demand loading.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResource {
    Glob(String),
    Detailed {
        glob: String,
        #[serde(default)]
        tags: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawScheme {
    name: String,

    #[serde(default = "default_true")]
    shared: bool,

    /// Target references: `Name` or `project/dir:Name`
    #[serde(default)]
    build: Vec<String>,

    #[serde(default)]
    test: Vec<RawTestable>,

    #[serde(default)]
    test_plans: Vec<RawTestPlan>,

    #[serde(default)]
    test_configuration: Option<String>,

    #[serde(default)]
    run: Option<String>,

    #[serde(default)]
    run_configuration: Option<String>,

    #[serde(default)]
    run_arguments: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTestable {
    Reference(String),
    Detailed {
        target: String,
        #[serde(default)]
        skipped: bool,
        #[serde(default)]
        parallelizable: bool,
    },
}

#[derive(Debug, Deserialize)]
struct RawTestPlan {
    name: String,

    path: PathBuf,

    #[serde(default)]
    default: bool,

    #[serde(default)]
    targets: Vec<RawTestable>,
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        if raw.workspace.is_none() && raw.project.is_none() {
            bail!(
                "manifest at {} must have either [workspace] or [project] section",
                path.display()
            );
        }

        let workspace = raw.workspace.map(|ws| WorkspaceManifest {
            name: ws.name,
            projects: ws
                .projects
                .iter()
                .map(|p| normalize(&manifest_dir.join(p)))
                .collect(),
            schemes: ws
                .schemes
                .into_iter()
                .map(|s| convert_scheme(s, &manifest_dir))
                .collect(),
        });

        let project = match raw.project {
            Some(metadata) => {
                let mut project = Project::new(metadata.name, &manifest_dir);
                project.organization_name = metadata.organization;
                project.class_prefix = metadata.class_prefix;
                project.development_region = metadata.development_region;
                project.default_known_regions = metadata.known_regions;
                project.last_upgrade_check = metadata.last_upgrade_check;

                if let Some(settings) = raw.settings {
                    project.settings = convert_settings(settings, true)?;
                }

                for package in raw.packages {
                    let package = convert_package(package, &project.name, &manifest_dir)?;
                    project.packages.push(package);
                }

                let mut seen = BTreeSet::new();
                for target in raw.targets {
                    if !seen.insert(target.name.clone()) {
                        return Err(ManifestError::DuplicateTarget {
                            project: project.name.clone(),
                            target: target.name,
                        }
                        .into());
                    }
                    project.targets.push(convert_target(target, &manifest_dir)?);
                }

                project.schemes = raw
                    .schemes
                    .into_iter()
                    .map(|s| convert_scheme(s, &manifest_dir))
                    .collect();

                Some(project)
            }
            None => None,
        };

        Ok(Manifest {
            workspace,
            project,
            manifest_dir,
        })
    }

    /// The project declared by this manifest.
    pub fn into_project(self) -> Result<Project> {
        match self.project {
            Some(project) => Ok(project),
            None => Err(ManifestError::NotAProject(self.manifest_dir.join(MANIFEST_NAME)).into()),
        }
    }
}

fn convert_settings(raw: RawSettings, stock_configurations: bool) -> Result<Settings> {
    let mut settings = match raw.configurations {
        None if stock_configurations => Settings::default(),
        None => Settings::with_base(SettingsDictionary::new()),
        Some(configurations) => {
            let mut settings = Settings::with_base(SettingsDictionary::new());
            for raw in configurations {
                let variant = parse_variant(&raw)?;
                let bundle = if raw.settings.is_empty() && raw.xcconfig.is_none() {
                    None
                } else {
                    Some(Configuration {
                        settings: raw.settings,
                        xcconfig: raw.xcconfig,
                    })
                };
                settings = settings.with_configuration(BuildConfiguration::new(raw.name, variant), bundle);
            }
            settings
        }
    };
    settings.base = raw.base;
    Ok(settings)
}

/// Explicit variant, else inferred from the configuration name.
fn parse_variant(raw: &RawConfiguration) -> Result<Variant> {
    match raw.variant.as_deref() {
        Some("debug") => Ok(Variant::Debug),
        Some("release") => Ok(Variant::Release),
        Some(other) => Err(ManifestError::UnknownVariant {
            configuration: raw.name.clone(),
            variant: other.to_string(),
        }
        .into()),
        None if raw.name.eq_ignore_ascii_case("release") => Ok(Variant::Release),
        None => Ok(Variant::Debug),
    }
}

fn convert_package(raw: RawPackage, project: &str, dir: &Path) -> Result<Package> {
    match (raw.path, raw.url) {
        (Some(path), None) => Ok(Package::local(normalize(&dir.join(path)))),
        (None, Some(url)) => {
            url::Url::parse(&url).map_err(|e| ManifestError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;

            let requirement = raw
                .requirement
                .ok_or_else(|| ManifestError::MissingRequirement { url: url.clone() })?;
            for version in requirement.versions() {
                semver::Version::parse(version).map_err(|e| ManifestError::InvalidVersion {
                    package: url.clone(),
                    version: version.to_string(),
                    reason: e.to_string(),
                })?;
            }

            Ok(Package::remote(url, requirement))
        }
        _ => Err(ManifestError::AmbiguousPackage {
            project: project.to_string(),
        }
        .into()),
    }
}

fn convert_target(raw: RawTarget, dir: &Path) -> Result<Target> {
    let mut target = Target::new(raw.name, raw.product);
    target.product_name = raw.product_name;
    target.bundle_id = raw.bundle_id;
    target.on_demand_resources_tags = raw.on_demand_resources;

    let mut seen = BTreeSet::new();
    for source in raw.sources {
        let (pattern, flags) = match source {
            RawSource::Glob(pattern) => (pattern, None),
            RawSource::Detailed {
                glob,
                compiler_flags,
            } => (glob, compiler_flags),
        };
        for path in expand_glob(dir, &pattern, true)? {
            if seen.insert(path.clone()) {
                target.sources.push(SourceFile {
                    path,
                    compiler_flags: flags.clone(),
                });
            }
        }
    }

    let mut seen = BTreeSet::new();
    for resource in raw.resources {
        let (pattern, tags) = match resource {
            RawResource::Glob(pattern) => (pattern, Vec::new()),
            RawResource::Detailed { glob, tags } => (glob, tags),
        };
        for path in expand_glob(dir, &pattern, false)? {
            if seen.insert(path.clone()) {
                target.resources.push(ResourceFile::new(path).with_tags(tags.clone()));
            }
        }
    }

    target.settings = raw
        .settings
        .map(|settings| convert_settings(settings, false))
        .transpose()?;

    target.dependencies = raw
        .dependencies
        .into_iter()
        .map(|dependency| match dependency {
            TargetDependency::Project { path, target } => TargetDependency::Project {
                path: normalize(&dir.join(path)),
                target,
            },
            other => other,
        })
        .collect();

    Ok(target)
}

/// Expand a glob relative to `dir` into sorted, `dir`-relative paths.
///
/// Resource globs may match directories such as asset catalogs.
fn expand_glob(dir: &Path, pattern: &str, files_only: bool) -> Result<Vec<PathBuf>> {
    // Only the pattern is a glob; metacharacters in the directory match literally.
    let full = if Path::new(pattern).is_absolute() {
        PathBuf::from(pattern)
    } else {
        Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern)
    };
    let entries = glob::glob(&full.to_string_lossy()).map_err(|e| ManifestError::InvalidGlob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to read files matching `{}`", pattern))?;
        if files_only && !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(dir).map(Path::to_path_buf).unwrap_or(path);
        paths.push(relative);
    }
    paths.sort();

    if paths.is_empty() {
        tracing::warn!("pattern `{}` in {} matched no files", pattern, dir.display());
    }

    Ok(paths)
}

fn convert_scheme(raw: RawScheme, dir: &Path) -> Scheme {
    let mut scheme = Scheme::new(raw.name);
    scheme.shared = raw.shared;

    if !raw.build.is_empty() {
        scheme = scheme.with_build_action(raw.build.iter().map(|r| parse_reference(r, dir)));
    }

    if !raw.test.is_empty() || !raw.test_plans.is_empty() || raw.test_configuration.is_some() {
        let defaults = TestAction::default();
        scheme = scheme.with_test_action(TestAction {
            targets: raw.test.into_iter().map(|t| convert_testable(t, dir)).collect(),
            test_plans: raw
                .test_plans
                .into_iter()
                .map(|plan| TestPlan {
                    name: plan.name,
                    path: normalize(&dir.join(plan.path)),
                    test_targets: plan
                        .targets
                        .into_iter()
                        .map(|t| convert_testable(t, dir))
                        .collect(),
                    is_default: plan.default,
                })
                .collect(),
            configuration: raw.test_configuration.unwrap_or(defaults.configuration),
        });
    }

    if raw.run.is_some() || raw.run_configuration.is_some() || !raw.run_arguments.is_empty() {
        scheme.run_action = Some(RunAction {
            configuration: raw.run_configuration.unwrap_or_else(|| "Debug".to_string()),
            executable: raw.run.map(|r| parse_reference(&r, dir)),
            arguments: raw.run_arguments,
        });
    }

    scheme
}

fn convert_testable(raw: RawTestable, dir: &Path) -> TestableTarget {
    match raw {
        RawTestable::Reference(reference) => TestableTarget::new(parse_reference(&reference, dir)),
        RawTestable::Detailed {
            target,
            skipped,
            parallelizable,
        } => TestableTarget {
            target: parse_reference(&target, dir),
            is_skipped: skipped,
            is_parallelizable: parallelizable,
        },
    }
}

/// Parse `Name` (a target of the manifest's own project) or
/// `project/dir:Name`.
fn parse_reference(value: &str, dir: &Path) -> TargetReference {
    match value.rsplit_once(':') {
        Some((project, name)) => TargetReference::new(normalize(&dir.join(project)), name),
        None => TargetReference::new(dir, value),
    }
}

/// Lexically resolve `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
