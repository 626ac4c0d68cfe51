//! Target definitions - what gets built.
//!
//! A Target is one buildable, testable or runnable unit of a project.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::settings::Settings;

/// The kind of product a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Application bundle
    #[serde(alias = "application")]
    App,

    /// Static library (.a)
    #[serde(alias = "staticlib")]
    StaticLibrary,

    /// Dynamic library (.dylib)
    #[serde(alias = "dylib")]
    DynamicLibrary,

    /// Dynamic framework
    Framework,

    /// Static framework
    StaticFramework,

    /// Resource bundle
    Bundle,

    /// Command line tool
    #[serde(alias = "tool")]
    CommandLineTool,

    /// Application extension
    AppExtension,

    /// Unit test bundle
    UnitTests,

    /// UI test bundle
    UiTests,
}

impl Default for Product {
    fn default() -> Self {
        Product::App
    }
}

impl Product {
    /// Product type identifier recorded on the native target.
    pub fn product_type(&self) -> &'static str {
        match self {
            Product::App => "com.apple.product-type.application",
            Product::StaticLibrary => "com.apple.product-type.library.static",
            Product::DynamicLibrary => "com.apple.product-type.library.dynamic",
            Product::Framework => "com.apple.product-type.framework",
            Product::StaticFramework => "com.apple.product-type.framework.static",
            Product::Bundle => "com.apple.product-type.bundle",
            Product::CommandLineTool => "com.apple.product-type.tool",
            Product::AppExtension => "com.apple.product-type.app-extension",
            Product::UnitTests => "com.apple.product-type.bundle.unit-test",
            Product::UiTests => "com.apple.product-type.bundle.ui-testing",
        }
    }

    /// File extension of the built product, if any.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Product::App => Some("app"),
            Product::StaticLibrary => Some("a"),
            Product::DynamicLibrary => Some("dylib"),
            Product::Framework | Product::StaticFramework => Some("framework"),
            Product::Bundle => Some("bundle"),
            Product::CommandLineTool => None,
            Product::AppExtension => Some("appex"),
            Product::UnitTests | Product::UiTests => Some("xctest"),
        }
    }

    /// Check if this is a unit-test or UI-test bundle.
    pub fn is_test_bundle(&self) -> bool {
        matches!(self, Product::UnitTests | Product::UiTests)
    }

    /// Check if the product can be launched by a run action.
    pub fn is_runnable(&self) -> bool {
        matches!(self, Product::App | Product::CommandLineTool)
    }

    /// Get the output filename for a product name.
    pub fn output_filename(&self, product_name: &str) -> String {
        match (self, self.extension()) {
            (Product::StaticLibrary | Product::DynamicLibrary, Some(ext)) => {
                format!("lib{}.{}", product_name, ext)
            }
            (_, Some(ext)) => format!("{}.{}", product_name, ext),
            (_, None) => product_name.to_string(),
        }
    }
}

/// A source file compiled by a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project source root
    pub path: PathBuf,

    /// Per-file compiler flags
    #[serde(default)]
    pub compiler_flags: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            compiler_flags: None,
        }
    }
}

/// A resource copied into the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFile {
    /// Path relative to the project source root
    pub path: PathBuf,

    /// On-demand resource tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ResourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResourceFile {
            path: path.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// On-demand resource tag ordering declared on a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnDemandResourcesTags {
    #[serde(default)]
    pub initial_install: Vec<String>,

    #[serde(default)]
    pub prefetch_order: Vec<String>,
}

/// A dependency declared by a target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetDependency {
    /// Another target in the same project
    Target { name: String },

    /// A target in another project
    Project { path: PathBuf, target: String },

    /// A product of a declared package
    Package { product: String },

    /// A system SDK framework or library
    Sdk { name: String },
}

/// A build target with its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Target name, unique within the project
    pub name: String,

    /// What kind of product to build
    pub product: Product,

    /// Product name (defaults to the target name)
    pub product_name: Option<String>,

    /// Bundle identifier
    pub bundle_id: Option<String>,

    pub sources: Vec<SourceFile>,

    pub resources: Vec<ResourceFile>,

    /// Per-configuration settings override
    pub settings: Option<Settings>,

    pub dependencies: Vec<TargetDependency>,

    pub on_demand_resources_tags: Option<OnDemandResourcesTags>,
}

impl Target {
    /// Create a new target with the given name and product.
    pub fn new(name: impl Into<String>, product: Product) -> Self {
        Target {
            name: name.into(),
            product,
            product_name: None,
            bundle_id: None,
            sources: Vec::new(),
            resources: Vec::new(),
            settings: None,
            dependencies: Vec::new(),
            on_demand_resources_tags: None,
        }
    }

    /// Add source paths.
    pub fn with_sources(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.sources = paths.into_iter().map(SourceFile::new).collect();
        self
    }

    /// Add resources.
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceFile>) -> Self {
        self.resources = resources.into_iter().collect();
        self
    }

    /// Set the settings override.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Add dependencies.
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TargetDependency>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Get the effective product name.
    pub fn product_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.name)
    }

    /// Get the output filename for this target.
    pub fn output_filename(&self) -> String {
        self.product.output_filename(self.product_name())
    }

    /// All on-demand resource tags this target declares.
    pub fn on_demand_tags(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = self
            .resources
            .iter()
            .flat_map(|r| r.tags.iter().cloned())
            .collect();
        if let Some(odr) = &self.on_demand_resources_tags {
            tags.extend(odr.initial_install.iter().cloned());
            tags.extend(odr.prefetch_order.iter().cloned());
        }
        tags
    }
}
