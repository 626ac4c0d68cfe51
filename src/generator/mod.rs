//! Project descriptor generation.
//!
//! `ProjectDescriptorGenerator` drives a set of injectable collaborators
//! (targets, configurations, schemes, asset tags) to turn a loaded project
//! into a `ProjectDescriptor`.

pub mod attributes;
pub mod config;
pub mod descriptor;
pub mod file_elements;
pub mod packages;
pub mod project;
pub mod schemes;
pub mod target;

pub use attributes::{KnownAssetTagsFetcher, KnownAssetTagsFetching, ProjectAttributeBuilder};
pub use config::{ConfigGenerating, ConfigGenerator};
pub use descriptor::{
    BuildableReference, GeneratedProject, ProjectDescriptor, SchemeDescriptor,
    SideEffectDescriptor, TestableReference, WorkspaceData, WorkspaceDataElement,
    XcodeProjDescriptor,
};
pub use file_elements::{ProjectFileElements, ProjectGroups};
pub use packages::{generate_package_references, PackageReferences};
pub use project::{determine_format_profile, GeneratorOptions, ProjectDescriptorGenerator};
pub use schemes::{SchemeDescriptorsGenerating, SchemeDescriptorsGenerator};
pub use target::{TargetGenerating, TargetGenerator};
