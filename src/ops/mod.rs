//! High-level operations.
//!
//! This module contains the implementation of Wharf commands.

pub mod generate;
pub mod load;
pub mod manifest;

pub use generate::{generate, generate_projects, GenerateOptions, GenerateResult};
pub use load::load_graph;
pub use manifest::{Manifest, WorkspaceManifest, MANIFEST_NAME};
