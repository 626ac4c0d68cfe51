//! Manifest validation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error found while validating a workspace or project manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("could not find `Wharf.toml` in `{}`", .0.display())]
    NotFound(PathBuf),

    #[error("workspace lists project `{}` which has no manifest", .0.display())]
    MissingProject(PathBuf),

    #[error("manifest at `{}` has no [project] section", .0.display())]
    NotAProject(PathBuf),

    #[error("target `{target}` is declared more than once in project `{project}`")]
    DuplicateTarget { project: String, target: String },

    #[error("package must have exactly one of `path` or `url` (in project `{project}`)")]
    AmbiguousPackage { project: String },

    #[error("remote package `{url}` has no version requirement")]
    MissingRequirement { url: String },

    #[error("invalid package url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid version `{version}` for package `{package}`: {reason}")]
    InvalidVersion {
        package: String,
        version: String,
        reason: String,
    },

    #[error("invalid glob `{pattern}`: {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("unknown variant `{variant}` for configuration `{configuration}`")]
    UnknownVariant {
        configuration: String,
        variant: String,
    },
}
