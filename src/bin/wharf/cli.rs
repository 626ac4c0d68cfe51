//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

/// Wharf - project generation for native application workspaces
#[derive(Parser)]
#[command(name = "wharf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate project descriptors for every project of the workspace
    Generate(GenerateArgs),

    /// List the workspace's schemes
    Schemes(SchemesArgs),

    /// Print the build tool arguments for a target
    BuildArgs(BuildArgsArgs),

    /// Resolve the target a test run of a scheme is about
    TestTarget(TestTargetArgs),

    /// Find a generated workspace bundle
    Locate(LocateArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Workspace directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Dump the descriptors as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Maximum number of targets generated concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("filter").args(["buildable", "entry", "testable", "test", "runnable", "workspace"])))]
pub struct SchemesArgs {
    /// Workspace directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Only schemes that build something
    #[arg(long)]
    pub buildable: bool,

    /// Only buildable schemes of the workspace's entry projects
    #[arg(long)]
    pub entry: bool,

    /// Only schemes with something to test
    #[arg(long)]
    pub testable: bool,

    /// Only schemes dedicated to a single test bundle
    #[arg(long)]
    pub test: bool,

    /// Only schemes that run an executable
    #[arg(long)]
    pub runnable: bool,

    /// Only generated workspace schemes
    #[arg(long)]
    pub workspace: bool,
}

#[derive(Args)]
pub struct BuildArgsArgs {
    /// Workspace directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Project directory, relative to the workspace
    #[arg(long)]
    pub project: PathBuf,

    /// Target name
    #[arg(long)]
    pub target: String,

    /// Build configuration
    #[arg(short, long)]
    pub configuration: Option<String>,

    /// Disable code signing
    #[arg(long)]
    pub skip_signing: bool,
}

#[derive(Args)]
pub struct TestTargetArgs {
    /// Workspace directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Scheme name
    #[arg(long)]
    pub scheme: String,

    /// Test plan to select from
    #[arg(long)]
    pub test_plan: Option<String>,

    /// Only run these tests (Target[/Class[/method]])
    #[arg(long, value_delimiter = ',')]
    pub test_targets: Vec<String>,

    /// Skip these tests (Target[/Class[/method]])
    #[arg(long, value_delimiter = ',')]
    pub skip_test_targets: Vec<String>,

    /// Select for a build instead of a test run
    #[arg(long)]
    pub build: bool,
}

#[derive(Args)]
pub struct LocateArgs {
    /// Directory to search
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}
