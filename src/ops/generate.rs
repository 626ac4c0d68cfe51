//! Implementation of `wharf generate`.

use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;

use crate::core::graph::{Graph, GraphTraverser};
use crate::generator::{GeneratorOptions, ProjectDescriptor, ProjectDescriptorGenerator};
use crate::ops::load::load_graph;
use crate::util::config::load_workspace_config;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Workspace directory
    pub path: PathBuf,

    /// Override the configured target concurrency
    pub jobs: Option<usize>,
}

/// Result of generating a workspace.
#[derive(Debug)]
pub struct GenerateResult {
    pub graph: Graph,

    /// One descriptor per project, sorted by project path
    pub descriptors: Vec<ProjectDescriptor>,
}

/// Load the workspace at `options.path` and generate every project.
pub fn generate(options: &GenerateOptions) -> Result<GenerateResult> {
    let graph = load_graph(&options.path)?;

    let config = load_workspace_config(graph.path());
    let mut generator_options = GeneratorOptions::from_config(&config);
    if let Some(jobs) = options.jobs {
        generator_options.max_concurrency = jobs;
    }

    let generator = ProjectDescriptorGenerator::new(generator_options);
    let descriptors = generate_projects(&generator, &graph)?;

    Ok(GenerateResult { graph, descriptors })
}

/// Generate every project of the graph.
///
/// Projects share no mutable state and are generated in parallel; the
/// first failure aborts the whole run.
pub fn generate_projects(
    generator: &ProjectDescriptorGenerator,
    graph: &dyn GraphTraverser,
) -> Result<Vec<ProjectDescriptor>> {
    let projects = graph.projects();
    tracing::info!("generating {} projects", projects.len());

    let mut descriptors = projects
        .par_iter()
        .map(|project| generator.generate(project, graph))
        .collect::<Result<Vec<_>>>()?;
    descriptors.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(descriptors)
}
