//! `wharf build-args` command

use anyhow::{Context, Result};

use crate::cli::BuildArgsArgs;
use wharf::core::GraphTraverser;
use wharf::inspector::render;
use wharf::ops::load_graph;
use wharf::BuildGraphInspector;

pub fn execute(args: BuildArgsArgs) -> Result<()> {
    let graph = load_graph(&args.path)?;

    let project_dir = args.path.join(&args.project);
    let project_dir = std::fs::canonicalize(&project_dir)
        .with_context(|| format!("failed to resolve project path: {}", project_dir.display()))?;

    let project = graph.project(&project_dir).ok_or_else(|| {
        anyhow::anyhow!(
            "project `{}` is not part of the workspace\n\
             help: Run `wharf generate` to see the generated projects",
            args.project.display()
        )
    })?;
    let target = project.target(&args.target).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown target `{}` in project `{}`",
            args.target,
            project.name
        )
    })?;

    let arguments = BuildGraphInspector::new().build_arguments(
        project,
        target,
        args.configuration.as_deref(),
        args.skip_signing,
    );
    println!("{}", render(&arguments).join(" "));

    Ok(())
}
