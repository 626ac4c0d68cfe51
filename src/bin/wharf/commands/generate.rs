//! `wharf generate` command

use anyhow::{Context, Result};

use crate::cli::GenerateArgs;
use wharf::core::GraphTraverser;
use wharf::ops::{generate, GenerateOptions};

pub fn execute(args: GenerateArgs) -> Result<()> {
    let result = generate(&GenerateOptions {
        path: args.path,
        jobs: args.jobs,
    })?;

    if args.json {
        let json = serde_json::to_string_pretty(&result.descriptors)
            .context("failed to serialize project descriptors")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "Workspace {} ({})",
        result.graph.workspace().name,
        result.graph.workspace().xcworkspace_path.display()
    );
    for descriptor in &result.descriptors {
        let file = &descriptor.xcodeproj.project_file;
        let targets = file.root_project().map(|p| p.targets.len()).unwrap_or_default();
        println!(
            "Generated {} ({} targets, {} schemes, {} objects)",
            descriptor.xcodeproj_path.display(),
            targets,
            descriptor.scheme_descriptors.len(),
            file.objects.len()
        );
    }

    tracing::info!("generated {} projects", result.descriptors.len());

    Ok(())
}
