//! `wharf schemes` command

use anyhow::Result;

use crate::cli::SchemesArgs;
use wharf::core::{GraphTraverser, Scheme};
use wharf::ops::load_graph;
use wharf::BuildGraphInspector;

pub fn execute(args: SchemesArgs) -> Result<()> {
    let graph = load_graph(&args.path)?;
    let inspector = BuildGraphInspector::new();

    let schemes: Vec<&Scheme> = if args.buildable {
        inspector.buildable_schemes(&graph)
    } else if args.entry {
        inspector.buildable_entry_schemes(&graph)
    } else if args.testable {
        inspector.testable_schemes(&graph)
    } else if args.test {
        inspector.test_schemes(&graph)
    } else if args.runnable {
        inspector.runnable_schemes(&graph)
    } else if args.workspace {
        inspector.workspace_schemes(&graph)
    } else {
        let mut all = graph.schemes();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    };

    if schemes.is_empty() {
        tracing::info!("no matching schemes");
    }
    for scheme in schemes {
        println!("{}", scheme.name);
    }

    Ok(())
}
