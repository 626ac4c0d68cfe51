//! `wharf test-target` command

use anyhow::{bail, Result};

use crate::cli::TestTargetArgs;
use wharf::core::{GraphTraverser, TestIdentifier};
use wharf::inspector::{test_selection_arguments, TestActionKind};
use wharf::ops::load_graph;
use wharf::BuildGraphInspector;

pub fn execute(args: TestTargetArgs) -> Result<()> {
    let graph = load_graph(&args.path)?;

    let test_targets = parse_identifiers(&args.test_targets)?;
    let skip_test_targets = parse_identifiers(&args.skip_test_targets)?;

    let Some(scheme) = graph.schemes().into_iter().find(|s| s.name == args.scheme) else {
        bail!(
            "unknown scheme `{}`\n\
             help: Run `wharf schemes --testable` to see testable schemes",
            args.scheme
        );
    };

    let action = if args.build {
        TestActionKind::Build
    } else {
        TestActionKind::Test
    };

    let Some(target) = BuildGraphInspector::new().testable_target(
        scheme,
        args.test_plan.as_deref(),
        &test_targets,
        &skip_test_targets,
        action,
        &graph,
    ) else {
        bail!("scheme `{}` has no testable target for this selection", scheme.name);
    };

    println!("{} ({})", target.target.name, target.path.display());

    let selection = test_selection_arguments(&test_targets, &skip_test_targets);
    if !selection.is_empty() {
        println!("{}", selection.join(" "));
    }

    Ok(())
}

fn parse_identifiers(values: &[String]) -> Result<Vec<TestIdentifier>> {
    values
        .iter()
        .map(|value| value.parse::<TestIdentifier>().map_err(Into::into))
        .collect()
}
