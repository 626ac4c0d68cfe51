//! `wharf locate` command

use anyhow::Result;

use crate::cli::LocateArgs;
use wharf::BuildGraphInspector;

pub fn execute(args: LocateArgs) -> Result<()> {
    match BuildGraphInspector::new().workspace_path(&args.path)? {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!(
            "no generated workspace found in {}\n\
             help: Run `wharf generate` first",
            args.path.display()
        ),
    }

    Ok(())
}
