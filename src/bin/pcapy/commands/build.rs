//! `pcapy build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use pcapy::ops::build::{build, plan};

use super::build_options;

pub fn execute(args: BuildArgs) -> Result<()> {
    let (opts, config) = build_options(args.source, args.flags);

    if args.plan {
        let (_, plan) = plan(&opts, &config)?;
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    let result = build(&opts, &config)?;

    let state = if result.artifact.rebuilt { "Finished" } else { "Fresh" };
    eprintln!(
        "    {} `{}` -> {}",
        state,
        result.artifact.module,
        result.artifact.path.display()
    );

    Ok(())
}
