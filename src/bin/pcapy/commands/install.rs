//! `pcapy install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use pcapy::ops::install::{install, InstallOptions};

use super::build_options;

pub fn execute(args: InstallArgs) -> Result<()> {
    let (build, config) = build_options(args.source, args.flags);

    let opts = InstallOptions {
        build,
        prefix: args.prefix,
        root: args.root,
        install_lib: args.install_lib,
        skip_build: args.skip_build,
        record: args.record,
    };

    let result = install(&opts, &config)?;

    eprintln!(
        "   Installed {} {} ({} files)",
        result.package.name,
        result.package.version,
        result.installed.len()
    );

    Ok(())
}
