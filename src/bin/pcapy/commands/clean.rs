//! `pcapy clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use pcapy::ops::build::BuildOptions;
use pcapy::ops::clean;
use pcapy::util::config::load_for_source_dir;

pub fn execute(args: CleanArgs) -> Result<()> {
    let config = load_for_source_dir(&args.source_dir);
    let opts = BuildOptions {
        source_dir: args.source_dir,
        build_dir: args.build_dir,
        ..Default::default()
    };

    match clean(&opts.build_dir(&config), args.all)? {
        Some(removed) => eprintln!("     Removed {}", removed.display()),
        None => eprintln!("     Nothing to clean"),
    }

    Ok(())
}
