//! Command implementations

use pcapy::core::Platform;
use pcapy::ops::BuildOptions;
use pcapy::util::config::{load_for_source_dir, Config};

use crate::cli::{CompileFlags, SourceArgs};

pub mod build;
pub mod clean;
pub mod completions;
pub mod config;
pub mod install;
pub mod toolchain;

#[cfg(feature = "capture")]
pub mod compile;
#[cfg(feature = "capture")]
pub mod devices;
#[cfg(feature = "capture")]
pub mod live;
#[cfg(feature = "capture")]
pub mod read;

/// Build options and merged configuration for a source directory.
pub(crate) fn build_options(source: SourceArgs, flags: CompileFlags) -> (BuildOptions, Config) {
    let config = load_for_source_dir(&source.source_dir);

    let opts = BuildOptions {
        source_dir: source.source_dir,
        build_dir: source.build_dir,
        platform: source.platform.unwrap_or_else(Platform::host),
        ldshared: flags.ldshared,
        jobs: flags.jobs,
        force: flags.force,
    };

    (opts, config)
}
