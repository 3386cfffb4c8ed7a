//! Implementation of `pcapy build`.
//!
//! Gathers build inputs (platform table, descriptor, toolchain), plans the
//! compile and link steps, and runs them.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::native::{Artifact, NativeBuilder};
use crate::builder::plan::{BuildPlan, PlanInputs};
use crate::builder::runtime;
use crate::builder::toolchain::resolve_toolchain;
use crate::core::package::PackageDescriptor;
use crate::core::platform::{Platform, PlatformConfig};
use crate::util::config::Config;

/// Default build directory, relative to the source directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory containing the native sources and docs
    pub source_dir: PathBuf,

    /// Output directory (None = config or `build/`)
    pub build_dir: Option<PathBuf>,

    /// Target platform
    pub platform: Platform,

    /// Explicit LDSHARED from the command line
    pub ldshared: Option<String>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Rebuild even when outputs are up to date
    pub force: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            source_dir: PathBuf::from("."),
            build_dir: None,
            platform: Platform::host(),
            ldshared: None,
            jobs: None,
            force: false,
        }
    }
}

impl BuildOptions {
    /// Effective build directory.
    pub fn build_dir(&self, config: &Config) -> PathBuf {
        let dir = self
            .build_dir
            .clone()
            .or_else(|| config.build.build_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));

        if dir.is_absolute() {
            dir
        } else {
            self.source_dir.join(dir)
        }
    }
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildResult {
    pub package: PackageDescriptor,
    pub plan: BuildPlan,
    pub artifact: Artifact,
}

/// Look up the platform table entry, applying a configured SDK root.
pub fn platform_config(platform: Platform, config: &Config) -> PlatformConfig {
    let table = PlatformConfig::for_platform(platform);
    match &config.build.wpcap_sdk {
        Some(root) => table.with_sdk_root(root),
        None => table,
    }
}

/// Compute the package descriptor and build plan without running anything.
pub fn plan(opts: &BuildOptions, config: &Config) -> Result<(PackageDescriptor, BuildPlan)> {
    let table = platform_config(opts.platform, config);
    let package = PackageDescriptor::pcapy(&table)?;

    // LDSHARED goes through the linker-driver fix inside resolve_toolchain
    let toolchain = resolve_toolchain(opts.platform, config, opts.ldshared.as_deref())?;

    // Python.h comes after the platform and user directories
    let mut include_dirs = config.build.include_dirs.clone();
    if let Some(dir) = runtime::include_dir(opts.platform, config) {
        include_dirs.push(dir.display().to_string());
    }

    let inputs = PlanInputs {
        source_dir: opts.source_dir.clone(),
        build_dir: opts.build_dir(config),
        include_dirs,
        library_dirs: config.build.library_dirs.clone(),
        cflags: config.build.cflags.clone(),
        ldflags: config.build.ldflags.clone(),
    };

    let plan = BuildPlan::new(&package.ext_module, toolchain.as_ref(), &inputs);

    tracing::debug!(
        "Planned {} steps for `{}` on {}",
        plan.steps.len(),
        plan.module,
        opts.platform
    );

    Ok((package, plan))
}

/// Build the extension module.
pub fn build(opts: &BuildOptions, config: &Config) -> Result<BuildResult> {
    let (package, plan) = plan(opts, config)?;

    let jobs = opts.jobs.or(config.build.jobs);
    let artifact = NativeBuilder::new(opts.force)
        .with_display_root(&opts.source_dir)
        .execute(&plan, jobs)?;

    Ok(BuildResult {
        package,
        plan,
        artifact,
    })
}
