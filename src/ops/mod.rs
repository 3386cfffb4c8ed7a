//! High-level operations.
//!
//! This module contains the implementation of pcapy commands.

pub mod build;
pub mod clean;
pub mod install;

pub use build::{build, plan, platform_config, BuildOptions, BuildResult};
pub use clean::clean;
pub use install::{install, InstallOptions, InstallResult};
