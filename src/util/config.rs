//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.pcapy/config.toml` - User-wide defaults
//! - Project: `<source-dir>/.pcapy/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Environment variables
//! (`CC`, `CXX`, `LDSHARED`, `CFLAGS`, `LDFLAGS`, `PCAPY_WPCAP_SDK`, `PYTHON`,
//! `PCAPY_PYTHON_INCLUDE`) take precedence over both, and command-line flags
//! over everything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming the WinPcap developer pack root.
pub const WPCAP_SDK_ENV: &str = "PCAPY_WPCAP_SDK";

/// Environment variable naming the directory containing `Python.h`.
pub const PYTHON_INCLUDE_ENV: &str = "PCAPY_PYTHON_INCLUDE";

/// pcapy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Compiler overrides
    pub toolchain: ToolchainSettings,

    /// Install settings
    pub install: InstallConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build directory, relative to the source directory
    pub build_dir: Option<PathBuf>,

    /// Default number of parallel jobs (None = auto-detect)
    pub jobs: Option<usize>,

    /// Shared-module linker command (e.g. "gcc -pthread -shared")
    pub ldshared: Option<String>,

    /// Root of the WinPcap developer pack
    pub wpcap_sdk: Option<String>,

    /// Interpreter asked for its header and platlib directories
    pub python: Option<String>,

    /// Directory containing `Python.h` (skips asking the interpreter)
    pub python_include: Option<String>,

    /// Extra header search paths
    pub include_dirs: Vec<String>,

    /// Extra library search paths
    pub library_dirs: Vec<String>,

    /// Additional compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Toolchain settings for C/C++ compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (e.g. gcc, /usr/bin/clang, cl)
    pub cc: Option<String>,

    /// C++ compiler (e.g. g++, clang++)
    pub cxx: Option<String>,

    /// MSVC linker (link.exe)
    pub link: Option<String>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Installation prefix
    pub prefix: Option<PathBuf>,

    /// Module directory (skips asking the interpreter for its platlib)
    pub install_lib: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.ldshared.is_some() {
            self.build.ldshared = other.build.ldshared;
        }
        if other.build.wpcap_sdk.is_some() {
            self.build.wpcap_sdk = other.build.wpcap_sdk;
        }
        if other.build.python.is_some() {
            self.build.python = other.build.python;
        }
        if other.build.python_include.is_some() {
            self.build.python_include = other.build.python_include;
        }
        if !other.build.include_dirs.is_empty() {
            self.build.include_dirs = other.build.include_dirs;
        }
        if !other.build.library_dirs.is_empty() {
            self.build.library_dirs = other.build.library_dirs;
        }
        if !other.build.cflags.is_empty() {
            self.build.cflags = other.build.cflags;
        }
        if !other.build.ldflags.is_empty() {
            self.build.ldflags = other.build.ldflags;
        }

        // Toolchain settings
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if other.toolchain.link.is_some() {
            self.toolchain.link = other.toolchain.link;
        }

        // Install settings
        if other.install.prefix.is_some() {
            self.install.prefix = other.install.prefix;
        }
        if other.install.install_lib.is_some() {
            self.install.install_lib = other.install.install_lib;
        }
    }

    /// Overlay the distutils-style environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay environment values read through `lookup`.
    ///
    /// Empty values are ignored. Flag variables are split on whitespace.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(cc) = get("CC") {
            self.toolchain.cc = Some(cc);
        }
        if let Some(cxx) = get("CXX") {
            self.toolchain.cxx = Some(cxx);
        }
        if let Some(ldshared) = get("LDSHARED") {
            self.build.ldshared = Some(ldshared);
        }
        if let Some(sdk) = get(WPCAP_SDK_ENV) {
            self.build.wpcap_sdk = Some(sdk);
        }
        if let Some(python) = get("PYTHON") {
            self.build.python = Some(python);
        }
        if let Some(include) = get(PYTHON_INCLUDE_ENV) {
            self.build.python_include = Some(include);
        }
        if let Some(cflags) = get("CFLAGS") {
            self.build.cflags = split_flags(&cflags);
        }
        if let Some(ldflags) = get("LDFLAGS") {
            self.build.ldflags = split_flags(&ldflags);
        }
    }
}

fn split_flags(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.pcapy/config.toml)
/// 2. Global config (~/.pcapy/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load the global and project configuration for a source directory, then
/// apply the environment on top.
pub fn load_for_source_dir(source_dir: &Path) -> Config {
    let global = global_config_path().unwrap_or_default();
    let mut config = load_config(&global, &project_config_path(source_dir));
    config.apply_env();
    config
}

/// Get the global pcapy config directory (~/.pcapy).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".pcapy"))
}

/// Get the global config path (~/.pcapy/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.pcapy/config.toml).
pub fn project_config_path(source_dir: &Path) -> PathBuf {
    source_dir.join(".pcapy").join("config.toml")
}
