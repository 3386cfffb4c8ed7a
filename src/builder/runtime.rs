//! Python runtime paths.
//!
//! The extension includes `Python.h` and is imported from the interpreter's
//! platlib, so both directories come from asking the interpreter through
//! `sysconfig`. Explicit config values skip the query.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::platform::Platform;
use crate::util::config::Config;
use crate::util::process::ProcessBuilder;

/// Interpreter queried when none is configured.
#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// Prints the include dir, then the platlib (rebased on argv[1] when given).
const QUERY: &str = "import sys, sysconfig
v = {'base': sys.argv[1], 'platbase': sys.argv[1]} if len(sys.argv) > 1 else None
print(sysconfig.get_path('include'))
print(sysconfig.get_path('platlib', vars=v))";

/// Directories reported by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    /// Directory containing `Python.h`
    pub include: PathBuf,
    /// Directory extension modules are installed into
    pub platlib: PathBuf,
}

/// A Python interpreter to query.
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    interpreter: PathBuf,
}

impl PythonRuntime {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        PythonRuntime {
            interpreter: interpreter.into(),
        }
    }

    /// The configured interpreter (`PYTHON` or `build.python`), or the default.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.build.python.as_deref().unwrap_or(DEFAULT_PYTHON))
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Ask the interpreter for its paths. With `prefix`, platlib is the one
    /// an install under that prefix would use.
    pub fn query(&self, prefix: Option<&Path>) -> Result<RuntimePaths> {
        let mut cmd = ProcessBuilder::new(&self.interpreter).args(["-c", QUERY]);
        if let Some(prefix) = prefix {
            cmd = cmd.arg(prefix);
        }

        let output = cmd
            .exec_and_check()
            .with_context(|| format!("failed to query `{}`", self.interpreter.display()))?;

        parse_paths(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("unexpected output from `{}`", self.interpreter.display()))
    }
}

fn parse_paths(stdout: &str) -> Result<RuntimePaths> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(include), Some(platlib)) => Ok(RuntimePaths {
            include: PathBuf::from(include),
            platlib: PathBuf::from(platlib),
        }),
        _ => bail!("expected an include and a platlib line, got {:?}", stdout),
    }
}

/// Header directory of the runtime: the configured one, or the interpreter's.
///
/// The interpreter is only asked when building for the host platform. A
/// failed query is logged and yields `None`; the compiler then reports the
/// missing header.
pub fn include_dir(platform: Platform, config: &Config) -> Option<PathBuf> {
    if let Some(dir) = &config.build.python_include {
        return Some(PathBuf::from(dir));
    }
    if platform != Platform::host() {
        tracing::debug!("Not querying the host interpreter for a {} build", platform);
        return None;
    }

    let runtime = PythonRuntime::from_config(config);
    match runtime.query(None) {
        Ok(paths) => {
            tracing::debug!("Python headers: {}", paths.include.display());
            Some(paths.include)
        }
        Err(e) => {
            tracing::warn!("Python headers not found: {:#}", e);
            None
        }
    }
}

/// Module install directory for `prefix`, or `None` when the interpreter
/// cannot be asked.
pub fn platlib(platform: Platform, config: &Config, prefix: &Path) -> Option<PathBuf> {
    if platform != Platform::host() {
        return None;
    }

    let runtime = PythonRuntime::from_config(config);
    match runtime.query(Some(prefix)) {
        Ok(paths) => Some(paths.platlib),
        Err(e) => {
            tracing::warn!("Python platlib not found, using <prefix>/lib: {:#}", e);
            None
        }
    }
}
