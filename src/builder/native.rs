//! Native C/C++ compiler driver.
//!
//! Runs a [`BuildPlan`]: compile steps in parallel, then the link step.
//! Steps whose outputs are newer than their inputs are skipped unless the
//! build is forced.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::builder::plan::{BuildPlan, CompileStep, LinkStep};
use crate::builder::toolchain::CommandSpec;
use crate::util::fs::{ensure_dir, relative_path};
use crate::util::process::ProcessBuilder;

/// A built extension module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Module name
    pub module: String,
    /// Path of the module on disk
    pub path: PathBuf,
    /// Whether anything was compiled or linked
    pub rebuilt: bool,
}

/// Native C/C++ builder.
pub struct NativeBuilder {
    /// Rebuild everything regardless of timestamps
    force: bool,
    /// Base directory for log messages
    display_root: Option<PathBuf>,
}

impl NativeBuilder {
    /// Create a new native builder.
    pub fn new(force: bool) -> Self {
        NativeBuilder {
            force,
            display_root: None,
        }
    }

    /// Show paths relative to this directory in log messages.
    pub fn with_display_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.display_root = Some(root.into());
        self
    }

    /// Execute the build plan.
    pub fn execute(&self, plan: &BuildPlan, jobs: Option<usize>) -> Result<Artifact> {
        let Some(link) = plan.link_step() else {
            bail!("build plan for `{}` has no link step", plan.module);
        };

        let compile_steps: Vec<&CompileStep> = plan.compile_steps().collect();

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(j) = jobs {
            builder = builder.num_threads(j);
        }
        let pool = builder
            .build()
            .context("failed to create compile thread pool")?;

        tracing::info!("Compiling {} files", compile_steps.len());

        let compiled: Vec<bool> = pool.install(|| {
            compile_steps
                .par_iter()
                .map(|step| self.compile(step))
                .collect::<Result<Vec<bool>>>()
        })?;

        let any_compiled = compiled.iter().any(|c| *c);
        let linked = self.link(link, any_compiled)?;

        Ok(Artifact {
            module: plan.module.clone(),
            path: link.output.clone(),
            rebuilt: any_compiled || linked,
        })
    }

    /// Compile one source file. Returns whether the compiler ran.
    fn compile(&self, step: &CompileStep) -> Result<bool> {
        if !self.force && is_fresh(&step.output, [step.source.as_path()]) {
            tracing::debug!("Fresh {}", self.display(&step.output));
            return Ok(false);
        }

        if let Some(parent) = step.output.parent() {
            ensure_dir(parent)?;
        }

        tracing::debug!("Compiling {}", self.display(&step.source));
        run(&step.command).with_context(|| {
            format!("compilation failed for {}", step.source.display())
        })?;

        Ok(true)
    }

    /// Link the module. Returns whether the linker ran.
    fn link(&self, step: &LinkStep, objects_changed: bool) -> Result<bool> {
        let inputs = step.objects.iter().map(PathBuf::as_path);
        if !self.force && !objects_changed && is_fresh(&step.output, inputs) {
            tracing::info!("Module {} is up to date", self.display(&step.output));
            return Ok(false);
        }

        if let Some(parent) = step.output.parent() {
            ensure_dir(parent)?;
        }

        tracing::info!("Linking {}", self.display(&step.output));
        run(&step.command)
            .with_context(|| format!("linking failed for {}", step.output.display()))?;

        Ok(true)
    }

    fn display(&self, path: &Path) -> String {
        match &self.display_root {
            Some(root) => relative_path(root, path).display().to_string(),
            None => path.display().to_string(),
        }
    }
}

/// Run a command spec, failing with the tool's stderr on a non-zero exit.
fn run(spec: &CommandSpec) -> Result<()> {
    let cmd = ProcessBuilder::new(&spec.program).args(&spec.args);
    tracing::trace!("Running `{}`", cmd.display_command());
    cmd.exec_and_check()?;
    Ok(())
}

/// Whether `output` exists and is at least as new as every input.
///
/// A missing or unreadable input counts as stale so the tool gets to report
/// the problem itself.
fn is_fresh<'a>(output: &Path, inputs: impl IntoIterator<Item = &'a Path>) -> bool {
    let Some(out_time) = modified(output) else {
        return false;
    };

    inputs
        .into_iter()
        .all(|input| modified(input).is_some_and(|t| t <= out_time))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("pcapy.cc");
        let obj = tmp.path().join("pcapy.o");

        fs::write(&src, "int x;").unwrap();
        assert!(!is_fresh(&obj, [src.as_path()]));

        fs::write(&obj, "obj").unwrap();
        let now = SystemTime::now();
        set_mtime(&src, now - Duration::from_secs(60));
        set_mtime(&obj, now);
        assert!(is_fresh(&obj, [src.as_path()]));

        set_mtime(&src, now + Duration::from_secs(60));
        assert!(!is_fresh(&obj, [src.as_path()]));
    }

    #[test]
    fn test_missing_input_is_stale() {
        let tmp = TempDir::new().unwrap();
        let obj = tmp.path().join("pcapy.o");
        fs::write(&obj, "obj").unwrap();

        assert!(!is_fresh(&obj, [tmp.path().join("missing.cc").as_path()]));
    }

    /// Stand-in for gcc, g++ and LDSHARED that writes its `-o` target.
    #[cfg(unix)]
    fn fake_compiler(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-cc");
        fs::write(
            &path,
            "#!/bin/sh\nout=\nwhile [ $# -gt 0 ]; do\n  [ \"$1\" = -o ] && out=$2\n  shift\ndone\necho built > \"$out\"\n",
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_builds_then_skips_fresh_module() {
        use crate::builder::linker::LinkerCommand;
        use crate::builder::plan::PlanInputs;
        use crate::builder::toolchain::GccToolchain;
        use crate::core::package::Extension;
        use crate::core::platform::{Platform, PlatformConfig};

        let tmp = TempDir::new().unwrap();
        let cc = fake_compiler(tmp.path());
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        let ext = Extension::from_platform("pcapy", &PlatformConfig::for_platform(Platform::Posix));
        for source in &ext.sources {
            fs::write(src.join(source), "#include <Python.h>\n").unwrap();
        }

        let ldshared = LinkerCommand::parse(&format!("{} -shared", cc.display())).unwrap();
        let toolchain = GccToolchain::new(cc.clone(), cc.clone(), ldshared);
        let inputs = PlanInputs {
            source_dir: src,
            build_dir: tmp.path().join("build"),
            ..Default::default()
        };
        let plan = BuildPlan::new(&ext, &toolchain, &inputs);

        let first = NativeBuilder::new(false).execute(&plan, Some(2)).unwrap();
        assert!(first.rebuilt);
        assert_eq!(first.path, tmp.path().join("build/pcapy.so"));
        assert!(first.path.is_file());
        assert!(plan.compile_steps().all(|c| c.output.is_file()));

        let second = NativeBuilder::new(false).execute(&plan, Some(2)).unwrap();
        assert!(!second.rebuilt);
        assert!(second.path.is_file());

        let forced = NativeBuilder::new(true).execute(&plan, None).unwrap();
        assert!(forced.rebuilt);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_reports_stderr() {
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo 'pcap.h: No such file or directory' >&2; exit 1");

        let err = run(&spec).unwrap_err();
        assert!(format!("{:#}", err).contains("pcap.h: No such file or directory"));
    }
}
