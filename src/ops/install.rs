//! Implementation of `pcapy install`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::runtime;
use crate::core::package::PackageDescriptor;
use crate::ops::build::{self, BuildOptions};
use crate::util::config::Config;
use crate::util::fs::{change_root, copy_into, write_string};

/// Default installation prefix.
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Options for the install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Build settings (also used to locate an existing module)
    pub build: BuildOptions,

    /// Installation prefix (None = config or /usr/local)
    pub prefix: Option<PathBuf>,

    /// Staging directory prepended to every install path
    pub root: Option<PathBuf>,

    /// Module directory (None = config, the interpreter's platlib, or `<prefix>/lib`)
    pub install_lib: Option<PathBuf>,

    /// Install a previously built module without building
    pub skip_build: bool,

    /// Write the installed file list here
    pub record: Option<PathBuf>,
}

impl InstallOptions {
    /// Effective installation prefix.
    pub fn prefix(&self, config: &Config) -> PathBuf {
        self.prefix
            .clone()
            .or_else(|| config.install.prefix.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX))
    }

    /// Directory the module is installed into.
    ///
    /// Without an explicit directory this is the interpreter's platlib for
    /// the prefix, so the module is importable. `<prefix>/lib` is the last
    /// resort when the interpreter cannot be asked.
    pub fn install_lib(&self, config: &Config) -> PathBuf {
        if let Some(dir) = self
            .install_lib
            .clone()
            .or_else(|| config.install.install_lib.clone())
        {
            return dir;
        }

        let prefix = self.prefix(config);
        runtime::platlib(self.build.platform, config, &prefix).unwrap_or_else(|| prefix.join("lib"))
    }

    fn staged(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => change_root(root, path),
            None => path.to_path_buf(),
        }
    }
}

/// Result of an install.
#[derive(Debug)]
pub struct InstallResult {
    pub package: PackageDescriptor,
    /// Installed files, module first
    pub installed: Vec<PathBuf>,
}

/// Build (unless skipped) and install the module and its documentation.
pub fn install(opts: &InstallOptions, config: &Config) -> Result<InstallResult> {
    let (package, module) = if opts.skip_build {
        let (package, plan) = build::plan(&opts.build, config)?;
        let Some(module) = plan.output().map(Path::to_path_buf) else {
            bail!("build plan for `{}` has no output", plan.module);
        };
        if !module.is_file() {
            bail!(
                "module {} has not been built; run `pcapy build` first or drop --skip-build",
                module.display()
            );
        }
        (package, module)
    } else {
        let result = build::build(&opts.build, config)?;
        (result.package, result.artifact.path)
    };

    let mut installed = Vec::new();

    let lib_dir = opts.staged(&opts.install_lib(config));
    let dst = copy_into(&module, &lib_dir)?;
    tracing::info!("Installed {}", dst.display());
    installed.push(dst);

    let prefix = opts.prefix(config);
    for data in &package.data_files {
        let dir = opts.staged(&prefix.join(&data.dir));
        for file in &data.files {
            let src = opts.build.source_dir.join(file);
            let dst = copy_into(&src, &dir)
                .with_context(|| format!("failed to install data file `{}`", file.display()))?;
            tracing::debug!("Installed {}", dst.display());
            installed.push(dst);
        }
    }

    if let Some(record) = &opts.record {
        write_record(record, &installed)?;
    }

    Ok(InstallResult { package, installed })
}

fn write_record(path: &Path, files: &[PathBuf]) -> Result<()> {
    let mut contents = String::new();
    for file in files {
        contents.push_str(&file.display().to_string());
        contents.push('\n');
    }
    write_string(path, &contents)?;
    tracing::debug!("Wrote install record {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::package::DOC_FILES;
    use crate::core::platform::Platform;
    use std::fs;
    use tempfile::TempDir;

    fn source_tree(tmp: &TempDir) -> PathBuf {
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("build")).unwrap();
        fs::write(src.join("build/pcapy.so"), "module").unwrap();
        for doc in DOC_FILES {
            fs::write(src.join(doc), doc).unwrap();
        }
        src
    }

    /// Config whose interpreter cannot be found.
    fn no_python() -> Config {
        let mut config = Config::default();
        config.build.python = Some("pcapy-no-such-python".to_string());
        config
    }

    fn options(tmp: &TempDir, src: PathBuf) -> InstallOptions {
        InstallOptions {
            build: BuildOptions {
                source_dir: src,
                platform: Platform::Posix,
                ..Default::default()
            },
            prefix: Some(PathBuf::from("/usr/local")),
            root: Some(tmp.path().join("stage")),
            skip_build: true,
            record: Some(tmp.path().join("files.txt")),
            ..Default::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_install_skip_build_stages_module_and_docs() {
        let tmp = TempDir::new().unwrap();
        let src = source_tree(&tmp);
        let opts = options(&tmp, src);

        let result = install(&opts, &no_python()).unwrap();

        let stage = tmp.path().join("stage/usr/local");
        assert_eq!(result.installed[0], stage.join("lib/pcapy.so"));
        assert_eq!(result.installed.len(), 1 + DOC_FILES.len());

        let doc_dir = stage.join("share/doc/pcapy-0.10.5");
        assert_eq!(fs::read_to_string(doc_dir.join("LICENSE")).unwrap(), "LICENSE");

        let record = fs::read_to_string(tmp.path().join("files.txt")).unwrap();
        assert_eq!(record.lines().count(), 4);
        assert!(record.lines().any(|l| l.ends_with("pcapy.html")));
    }

    #[test]
    fn test_missing_doc_file_fails() {
        let tmp = TempDir::new().unwrap();
        let src = source_tree(&tmp);
        fs::remove_file(src.join("pcapy.html")).unwrap();

        let err = install(&options(&tmp, src), &no_python()).unwrap_err();
        assert!(format!("{:#}", err).contains("pcapy.html"));
    }

    #[test]
    fn test_skip_build_requires_module() {
        let tmp = TempDir::new().unwrap();
        let src = source_tree(&tmp);
        fs::remove_file(src.join("build/pcapy.so")).unwrap();

        let err = install(&options(&tmp, src), &no_python()).unwrap_err();
        assert!(err.to_string().contains("has not been built"));
    }

    #[test]
    fn test_install_lib_falls_back_under_prefix() {
        let mut config = no_python();
        let opts = InstallOptions::default();
        assert_eq!(opts.install_lib(&config), PathBuf::from("/usr/local/lib"));

        config.install.prefix = Some(PathBuf::from("/opt/pcapy"));
        assert_eq!(opts.install_lib(&config), PathBuf::from("/opt/pcapy/lib"));
    }

    #[test]
    fn test_explicit_install_lib_wins() {
        let mut config = no_python();
        config.install.install_lib = Some(PathBuf::from("/opt/site"));

        let mut opts = InstallOptions::default();
        assert_eq!(opts.install_lib(&config), PathBuf::from("/opt/site"));

        opts.install_lib = Some(PathBuf::from("/srv/site"));
        assert_eq!(opts.install_lib(&config), PathBuf::from("/srv/site"));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_lib_is_interpreter_platlib() {
        use crate::builder::runtime::tests::fake_python;

        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.python = Some(fake_python(tmp.path()).display().to_string());

        let opts = InstallOptions {
            build: BuildOptions {
                platform: Platform::Posix,
                ..Default::default()
            },
            prefix: Some(PathBuf::from("/opt/pcapy")),
            ..Default::default()
        };
        assert_eq!(
            opts.install_lib(&config),
            PathBuf::from("/opt/pcapy/site-packages")
        );
    }
}
