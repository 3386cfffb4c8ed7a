//! Toolchain resolution.
//!
//! Compilers are taken by name from flags, environment and config. They are
//! not looked up on disk: a missing compiler fails when it is invoked, with
//! the operating system's own error.

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::builder::linker::{default_ldshared, fix_linker_driver, LinkerCommand};
use crate::core::platform::Platform;
use crate::util::config::Config;

use super::{GccToolchain, MsvcToolchain, Toolchain};

/// Default C compiler driver on POSIX.
const DEFAULT_CC: &str = "gcc";

/// The shared-module linker command before and after driver selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LdShared {
    /// Command as found in flags, environment, config or defaults
    pub detected: String,
    /// Command that will actually run
    pub effective: LinkerCommand,
}

/// Resolve `LDSHARED` and apply the C++ linker-driver fix.
///
/// `cli` wins over the (already environment-merged) config; otherwise the
/// default is derived from the C compiler name.
pub fn resolve_ldshared(config: &Config, cli: Option<&str>) -> Result<LdShared> {
    let cc = config.toolchain.cc.as_deref().unwrap_or(DEFAULT_CC);

    let detected = cli
        .map(str::to_string)
        .or_else(|| config.build.ldshared.clone())
        .unwrap_or_else(|| default_ldshared(cc));

    let fixed = fix_linker_driver(&detected);
    let Some(effective) = LinkerCommand::parse(&fixed) else {
        bail!("LDSHARED is empty; set it to a linker command such as `g++ -shared`");
    };

    Ok(LdShared { detected, effective })
}

/// Resolve the toolchain for a target platform.
///
/// POSIX targets get a GCC-style toolchain whose linker command went through
/// [`fix_linker_driver`]. Windows targets get MSVC, where the override does
/// not apply.
pub fn resolve_toolchain(
    platform: Platform,
    config: &Config,
    ldshared: Option<&str>,
) -> Result<Box<dyn Toolchain>> {
    match platform {
        Platform::Posix => {
            let cc = PathBuf::from(config.toolchain.cc.as_deref().unwrap_or(DEFAULT_CC));
            let cxx = config
                .toolchain
                .cxx
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| GccToolchain::infer_cxx(&cc));
            let ld = resolve_ldshared(config, ldshared)?;

            tracing::debug!(
                "Using toolchain: cc={}, cxx={}, ldshared={}",
                cc.display(),
                cxx.display(),
                ld.effective
            );

            Ok(Box::new(GccToolchain::new(cc, cxx, ld.effective)))
        }
        Platform::Windows => {
            let cl = PathBuf::from(config.toolchain.cc.as_deref().unwrap_or("cl"));
            let link = PathBuf::from(config.toolchain.link.as_deref().unwrap_or("link"));

            tracing::debug!("Using MSVC toolchain: cl={}, link={}", cl.display(), link.display());

            Ok(Box::new(MsvcToolchain::new(cl, link)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::ToolchainPlatform;

    #[test]
    fn test_default_ldshared_is_fixed() {
        let ld = resolve_ldshared(&Config::default(), None).unwrap();
        assert!(ld.detected.starts_with("gcc "));
        assert_eq!(ld.effective.program, PathBuf::from("g++"));
    }

    #[test]
    fn test_cli_ldshared_wins() {
        let mut config = Config::default();
        config.build.ldshared = Some("clang -shared".to_string());

        let ld = resolve_ldshared(&config, Some("gcc -pthread -shared")).unwrap();
        assert_eq!(ld.detected, "gcc -pthread -shared");
        assert_eq!(ld.effective.to_string(), "g++ -pthread -shared");

        let ld = resolve_ldshared(&config, None).unwrap();
        assert_eq!(ld.effective.to_string(), "clang -shared");
    }

    #[test]
    fn test_empty_ldshared_is_an_error() {
        assert!(resolve_ldshared(&Config::default(), Some("  ")).is_err());
    }

    #[test]
    fn test_posix_toolchain() {
        let mut config = Config::default();
        config.toolchain.cc = Some("clang".to_string());

        let tc = resolve_toolchain(Platform::Posix, &config, None).unwrap();
        assert_eq!(tc.platform(), ToolchainPlatform::Clang);
        assert_eq!(tc.cxx_compiler_path(), PathBuf::from("clang++").as_path());
        assert_eq!(tc.object_extension(), "o");
    }

    #[test]
    fn test_windows_toolchain() {
        let tc = resolve_toolchain(Platform::Windows, &Config::default(), None).unwrap();
        assert_eq!(tc.platform(), ToolchainPlatform::Msvc);
        assert_eq!(tc.compiler_path(), PathBuf::from("cl").as_path());
        assert_eq!(tc.object_extension(), "obj");
    }
}
