//! `pcapy toolchain` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ToolchainArgs;
use pcapy::builder::runtime::{self, PythonRuntime};
use pcapy::builder::toolchain::{resolve_ldshared, resolve_toolchain};
use pcapy::core::Platform;
use pcapy::util::config::{load_for_source_dir, PYTHON_INCLUDE_ENV, WPCAP_SDK_ENV};
use pcapy::util::process::{find_executable, version_line};

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let config = load_for_source_dir(&args.source_dir);
    let platform = Platform::host();
    let toolchain = resolve_toolchain(platform, &config, args.ldshared.as_deref())?;

    println!("Toolchain: {}", toolchain.platform().as_str());
    println!();

    show_program("CC", toolchain.compiler_path());
    show_program("CXX", toolchain.cxx_compiler_path());

    if platform == Platform::Posix {
        let ld = resolve_ldshared(&config, args.ldshared.as_deref())?;
        println!();
        println!("  LDSHARED (detected):  {}", ld.detected);
        println!("  LDSHARED (effective): {}", ld.effective);
    }

    println!();
    show_program("PY", PythonRuntime::from_config(&config).interpreter());
    match runtime::include_dir(platform, &config) {
        Some(dir) => println!("  Python headers: {}", dir.display()),
        None => println!("  Python headers: (not found)"),
    }

    println!();
    println!("  Platform: {}", platform);
    println!();

    println!("Environment:");
    for key in [
        "CC",
        "CXX",
        "LDSHARED",
        "CFLAGS",
        "LDFLAGS",
        WPCAP_SDK_ENV,
        "PYTHON",
        PYTHON_INCLUDE_ENV,
    ] {
        if let Ok(value) = std::env::var(key) {
            println!("  {}={}", key, value);
        }
    }

    Ok(())
}

fn show_program(label: &str, program: &Path) {
    match find_executable(program) {
        Some(path) => {
            println!("  {:<4} {}", format!("{}:", label), path.display());
            if let Some(version) = version_line(&path) {
                println!("       {}", version);
            }
        }
        None => println!("  {:<4} {} (not found)", format!("{}:", label), program.display()),
    }
}
