//! `pcapy config` command
//!
//! Prints the platform build configuration and the extension descriptor
//! that `pcapy build` would use.

use anyhow::Result;

use crate::cli::{CompileFlags, ConfigArgs};
use pcapy::builder::toolchain::resolve_ldshared;
use pcapy::core::{PackageDescriptor, Platform};
use pcapy::ops::build::platform_config;

use super::build_options;

pub fn execute(args: ConfigArgs) -> Result<()> {
    let flags = CompileFlags {
        ldshared: args.ldshared,
        jobs: None,
        force: false,
    };
    let (opts, config) = build_options(args.source, flags);

    let table = platform_config(opts.platform, &config);
    let package = PackageDescriptor::pcapy(&table)?;

    let ldshared = match opts.platform {
        Platform::Posix => Some(resolve_ldshared(&config, opts.ldshared.as_deref())?),
        Platform::Windows => None,
    };

    if args.json {
        let value = serde_json::json!({
            "platform": opts.platform.as_str(),
            "build_dir": opts.build_dir(&config),
            "package": package,
            "ldshared": ldshared.as_ref().map(|ld| serde_json::json!({
                "detected": ld.detected,
                "effective": ld.effective.to_string(),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let ext = &package.ext_module;
    println!("Package:   {} {}", package.name, package.version);
    println!("Platform:  {}", opts.platform);
    println!("Module:    {}", ext.file_name());
    println!();

    println!("Sources:");
    for source in &ext.sources {
        println!("  {}", source.display());
    }
    println!();

    print_list("Include dirs", &ext.include_dirs);
    print_list("Library dirs", &ext.library_dirs);
    print_list("Libraries", &ext.libraries);

    let macros: Vec<String> = ext
        .define_macros
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    print_list("Macros", &macros);

    if let Some(ld) = &ldshared {
        println!("LDSHARED:  {}", ld.effective);
        if ld.detected != ld.effective.to_string() {
            println!("           (was {})", ld.detected);
        }
    }

    println!("Build dir: {}", opts.build_dir(&config).display());
    for data in &package.data_files {
        println!("Docs:      <prefix>/{}", data.dir.display());
    }

    Ok(())
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        println!("{}: (none)", label);
    } else {
        println!("{}: {}", label, items.join(", "));
    }
}
