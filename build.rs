//! Links the system packet-capture library for the `capture` feature.
//!
//! Uses the same platform table as the `pcapy build` command, so the Rust
//! binding and the native module link against the same libraries.

use std::env;

#[allow(dead_code)]
#[path = "src/core/platform.rs"]
mod platform;

use platform::{Platform, PlatformConfig};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/core/platform.rs");
    println!("cargo:rerun-if-env-changed=PCAPY_WPCAP_SDK");
    println!("cargo:rustc-check-cfg=cfg(pcapy_win32)");

    let os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let mut config = PlatformConfig::for_platform(Platform::from_target_os(&os));

    if let Ok(root) = env::var("PCAPY_WPCAP_SDK") {
        if !root.trim().is_empty() {
            config = config.with_sdk_root(&root);
        }
    }

    if config.defines("WIN32") {
        println!("cargo:rustc-cfg=pcapy_win32");
    }

    if env::var_os("CARGO_FEATURE_CAPTURE").is_none() {
        return;
    }

    // 64-bit import libraries live one level down in the developer pack
    if config.platform == Platform::Windows
        && env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("x86_64")
    {
        for dir in &config.library_dirs {
            println!(r"cargo:rustc-link-search=native={}\x64", dir);
        }
    }

    for dir in &config.library_dirs {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    for lib in &config.libraries {
        println!("cargo:rustc-link-lib={}", lib);
    }
}
