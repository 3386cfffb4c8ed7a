//! pcapy - build and install the pcapy packet-capture extension
//!
//! This crate describes the native `pcapy` module (sources, per-platform
//! compile and link inputs, documentation), drives the C/C++ toolchain to
//! build it, and installs the result. With the `capture` feature it also
//! links libpcap directly and exposes the same capture API to Rust.

pub mod builder;
pub mod capture;
pub mod core;
pub mod ops;
pub mod util;

pub use self::builder::fix_linker_driver;
pub use self::core::{PackageDescriptor, Platform, PlatformConfig};
pub use self::util::Config;
