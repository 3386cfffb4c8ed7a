//! Core data structures for pcapy.
//!
//! - Platform build configuration table
//! - Package and extension descriptor
//! - Source languages

pub mod language;
pub mod package;
pub mod platform;

pub use language::Language;
pub use package::{DataFiles, Extension, PackageDescriptor};
pub use platform::{Platform, PlatformConfig};
