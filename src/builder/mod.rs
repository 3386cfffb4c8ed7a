//! C/C++ build system.
//!
//! This module implements build planning, linker driver selection and the
//! native compiler driver for the extension module.

pub mod linker;
pub mod native;
pub mod plan;
pub mod runtime;
pub mod toolchain;

pub use linker::{fix_linker_driver, LinkerCommand};
pub use native::{Artifact, NativeBuilder};
pub use plan::{BuildPlan, BuildStep, PlanInputs};
pub use runtime::{PythonRuntime, RuntimePaths};
pub use toolchain::{
    resolve_ldshared, resolve_toolchain, CommandSpec, GccToolchain, LdShared, MsvcToolchain,
    Toolchain, ToolchainPlatform,
};
