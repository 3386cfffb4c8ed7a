//! Build plan generation.
//!
//! A BuildPlan describes every compile step and the final link step needed
//! to produce the extension module. Plans are plain data: they can be
//! printed as JSON (`pcapy build --plan`) without running anything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::toolchain::{CommandSpec, CompileInput, Language, LinkInput, Toolchain};
use crate::core::package::Extension;

/// Where the plan reads sources and writes outputs, plus user flags.
#[derive(Debug, Clone, Default)]
pub struct PlanInputs {
    /// Directory the extension's source paths are relative to
    pub source_dir: PathBuf,
    /// Output directory (objects go to `<build_dir>/temp`)
    pub build_dir: PathBuf,
    /// Extra include directories (after the platform ones)
    pub include_dirs: Vec<String>,
    /// Extra library directories (after the platform ones)
    pub library_dirs: Vec<String>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// A complete build plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Extension module name
    pub module: String,

    /// Target platform
    pub platform: String,

    /// All build steps in execution order
    pub steps: Vec<BuildStep>,
}

/// A build step in the plan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildStep {
    /// Compile a source file to an object file
    Compile(CompileStep),
    /// Link objects into the shared module
    Link(LinkStep),
}

/// A single compilation step.
#[derive(Debug, Clone, Serialize)]
pub struct CompileStep {
    /// Source file
    pub source: PathBuf,

    /// Output object file
    pub output: PathBuf,

    /// Source language
    pub language: Language,

    /// Command to run
    pub command: CommandSpec,
}

/// The link step producing the module.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStep {
    /// Object files, in source order
    pub objects: Vec<PathBuf>,

    /// Output module
    pub output: PathBuf,

    /// Command to run
    pub command: CommandSpec,
}

impl BuildPlan {
    /// Plan the compilation and link of an extension with a toolchain.
    pub fn new(ext: &Extension, toolchain: &dyn Toolchain, inputs: &PlanInputs) -> Self {
        let temp_dir = inputs.build_dir.join("temp");

        let include_dirs: Vec<PathBuf> = ext
            .include_dirs
            .iter()
            .chain(&inputs.include_dirs)
            .map(PathBuf::from)
            .collect();

        let defines: Vec<(String, Option<String>)> = ext
            .define_macros
            .iter()
            .map(|(name, value)| (name.clone(), Some(value.clone())))
            .collect();

        let mut steps = Vec::with_capacity(ext.sources.len() + 1);
        let mut objects = Vec::with_capacity(ext.sources.len());

        for source in &ext.sources {
            let language = Language::from_source(source);
            let output = temp_dir
                .join(source)
                .with_extension(toolchain.object_extension());

            let input = CompileInput {
                source: inputs.source_dir.join(source),
                output: output.clone(),
                include_dirs: include_dirs.clone(),
                defines: defines.clone(),
                cflags: inputs.cflags.clone(),
            };

            let command = toolchain.compile_command(&input, language);
            objects.push(output.clone());
            steps.push(BuildStep::Compile(CompileStep {
                source: input.source,
                output,
                language,
                command,
            }));
        }

        let output = inputs.build_dir.join(ext.file_name());
        let link_input = LinkInput {
            objects: objects.clone(),
            output: output.clone(),
            lib_dirs: ext
                .library_dirs
                .iter()
                .chain(&inputs.library_dirs)
                .map(PathBuf::from)
                .collect(),
            libs: ext.libraries.clone(),
            ldflags: inputs.ldflags.clone(),
        };
        let command = toolchain.link_shared_command(&link_input);
        steps.push(BuildStep::Link(LinkStep {
            objects,
            output,
            command,
        }));

        BuildPlan {
            module: ext.name.clone(),
            platform: ext.platform.as_str().to_string(),
            steps,
        }
    }

    /// Compile steps, in source order.
    pub fn compile_steps(&self) -> impl Iterator<Item = &CompileStep> {
        self.steps.iter().filter_map(|s| match s {
            BuildStep::Compile(c) => Some(c),
            BuildStep::Link(_) => None,
        })
    }

    /// The link step.
    pub fn link_step(&self) -> Option<&LinkStep> {
        self.steps.iter().find_map(|s| match s {
            BuildStep::Link(l) => Some(l),
            BuildStep::Compile(_) => None,
        })
    }

    /// Path of the module this plan produces.
    pub fn output(&self) -> Option<&Path> {
        self.link_step().map(|l| l.output.as_path())
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }
}
