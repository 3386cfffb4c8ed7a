//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use pcapy::core::Platform;

/// pcapy - build and install the pcapy packet-capture extension
#[derive(Parser)]
#[command(name = "pcapy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link the extension module
    Build(BuildArgs),

    /// Build, then install the module and its documentation
    Install(InstallArgs),

    /// Remove build outputs
    Clean(CleanArgs),

    /// Show the resolved build configuration
    Config(ConfigArgs),

    /// Show the compilers and linker command in use
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// List capture devices
    #[cfg(feature = "capture")]
    Devices(DevicesArgs),

    /// Capture packets from a network interface
    #[cfg(feature = "capture")]
    Live(LiveArgs),

    /// Read packets from a savefile
    #[cfg(feature = "capture")]
    Read(ReadArgs),

    /// Compile a BPF filter and print its instructions
    #[cfg(feature = "capture")]
    Compile(CompileArgs),
}

/// Where the sources are and which platform to build for.
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Directory containing the native sources and docs
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Build output directory (default: <source-dir>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Target platform: posix or windows (default: host)
    #[arg(long)]
    pub platform: Option<Platform>,
}

#[derive(Args, Clone)]
pub struct CompileFlags {
    /// Shared-module linker command (overrides LDSHARED)
    #[arg(long)]
    pub ldshared: Option<String>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Rebuild even if outputs are up to date
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Emit build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Installation prefix (default: /usr/local)
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Stage the installation under this directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Directory for the module (default: the interpreter's platlib)
    #[arg(long)]
    pub install_lib: Option<PathBuf>,

    /// Install an already built module
    #[arg(long)]
    pub skip_build: bool,

    /// Write the list of installed files to this file
    #[arg(long)]
    pub record: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Directory containing the native sources
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Build output directory (default: <source-dir>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Remove the whole build directory, including the module
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Shared-module linker command (overrides LDSHARED)
    #[arg(long)]
    pub ldshared: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Directory whose .pcapy/config.toml is read
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Shared-module linker command (overrides LDSHARED)
    #[arg(long)]
    pub ldshared: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(feature = "capture")]
#[derive(Args)]
pub struct DevicesArgs {
    /// Only print the default device
    #[arg(long)]
    pub default: bool,
}

/// Options shared by `live` and `read`.
#[cfg(feature = "capture")]
#[derive(Args)]
pub struct PacketArgs {
    /// BPF filter expression
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop after this many packets
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Also write packets to this savefile
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}

#[cfg(feature = "capture")]
#[derive(Args)]
pub struct LiveArgs {
    /// Interface to capture on (default: first device)
    pub device: Option<String>,

    /// Snapshot length
    #[arg(long, default_value_t = 65535)]
    pub snaplen: i32,

    /// Put the interface into promiscuous mode
    #[arg(long)]
    pub promisc: bool,

    /// Read timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: i32,

    #[command(flatten)]
    pub packets: PacketArgs,
}

#[cfg(feature = "capture")]
#[derive(Args)]
pub struct ReadArgs {
    /// Savefile to read
    pub file: PathBuf,

    #[command(flatten)]
    pub packets: PacketArgs,
}

#[cfg(feature = "capture")]
#[derive(Args)]
pub struct CompileArgs {
    /// Filter expression
    pub filter: String,

    /// Data link type (DLT_* number)
    #[arg(long, default_value_t = 1)]
    pub linktype: i32,

    /// Snapshot length
    #[arg(long, default_value_t = 65535)]
    pub snaplen: i32,

    /// Netmask of the capture network
    #[arg(long, default_value = "0.0.0.0")]
    pub netmask: std::net::Ipv4Addr,

    /// Disable the optimizer
    #[arg(long)]
    pub no_optimize: bool,
}
