//! pcapy CLI - build and install the pcapy extension module

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default = if cli.verbose { "pcapy=debug" } else { "pcapy=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Config(args) => commands::config::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
        #[cfg(feature = "capture")]
        Commands::Devices(args) => commands::devices::execute(args),
        #[cfg(feature = "capture")]
        Commands::Live(args) => commands::live::execute(args),
        #[cfg(feature = "capture")]
        Commands::Read(args) => commands::read::execute(args),
        #[cfg(feature = "capture")]
        Commands::Compile(args) => commands::compile::execute(args),
    }
}
