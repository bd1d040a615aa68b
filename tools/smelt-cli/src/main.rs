//! Smelt CLI - build tool for shader fragment and shader libraries
//!
//! # Commands
//!
//! - `smelt info` - Print a summary of a library file
//! - `smelt unpack` - Write a library's records out as individual files
//! - `smelt build` - Enumerate, assemble and compile builder permutations
//!
//! # Usage
//!
//! ```bash
//! # Inspect either container kind
//! smelt info shaders.lib
//!
//! # Spill records to a directory
//! smelt unpack shaders.lib -o unpacked/
//!
//! # Bake every builder permutation into compiled shader records
//! smelt build shaders.lib --fragments fragments.lib -o baked.lib
//!
//! # Assemble only, write the HLSL sources instead
//! smelt build shaders.lib --fragments fragments.lib -o sources/ --dry-run
//! ```

mod build;
mod container;
mod info;
mod unpack;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Smelt CLI - build tool for shader libraries
#[derive(Parser)]
#[command(name = "smelt")]
#[command(about = "Build tool for shader fragment permutation libraries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a fragment or shader library
    Info(info::InfoArgs),

    /// Write a library's records out as individual files
    Unpack(unpack::UnpackArgs),

    /// Enumerate, assemble and compile builder permutations
    Build(build::BuildArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Unpack(args) => unpack::execute(args),
        Commands::Build(args) => build::execute(args),
    }
}
