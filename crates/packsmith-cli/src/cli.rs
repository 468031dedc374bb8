//! CLI argument definitions for Packsmith.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "packsmith",
    version,
    about = "Dependency resolver and compile orderer for content packs",
    long_about = "Packsmith loads every pack manifest in a workspace, validates each pack's \
                  dependencies against the others, discards packs that cannot be satisfied, \
                  and compiles the rest in dependency order into Packsmith.lock."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the workspace's Packsmith.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every pack, compile in dependency order and write Packsmith.lock
    Resolve {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every pack without compiling or writing a lockfile
    Check,

    /// Display the resolved dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<u32>,
        /// Explain how a pack is reached from the top-level packs
        #[arg(long)]
        why: Option<String>,
        /// Show the packs that depend on a pack
        #[arg(long)]
        invert: Option<String>,
    },

    /// Create a Packsmith.toml and an empty pack root in the current directory
    Init,
}

pub fn parse() -> Cli {
    Cli::parse()
}
