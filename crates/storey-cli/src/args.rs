//! Command-line argument definitions for the Storey CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the texture catalog,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Storey floor-plan exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the floor plan or export request (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output GLB file
    #[arg(short, long, default_value = "out.glb")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Path to a texture catalog (JSON), replacing the input's `texturesByType`
    #[arg(short, long)]
    pub textures: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
