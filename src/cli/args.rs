// src/cli/args.rs

use clap::Parser;
use std::path::PathBuf;

/// Jack language compiler front-end targeting the Hack VM.
#[derive(Parser)]
#[command(name = "jackc")]
#[command(version = "0.1.0")]
#[command(about = "Compiles .jack sources to Hack VM code", long_about = None)]
pub struct Cli {
    /// The .jack files to compile together (must include Main.jack)
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Dump ASTs for the external visualizer
    #[arg(long)]
    pub viz_ast: bool,

    /// Dump symbol tables and the registry for the external visualizer
    #[arg(long)]
    pub viz_checker: bool,

    /// Enable debug-level logging (RUST_LOG overrides)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
