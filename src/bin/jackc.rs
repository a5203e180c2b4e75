// src/bin/jackc.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use jackc::cli::Cli;
use jackc::commands::compile::compile_files;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    compile_files(&cli.files, cli.viz_ast, cli.viz_checker)
}
