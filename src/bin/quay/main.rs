//! Quay CLI - inspect build plans for Swift packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::builder::BuildPlanError;
use quay::core::GraphError;
use quay::util::diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        if let Some(err) = e.downcast_ref::<BuildPlanError>() {
            diagnostic::emit(&err.to_diagnostic(), color);
        } else if let Some(err) = e.downcast_ref::<GraphError>() {
            diagnostic::emit(&err.to_diagnostic(), color);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Linkplan(args) => commands::linkplan::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
    }
}
