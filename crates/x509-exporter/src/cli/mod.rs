//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

use crate::logging;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = commands::Context {
        config_path: cli.config,
        verbose: cli.verbose,
    };

    match cli.command {
        None => commands::serve::execute(ctx, args::ServeArgs::default()).await,
        Some(Commands::Serve(args)) => commands::serve::execute(ctx, args).await,
        Some(Commands::Probe(args)) => commands::probe::execute(ctx, args).await,
        Some(Commands::Config) => commands::config::execute(&ctx),
        Some(Commands::Release(args)) => commands::release::execute(args),
    }
}
