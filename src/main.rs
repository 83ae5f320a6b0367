mod agents;
mod cli;
mod error;
mod report;
mod tasks;
mod workflow;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, UpdateArgs};
use colored::Colorize;
use std::process;
use tasks::UpkeepConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `--verbose` forces debug output, otherwise `RUST_LOG` applies with a warn default.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("upkeep=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("upkeep=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = UpkeepConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load built-in configuration".to_string(),
    })?;

    let code = match cli.command.unwrap_or(Commands::Update(UpdateArgs::default())) {
        Commands::Update(args) => workflow::execute_update(config, &args)?,
        Commands::Check { selection, json } => workflow::execute_check(config, &selection, json)?,
        Commands::List => {
            workflow::execute_list(&config)?;
            0
        }
        Commands::Versions => {
            workflow::execute_versions()?;
            0
        }
    };

    Ok(code)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("upkeep starting with args: {:?}", cli);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
