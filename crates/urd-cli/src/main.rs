use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use urd_cli::commands::{add, checkpoint, delete, list, resume, status, stop, toggle};
use urd_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::List { json } => list::run(&mut out, &config, json)?,
        Commands::Add { name, at } => add::run(&mut out, &config, &name, at)?,
        Commands::Delete { stream, yes } => delete::run(&mut out, &config, &stream, yes)?,
        Commands::Toggle { stream } => toggle::run(&mut out, &config, &stream)?,
        Commands::Stop => stop::run(&mut out, &config)?,
        Commands::Continue => resume::run(&mut out, &config)?,
        Commands::Checkpoint => checkpoint::run(&mut out, &config)?,
        Commands::Status => status::run(&mut out, &config)?,
    }

    out.flush()?;
    Ok(())
}
