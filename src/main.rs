use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod calibrate;
mod config;

use app::App;
use config::load_settings;

/// F1 start-lights reaction timer
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Settings file; defaults to ./lightsout.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the game window (default)
    Run,
    /// Play trials headless with a scripted reaction to measure timer overshoot
    Calibrate {
        #[arg(long, default_value_t = 10)]
        trials: usize,
        #[arg(long, default_value_t = 250)]
        reaction_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => App::new(settings)?.run()?,
        Command::Calibrate {
            trials,
            reaction_ms,
        } => {
            calibrate::run(&settings, trials, reaction_ms)?;
        }
    }

    Ok(())
}
