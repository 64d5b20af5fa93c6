use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use offset_engine_cli::commands;
use offset_engine_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so piped output stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let output = match &cli.command {
        Commands::Apply {
            timestamp,
            freq,
            normalize,
        } => {
            let offset = commands::resolve_offset(freq.as_deref(), &config)?;
            commands::apply(&offset, timestamp, *normalize, cli.json)?
        }
        Commands::Roll {
            timestamp,
            freq,
            direction,
        } => {
            let offset = commands::resolve_offset(freq.as_deref(), &config)?;
            commands::roll(&offset, timestamp, *direction, cli.json)?
        }
        Commands::Range {
            start,
            end,
            periods,
            freq,
        } => {
            let offset = commands::resolve_offset(freq.as_deref(), &config)?;
            commands::range(&offset, start.as_deref(), end.as_deref(), *periods, cli.json)?
        }
        Commands::Describe { freq } => {
            let offset = commands::resolve_offset(freq.as_deref(), &config)?;
            commands::describe(&offset, cli.json)?
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
