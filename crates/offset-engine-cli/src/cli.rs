//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Calendar offset arithmetic from the shell.
///
/// Frequencies are rule codes with an optional multiplier: `B`, `3B`,
/// `-2W-FRI`, `BQ-MAR`, `RE-N-DEC-FRI`. Custom-calendar codes (`C`, `CBH`,
/// `CBM`, `CBMS`) use the weekmask and holidays from the configuration.
#[derive(Debug, Parser)]
#[command(name = "offsets", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Step a timestamp by an offset.
    Apply {
        /// Timestamp, e.g. `2024-03-08`, `2024-03-08 09:30` or
        /// `2024-03-08 09:30 America/New_York`.
        timestamp: String,

        /// Frequency string; defaults to the configured `default_freq`.
        #[arg(short, long)]
        freq: Option<String>,

        /// Snap the result to midnight.
        #[arg(long)]
        normalize: bool,
    },

    /// Move a timestamp onto the offset if it is not already on it.
    Roll {
        timestamp: String,

        #[arg(short, long)]
        freq: Option<String>,

        #[arg(short, long, value_enum, default_value_t = Direction::Forward)]
        direction: Direction,
    },

    /// List the dates an offset generates.
    Range {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(short, long)]
        periods: Option<u64>,

        #[arg(short, long)]
        freq: Option<String>,
    },

    /// Show how a frequency string is understood.
    Describe {
        #[arg(short, long)]
        freq: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Forward,
    Back,
}
