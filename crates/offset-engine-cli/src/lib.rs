//! Command-line front end for offset-engine.
//!
//! Parses frequency strings such as `2BQ-MAR` or `CBH`, fills custom
//! calendars and business hours in from configuration, and renders results
//! as text or JSON.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, Direction};
pub use config::Config;
