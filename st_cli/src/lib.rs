//! Command-line harness for Swiss-system tournaments.
//!
//! Parses a single command, runs it through a [`swiss_tournament::SwissManager`]
//! and renders the result as a table or JSON.

pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

pub use commands::{Command, ParseError, execute, parse_command};
pub use config::{CliConfig, ConfigError};
pub use output::Format;
