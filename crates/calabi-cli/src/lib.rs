//! Calabi CLI library.
//!
//! Runs the NLP pipeline in-process: argument parsing, command execution
//! and output formatting. Configuration is shared with the server.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
