//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Calabi CLI - extract entities and suggest terms from the command line.
#[derive(Debug, Parser)]
#[command(name = "calabi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (same format as the server's)
    #[arg(short, long, global = true, env = "CALABI_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract named entities from text
    Ner(NerArgs),

    /// Suggest vocabulary terms for text
    Suggest(SuggestArgs),

    /// Check that the model is loaded and responsive
    Health,
}

/// Arguments for the ner command.
#[derive(Debug, Parser)]
pub struct NerArgs {
    /// Input text (words are joined with spaces)
    #[arg(required = true)]
    pub text: Vec<String>,
}

/// Arguments for the suggest command.
#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Input text (words are joined with spaces)
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Seed from the best entity of this type (e.g. LOCATION, loc, date)
    #[arg(short = 't', long = "type")]
    pub entity_type: Option<String>,

    /// Maximum number of suggestions
    #[arg(short, long)]
    pub max: Option<usize>,

    /// Previously used phrase offered as a completion (repeatable)
    #[arg(long = "history")]
    pub history: Vec<String>,

    /// Popular tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}
