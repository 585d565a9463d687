//! Calabi NLP server
//!
//! Starts the HTTP server for entity extraction and term suggestion.

use calabi_server::{config::ServerConfig, init_tracing, start_server, ServerError};
use std::env;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    // Before loading config so its .env and override logs are kept
    init_tracing();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::load(Some(Path::new(&args[2])))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServerConfig::load(None)?
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Calabi NLP Server - entity extraction and term suggestion");
    println!();
    println!("USAGE:");
    println!("    calabi-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT (also read from .env):");
    println!("    CALABI_BIND_ADDRESS, CALABI_BIND_PORT");
    println!("    CALABI_MODEL_PATH          lexicon model file");
    println!("    CALABI_MODEL_ENDPOINT      remote inference server (with CALABI_MODEL_NAME)");
    println!("    CALABI_VOCABULARY_PATH     vocabulary file");
    println!("    CALABI_CONFIDENCE_THRESHOLD, CALABI_MAX_SUGGESTIONS");
    println!("    RUST_LOG                   log filter (default: info)");
    println!();
}
