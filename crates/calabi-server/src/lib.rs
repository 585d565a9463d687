//! Calabi Server
//!
//! HTTP transport for the NLP pipeline: `/nlp/ner`, `/nlp/suggest` and
//! `/health`. Configuration, the model and the vocabulary are loaded once
//! at startup and shared by every request.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use calabi_model::ModelError;
use calabi_nlp::{Pipeline, PipelineError};
use calabi_vocab::{VocabError, Vocabulary};
use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Model failed to load
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Vocabulary failed to load
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabError),

    /// Pipeline rejected its configuration
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Initialize logging from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding binaries)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load the model and vocabulary and build the shared state
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    info!("Loading model {}", config.model.reference());
    let model = config.model.build()?;

    let vocabulary = match &config.vocabulary.path {
        Some(path) => Vocabulary::from_file(path)?,
        None => Vocabulary::builtin(),
    };
    info!("Vocabulary has {} terms", vocabulary.len());

    let pipeline = Pipeline::new(config.pipeline.clone(), Arc::new(model), Arc::new(vocabulary))?;

    Ok(AppState {
        pipeline: Arc::new(pipeline),
    })
}

/// Start the HTTP server
///
/// Builds the pipeline from `config` and serves until the process exits.
/// Logging is set up by the caller with [`init_tracing`], before the
/// configuration is loaded.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Calabi NLP server");
    info!("Bind address: {}", config.bind_addr());

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
