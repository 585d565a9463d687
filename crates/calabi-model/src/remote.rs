//! Remote inference server backend
//!
//! Sends token sequences to an HTTP inference server that hosts the real
//! sequence-labeling model.
//!
//! # Protocol
//!
//! - `POST {endpoint}/infer` with `{"model": "...", "tokens": ["Book", "a", ...]}`
//!   returns `{"labels": [{"scores": [["O", 0.98], ["B-LOC", 0.02]]}, ...]}`
//! - `GET {endpoint}/health` returns any 2xx when the model is loaded
//!
//! # Examples
//!
//! ```no_run
//! use calabi_model::RemoteModel;
//!
//! let model = RemoteModel::new("http://localhost:9000", "gliner-multi");
//! ```

use crate::ModelError;
use calabi_domain::traits::InferenceModel;
use calabi_domain::{LabelDistribution, Token};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default inference server endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000";

/// Default HTTP timeout for a single inference call (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP-backed sequence labeler
#[derive(Debug, Clone)]
pub struct RemoteModel {
    endpoint: String,
    model: String,
    name: String,
    client: reqwest::Client,
}

/// Request body for the infer API
#[derive(Serialize)]
struct InferRequest<'a> {
    model: &'a str,
    tokens: Vec<&'a str>,
}

/// Response from the infer API
#[derive(Deserialize)]
struct InferResponse {
    labels: Vec<LabelDistribution>,
}

impl RemoteModel {
    /// Create a new remote model client
    ///
    /// # Parameters
    ///
    /// - `endpoint`: server base URL (e.g., "http://localhost:9000")
    /// - `model`: model identifier understood by the server
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let model = model.into();
        // Builder only fails when the TLS backend cannot initialize
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            name: format!("remote:{}", model),
            endpoint,
            model,
            client,
        }
    }

    /// Server base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Label tokens using the remote server
    ///
    /// # Errors
    ///
    /// - `Communication` if the server is unreachable or returns an error status
    /// - `NotAvailable` if the server does not know the model (HTTP 404)
    /// - `InvalidOutput` if the response cannot be parsed
    pub async fn infer_async(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, ModelError> {
        let url = format!("{}/infer", self.endpoint);
        let body = InferRequest {
            model: &self.model,
            tokens: tokens.iter().map(|t| t.text.as_str()).collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ModelError::NotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: InferResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidOutput(format!("Failed to parse response: {}", e)))?;

        debug!("Remote model returned {} distributions", parsed.labels.len());
        Ok(parsed.labels)
    }

    /// Probe the server health endpoint
    pub async fn health_check_async(&self) -> Result<(), ModelError> {
        let url = format!("{}/health", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModelError::Communication(format!("Health probe failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ModelError::NotAvailable(format!(
                "{} reported HTTP {}",
                self.endpoint,
                response.status()
            )));
        }
        Ok(())
    }
}

/// Drive a future to completion from synchronous code
///
/// Inside a runtime's blocking pool the ambient handle is reused; anywhere
/// else a throwaway current-thread runtime is built.
fn block_on<F: Future>(future: F) -> Result<F::Output, ModelError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| ModelError::Inference(format!("Failed to create runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

impl InferenceModel for RemoteModel {
    type Error = ModelError;

    fn infer(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, Self::Error> {
        block_on(self.infer_async(tokens))?
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn health_check(&self) -> Result<(), Self::Error> {
        block_on(self.health_check_async())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_model_creation() {
        let model = RemoteModel::new("http://localhost:9000/", "gliner-multi");
        assert_eq!(model.endpoint(), "http://localhost:9000");
        assert_eq!(model.name(), "remote:gliner-multi");
    }

    #[test]
    fn test_response_format() {
        let json = r#"{"labels": [{"scores": [["O", 0.9], ["B-LOC", 0.1]]}, {"scores": [["B-DATE", 0.8]]}]}"#;
        let parsed: InferResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.labels.len(), 2);
        assert_eq!(parsed.labels[1].best().1, 0.8);
    }

    #[test]
    fn test_unreachable_server() {
        let model = RemoteModel::with_timeout("http://127.0.0.1:1", "none", Duration::from_secs(1));
        let result = model.infer(&[Token::new("Seoul", 0, 5)]);
        assert!(matches!(result, Err(ModelError::Communication(_))));
    }

    #[test]
    fn test_unreachable_server_is_unhealthy() {
        let model = RemoteModel::with_timeout("http://127.0.0.1:1", "none", Duration::from_secs(1));
        assert!(model.health_check().is_err());
    }
}
