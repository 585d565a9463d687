//! Entity extraction
//!
//! Inference is blocking, so it runs on the blocking pool behind a
//! semaphore. The permit moves into the blocking task: if the caller gives
//! up (timeout or dropped request), the slot stays taken until the model
//! call really returns.

use crate::config::{PipelineConfig, SpanAggregation};
use crate::decoder::decode_spans;
use crate::error::PipelineError;
use calabi_domain::token::is_monotonic;
use calabi_domain::traits::InferenceModel;
use calabi_domain::{EntitySpan, LabelDistribution, Token};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs the model over tokens and decodes entity spans
pub struct EntityExtractor<M> {
    model: Arc<M>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    aggregation: SpanAggregation,
    confidence_threshold: f32,
}

impl<M> EntityExtractor<M>
where
    M: InferenceModel + Send + Sync + 'static,
    M::Error: std::fmt::Display,
{
    /// Create an extractor sharing `model`
    pub fn new(model: Arc<M>, config: &PipelineConfig) -> Self {
        Self {
            model,
            permits: Arc::new(Semaphore::new(config.max_concurrent_inferences)),
            timeout: config.inference_timeout(),
            aggregation: config.aggregation,
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Extract entity spans from tokens of a single `normalize` call
    pub async fn extract(&self, tokens: &[Token]) -> Result<Vec<EntitySpan>, PipelineError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        if !is_monotonic(tokens) {
            return Err(PipelineError::InvalidInput(
                "token offsets must be strictly increasing".to_string(),
            ));
        }

        let labels = self.infer(tokens.to_vec()).await?;
        if labels.len() != tokens.len() {
            warn!(
                "Model '{}' returned {} labels for {} tokens",
                self.model.name(),
                labels.len(),
                tokens.len()
            );
            return Err(PipelineError::ModelUnavailable(format!(
                "model returned {} labels for {} tokens",
                labels.len(),
                tokens.len()
            )));
        }

        let spans = decode_spans(tokens, &labels, self.aggregation, self.confidence_threshold);
        debug!("Decoded {} spans from {} tokens", spans.len(), tokens.len());
        Ok(spans)
    }

    /// Run the model's own health check under the inference timeout
    pub async fn health_check(&self) -> Result<(), PipelineError> {
        let model = Arc::clone(&self.model);
        let check = tokio::task::spawn_blocking(move || {
            model
                .health_check()
                .map_err(|e| PipelineError::ModelUnavailable(e.to_string()))
        });

        timeout(self.timeout, check)
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout_ms()))?
            .map_err(|e| PipelineError::ModelUnavailable(format!("Task join error: {}", e)))?
    }

    /// Call the model off the async executor
    async fn infer(&self, tokens: Vec<Token>) -> Result<Vec<LabelDistribution>, PipelineError> {
        let permits = Arc::clone(&self.permits);
        let model = Arc::clone(&self.model);

        let call = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::ModelUnavailable("inference pool closed".to_string()))?;

            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                model
                    .infer(&tokens)
                    .map_err(|e| PipelineError::ModelUnavailable(e.to_string()))
            })
            .await
            .map_err(|e| PipelineError::ModelUnavailable(format!("Task join error: {}", e)))?
        };

        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                info!("Inference timed out after {} ms", self.timeout_ms());
                Err(PipelineError::Timeout(self.timeout_ms()))
            }
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}
