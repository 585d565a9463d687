//! Configuration for the pipeline

use calabi_vocab::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How token confidences combine into a span confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanAggregation {
    /// Arithmetic mean of token confidences
    #[default]
    Mean,
    /// Weakest token confidence
    Min,
}

/// Weights of the composite relevance score
///
/// `relevance = clamp01(source_weight * source_score
///     + popularity_weight * popularity
///     - length_penalty * min(1, chars / 32))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Weight of the similarity to the seed
    pub source_weight: f32,
    /// Weight of the popularity signal
    pub popularity_weight: f32,
    /// Penalty applied in full to terms of 32 characters or more
    pub length_penalty: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            source_weight: 0.8,
            popularity_weight: 0.2,
            length_penalty: 0.05,
        }
    }
}

impl RankingWeights {
    /// Validate the weights
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("source_weight", self.source_weight),
            ("popularity_weight", self.popularity_weight),
            ("length_penalty", self.length_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }
        if self.source_weight + self.popularity_weight == 0.0 {
            return Err("source_weight and popularity_weight cannot both be 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for the pipeline
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Spans below this confidence are discarded
    pub confidence_threshold: f32,

    /// Candidates requested from the vocabulary per suggestion
    pub max_candidates: usize,

    /// Upper bound on suggestions returned
    pub max_suggestions: usize,

    /// Maximum input length in characters
    pub max_input_chars: usize,

    /// Lowercase token text during normalization
    pub lowercase: bool,

    /// Span confidence aggregation
    pub aggregation: SpanAggregation,

    /// Inference calls allowed to run at once (1 = single-flight)
    pub max_concurrent_inferences: usize,

    /// Maximum time for one inference call, queueing included (milliseconds)
    pub inference_timeout_ms: u64,

    /// Drop suggestions equal to the seed itself
    pub exclude_seed: bool,

    /// Score given to completions drawn from the caller's history
    pub history_score: f32,

    /// Score given to popular tags supplied by the caller
    pub tag_score: f32,

    /// Score given to entities found in the input, offered as tags
    pub entity_tag_score: f32,

    /// Relevance weights
    pub ranking: RankingWeights,

    /// Candidate generation
    pub generator: GeneratorConfig,
}

impl Default for PipelineConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_candidates: 50,
            max_suggestions: 20,
            max_input_chars: 10_000,
            lowercase: false,
            aggregation: SpanAggregation::Mean,
            max_concurrent_inferences: 4,
            inference_timeout_ms: 5_000,
            exclude_seed: true,
            history_score: 0.9,
            tag_score: 0.6,
            entity_tag_score: 0.65,
            ranking: RankingWeights::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Strict preset: confident spans only, single-flight inference
    pub fn strict() -> Self {
        Self {
            confidence_threshold: 0.75,
            aggregation: SpanAggregation::Min,
            max_concurrent_inferences: 1,
            max_input_chars: 2_000,
            ..Self::default()
        }
    }

    /// Lenient preset: low thresholds, fuzzy vocabulary lookup
    pub fn lenient() -> Self {
        Self {
            confidence_threshold: 0.3,
            max_candidates: 100,
            inference_timeout_ms: 15_000,
            generator: GeneratorConfig {
                min_similarity: 0.2,
                use_vector_index: true,
                ..GeneratorConfig::default()
            },
            ..Self::default()
        }
    }

    /// Get the inference timeout as a Duration
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.max_candidates == 0 {
            return Err("max_candidates must be greater than 0".to_string());
        }
        if self.max_suggestions == 0 {
            return Err("max_suggestions must be greater than 0".to_string());
        }
        if self.max_input_chars == 0 {
            return Err("max_input_chars must be greater than 0".to_string());
        }
        if self.max_concurrent_inferences == 0 {
            return Err("max_concurrent_inferences must be greater than 0".to_string());
        }
        if self.inference_timeout_ms == 0 {
            return Err("inference_timeout_ms must be greater than 0".to_string());
        }
        for (name, value) in [
            ("history_score", self.history_score),
            ("tag_score", self.tag_score),
            ("entity_tag_score", self.entity_tag_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }
        self.ranking.validate()?;
        self.generator.validate()?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
