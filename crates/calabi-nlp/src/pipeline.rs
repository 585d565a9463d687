//! Pipeline orchestration
//!
//! ```text
//! extract_entities: text → normalize → extract
//! suggest_terms:    text → normalize → (extract → pick seed) → generate
//!                        → history / entity / tag completions → rank
//! ```

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::extractor::EntityExtractor;
use crate::normalizer::{normalized_text, Normalizer};
use crate::ranker::SuggestionRanker;
use calabi_domain::traits::InferenceModel;
use calabi_domain::{fold_term, Candidate, EntitySpan, EntityType, Suggestion, SuggestionSource};
use calabi_vocab::{CandidateGenerator, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-request options for [`Pipeline::suggest_terms`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestOptions {
    /// Seed from the best span of this type instead of the whole text
    pub entity_type: Option<EntityType>,
    /// Suggestions wanted; capped by the configured maximum
    pub max_results: Option<usize>,
    /// Phrases the caller used before, offered as completions of the seed
    pub history: Vec<String>,
    /// Tags popular with the caller
    pub popular_tags: Vec<String>,
}

impl SuggestOptions {
    /// Options seeding from a span of `entity_type`
    pub fn for_type(entity_type: EntityType) -> Self {
        Self {
            entity_type: Some(entity_type),
            ..Self::default()
        }
    }

    /// Set the number of suggestions wanted
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Readiness of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Model loaded and responsive
    pub ready: bool,
    /// Model name
    pub model: String,
    /// Terms in the loaded vocabulary
    pub vocabulary_terms: usize,
    /// Failure detail when not ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The NLP pipeline
///
/// Holds the configuration, model and vocabulary for the life of the
/// process. Every operation takes `&self`, so one instance behind an `Arc`
/// serves concurrent requests.
pub struct Pipeline<M> {
    config: Arc<PipelineConfig>,
    normalizer: Normalizer,
    extractor: EntityExtractor<M>,
    generator: CandidateGenerator,
    ranker: SuggestionRanker,
}

impl<M> Pipeline<M>
where
    M: InferenceModel + Send + Sync + 'static,
    M::Error: std::fmt::Display,
{
    /// Create a pipeline, validating the configuration
    pub fn new(
        config: PipelineConfig,
        model: Arc<M>,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Configuration)?;

        let generator = CandidateGenerator::from_config(vocabulary, config.generator.clone())?;
        let normalizer = Normalizer::new(config.max_input_chars, config.lowercase);
        let extractor = EntityExtractor::new(model, &config);
        let ranker = SuggestionRanker::new(config.ranking.clone());

        info!(
            "Pipeline ready: model '{}', {} vocabulary terms, vector index {}",
            extractor.model_name(),
            generator.vocabulary().len(),
            if generator.has_vector_index() { "on" } else { "off" }
        );

        Ok(Self {
            config: Arc::new(config),
            normalizer,
            extractor,
            generator,
            ranker,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the loaded model
    pub fn model_name(&self) -> &str {
        self.extractor.model_name()
    }

    /// Entities found in `raw_text`, ordered by position
    pub async fn extract_entities(&self, raw_text: &str) -> Result<Vec<EntitySpan>, PipelineError> {
        let tokens = self.normalizer.normalize(raw_text)?;
        debug!("Normalized input into {} tokens", tokens.len());
        self.extractor.extract(&tokens).await
    }

    /// Terms related to `raw_text`, best first
    ///
    /// Entities found in the text are offered as tags alongside the vocabulary
    /// matches. Returns an empty list for blank input or when no span of the
    /// requested type is found.
    pub async fn suggest_terms(
        &self,
        raw_text: &str,
        options: SuggestOptions,
    ) -> Result<Vec<Suggestion>, PipelineError> {
        let limit = match options.max_results {
            Some(0) => {
                return Err(PipelineError::InvalidInput(
                    "max_results must be at least 1".to_string(),
                ))
            }
            Some(n) => n.min(self.config.max_suggestions),
            None => self.config.max_suggestions,
        };

        let tokens = self.normalizer.normalize(raw_text)?;
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let spans = self.extractor.extract(&tokens).await?;
        let seed = match options.entity_type {
            Some(wanted) => match best_span(&spans, wanted) {
                Some(span) => span.text.clone(),
                None => {
                    debug!("No {} span found, no suggestions", wanted);
                    return Ok(Vec::new());
                }
            },
            None => normalized_text(&tokens),
        };
        let folded_seed = fold_term(&seed);

        let mut candidates = self.generator.generate_filtered(
            &seed,
            self.config.max_candidates,
            options.entity_type,
        )?;
        candidates.extend(self.history_candidates(&folded_seed, &options.history));
        candidates.extend(self.entity_tag_candidates(&spans));
        candidates.extend(self.tag_candidates(&options.popular_tags));

        if self.config.exclude_seed {
            candidates.retain(|c| fold_term(&c.term) != folded_seed);
        }

        let suggestions = self.ranker.rank(candidates, limit);
        info!("Suggested {} terms for seed '{}'", suggestions.len(), seed);
        Ok(suggestions)
    }

    /// Readiness report from the model's own health check
    pub async fn health(&self) -> HealthReport {
        let (ready, detail) = match self.extractor.health_check().await {
            Ok(()) => (true, None),
            Err(e) => {
                warn!("Health check failed: {}", e);
                (false, Some(e.to_string()))
            }
        };

        HealthReport {
            ready,
            model: self.model_name().to_string(),
            vocabulary_terms: self.generator.vocabulary().len(),
            detail,
        }
    }

    /// History phrases that extend the seed
    fn history_candidates(&self, folded_seed: &str, history: &[String]) -> Vec<Candidate> {
        history
            .iter()
            .filter(|phrase| {
                let folded = fold_term(phrase);
                folded.starts_with(folded_seed) && folded != folded_seed
            })
            .map(|phrase| {
                Candidate::new(phrase.trim(), self.config.history_score)
                    .with_source(SuggestionSource::History)
            })
            .collect()
    }

    /// Entities of the input itself, one tag per distinct surface form
    fn entity_tag_candidates(&self, spans: &[EntitySpan]) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        spans
            .iter()
            .filter(|span| seen.insert(fold_term(&span.text)))
            .map(|span| {
                Candidate::new(span.text.clone(), self.config.entity_tag_score)
                    .with_source(SuggestionSource::Tag)
            })
            .collect()
    }

    fn tag_candidates(&self, tags: &[String]) -> Vec<Candidate> {
        tags.iter()
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| {
                Candidate::new(tag.trim(), self.config.tag_score).with_source(SuggestionSource::Tag)
            })
            .collect()
    }
}

/// Highest-confidence span of a type, earliest on ties
fn best_span(spans: &[EntitySpan], wanted: EntityType) -> Option<&EntitySpan> {
    spans
        .iter()
        .filter(|s| s.entity_type == wanted)
        .fold(None, |best: Option<&EntitySpan>, s| match best {
            Some(b) if b.confidence >= s.confidence => Some(b),
            _ => Some(s),
        })
}
