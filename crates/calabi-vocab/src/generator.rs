//! Candidate generation
//!
//! Scores every vocabulary entry against the folded seed, optionally adds
//! nearest neighbours from the embedding index, then expands strong matches
//! into their related terms.

use crate::cache::CandidateCache;
use crate::embedding::{EmbeddingModel, NgramEmbedding};
use crate::similarity::lexical_similarity;
use crate::vector_index::VectorIndex;
use crate::vocabulary::Vocabulary;
use crate::VocabError;
use calabi_domain::{clamp01, fold_term, Candidate, EntityType, SuggestionSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for candidate generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Candidates scoring below this are dropped
    pub min_similarity: f32,

    /// Entries scoring at least this contribute their related terms
    pub expansion_threshold: f32,

    /// Multiplier applied to the parent score for related terms
    pub related_decay: f32,

    /// Build an HNSW index over term embeddings
    pub use_vector_index: bool,

    /// Dimension of the built-in n-gram embedding
    pub embedding_dimension: usize,

    /// HNSW search breadth
    pub ef_search: usize,

    /// Cached results kept in memory (0 disables the cache)
    pub cache_capacity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.3,
            expansion_threshold: 0.9,
            related_decay: 0.8,
            use_vector_index: false,
            embedding_dimension: crate::embedding::DEFAULT_DIMENSION,
            ef_search: 64,
            cache_capacity: 1024,
        }
    }
}

impl GeneratorConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("min_similarity", self.min_similarity),
            ("expansion_threshold", self.expansion_threshold),
            ("related_decay", self.related_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        if self.use_vector_index && self.embedding_dimension == 0 {
            return Err("embedding_dimension must be greater than 0".to_string());
        }

        if self.use_vector_index && self.ef_search == 0 {
            return Err("ef_search must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Embedding model plus the index built with it
struct SemanticIndex {
    model: Arc<dyn EmbeddingModel>,
    index: VectorIndex,
    /// Vocabulary entry owning each indexed vector
    owners: Vec<usize>,
}

/// Retrieves candidate terms for a seed phrase
pub struct CandidateGenerator {
    vocabulary: Arc<Vocabulary>,
    config: GeneratorConfig,
    semantic: Option<SemanticIndex>,
    cache: Option<CandidateCache>,
}

impl CandidateGenerator {
    /// Create a lexical-only generator
    pub fn new(vocabulary: Arc<Vocabulary>, config: GeneratorConfig) -> Self {
        let cache = (config.cache_capacity > 0).then(|| CandidateCache::new(config.cache_capacity));
        Self {
            vocabulary,
            config,
            semantic: None,
            cache,
        }
    }

    /// Create a generator that also searches an embedding index
    ///
    /// Every term and alias of the vocabulary is embedded up front.
    pub fn with_embeddings(
        vocabulary: Arc<Vocabulary>,
        config: GeneratorConfig,
        model: Arc<dyn EmbeddingModel>,
    ) -> Result<Self, VocabError> {
        let mut index = VectorIndex::new(model.dimension(), vocabulary.len());
        let mut owners = Vec::new();

        for (idx, _) in vocabulary.iter() {
            for form in vocabulary.folded_forms(idx) {
                let embedding = model.embed(form)?;
                index.add(owners.len(), &embedding)?;
                owners.push(idx);
            }
        }
        info!(
            "Built vector index with {} vectors for {} terms",
            index.len(),
            vocabulary.len()
        );

        let mut generator = Self::new(vocabulary, config);
        generator.semantic = Some(SemanticIndex { model, index, owners });
        Ok(generator)
    }

    /// Create a generator as described by the configuration
    pub fn from_config(vocabulary: Arc<Vocabulary>, config: GeneratorConfig) -> Result<Self, VocabError> {
        if config.use_vector_index {
            let model = Arc::new(NgramEmbedding::new(config.embedding_dimension));
            Self::with_embeddings(vocabulary, config, model)
        } else {
            Ok(Self::new(vocabulary, config))
        }
    }

    /// The vocabulary candidates are drawn from
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// True if an embedding index is searched
    pub fn has_vector_index(&self) -> bool {
        self.semantic.is_some()
    }

    /// Up to `limit` candidates for `seed`, best first
    pub fn generate_candidates(&self, seed: &str, limit: usize) -> Result<Vec<Candidate>, VocabError> {
        self.generate_filtered(seed, limit, None)
    }

    /// Up to `limit` candidates for `seed` compatible with `entity_type`
    ///
    /// Untyped vocabulary entries are compatible with every type.
    pub fn generate_filtered(
        &self,
        seed: &str,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<Candidate>, VocabError> {
        let folded = fold_term(seed);
        if folded.is_empty() {
            return Err(VocabError::InvalidInput("seed is empty".to_string()));
        }
        if limit == 0 {
            return Err(VocabError::InvalidInput("limit must be at least 1".to_string()));
        }

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&folded, limit, entity_type)) {
            debug!("Candidate cache hit for '{}'", folded);
            return Ok(cached);
        }

        let mut scores = self.lexical_scores(&folded, entity_type);
        if let Some(semantic) = &self.semantic {
            self.merge_semantic_scores(semantic, &folded, limit, entity_type, &mut scores)?;
        }

        let mut by_term: HashMap<String, Candidate> = HashMap::new();
        for (&idx, &score) in &scores {
            if score < self.config.min_similarity {
                continue;
            }
            let Some(entry) = self.vocabulary.get(idx) else {
                continue;
            };
            by_term.insert(
                fold_term(&entry.term),
                Candidate::new(entry.term.clone(), score).with_popularity(entry.popularity),
            );
        }

        self.expand_related(&scores, entity_type, &mut by_term);

        let mut candidates: Vec<Candidate> = by_term.into_values().collect();
        candidates.sort_by(|a, b| {
            b.source_score
                .total_cmp(&a.source_score)
                .then_with(|| a.term.cmp(&b.term))
        });
        candidates.truncate(limit);

        debug!("Generated {} candidates for '{}'", candidates.len(), folded);

        if let Some(cache) = &self.cache {
            cache.insert(&folded, limit, entity_type, candidates.clone());
        }

        Ok(candidates)
    }

    fn lexical_scores(&self, folded: &str, entity_type: Option<EntityType>) -> HashMap<usize, f32> {
        self.vocabulary
            .iter()
            .filter(|(_, entry)| entry.matches_type(entity_type))
            .filter_map(|(idx, _)| {
                let score = self
                    .vocabulary
                    .folded_forms(idx)
                    .iter()
                    .map(|form| lexical_similarity(folded, form))
                    .fold(0.0f32, f32::max);
                (score > 0.0).then_some((idx, score))
            })
            .collect()
    }

    fn merge_semantic_scores(
        &self,
        semantic: &SemanticIndex,
        folded: &str,
        limit: usize,
        entity_type: Option<EntityType>,
        scores: &mut HashMap<usize, f32>,
    ) -> Result<(), VocabError> {
        let query = semantic.model.embed(folded)?;
        let k = limit.max(16).min(semantic.owners.len());

        for (slot, similarity) in semantic.index.search(&query, k, self.config.ef_search)? {
            let Some(&idx) = semantic.owners.get(slot) else {
                continue;
            };
            let matches = self
                .vocabulary
                .get(idx)
                .is_some_and(|entry| entry.matches_type(entity_type));
            if !matches {
                continue;
            }
            let score = scores.entry(idx).or_insert(0.0);
            *score = score.max(clamp01(similarity));
        }

        Ok(())
    }

    fn expand_related(
        &self,
        scores: &HashMap<usize, f32>,
        entity_type: Option<EntityType>,
        by_term: &mut HashMap<String, Candidate>,
    ) {
        // Stronger parents first, vocabulary order on ties, so the first
        // spelling of a shared related term is stable across runs
        let mut parents: Vec<(usize, f32)> = scores.iter().map(|(&idx, &score)| (idx, score)).collect();
        parents.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        for (idx, parent_score) in parents {
            if parent_score < self.config.expansion_threshold {
                continue;
            }
            let Some(parent) = self.vocabulary.get(idx) else {
                continue;
            };

            let score = parent_score * self.config.related_decay;
            if score < self.config.min_similarity {
                continue;
            }

            for related in &parent.related {
                let candidate = match self.vocabulary.lookup(related) {
                    Some((_, entry)) if !entry.matches_type(entity_type) => continue,
                    Some((_, entry)) => {
                        Candidate::new(entry.term.clone(), score).with_popularity(entry.popularity)
                    }
                    None => Candidate::new(related.trim(), score),
                };
                let key = fold_term(&candidate.term);
                if key.is_empty() {
                    continue;
                }

                let keep_existing = by_term
                    .get(&key)
                    .is_some_and(|existing| existing.source_score >= score);
                if !keep_existing {
                    by_term.insert(key, candidate.with_source(SuggestionSource::Related));
                }
            }
        }
    }
}

impl std::fmt::Debug for CandidateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateGenerator")
            .field("terms", &self.vocabulary.len())
            .field("config", &self.config)
            .field("vector_index", &self.has_vector_index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SUBSTRING_SCORE;
    use crate::vocabulary::VocabularyEntry;

    fn generator(entries: Vec<VocabularyEntry>) -> CandidateGenerator {
        CandidateGenerator::new(Arc::new(Vocabulary::from_entries(entries)), GeneratorConfig::default())
    }

    #[test]
    fn test_default_config_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = GeneratorConfig {
            related_decay: 1.5,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("related_decay"));
    }

    #[test]
    fn test_empty_seed_rejected() {
        let gen = generator(vec![VocabularyEntry::new("Seoul")]);
        assert!(matches!(gen.generate_candidates("   ", 5), Err(VocabError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let gen = generator(vec![VocabularyEntry::new("Seoul")]);
        assert!(matches!(gen.generate_candidates("seoul", 0), Err(VocabError::InvalidInput(_))));
    }

    #[test]
    fn test_seoul_example() {
        let gen = generator(vec![
            VocabularyEntry::new("Seoul"),
            VocabularyEntry::new("Seoul City"),
            VocabularyEntry::new("Busan"),
        ]);
        let candidates = gen.generate_candidates("seoul", 5).unwrap();

        let terms: Vec<_> = candidates.iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["Seoul", "Seoul City"]);
        assert_eq!(candidates[0].source_score, 1.0);
        assert_eq!(candidates[1].source_score, SUBSTRING_SCORE);
    }

    #[test]
    fn test_no_match_is_empty() {
        let gen = generator(vec![VocabularyEntry::new("Seoul")]);
        assert!(gen.generate_candidates("zzzz", 5).unwrap().is_empty());
    }

    #[test]
    fn test_alias_match() {
        let gen = generator(vec![VocabularyEntry::new("meeting").with_aliases(["mtg"])]);
        let candidates = gen.generate_candidates("MTG", 5).unwrap();
        assert_eq!(candidates[0].term, "meeting");
        assert_eq!(candidates[0].source_score, 1.0);
    }

    #[test]
    fn test_tie_broken_by_term() {
        let gen = generator(vec![
            VocabularyEntry::new("tokyo tower"),
            VocabularyEntry::new("tokyo bay"),
        ]);
        let candidates = gen.generate_candidates("tokyo", 5).unwrap();
        assert_eq!(candidates[0].term, "tokyo bay");
        assert_eq!(candidates[1].term, "tokyo tower");
    }

    #[test]
    fn test_limit_truncates() {
        let gen = generator(vec![
            VocabularyEntry::new("Seoul"),
            VocabularyEntry::new("Seoul City"),
            VocabularyEntry::new("Seoul Station"),
        ]);
        assert_eq!(gen.generate_candidates("seoul", 2).unwrap().len(), 2);
    }

    #[test]
    fn test_related_expansion() {
        let gen = generator(vec![
            VocabularyEntry::new("Seoul").with_related(["Busan", "kimchi"]),
            VocabularyEntry::new("Busan").with_popularity(0.7),
        ]);
        let candidates = gen.generate_candidates("seoul", 5).unwrap();

        let busan = candidates.iter().find(|c| c.term == "Busan").unwrap();
        assert_eq!(busan.source, SuggestionSource::Related);
        assert!((busan.source_score - 0.8).abs() < 1e-6);
        assert_eq!(busan.popularity, 0.7);

        let kimchi = candidates.iter().find(|c| c.term == "kimchi").unwrap();
        assert_eq!(kimchi.popularity, 0.0);
    }

    #[test]
    fn test_shared_related_term_spelling_is_stable() {
        let entries = || {
            vec![
                VocabularyEntry::new("Seoul").with_related(["Kimchi"]),
                VocabularyEntry::new("Seoul Metro")
                    .with_aliases(["seoul"])
                    .with_related(["kimchi"]),
            ]
        };
        let config = GeneratorConfig {
            cache_capacity: 0,
            ..Default::default()
        };

        for _ in 0..50 {
            let gen = CandidateGenerator::new(Arc::new(Vocabulary::from_entries(entries())), config.clone());
            let terms: Vec<_> = gen
                .generate_candidates("seoul", 5)
                .unwrap()
                .into_iter()
                .map(|c| c.term)
                .collect();
            assert_eq!(terms, vec!["Seoul", "Seoul Metro", "Kimchi"]);
        }
    }

    #[test]
    fn test_no_expansion_below_threshold() {
        let gen = generator(vec![
            VocabularyEntry::new("climbing").with_related(["bouldering"]),
        ]);
        let candidates = gen.generate_candidates("climbers", 5).unwrap();
        assert!(candidates.iter().all(|c| c.term != "bouldering"));
    }

    #[test]
    fn test_type_filter() {
        let gen = generator(vec![
            VocabularyEntry::new("Seoul").with_type(EntityType::Location),
            VocabularyEntry::new("Seoul trip").with_type(EntityType::Event),
            VocabularyEntry::new("Seoul notes"),
        ]);
        let candidates = gen
            .generate_filtered("seoul", 5, Some(EntityType::Location))
            .unwrap();
        let terms: Vec<_> = candidates.iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["Seoul", "Seoul notes"]);
    }

    #[test]
    fn test_cached_results_match() {
        let gen = generator(vec![VocabularyEntry::new("Seoul"), VocabularyEntry::new("Seoul City")]);
        let first = gen.generate_candidates("Seoul", 5).unwrap();
        let second = gen.generate_candidates("  seoul ", 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_vector_index_adds_fuzzy_recall() {
        let vocab = Arc::new(Vocabulary::from_entries(vec![
            VocabularyEntry::new("bouldering"),
            VocabularyEntry::new("Tokyo"),
        ]));
        let config = GeneratorConfig {
            use_vector_index: true,
            ..Default::default()
        };
        let gen = CandidateGenerator::from_config(vocab, config).unwrap();
        assert!(gen.has_vector_index());

        let candidates = gen.generate_candidates("boulderign", 5).unwrap();
        assert_eq!(candidates[0].term, "bouldering");
    }
}
