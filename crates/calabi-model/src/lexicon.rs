//! Gazetteer tagger
//!
//! Labels tokens by greedy longest match against a phrase lexicon, plus a
//! handful of shape rules for clock times and numeric dates. This is the
//! model bundled with the service; richer models plug in through
//! [`crate::RemoteModel`].
//!
//! # Lexicon file format
//!
//! ```json
//! {
//!   "name": "calendar-ko-en",
//!   "entries": [
//!     { "phrase": "Seoul", "type": "LOCATION", "confidence": 0.95 },
//!     { "phrase": "next week", "type": "DATE" }
//!   ]
//! }
//! ```

use crate::ModelError;
use calabi_domain::traits::InferenceModel;
use calabi_domain::{fold_term, EntityType, Label, LabelDistribution, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Confidence assigned to entries that do not specify one
pub const DEFAULT_ENTRY_CONFIDENCE: f32 = 0.9;

/// Confidence assigned to time/date shape matches
pub const SHAPE_RULE_CONFIDENCE: f32 = 0.8;

/// A lexicon phrase with its type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Surface phrase, matched case-insensitively token by token
    pub phrase: String,
    /// Entity type to emit
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Confidence to emit for every token of the phrase
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    DEFAULT_ENTRY_CONFIDENCE
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    name: Option<String>,
    entries: Vec<LexiconEntry>,
}

/// Gazetteer-based sequence labeler
#[derive(Debug, Clone)]
pub struct LexiconModel {
    name: String,
    phrases: Arc<HashMap<String, (EntityType, f32)>>,
    max_phrase_tokens: usize,
}

impl LexiconModel {
    /// Build a model from explicit entries
    pub fn from_entries(name: impl Into<String>, entries: Vec<LexiconEntry>) -> Self {
        let mut phrases = HashMap::new();
        let mut max_phrase_tokens = 1;

        for entry in entries {
            let key = fold_term(&entry.phrase);
            if key.is_empty() {
                continue;
            }
            max_phrase_tokens = max_phrase_tokens.max(key.split(' ').count());
            let confidence = entry.confidence.clamp(0.0, 1.0);
            // Later entries win, so a user file can override a phrase
            phrases.insert(key, (entry.entity_type, confidence));
        }

        Self {
            name: format!("lexicon:{}", name.into()),
            phrases: Arc::new(phrases),
            max_phrase_tokens,
        }
    }

    /// Load a lexicon from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ModelError::NotAvailable(format!("Failed to read lexicon {}: {}", path.display(), e))
        })?;
        let file: LexiconFile = serde_json::from_str(&contents).map_err(|e| {
            ModelError::NotAvailable(format!("Failed to parse lexicon {}: {}", path.display(), e))
        })?;

        let name = file.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string())
        });

        let model = Self::from_entries(name, file.entries);
        info!("Loaded {} with {} phrases", model.name, model.len());
        Ok(model)
    }

    /// The small built-in calendar lexicon
    pub fn builtin() -> Self {
        let mut entries = Vec::new();
        let mut push = |phrases: &[&str], entity_type: EntityType, confidence: f32| {
            for phrase in phrases {
                entries.push(LexiconEntry {
                    phrase: phrase.to_string(),
                    entity_type,
                    confidence,
                });
            }
        };

        push(
            &[
                "Seoul", "Busan", "Incheon", "Jeju", "Tokyo", "Osaka", "Kyoto", "Beijing",
                "Shanghai", "New York", "London", "Paris", "Berlin", "San Francisco",
                "South Korea", "Korea", "Japan", "Han River", "Gangnam", "서울", "부산", "한강",
            ],
            EntityType::Location,
            0.95,
        );
        push(
            &[
                "today", "tomorrow", "yesterday", "tonight", "next week", "last week",
                "this weekend", "next month", "monday", "tuesday", "wednesday", "thursday",
                "friday", "saturday", "sunday", "january", "february", "march", "april",
                "june", "july", "august", "september", "october", "november", "december",
                "오늘", "내일", "어제", "주말",
            ],
            EntityType::Date,
            0.9,
        );
        push(&["morning", "noon", "afternoon", "evening", "midnight"], EntityType::Time, 0.85);
        push(&["friend", "friends", "mom", "dad", "친구", "친구들"], EntityType::Person, 0.8);
        push(&["chicken", "beer", "coffee", "pizza", "sushi", "치맥"], EntityType::Food, 0.8);
        push(
            &[
                "climbing", "bouldering", "running", "yoga", "meeting", "review", "fireworks",
                "standup", "불꽃놀이", "클라이밍", "회의",
            ],
            EntityType::Activity,
            0.8,
        );

        Self::from_entries("builtin", entries)
    }

    /// Number of phrases in the lexicon
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// True if the lexicon has no phrases
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Longest phrase match starting at `start`, as (token count, type, confidence)
    fn match_at(&self, folded: &[String], start: usize) -> Option<(usize, EntityType, f32)> {
        let longest = self.max_phrase_tokens.min(folded.len() - start);
        for len in (1..=longest).rev() {
            let key = folded[start..start + len].join(" ");
            if let Some(&(entity_type, confidence)) = self.phrases.get(&key) {
                return Some((len, entity_type, confidence));
            }
        }
        shape_type(&folded[start]).map(|t| (1, t, SHAPE_RULE_CONFIDENCE))
    }
}

impl InferenceModel for LexiconModel {
    type Error = ModelError;

    fn infer(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, Self::Error> {
        let folded: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < folded.len() {
            match self.match_at(&folded, i) {
                Some((len, entity_type, confidence)) => {
                    debug!("Lexicon match '{}' as {}", folded[i..i + len].join(" "), entity_type);
                    for offset in 0..len {
                        let label = if offset == 0 {
                            Label::Begin(entity_type)
                        } else {
                            Label::Inside(entity_type)
                        };
                        // Entity label alone; the pipeline threshold decides
                        out.push(LabelDistribution::certain(label, confidence));
                    }
                    i += len;
                }
                None => {
                    out.push(LabelDistribution::outside());
                    i += 1;
                }
            }
        }

        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn health_check(&self) -> Result<(), Self::Error> {
        if self.is_empty() {
            return Err(ModelError::NotAvailable(format!("{} has no phrases", self.name)));
        }
        Ok(())
    }
}

/// Classify clock times ("9am", "15:30") and numeric dates ("2024-05-01", "5/1")
fn shape_type(token: &str) -> Option<EntityType> {
    if token.is_empty() || !token.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let body = token
        .strip_suffix("am")
        .or_else(|| token.strip_suffix("pm"));
    if let Some(digits) = body {
        let is_clock = !digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit() || c == ':')
            && digits.split(':').all(|part| (1..=2).contains(&part.len()));
        return is_clock.then_some(EntityType::Time);
    }

    let numeric_parts = |sep: char| -> Option<Vec<&str>> {
        let parts: Vec<&str> = token.split(sep).collect();
        let valid = parts.len() >= 2
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.len() <= 4 && p.chars().all(|c| c.is_ascii_digit()));
        valid.then_some(parts)
    };

    if let Some(parts) = numeric_parts(':') {
        if parts.len() == 2 && parts.iter().all(|p| p.len() <= 2) {
            return Some(EntityType::Time);
        }
    }
    if numeric_parts('-').is_some() || numeric_parts('/').is_some() {
        return Some(EntityType::Date);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tokens(words: &[&str]) -> Vec<Token> {
        let mut offset = 0;
        words
            .iter()
            .map(|w| {
                let len = w.chars().count();
                let token = Token::new(*w, offset, offset + len);
                offset += len + 1;
                token
            })
            .collect()
    }

    fn best_labels(model: &LexiconModel, words: &[&str]) -> Vec<Label> {
        model
            .infer(&tokens(words))
            .unwrap()
            .iter()
            .map(|d| d.best().0)
            .collect()
    }

    #[test]
    fn test_builtin_flight_example() {
        let model = LexiconModel::builtin();
        let labels = best_labels(
            &model,
            &["Book", "a", "flight", "from", "Seoul", "to", "Tokyo", "tomorrow"],
        );
        assert_eq!(labels[4], Label::Begin(EntityType::Location));
        assert_eq!(labels[6], Label::Begin(EntityType::Location));
        assert_eq!(labels[7], Label::Begin(EntityType::Date));
        assert_eq!(labels.iter().filter(|l| **l != Label::Outside).count(), 3);
    }

    #[test]
    fn test_longest_match_wins() {
        let model = LexiconModel::builtin();
        let labels = best_labels(&model, &["trip", "to", "South", "Korea"]);
        assert_eq!(labels[2], Label::Begin(EntityType::Location));
        assert_eq!(labels[3], Label::Inside(EntityType::Location));
    }

    #[test]
    fn test_case_insensitive() {
        let model = LexiconModel::builtin();
        let labels = best_labels(&model, &["SEOUL"]);
        assert_eq!(labels[0], Label::Begin(EntityType::Location));
    }

    #[test]
    fn test_shape_rules() {
        assert_eq!(shape_type("9am"), Some(EntityType::Time));
        assert_eq!(shape_type("10:30pm"), Some(EntityType::Time));
        assert_eq!(shape_type("15:00"), Some(EntityType::Time));
        assert_eq!(shape_type("2024-05-01"), Some(EntityType::Date));
        assert_eq!(shape_type("5/1"), Some(EntityType::Date));
        assert_eq!(shape_type("42"), None);
        assert_eq!(shape_type("am"), None);
        assert_eq!(shape_type("3-"), None);
    }

    #[test]
    fn test_one_distribution_per_token() {
        let model = LexiconModel::builtin();
        let input = tokens(&["lunch", "in", "New", "York", "at", "noon"]);
        assert_eq!(model.infer(&input).unwrap().len(), input.len());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "custom", "entries": [
                {{"phrase": "Acme Corp", "type": "ORG", "confidence": 0.7}},
                {{"phrase": "standup", "type": "ACTIVITY"}}
            ]}}"#
        )
        .unwrap();

        let model = LexiconModel::from_file(file.path()).unwrap();
        assert_eq!(model.name(), "lexicon:custom");
        assert_eq!(model.len(), 2);

        let dists = model.infer(&tokens(&["Acme", "Corp", "standup"])).unwrap();
        assert_eq!(dists[0].best(), (Label::Begin(EntityType::Organization), 0.7));
        assert_eq!(dists[2].best(), (Label::Begin(EntityType::Activity), DEFAULT_ENTRY_CONFIDENCE));
    }

    #[test]
    fn test_low_confidence_phrase_still_labeled() {
        let model = LexiconModel::from_entries(
            "weak",
            vec![LexiconEntry {
                phrase: "Acme".to_string(),
                entity_type: EntityType::Organization,
                confidence: 0.4,
            }],
        );
        let dists = model.infer(&tokens(&["visit", "Acme"])).unwrap();
        assert_eq!(dists[0].best().0, Label::Outside);
        assert_eq!(dists[1].best(), (Label::Begin(EntityType::Organization), 0.4));
    }

    #[test]
    fn test_missing_file() {
        let result = LexiconModel::from_file("/nonexistent/lexicon.json");
        assert!(matches!(result, Err(ModelError::NotAvailable(_))));
    }

    #[test]
    fn test_empty_lexicon_is_unhealthy() {
        let model = LexiconModel::from_entries("empty", Vec::new());
        assert!(model.health_check().is_err());
    }
}
