//! Reference vocabulary
//!
//! Loaded once at startup and shared read-only between requests.

use crate::VocabError;
use calabi_domain::{clamp01, fold_term, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// A vocabulary term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Display form of the term
    pub term: String,
    /// Entity type the term belongs to, if any
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    /// Popularity in [0, 1]
    #[serde(default)]
    pub popularity: f32,
    /// Alternative surface forms that should match this term
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Terms worth suggesting when this one matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl VocabularyEntry {
    /// Create an untyped entry with no popularity
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            entity_type: None,
            popularity: 0.0,
            aliases: Vec::new(),
            related: Vec::new(),
        }
    }

    /// Set the entity type
    pub fn with_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Set the popularity
    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = popularity;
        self
    }

    /// Add aliases
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Add related terms
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related.extend(related.into_iter().map(Into::into));
        self
    }

    /// True if the entry is compatible with a requested type
    ///
    /// Untyped entries are compatible with every type.
    pub fn matches_type(&self, wanted: Option<EntityType>) -> bool {
        match (wanted, self.entity_type) {
            (Some(w), Some(t)) => w == t,
            _ => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    terms: Vec<VocabularyEntry>,
}

/// Immutable vocabulary snapshot with precomputed folded forms
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
    /// Folded term and aliases per entry, term first
    folded_forms: Vec<Vec<String>>,
    by_folded: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from entries
    ///
    /// Entries with an empty term are skipped; a repeated term keeps its
    /// first entry.
    pub fn from_entries(entries: Vec<VocabularyEntry>) -> Self {
        let mut vocab = Self::default();

        for mut entry in entries {
            let folded = fold_term(&entry.term);
            if folded.is_empty() {
                continue;
            }
            if vocab.by_folded.contains_key(&folded) {
                warn!("Duplicate vocabulary term '{}' ignored", entry.term);
                continue;
            }
            entry.popularity = clamp01(entry.popularity);

            let mut forms = vec![folded.clone()];
            forms.extend(
                entry
                    .aliases
                    .iter()
                    .map(|a| fold_term(a))
                    .filter(|a| !a.is_empty()),
            );

            vocab.by_folded.insert(folded, vocab.entries.len());
            vocab.folded_forms.push(forms);
            vocab.entries.push(entry);
        }

        vocab
    }

    /// Load a vocabulary from a JSON file
    ///
    /// ```json
    /// { "terms": [ { "term": "Seoul", "type": "LOCATION", "popularity": 0.9,
    ///                "aliases": ["서울"], "related": ["South Korea"] } ] }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VocabError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VocabError::Load(format!("{}: {}", path.display(), e)))?;
        let file: VocabularyFile = serde_json::from_str(&contents)
            .map_err(|e| VocabError::Load(format!("{}: {}", path.display(), e)))?;

        let vocab = Self::from_entries(file.terms);
        info!("Loaded {} vocabulary terms from {}", vocab.len(), path.display());
        Ok(vocab)
    }

    /// A small built-in calendar vocabulary
    pub fn builtin() -> Self {
        use EntityType::*;
        let entry = |term: &str, t: EntityType, popularity: f32| {
            VocabularyEntry::new(term).with_type(t).with_popularity(popularity)
        };

        Self::from_entries(vec![
            entry("Seoul", Location, 0.9)
                .with_aliases(["서울"])
                .with_related(["South Korea", "Busan", "Han River"]),
            entry("Seoul City", Location, 0.5),
            entry("Seoul Station", Location, 0.6),
            entry("South Korea", Location, 0.7).with_aliases(["Korea"]),
            entry("Busan", Location, 0.7).with_aliases(["부산"]),
            entry("Han River", Location, 0.6)
                .with_aliases(["한강"])
                .with_related(["fireworks", "chicken and beer"]),
            entry("Tokyo", Location, 0.9).with_related(["Japan", "Osaka"]),
            entry("Tokyo Tower", Location, 0.5),
            entry("Japan", Location, 0.7),
            entry("Osaka", Location, 0.6),
            entry("meeting", Activity, 0.9)
                .with_aliases(["mtg", "회의"])
                .with_related(["meeting notes", "review"]),
            entry("meeting notes", Activity, 0.5),
            entry("review", Activity, 0.6),
            entry("climbing", Activity, 0.6)
                .with_aliases(["클밍", "클라이밍"])
                .with_related(["bouldering"]),
            entry("bouldering", Activity, 0.5).with_aliases(["볼더"]),
            entry("fireworks", Event, 0.5).with_aliases(["불꽃놀이"]),
            entry("chicken and beer", Food, 0.6).with_aliases(["치맥"]),
            entry("end of day", Time, 0.4).with_aliases(["eod"]),
            entry("tomorrow", Date, 0.8),
            entry("next week", Date, 0.6),
        ])
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at an index
    pub fn get(&self, idx: usize) -> Option<&VocabularyEntry> {
        self.entries.get(idx)
    }

    /// Look up an entry by any casing/spacing of its term
    pub fn lookup(&self, term: &str) -> Option<(usize, &VocabularyEntry)> {
        let idx = *self.by_folded.get(&fold_term(term))?;
        Some((idx, &self.entries[idx]))
    }

    /// Folded term and aliases of an entry, term first
    pub fn folded_forms(&self, idx: usize) -> &[String] {
        self.folded_forms.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate entries with their indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &VocabularyEntry)> {
        self.entries.iter().enumerate()
    }
}
