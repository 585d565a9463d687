//! Candidate cache keyed by folded seed, limit and type filter

use calabi_domain::{Candidate, EntityType};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

type CacheKey = (String, usize, Option<EntityType>);

/// Bounded, thread-safe cache of generator results
///
/// When full, the whole map is dropped before the next insert. Poisoned
/// locks are treated as a miss.
#[derive(Debug)]
pub struct CandidateCache {
    capacity: usize,
    entries: RwLock<HashMap<CacheKey, Vec<Candidate>>>,
}

impl CandidateCache {
    /// Create a cache holding at most `capacity` results
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached result for a key
    pub fn get(&self, seed: &str, limit: usize, entity_type: Option<EntityType>) -> Option<Vec<Candidate>> {
        let entries = self.entries.read().ok()?;
        entries.get(&(seed.to_string(), limit, entity_type)).cloned()
    }

    /// Store a result
    pub fn insert(
        &self,
        seed: &str,
        limit: usize,
        entity_type: Option<EntityType>,
        candidates: Vec<Candidate>,
    ) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        if entries.len() >= self.capacity {
            debug!("Candidate cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert((seed.to_string(), limit, entity_type), candidates);
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
