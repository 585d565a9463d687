//! Suggestion ranking

use crate::config::RankingWeights;
use calabi_domain::{clamp01, fold_term, Candidate, Suggestion};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Terms this long or longer receive the full length penalty
const LENGTH_PENALTY_CHARS: f32 = 32.0;

/// Scores, deduplicates and orders candidates
#[derive(Debug, Clone, Default)]
pub struct SuggestionRanker {
    weights: RankingWeights,
}

impl SuggestionRanker {
    /// Create a ranker with the given weights
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Composite relevance of a candidate in [0, 1]
    pub fn relevance(&self, candidate: &Candidate) -> f32 {
        let chars = candidate.term.chars().count() as f32;
        let length = (chars / LENGTH_PENALTY_CHARS).min(1.0);
        clamp01(
            self.weights.source_weight * clamp01(candidate.source_score)
                + self.weights.popularity_weight * clamp01(candidate.popularity)
                - self.weights.length_penalty * length,
        )
    }

    /// Rank candidates, keeping at most `max_suggestions`
    ///
    /// Candidates that fold to the same term collapse into the most relevant
    /// one. Ranks are contiguous from 0, relevance never increases with rank,
    /// and equal relevance is ordered by term.
    pub fn rank(&self, candidates: Vec<Candidate>, max_suggestions: usize) -> Vec<Suggestion> {
        let mut best: HashMap<String, Suggestion> = HashMap::new();

        for candidate in candidates {
            let key = fold_term(&candidate.term);
            if key.is_empty() {
                continue;
            }
            let suggestion = Suggestion {
                relevance: self.relevance(&candidate),
                term: candidate.term,
                rank: 0,
                source: candidate.source,
            };
            match best.get(&key) {
                Some(existing) if order(existing, &suggestion) != Ordering::Greater => {}
                _ => {
                    best.insert(key, suggestion);
                }
            }
        }

        let mut ranked: Vec<Suggestion> = best.into_values().collect();
        ranked.sort_by(order);
        ranked.truncate(max_suggestions);
        for (rank, suggestion) in ranked.iter_mut().enumerate() {
            suggestion.rank = rank;
        }
        ranked
    }
}

/// Relevance descending, then term ascending
fn order(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| a.term.cmp(&b.term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calabi_domain::SuggestionSource;
    use proptest::prelude::*;

    fn ranker() -> SuggestionRanker {
        SuggestionRanker::default()
    }

    #[test]
    fn test_relevance_formula() {
        let r = SuggestionRanker::new(RankingWeights {
            source_weight: 0.8,
            popularity_weight: 0.2,
            length_penalty: 0.1,
        });
        // 16 chars: half the length penalty
        let c = Candidate::new("abcdefghijklmnop", 0.5).with_popularity(1.0);
        assert!((r.relevance(&c) - (0.4 + 0.2 - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_relevance_clamped() {
        let r = SuggestionRanker::new(RankingWeights {
            source_weight: 2.0,
            popularity_weight: 0.0,
            length_penalty: 0.0,
        });
        assert_eq!(r.relevance(&Candidate::new("x", 1.0)), 1.0);

        let r = SuggestionRanker::new(RankingWeights {
            source_weight: 0.1,
            popularity_weight: 0.0,
            length_penalty: 1.0,
        });
        assert_eq!(r.relevance(&Candidate::new("a".repeat(40), 0.1)), 0.0);
    }

    #[test]
    fn test_dedup_keeps_best() {
        let ranked = ranker().rank(
            vec![
                Candidate::new("Seoul", 0.5),
                Candidate::new("seoul", 0.9).with_source(SuggestionSource::History),
                Candidate::new("SEOUL ", 0.7),
            ],
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].term, "seoul");
        assert_eq!(ranked[0].source, SuggestionSource::History);
    }

    #[test]
    fn test_ties_by_term() {
        let ranked = ranker().rank(
            vec![Candidate::new("bbb", 0.5), Candidate::new("aaa", 0.5)],
            10,
        );
        assert_eq!(ranked[0].term, "aaa");
        assert_eq!(ranked[1].term, "bbb");
    }

    #[test]
    fn test_truncate_and_ranks() {
        let ranked = ranker().rank(
            vec![
                Candidate::new("a", 0.9),
                Candidate::new("b", 0.8),
                Candidate::new("c", 0.7),
            ],
            2,
        );
        assert_eq!(ranked.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(ranked[1].term, "b");
    }

    #[test]
    fn test_empty_and_zero() {
        assert!(ranker().rank(vec![], 5).is_empty());
        assert!(ranker().rank(vec![Candidate::new("a", 1.0)], 0).is_empty());
    }

    proptest! {
        #[test]
        fn ranking_invariants(
            raw in prop::collection::vec(("[a-cA-C ]{1,4}", 0.0f32..=1.0, 0.0f32..=1.0), 0..30),
            max in 0usize..10,
        ) {
            let candidates: Vec<Candidate> = raw
                .iter()
                .map(|(t, s, p)| Candidate::new(t.clone(), *s).with_popularity(*p))
                .collect();
            let distinct: std::collections::HashSet<String> = candidates
                .iter()
                .map(|c| fold_term(&c.term))
                .filter(|t| !t.is_empty())
                .collect();

            let ranked = ranker().rank(candidates, max);

            prop_assert!(ranked.len() <= max.min(distinct.len()));
            for (i, s) in ranked.iter().enumerate() {
                prop_assert_eq!(s.rank, i);
                prop_assert!((0.0..=1.0).contains(&s.relevance));
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].relevance >= pair[1].relevance);
                if pair[0].relevance == pair[1].relevance {
                    prop_assert!(pair[0].term <= pair[1].term);
                }
            }
        }
    }
}
