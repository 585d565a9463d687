//! Candidate generation against the bundled vocabulary

use calabi_domain::{EntityType, SuggestionSource};
use calabi_vocab::{CandidateGenerator, GeneratorConfig, Vocabulary};
use std::sync::Arc;

fn builtin_generator(config: GeneratorConfig) -> CandidateGenerator {
    CandidateGenerator::from_config(Arc::new(Vocabulary::builtin()), config).unwrap()
}

#[test]
fn seoul_seed_yields_seoul_first() {
    let generator = builtin_generator(GeneratorConfig::default());
    let candidates = generator.generate_candidates("Seoul", 10).unwrap();

    assert_eq!(candidates[0].term, "Seoul");
    assert_eq!(candidates[0].source, SuggestionSource::Vocabulary);
    assert!(candidates.iter().any(|c| c.term == "Seoul City"));
    assert!(candidates.iter().any(|c| c.term == "Han River" && c.source == SuggestionSource::Related));
}

#[test]
fn results_are_sorted_and_bounded() {
    let generator = builtin_generator(GeneratorConfig::default());
    for seed in ["seoul", "tokyo", "meeting", "climbing", "mtg", "치맥"] {
        let candidates = generator.generate_candidates(seed, 4).unwrap();
        assert!(candidates.len() <= 4);
        for pair in candidates.windows(2) {
            assert!(
                pair[0].source_score > pair[1].source_score
                    || (pair[0].source_score == pair[1].source_score && pair[0].term <= pair[1].term),
                "{seed}: {:?}",
                candidates
            );
        }
        for c in &candidates {
            assert!(c.source_score >= 0.3 && c.source_score <= 1.0);
        }
    }
}

#[test]
fn korean_alias_resolves_to_term() {
    let generator = builtin_generator(GeneratorConfig::default());
    let candidates = generator.generate_candidates("치맥", 5).unwrap();
    assert_eq!(candidates[0].term, "chicken and beer");
}

#[test]
fn location_filter_excludes_other_types() {
    let generator = builtin_generator(GeneratorConfig::default());
    let vocab = Vocabulary::builtin();
    let candidates = generator
        .generate_filtered("seoul", 10, Some(EntityType::Location))
        .unwrap();

    assert!(!candidates.is_empty());
    for c in &candidates {
        let (_, entry) = vocab.lookup(&c.term).unwrap();
        assert_eq!(entry.entity_type, Some(EntityType::Location));
    }
}

#[test]
fn vector_index_does_not_change_exact_matches() {
    let lexical = builtin_generator(GeneratorConfig::default());
    let semantic = builtin_generator(GeneratorConfig {
        use_vector_index: true,
        ..Default::default()
    });

    let a = lexical.generate_candidates("tokyo", 1).unwrap();
    let b = semantic.generate_candidates("tokyo", 1).unwrap();
    assert_eq!(a[0].term, "Tokyo");
    assert_eq!(b[0].term, "Tokyo");
}
