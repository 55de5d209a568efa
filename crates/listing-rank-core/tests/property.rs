//! Property-based tests using proptest.
//!
//! These check the invariants every score and metric must satisfy for
//! arbitrary listings, queries and label sequences.

use listing_rank_core::evaluate::{dcg, idcg, ndcg, precision};
use listing_rank_core::models::{ContentBlock, PositionDescription};
use listing_rank_core::{Document, Position, RelevanceCalculator, Sphere};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Words drawn from the vocabulary the scorer actually reacts to, plus noise.
fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "python".to_string(),
            "java".to_string(),
            "go".to_string(),
            "qa".to_string(),
            "frontend".to_string(),
            "front-end".to_string(),
            "front end".to_string(),
            "devops".to_string(),
            "android".to_string(),
            "backend".to_string(),
            "разработчик".to_string(),
            "стажер".to_string(),
            "developer".to_string(),
            "тестирование".to_string(),
            "ML".to_string(),
        ]),
        prop::string::string_regex("[a-zа-я]{1,9}").unwrap(),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 0..6).prop_map(|words| words.join(" "))
}

fn position_strategy() -> impl Strategy<Value = Position> {
    (
        prop::option::of(text_strategy()),
        prop::collection::vec(prop::option::of(text_strategy()), 0..3),
        prop::collection::vec(text_strategy(), 0..3),
    )
        .prop_map(|(name, spheres, items)| Position {
            name,
            spheres: Some(spheres.into_iter().map(|caption| Sphere { caption }).collect()),
            description: Some(PositionDescription {
                blocks: Some(vec![ContentBlock {
                    text: None,
                    items: Some(items),
                }]),
            }),
        })
}

fn document_strategy() -> impl Strategy<Value = Document> {
    (
        prop::option::of(text_strategy()),
        prop::option::of(text_strategy()),
        prop::option::of(prop::collection::vec(position_strategy(), 0..4)),
    )
        .prop_map(|(title, description, positions)| Document {
            title,
            description,
            positions,
            ..Default::default()
        })
}

fn scores_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 0..20)
}

// ============================================================================
// SCORING PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_score_is_bounded(query in text_strategy(), doc in document_strategy()) {
        let score = RelevanceCalculator::default().score(&query, &doc);
        prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }

    #[test]
    fn prop_score_is_idempotent(query in text_strategy(), doc in document_strategy()) {
        let calc = RelevanceCalculator::default();
        let first = calc.score(&query, &doc);
        let second = calc.score(&query, &doc);
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn prop_exact_position_beats_everything(query in text_strategy(), other in document_strategy()) {
        prop_assume!(!query.trim().is_empty());
        let calc = RelevanceCalculator::default();
        let exact = Document {
            positions: Some(vec![Position {
                name: Some(query.clone()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        prop_assert!(calc.score(&query, &exact) >= calc.score(&query, &other));
    }
}

// ============================================================================
// METRIC PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_ndcg_is_bounded(scores in scores_strategy()) {
        let value = ndcg(&scores);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&value), "ndcg {} out of range", value);
    }

    #[test]
    fn prop_sorted_scores_have_perfect_ndcg(mut scores in scores_strategy()) {
        prop_assume!(scores.iter().any(|&s| s > 0.0));
        scores.sort_by(|a, b| b.total_cmp(a));
        prop_assert!((ndcg(&scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prop_idcg_dominates_dcg(scores in scores_strategy()) {
        prop_assert!(idcg(&scores) + 1e-12 >= dcg(&scores));
    }

    #[test]
    fn prop_precision_is_a_fraction(scores in scores_strategy(), threshold in 0.0f64..=1.0) {
        let p = precision(&scores, threshold);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
