//! Heuristic relevance scoring of a listing against a query.
//!
//! The calculator walks a fixed waterfall of evaluators. Each one emits a raw
//! score on the [`RelevanceWeights`] scale; the final score is the largest raw
//! score actually reached, divided by `max_score` and clamped to `1.0`.
//!
//! # Waterfall
//!
//! 1. **Exact position match**: the whole query is a substring of a
//!    position name → `exact_position_match`.
//! 2. **Partial position match**: query tokens longer than two characters
//!    found in the name, weighted by specificity, averaged over all query
//!    tokens, scaled by `partial_position_match`.
//! 3. **Category match**: the name carries vocabulary of a category the
//!    query belongs to → `category_match`. Max of (2) and (3) is the name score.
//! 4. **Sphere match**: only when the name score is below an exact match:
//!    a sphere caption carries vocabulary of a category named in the query
//!    → `sphere_match`.
//! 5. The best position wins.
//! 6. **Title / description fallback**: only when the best position is
//!    below `sphere_match`. Whole-word hits score `title_match` /
//!    `description_match`; a substring hit inside a longer word falls back to
//!    the category score scaled by 0.5 (title) or 0.3 (description).
//! 7. **Category-mismatch penalty**: a weak score for a categorised query,
//!    on a listing that contains none of the categories' vocabulary anywhere,
//!    is halved.
//! 8. Normalize to `[0, 1]`.

use serde::Serialize;
use tracing::trace;

use crate::models::{Document, Position};
use crate::normalize::Query;
use crate::taxonomy::{Taxonomy, TaxonomyEntry};
use crate::text::{contains_whole_word, extract_full_text};
use crate::weights::{RelevanceWeights, TermWeights};

/// Category score multiplier for a loose (non whole-word) title hit.
const TITLE_LOOSE_SCALE: f64 = 0.5;
/// Category score multiplier for a loose description hit.
const DESCRIPTION_LOOSE_SCALE: f64 = 0.3;
/// Scores at or above `category_match * 0.8` are never penalized.
const PENALTY_CEILING: f64 = 0.8;
/// Only scores below `category_match * 0.5` are actually halved.
const PENALTY_THRESHOLD: f64 = 0.5;
const PENALTY_FACTOR: f64 = 0.5;
/// Query tokens of this many characters or fewer never count as a partial match.
const MIN_PARTIAL_TOKEN_CHARS: usize = 2;

/// How a score was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Normalized score in `[0.0, 1.0]`.
    pub score: f64,
    /// Best raw position score (steps 1–5).
    pub position_score: f64,
    /// Index of the position that produced `position_score`, if any scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_position: Option<usize>,
    /// Raw title/description score, when the fallback ran (step 6).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_score: Option<f64>,
    /// Raw score after the penalty (step 7).
    pub raw_score: f64,
    /// Whether the category-mismatch penalty was applied.
    pub penalized: bool,
    /// Canonical terms of the categories detected for the query.
    pub categories: Vec<String>,
}

/// Scores listings against queries.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and reused for any number of queries.
#[derive(Debug, Clone, Default)]
pub struct RelevanceCalculator {
    taxonomy: Taxonomy,
    weights: RelevanceWeights,
    term_weights: TermWeights,
}

impl RelevanceCalculator {
    pub fn new(taxonomy: Taxonomy, weights: RelevanceWeights, term_weights: TermWeights) -> Self {
        Self {
            taxonomy,
            weights,
            term_weights,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn weights(&self) -> &RelevanceWeights {
        &self.weights
    }

    pub fn term_weights(&self) -> &TermWeights {
        &self.term_weights
    }

    /// Relevance of `document` for `query`, in `[0.0, 1.0]`.
    pub fn score(&self, query: &str, document: &Document) -> f64 {
        self.score_query(&Query::new(query), document)
    }

    /// Same as [`score`](Self::score) with the query already normalized.
    pub fn score_query(&self, query: &Query, document: &Document) -> f64 {
        self.explain_query(query, document).score
    }

    pub fn explain(&self, query: &str, document: &Document) -> ScoreBreakdown {
        self.explain_query(&Query::new(query), document)
    }

    /// Run the full waterfall and report every intermediate value.
    ///
    /// Categories are detected once here and shared by every step.
    pub fn explain_query(&self, query: &Query, document: &Document) -> ScoreBreakdown {
        let detected = self.taxonomy.detect_categories(query);
        let categories: Vec<String> = detected.iter().map(|e| e.canonical.clone()).collect();

        if query.is_empty() {
            return ScoreBreakdown {
                score: 0.0,
                position_score: 0.0,
                best_position: None,
                fallback_score: None,
                raw_score: 0.0,
                penalized: false,
                categories,
            };
        }

        let (best_position, position_score) = self.best_position(query, &detected, document);

        let fallback_score = if position_score < self.weights.sphere_match {
            Some(self.fallback_score(query, &detected, document))
        } else {
            None
        };
        let combined = position_score.max(fallback_score.unwrap_or(0.0));

        let raw_score = self.penalize(&detected, document, combined);
        let score = self.normalize(raw_score);

        trace!(
            query = query.as_str(),
            position_score,
            ?fallback_score,
            combined,
            raw_score,
            score,
            "scored document"
        );

        ScoreBreakdown {
            score,
            position_score,
            best_position,
            fallback_score,
            raw_score,
            penalized: raw_score < combined,
            categories,
        }
    }

    /// Step 1: the whole query appears inside the (lowercased) position name.
    pub fn exact_position_score(&self, query: &Query, name: &str) -> Option<f64> {
        name.contains(query.as_str())
            .then_some(self.weights.exact_position_match)
    }

    /// Step 2: weighted share of query tokens found in the position name.
    ///
    /// The accumulated token weight is divided by the number of *all* query
    /// tokens, so a long query with one matching word scores low.
    pub fn partial_position_score(&self, query: &Query, name: &str) -> f64 {
        let parts = query.parts();
        let matched: f64 = parts
            .iter()
            .filter(|part| part.chars().count() > MIN_PARTIAL_TOKEN_CHARS && name.contains(part.as_str()))
            .map(|part| {
                if self.taxonomy.is_common_term(part) {
                    self.term_weights.common_term_position
                } else {
                    self.term_weights.specific_term_position
                }
            })
            .sum();

        if matched == 0.0 {
            return 0.0;
        }
        self.weights.partial_position_match * (matched / parts.len() as f64)
    }

    /// Step 3: `category_match` when `text` carries vocabulary of a category
    /// detected for the query.
    pub fn category_score(&self, query: &Query, text: &str) -> f64 {
        self.category_score_for(&self.taxonomy.detect_categories(query), text)
    }

    fn category_score_for(&self, detected: &[&TaxonomyEntry], text: &str) -> f64 {
        if Taxonomy::text_matches(detected, text) {
            self.weights.category_match
        } else {
            0.0
        }
    }

    /// Steps 1–3 for one position name.
    pub fn position_name_score(&self, query: &Query, name: &str) -> f64 {
        self.name_score(query, &self.taxonomy.detect_categories(query), name)
    }

    fn name_score(&self, query: &Query, detected: &[&TaxonomyEntry], name: &str) -> f64 {
        let name = name.to_lowercase();
        if let Some(exact) = self.exact_position_score(query, &name) {
            return exact;
        }
        self.partial_position_score(query, &name)
            .max(self.category_score_for(detected, &name))
    }

    /// Step 4: a sphere caption carries vocabulary of a category whose
    /// canonical term is literally part of the query.
    pub fn sphere_score(&self, query: &Query, position: &Position) -> f64 {
        let hit = position
            .spheres()
            .iter()
            .filter_map(|s| s.caption.as_deref())
            .map(str::to_lowercase)
            .any(|caption| {
                self.taxonomy
                    .named_in(query.as_str())
                    .any(|entry| entry.related.iter().any(|t| caption.contains(t.as_str())))
            });

        if hit {
            self.weights.sphere_match
        } else {
            0.0
        }
    }

    /// Steps 1–4 for one position.
    pub fn position_score(&self, query: &Query, position: &Position) -> f64 {
        self.scored_position(query, &self.taxonomy.detect_categories(query), position)
    }

    fn scored_position(&self, query: &Query, detected: &[&TaxonomyEntry], position: &Position) -> f64 {
        let name_score = position
            .name()
            .map_or(0.0, |name| self.name_score(query, detected, name));

        if name_score < self.weights.exact_position_match {
            name_score.max(self.sphere_score(query, position))
        } else {
            name_score
        }
    }

    /// Step 5: best position score and its index. `(None, 0.0)` when the
    /// document has no positions or none of them scores.
    pub fn evaluate_positions(&self, query: &Query, document: &Document) -> (Option<usize>, f64) {
        self.best_position(query, &self.taxonomy.detect_categories(query), document)
    }

    fn best_position(
        &self,
        query: &Query,
        detected: &[&TaxonomyEntry],
        document: &Document,
    ) -> (Option<usize>, f64) {
        let mut best = (None, 0.0);
        for (i, position) in document.positions().iter().enumerate() {
            let score = self.scored_position(query, detected, position);
            if score > best.1 {
                best = (Some(i), score);
            }
        }
        best
    }

    /// Step 6: best of the title and description checks.
    pub fn title_description_score(&self, query: &Query, document: &Document) -> f64 {
        self.fallback_score(query, &self.taxonomy.detect_categories(query), document)
    }

    fn fallback_score(&self, query: &Query, detected: &[&TaxonomyEntry], document: &Document) -> f64 {
        let title = self.field_score(
            query,
            detected,
            document.title(),
            self.weights.title_match,
            TITLE_LOOSE_SCALE,
        );
        let description = self.field_score(
            query,
            detected,
            document.description(),
            self.weights.description_match,
            DESCRIPTION_LOOSE_SCALE,
        );
        title.max(description)
    }

    fn field_score(
        &self,
        query: &Query,
        detected: &[&TaxonomyEntry],
        field: &str,
        word_weight: f64,
        loose_scale: f64,
    ) -> f64 {
        let field = field.to_lowercase();
        if field.is_empty() {
            return 0.0;
        }

        if contains_whole_word(&field, query.as_str()) {
            word_weight
        } else if field.contains(query.as_str()) {
            self.category_score_for(detected, &field) * loose_scale
        } else {
            0.0
        }
    }

    /// Step 7: halve a weak score when the query is categorised but the
    /// listing contains none of the detected categories' terms.
    ///
    /// Both thresholds are compared against the incoming score; the penalty
    /// is applied at most once.
    pub fn category_mismatch_penalty(&self, query: &Query, document: &Document, score: f64) -> f64 {
        self.penalize(&self.taxonomy.detect_categories(query), document, score)
    }

    fn penalize(&self, detected: &[&TaxonomyEntry], document: &Document, score: f64) -> f64 {
        let category_match = self.weights.category_match;
        if score >= category_match * PENALTY_CEILING || detected.is_empty() {
            return score;
        }

        let full_text = extract_full_text(document);
        let has_vocabulary = detected
            .iter()
            .flat_map(|entry| entry.terms())
            .any(|term| full_text.contains(term));

        if !has_vocabulary && score < category_match * PENALTY_THRESHOLD {
            score * PENALTY_FACTOR
        } else {
            score
        }
    }

    /// Step 8. Weights that cannot scale a score (a `max_score` that is not
    /// positive and finite, or a NaN raw score) normalize to `0.0`.
    pub fn normalize(&self, raw_score: f64) -> f64 {
        let max_score = self.weights.max_score;
        if !(max_score.is_finite() && max_score > 0.0) || raw_score.is_nan() {
            return 0.0;
        }
        (raw_score / max_score).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentBlock, PositionDescription, Sphere};

    fn calc() -> RelevanceCalculator {
        RelevanceCalculator::default()
    }

    fn position(name: &str) -> Position {
        Position {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn with_positions(positions: Vec<Position>) -> Document {
        Document {
            positions: Some(positions),
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_position_match_is_max() {
        let doc = with_positions(vec![position("Python разработчик")]);
        assert_eq!(calc().score("python", &doc), 1.0);
        assert_eq!(calc().score("  PYTHON ", &doc), 1.0);
    }

    #[test]
    fn test_partial_match_divides_by_all_tokens() {
        let c = calc();
        let q = Query::new("python аналитик");
        // "аналитик" is specific (1.0), "python" is missing: 7.0 * 1.0 / 2
        assert!(approx(c.partial_position_score(&q, "аналитик данных"), 3.5));

        let q = Query::new("senior python");
        // "senior" is a common term (0.5): 7.0 * 0.5 / 2
        assert!(approx(c.partial_position_score(&q, "senior java developer"), 1.75));
    }

    #[test]
    fn test_partial_match_ignores_short_tokens() {
        let q = Query::new("go qa");
        assert_eq!(calc().partial_position_score(&q, "go qa team"), 0.0);
    }

    #[test]
    fn test_category_beats_partial_on_position_name() {
        let c = calc();
        let q = Query::new("python разработчик");
        // partial = 3.5, but "разработчик" is python vocabulary → 6.0
        assert!(approx(c.position_name_score(&q, "Java разработчик"), 6.0));
        let doc = with_positions(vec![position("Java разработчик")]);
        assert!(approx(c.score("python разработчик", &doc), 0.6));
    }

    #[test]
    fn test_sphere_match() {
        let doc = with_positions(vec![Position {
            name: Some("Стажер".into()),
            spheres: Some(vec![Sphere {
                caption: Some("Backend".into()),
            }]),
            description: None,
        }]);
        let c = calc();
        assert!(approx(c.position_score(&Query::new("python"), &doc.positions()[0]), 5.0));
        assert!(approx(c.score("python", &doc), 0.5));
    }

    #[test]
    fn test_sphere_requires_canonical_term_in_query() {
        let p = Position {
            name: None,
            spheres: Some(vec![Sphere {
                caption: Some("Backend".into()),
            }]),
            description: None,
        };
        // "разработчик" relates to python, but no canonical term is in the query
        assert_eq!(calc().sphere_score(&Query::new("разработчик"), &p), 0.0);
    }

    #[test]
    fn test_best_position_wins() {
        let doc = with_positions(vec![
            position("Маркетолог"),
            position("Python разработчик"),
            position("Backend"),
        ]);
        let (best, score) = calc().evaluate_positions(&Query::new("python"), &doc);
        assert_eq!(best, Some(1));
        assert!(approx(score, 10.0));
    }

    #[test]
    fn test_title_whole_word_match() {
        let doc = Document {
            title: Some("Стажировка QA инженер".into()),
            ..Default::default()
        };
        assert!(approx(calc().score("qa", &doc), 0.3));
    }

    #[test]
    fn test_title_whole_word_after_overlapping_partial_hit() {
        let doc = Document {
            title: Some("xgo go go".into()),
            ..Default::default()
        };
        assert!(approx(calc().title_description_score(&Query::new("go go"), &doc), 3.0));
    }

    #[test]
    fn test_title_plural_match() {
        let doc = Document {
            title: Some("Junior developers".into()),
            ..Default::default()
        };
        assert!(approx(calc().title_description_score(&Query::new("developer"), &doc), 3.0));
    }

    #[test]
    fn test_title_loose_match_uses_scaled_category() {
        let doc = Document {
            title: Some("Pythonista стажировка backend".into()),
            ..Default::default()
        };
        assert!(approx(calc().score("python", &doc), 0.3));

        let doc = Document {
            title: Some("Pythonista".into()),
            ..Default::default()
        };
        assert_eq!(calc().score("python", &doc), 0.0);
    }

    #[test]
    fn test_description_matches() {
        let c = calc();
        let doc = Document {
            description: Some("Ищем DevOps инженеров".into()),
            ..Default::default()
        };
        assert!(approx(c.score("devops", &doc), 0.2));

        let doc = Document {
            description: Some("kotlinx mobile".into()),
            ..Default::default()
        };
        assert!(approx(c.score("kotlin", &doc), 0.18));
    }

    #[test]
    fn test_fallback_skipped_when_position_reaches_sphere_weight() {
        let doc = Document {
            title: Some("python".into()),
            positions: Some(vec![position("Backend")]),
            ..Default::default()
        };
        let breakdown = calc().explain("python", &doc);
        assert!(approx(breakdown.position_score, 6.0));
        assert!(breakdown.fallback_score.is_none());
    }

    #[test]
    fn test_penalty_halves_weak_score_without_vocabulary() {
        let doc = with_positions(vec![position("Senior Java developer")]);
        let breakdown = calc().explain("senior python", &doc);
        assert!(breakdown.penalized);
        assert!(approx(breakdown.raw_score, 0.875));
        assert!(approx(breakdown.score, 0.0875));
    }

    #[test]
    fn test_penalty_skipped_between_thresholds() {
        // 3.5 is below 6.0 * 0.8 but not below 6.0 * 0.5
        let doc = with_positions(vec![position("Аналитик данных")]);
        let breakdown = calc().explain("python аналитик", &doc);
        assert!(!breakdown.penalized);
        assert!(approx(breakdown.score, 0.35));
    }

    #[test]
    fn test_penalty_skipped_when_vocabulary_in_blocks() {
        let doc = with_positions(vec![Position {
            name: Some("Senior Java developer".into()),
            spheres: None,
            description: Some(PositionDescription {
                blocks: Some(vec![ContentBlock {
                    text: None,
                    items: Some(vec!["Немного ML".into()]),
                }]),
            }),
        }]);
        let breakdown = calc().explain("senior python", &doc);
        assert!(!breakdown.penalized);
        assert!(approx(breakdown.raw_score, 1.75));
    }

    #[test]
    fn test_penalty_skipped_for_uncategorised_query() {
        let c = calc();
        let doc = Document::default();
        assert_eq!(c.category_mismatch_penalty(&Query::new("hr"), &doc, 1.0), 1.0);
    }

    #[test]
    fn test_missing_positions_use_fallback() {
        let doc = Document {
            title: Some("HR стажировка".into()),
            positions: None,
            ..Default::default()
        };
        let breakdown = calc().explain("hr", &doc);
        assert_eq!(breakdown.best_position, None);
        assert_eq!(breakdown.position_score, 0.0);
        assert!(approx(breakdown.score, 0.3));
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let doc = with_positions(vec![position("Python разработчик")]);
        assert_eq!(calc().score("   ", &doc), 0.0);
    }

    #[test]
    fn test_normalize_clamps() {
        let c = calc();
        assert_eq!(c.normalize(25.0), 1.0);
        assert!(approx(c.normalize(5.0), 0.5));
    }

    #[test]
    fn test_unusable_max_score_stays_in_bounds() {
        let doc = Document {
            title: Some("HR стажировка".into()),
            ..Default::default()
        };
        for max_score in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let weights = RelevanceWeights {
                max_score,
                ..Default::default()
            };
            let c = RelevanceCalculator::new(Taxonomy::builtin(), weights, TermWeights::default());
            let score = c.score("hr", &doc);
            assert_eq!(score, 0.0, "max_score {} gave {}", max_score, score);
        }
    }

    #[test]
    fn test_normalize_rejects_nan_raw_score() {
        assert_eq!(calc().normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_step_functions_agree_with_waterfall() {
        let c = calc();
        let q = Query::new("python разработчик");
        let doc = Document {
            title: Some("Стажировка".into()),
            positions: Some(vec![position("Маркетолог"), position("Java разработчик")]),
            ..Default::default()
        };
        let breakdown = c.explain_query(&q, &doc);
        let (best, position_score) = c.evaluate_positions(&q, &doc);
        assert_eq!(breakdown.best_position, best);
        assert_eq!(breakdown.position_score, position_score);
        assert_eq!(c.position_score(&q, &doc.positions()[1]), position_score);
        assert_eq!(c.category_score(&q, "java разработчик"), 6.0);
    }

    #[test]
    fn test_custom_weights() {
        let weights = RelevanceWeights {
            max_score: 20.0,
            ..Default::default()
        };
        let c = RelevanceCalculator::new(Taxonomy::builtin(), weights, TermWeights::default());
        let doc = with_positions(vec![position("Python разработчик")]);
        assert!(approx(c.score("python", &doc), 0.5));
    }
}
