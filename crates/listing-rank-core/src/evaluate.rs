//! Ranking-quality evaluation.
//!
//! Grades a ranked result list using the [`RelevanceCalculator`] as the
//! relevance oracle: every document gets a graded label in `[0, 1]`, and the
//! label sequence (in rank order) is summarised with precision, DCG, IDCG and
//! NDCG.
//!
//! ```text
//! DCG  = Σ score_i / max(1, log2(i + 1))     (i = 1-based rank)
//! IDCG = DCG of the scores sorted descending
//! NDCG = DCG / IDCG                          (0.0 when IDCG is 0.0)
//! ```

use serde::Serialize;
use tracing::debug;

use crate::models::Document;
use crate::normalize::Query;
use crate::relevance::RelevanceCalculator;

/// Scores at or above this count as relevant for precision.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.5;

/// Fraction of scores at or above `threshold`. `0.0` for an empty list.
pub fn precision(scores: &[f64], threshold: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let relevant = scores.iter().filter(|&&s| s >= threshold).count();
    relevant as f64 / scores.len() as f64
}

/// Discounted cumulative gain of scores in the given order.
pub fn dcg(scores: &[f64]) -> f64 {
    scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let rank = (i + 1) as f64;
            score / (rank + 1.0).log2().max(1.0)
        })
        .sum()
}

/// DCG of the best possible ordering of `scores`.
pub fn idcg(scores: &[f64]) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    dcg(&sorted)
}

/// Normalized DCG in `[0, 1]`; `0.0` when every score is zero.
pub fn ndcg(scores: &[f64]) -> f64 {
    let ideal = idcg(scores);
    if ideal == 0.0 {
        return 0.0;
    }
    dcg(scores) / ideal
}

/// Metrics for one query's ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub precision: f64,
    pub dcg: f64,
    pub idcg: f64,
    pub ndcg: f64,
    /// Number of documents in the ranked list.
    pub evaluated_count: usize,
    /// Relevance label per document, in rank order.
    pub relevance_scores: Vec<f64>,
}

impl QueryEvaluation {
    /// Compute every metric from precomputed relevance labels.
    pub fn from_scores(query: &str, relevance_scores: Vec<f64>, threshold: f64) -> Self {
        Self {
            query: query.to_string(),
            precision: precision(&relevance_scores, threshold),
            dcg: dcg(&relevance_scores),
            idcg: idcg(&relevance_scores),
            ndcg: ndcg(&relevance_scores),
            evaluated_count: relevance_scores.len(),
            relevance_scores,
        }
    }
}

/// Metrics for a whole run of queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Per-query results, in the order the queries were supplied.
    pub evaluations: Vec<QueryEvaluation>,
    pub avg_precision: f64,
    pub avg_ndcg: f64,
}

impl EvaluationReport {
    /// Aggregate per-query results. Queries with an empty ranked list count
    /// as zeros; an empty run averages to zero.
    pub fn from_evaluations(evaluations: Vec<QueryEvaluation>) -> Self {
        let divisor = evaluations.len().max(1) as f64;
        let total_precision: f64 = evaluations.iter().map(|e| e.precision).sum();
        let total_ndcg: f64 = evaluations.iter().map(|e| e.ndcg).sum();
        Self {
            avg_precision: total_precision / divisor,
            avg_ndcg: total_ndcg / divisor,
            evaluations,
        }
    }

    pub fn get(&self, query: &str) -> Option<&QueryEvaluation> {
        self.evaluations.iter().find(|e| e.query == query)
    }
}

/// Evaluates ranked lists against a relevance calculator.
#[derive(Debug, Clone)]
pub struct SearchEvaluator {
    calculator: RelevanceCalculator,
    threshold: f64,
}

impl Default for SearchEvaluator {
    fn default() -> Self {
        Self::new(RelevanceCalculator::default())
    }
}

impl SearchEvaluator {
    pub fn new(calculator: RelevanceCalculator) -> Self {
        Self {
            calculator,
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }

    /// Override the precision threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn calculator(&self) -> &RelevanceCalculator {
        &self.calculator
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score each document in rank order and compute the metrics.
    pub fn evaluate_one(&self, query: &str, ranked: &[Document]) -> QueryEvaluation {
        let normalized = Query::new(query);
        let scores: Vec<f64> = ranked
            .iter()
            .map(|doc| self.calculator.score_query(&normalized, doc))
            .collect();

        let evaluation = QueryEvaluation::from_scores(query, scores, self.threshold);
        debug!(
            query,
            evaluated = evaluation.evaluated_count,
            precision = evaluation.precision,
            ndcg = evaluation.ndcg,
            "evaluated query"
        );
        evaluation
    }

    /// Evaluate every `(query, ranked documents)` pair and average the
    /// results. Accepts any map or sequence of pairs; output order follows
    /// iteration order.
    pub fn evaluate_many<I, Q, D>(&self, runs: I) -> EvaluationReport
    where
        I: IntoIterator<Item = (Q, D)>,
        Q: AsRef<str>,
        D: AsRef<[Document]>,
    {
        let evaluations = runs
            .into_iter()
            .map(|(query, ranked)| self.evaluate_one(query.as_ref(), ranked.as_ref()))
            .collect();
        EvaluationReport::from_evaluations(evaluations)
    }
}
