//! # Listing Rank Core
//!
//! Pure scoring logic for Listing Rank: the listing document model, the
//! technology taxonomy, the relevance calculator, and the ranking-quality
//! evaluator.
//!
//! This crate contains no tokio, filesystem I/O, or network access. Every
//! type is immutable after construction and safe to share across threads,
//! so a single [`relevance::RelevanceCalculator`] can score any number of
//! queries concurrently.
//!
//! ## Pipeline
//!
//! 1. A raw query is normalized into a [`normalize::Query`] (lowercase,
//!    tokens, spelling variants).
//! 2. The [`taxonomy::Taxonomy`] detects which technology categories the
//!    query refers to.
//! 3. The [`relevance::RelevanceCalculator`] walks a fixed waterfall of
//!    evaluators over a [`models::Document`] and returns a score in `[0, 1]`.
//! 4. The [`evaluate::SearchEvaluator`] turns the scores of a ranked list
//!    into precision, DCG, IDCG and NDCG.

pub mod evaluate;
pub mod models;
pub mod normalize;
pub mod relevance;
pub mod taxonomy;
pub mod text;
pub mod weights;

pub use evaluate::{EvaluationReport, QueryEvaluation, SearchEvaluator};
pub use models::{Company, ContentBlock, Document, Position, Sphere};
pub use normalize::Query;
pub use relevance::{RelevanceCalculator, ScoreBreakdown};
pub use taxonomy::{Taxonomy, TaxonomyEntry};
pub use weights::{RelevanceWeights, TermWeights};
