//! `lrank score` and `lrank rerank`.
//!
//! Both commands load a documents file and run every document through the
//! [`RelevanceCalculator`]. `score` reports in file order; `rerank` sorts by
//! score (stable, so ties keep file order), applies `--min-score` and then
//! `--limit`, and returns the documents themselves so the output can feed
//! another stage.

use anyhow::{bail, Result};
use listing_rank_core::{Document, Query, RelevanceCalculator, ScoreBreakdown};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::corpus;

/// A document with its relevance for one query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    /// Position in the input file, 0-based.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub title: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

/// Score `documents` in input order.
pub fn score_documents(
    calculator: &RelevanceCalculator,
    query: &str,
    documents: &[Document],
    explain: bool,
) -> Vec<ScoredDocument> {
    let query = Query::new(query);
    documents
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            let breakdown = calculator.explain_query(&query, doc);
            ScoredDocument {
                index,
                uuid: doc.uuid.clone(),
                title: doc.title().to_string(),
                score: breakdown.score,
                breakdown: explain.then_some(breakdown),
                document: None,
            }
        })
        .collect()
}

/// Score, sort descending, filter and truncate.
pub fn rerank_documents(
    calculator: &RelevanceCalculator,
    query: &str,
    documents: Vec<Document>,
    limit: Option<usize>,
    min_score: f64,
) -> Vec<ScoredDocument> {
    let query = Query::new(query);
    let mut scored: Vec<ScoredDocument> = documents
        .into_iter()
        .enumerate()
        .map(|(index, doc)| ScoredDocument {
            index,
            uuid: doc.uuid.clone(),
            title: doc.title().to_string(),
            score: calculator.score_query(&query, &doc),
            breakdown: None,
            document: Some(doc),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.retain(|s| s.score >= min_score);
    if let Some(limit) = limit {
        scored.truncate(limit);
    }
    scored
}

pub async fn run_score(
    config: &Config,
    query: &str,
    documents: &Path,
    explain: bool,
    json: bool,
) -> Result<()> {
    let documents = corpus::load_documents(documents).await?;
    let calculator = config.build_calculator();
    let scored = score_documents(&calculator, query, &documents, explain);

    if json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(&scored)?);
        return Ok(());
    }

    if scored.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    for s in &scored {
        println!("{}", format_line(s.index, s));
        if let Some(b) = &s.breakdown {
            println!("    {}", format_breakdown(b));
        }
    }
    Ok(())
}

pub async fn run_rerank(
    config: &Config,
    query: &str,
    documents: &Path,
    limit: Option<usize>,
    min_score: f64,
    json: bool,
) -> Result<()> {
    if !(0.0..=1.0).contains(&min_score) {
        bail!("--min-score must be in [0.0, 1.0], got {}", min_score);
    }

    let documents = corpus::load_documents(documents).await?;
    let calculator = config.build_calculator();
    let total = documents.len();
    let ranked = rerank_documents(&calculator, query, documents, limit, min_score);
    tracing::info!(query, total, kept = ranked.len(), "reranked documents");

    if json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (i, s) in ranked.iter().enumerate() {
        println!("{}", format_line(i + 1, s));
    }
    Ok(())
}

fn format_line(ordinal: usize, s: &ScoredDocument) -> String {
    let label = match (&s.uuid, s.title.is_empty()) {
        (Some(uuid), true) => uuid.clone(),
        (Some(uuid), false) => format!("{} ({})", s.title, uuid),
        (None, true) => format!("<document {}>", s.index),
        (None, false) => s.title.clone(),
    };
    format!("{:>3}. [{:.3}] {}", ordinal, s.score, label)
}

fn format_breakdown(b: &ScoreBreakdown) -> String {
    let mut parts = vec![format!("position={:.2}", b.position_score)];
    if let Some(i) = b.best_position {
        parts.push(format!("best_position={}", i));
    }
    if let Some(f) = b.fallback_score {
        parts.push(format!("fallback={:.2}", f));
    }
    parts.push(format!("raw={:.3}", b.raw_score));
    if b.penalized {
        parts.push("penalized".to_string());
    }
    if !b.categories.is_empty() {
        parts.push(format!("categories={}", b.categories.join(",")));
    }
    parts.join("  ")
}
