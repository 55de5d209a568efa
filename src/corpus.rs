//! Loading listings and ranked runs from JSON files.
//!
//! Two file shapes are accepted:
//!
//! - **Documents file**: a JSON array of listings or search hits, or a full
//!   search-service response (`{"hits": {"hits": [...]}}`).
//! - **Run file**: a JSON object mapping each query to its ranked result
//!   list, where every list may take either documents-file shape.
//!
//! Files are read with `tokio::fs`; parsing is synchronous and separately
//! testable.

use anyhow::{bail, Context, Result};
use listing_rank_core::Document;
use serde_json::Value;
use std::path::Path;

/// A query with its ranked result list.
pub type RankedRun = Vec<(String, Vec<Document>)>;

pub async fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let value = read_json(path).await?;
    let documents = parse_documents(value)
        .with_context(|| format!("Invalid documents file: {}", path.display()))?;
    tracing::info!(path = %path.display(), documents = documents.len(), "loaded documents");
    Ok(documents)
}

pub async fn load_run(path: &Path) -> Result<RankedRun> {
    let value = read_json(path).await?;
    let run = parse_run(value).with_context(|| format!("Invalid run file: {}", path.display()))?;
    tracing::info!(path = %path.display(), queries = run.len(), "loaded run");
    Ok(run)
}

async fn read_json(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

/// Parse a ranked list: an array, or a search response wrapping one.
pub fn parse_documents(value: Value) -> Result<Vec<Document>> {
    match value {
        Value::Array(items) => Document::from_values(items),
        Value::Object(mut map) => match map.remove("hits") {
            Some(Value::Object(mut hits)) => match hits.remove("hits") {
                Some(Value::Array(items)) => Document::from_values(items),
                _ => bail!("Expected `hits.hits` to be an array"),
            },
            _ => bail!("Expected an array of documents or a search response with `hits.hits`"),
        },
        _ => bail!("Expected an array of documents"),
    }
}

/// Parse a run file into `(query, ranked documents)` pairs.
pub fn parse_run(value: Value) -> Result<RankedRun> {
    let Value::Object(map) = value else {
        bail!("Expected a JSON object mapping queries to ranked results");
    };

    map.into_iter()
        .map(|(query, ranked)| {
            let documents = parse_documents(ranked)
                .with_context(|| format!("Invalid results for query '{}'", query))?;
            Ok((query, documents))
        })
        .collect()
}

/// Keep only the queries named in `wanted` (trimmed, case-insensitive).
/// Wanted queries that are absent from the run are logged and skipped.
pub fn filter_run(run: RankedRun, wanted: &[String]) -> RankedRun {
    let normalize = |q: &str| q.trim().to_lowercase();
    let wanted_keys: Vec<String> = wanted.iter().map(|q| normalize(q)).collect();

    for (want, key) in wanted.iter().zip(&wanted_keys) {
        if !run.iter().any(|(query, _)| &normalize(query) == key) {
            tracing::warn!(query = %want, "configured query not present in run, skipping");
        }
    }

    run.into_iter()
        .filter(|(query, _)| wanted_keys.contains(&normalize(query)))
        .collect()
}
