//! `lrank labels`: export graded relevance labels for training.
//!
//! Each `(query, document)` pair of a run becomes one JSON line:
//!
//! ```json
//! {"query":"qa","uuid":"…","text":"qa инженер …","label":1.0}
//! ```
//!
//! `text` is the document's full text with the configured markup tokens
//! removed and whitespace collapsed; `label` is the relevance score.

use anyhow::{Context, Result};
use listing_rank_core::text::extract_full_text;
use listing_rank_core::{Document, Query, RelevanceCalculator};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::corpus::{self, RankedRun};
use crate::eval_cmd::select_queries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRecord {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub text: String,
    pub label: f64,
}

/// Remove `strip_tokens` from `text` and collapse runs of whitespace.
pub fn clean_text(text: &str, strip_tokens: &[String]) -> String {
    let mut cleaned = text.to_string();
    for token in strip_tokens.iter().filter(|t| !t.is_empty()) {
        // Tokens are matched against already-lowercased text.
        cleaned = cleaned.replace(&token.to_lowercase(), " ");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn label_document(
    calculator: &RelevanceCalculator,
    query: &Query,
    raw_query: &str,
    document: &Document,
    strip_tokens: &[String],
) -> LabelRecord {
    LabelRecord {
        query: raw_query.to_string(),
        uuid: document.uuid.clone(),
        text: clean_text(&extract_full_text(document), strip_tokens),
        label: calculator.score_query(query, document),
    }
}

pub fn build_labels(
    calculator: &RelevanceCalculator,
    run: &RankedRun,
    strip_tokens: &[String],
) -> Vec<LabelRecord> {
    run.iter()
        .flat_map(|(raw, documents)| {
            let query = Query::new(raw);
            documents
                .iter()
                .map(move |doc| label_document(calculator, &query, raw, doc, strip_tokens))
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn write_jsonl<W: Write>(mut out: W, records: &[LabelRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

pub async fn run_labels(
    config: &Config,
    run: &Path,
    output: Option<PathBuf>,
    all_queries: bool,
) -> Result<()> {
    let run = select_queries(config, corpus::load_run(run).await?, all_queries);
    let calculator = config.build_calculator();
    let records = build_labels(&calculator, &run, &config.labels.strip_tokens);

    match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_jsonl(std::io::BufWriter::new(file), &records)?;
            eprintln!("Wrote {} labels to {}", records.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_jsonl(stdout.lock(), &records)?;
        }
    }

    tracing::info!(queries = run.len(), labels = records.len(), "exported labels");
    Ok(())
}
