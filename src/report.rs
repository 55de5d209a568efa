//! Rendering evaluation results.
//!
//! Three formats are supported:
//!
//! - **table**: aligned per-query rows plus averages, for terminals.
//! - **json**: the full [`EvaluationReport`] with a generation timestamp
//!   and, when a baseline was given, the [`Comparison`].
//! - **csv**: the long `query,model,metric,value` layout with one row per
//!   metric, values rounded to three decimals.
//!
//! When no format is requested, [`OutputFormat::default_for_tty`] picks the
//! table for an interactive stdout and JSON otherwise.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use listing_rank_core::{EvaluationReport, QueryEvaluation};
use serde::Serialize;
use std::fmt::Write as _;

/// Differences below this are reported as ties.
const TIE_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// Default: table when stdout is a TTY, otherwise JSON.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stdout) {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    }
}

/// One line of the long-format report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub query: String,
    pub model: String,
    pub metric: &'static str,
    pub value: f64,
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Flatten a report into `query, model, metric, value` rows.
pub fn report_rows(report: &EvaluationReport, model: &str) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(report.evaluations.len() * 5);
    for eval in &report.evaluations {
        let metrics: [(&'static str, f64); 5] = [
            ("PRECISION", eval.precision),
            ("DCG", eval.dcg),
            ("IDCG", eval.idcg),
            ("NDCG", eval.ndcg),
            ("EVALUATED_RESULTS", eval.evaluated_count as f64),
        ];
        for (metric, value) in metrics {
            rows.push(ReportRow {
                query: eval.query.clone(),
                model: model.to_string(),
                metric,
                value: round3(value),
            });
        }
    }
    rows
}

pub fn render_csv(rows: &[ReportRow]) -> String {
    let mut out = String::from("query,model,metric,value\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            csv_field(&row.query),
            csv_field(&row.model),
            row.metric,
            row.value
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_table(report: &EvaluationReport, model: &str) -> String {
    let width = report
        .evaluations
        .iter()
        .map(|e| e.query.chars().count())
        .max()
        .unwrap_or(0)
        .max("query".len());

    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", model);
    let _ = writeln!(
        out,
        "{:<width$}  {:>9}  {:>7}  {:>7}  {:>6}  {:>7}",
        "query",
        "precision",
        "dcg",
        "idcg",
        "ndcg",
        "results",
        width = width
    );
    for eval in &report.evaluations {
        let _ = writeln!(out, "{}", table_row(eval, width));
    }
    let _ = writeln!(
        out,
        "\nAverage precision: {:.3}\nAverage NDCG:      {:.3}",
        report.avg_precision, report.avg_ndcg
    );
    out
}

fn table_row(eval: &QueryEvaluation, width: usize) -> String {
    // Pad by chars so Cyrillic queries line up.
    let pad = width.saturating_sub(eval.query.chars().count());
    format!(
        "{}{}  {:>9.3}  {:>7.3}  {:>7.3}  {:>6.3}  {:>7}",
        eval.query,
        " ".repeat(pad),
        eval.precision,
        eval.dcg,
        eval.idcg,
        eval.ndcg,
        eval.evaluated_count
    )
}

/// Per-query difference between a candidate run and a baseline.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDelta {
    pub query: String,
    pub ndcg_delta: f64,
    pub precision_delta: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub deltas: Vec<QueryDelta>,
    pub avg_ndcg_delta: f64,
    pub avg_precision_delta: f64,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
    /// Queries present in only one of the two runs.
    pub unmatched: Vec<String>,
}

/// Compare `candidate` against `baseline` over the queries both runs
/// contain. Wins and losses are decided on NDCG; the average deltas are the
/// mean of the per-query deltas, so queries present in only one run do not
/// shift them.
pub fn compare(candidate: &EvaluationReport, baseline: &EvaluationReport) -> Comparison {
    let mut deltas = Vec::new();
    let mut unmatched = Vec::new();
    let (mut wins, mut losses, mut ties) = (0, 0, 0);

    for eval in &candidate.evaluations {
        let Some(base) = baseline.get(&eval.query) else {
            unmatched.push(eval.query.clone());
            continue;
        };
        let ndcg_delta = eval.ndcg - base.ndcg;
        if ndcg_delta > TIE_EPSILON {
            wins += 1;
        } else if ndcg_delta < -TIE_EPSILON {
            losses += 1;
        } else {
            ties += 1;
        }
        deltas.push(QueryDelta {
            query: eval.query.clone(),
            ndcg_delta,
            precision_delta: eval.precision - base.precision,
        });
    }
    for eval in &baseline.evaluations {
        if candidate.get(&eval.query).is_none() {
            unmatched.push(eval.query.clone());
        }
    }

    let divisor = deltas.len().max(1) as f64;
    let avg_ndcg_delta = deltas.iter().map(|d| d.ndcg_delta).sum::<f64>() / divisor;
    let avg_precision_delta = deltas.iter().map(|d| d.precision_delta).sum::<f64>() / divisor;

    Comparison {
        deltas,
        avg_ndcg_delta,
        avg_precision_delta,
        wins,
        losses,
        ties,
        unmatched,
    }
}

pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::from("\nAgainst baseline:\n");
    for delta in &comparison.deltas {
        let _ = writeln!(
            out,
            "  {}  ndcg {:+.3}  precision {:+.3}",
            delta.query, delta.ndcg_delta, delta.precision_delta
        );
    }
    let _ = writeln!(
        out,
        "Average NDCG delta: {:+.3}\nAverage precision delta: {:+.3}\nWins: {}  Losses: {}  Ties: {}",
        comparison.avg_ndcg_delta,
        comparison.avg_precision_delta,
        comparison.wins,
        comparison.losses,
        comparison.ties
    );
    if !comparison.unmatched.is_empty() {
        let _ = writeln!(out, "Not in both runs: {}", comparison.unmatched.join(", "));
    }
    out
}

/// JSON document printed by `lrank evaluate --format json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub model: &'a str,
    pub relevance_threshold: f64,
    #[serde(flatten)]
    pub report: &'a EvaluationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<&'a EvaluationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<&'a Comparison>,
}
