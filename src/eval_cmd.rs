//! `lrank evaluate`: grade ranked runs and compare them.
//!
//! A run file maps each query to its ranked results. The candidate run and
//! the optional baseline are loaded together and evaluated concurrently on
//! the blocking pool; scoring is CPU-bound and the evaluator is shared
//! through an [`Arc`].

use anyhow::{Context, Result};
use listing_rank_core::{EvaluationReport, SearchEvaluator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::corpus::{self, RankedRun};
use crate::report::{self, JsonReport, OutputFormat};

pub async fn run_evaluate(
    config: &Config,
    run: &Path,
    baseline: Option<PathBuf>,
    model: Option<String>,
    all_queries: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let format = format.unwrap_or_else(OutputFormat::default_for_tty);
    let model = model.unwrap_or_else(|| model_name(run));

    let (candidate_run, baseline_run) = match &baseline {
        Some(path) => {
            let (c, b) = tokio::try_join!(corpus::load_run(run), corpus::load_run(path))?;
            (c, Some(b))
        }
        None => (corpus::load_run(run).await?, None),
    };

    let select = |r: RankedRun| select_queries(config, r, all_queries);
    let candidate_run = select(candidate_run);
    let baseline_run = baseline_run.map(select);

    let evaluator = Arc::new(config.build_evaluator());
    let candidate_task = spawn_evaluation(Arc::clone(&evaluator), candidate_run);
    let baseline_task = baseline_run.map(|r| spawn_evaluation(Arc::clone(&evaluator), r));

    let candidate = candidate_task.await.context("Evaluation task failed")?;
    let baseline_report = match baseline_task {
        Some(task) => Some(task.await.context("Baseline evaluation task failed")?),
        None => None,
    };
    let baseline_model = baseline.as_deref().map(model_name);

    let comparison = baseline_report
        .as_ref()
        .map(|b| report::compare(&candidate, b));

    tracing::info!(
        model = %model,
        queries = candidate.evaluations.len(),
        avg_ndcg = candidate.avg_ndcg,
        "evaluated run"
    );

    match format {
        OutputFormat::Json => {
            let json = JsonReport {
                generated_at: chrono::Utc::now(),
                model: &model,
                relevance_threshold: evaluator.threshold(),
                report: &candidate,
                baseline: baseline_report.as_ref(),
                comparison: comparison.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            let mut rows = report::report_rows(&candidate, &model);
            if let (Some(b), Some(name)) = (&baseline_report, &baseline_model) {
                rows.extend(report::report_rows(b, name));
            }
            print!("{}", report::render_csv(&rows));
        }
        OutputFormat::Table => {
            if candidate.evaluations.is_empty() {
                println!("No queries to evaluate.");
                return Ok(());
            }
            print!("{}", report::render_table(&candidate, &model));
            if let (Some(b), Some(name)) = (&baseline_report, &baseline_model) {
                println!();
                print!("{}", report::render_table(b, name));
            }
            if let Some(c) = &comparison {
                print!("{}", report::render_comparison(c));
            }
        }
    }

    Ok(())
}

fn spawn_evaluation(
    evaluator: Arc<SearchEvaluator>,
    run: RankedRun,
) -> tokio::task::JoinHandle<EvaluationReport> {
    tokio::task::spawn_blocking(move || evaluator.evaluate_many(run))
}

/// Apply `[evaluation].queries` unless every query was requested.
pub fn select_queries(config: &Config, run: RankedRun, all_queries: bool) -> RankedRun {
    match (&config.evaluation.queries, all_queries) {
        (Some(wanted), false) => corpus::filter_run(run, wanted),
        _ => run,
    }
}

/// Model label derived from a run file name.
fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string())
}
