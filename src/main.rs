//! # Listing Rank CLI (`lrank`)
//!
//! Scores internship listings against queries and grades ranked search
//! results.
//!
//! ## Usage
//!
//! ```bash
//! lrank --config ./config/lrank.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lrank score "<query>"` | Score every listing of a documents file |
//! | `lrank rerank "<query>"` | Re-rank a documents file by relevance |
//! | `lrank evaluate` | Precision and NDCG of a ranked run |
//! | `lrank labels` | Export relevance labels as JSON Lines |
//! | `lrank categories "<query>"` | Show detected taxonomy categories |
//! | `lrank completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Why did this listing score what it did?
//! lrank score "python" --documents hits.json --explain
//!
//! # Compare a new ranking against the previous one
//! lrank evaluate --run new.json --baseline old.json --format table
//!
//! # Long-format CSV report
//! lrank evaluate --run new.json --model bm25 --format csv > report.csv
//! ```

mod categories;
mod config;
mod corpus;
mod eval_cmd;
mod labels;
mod report;
mod score;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing Rank CLI: relevance scoring and ranking-quality evaluation for
/// internship listing search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist the built-in weights and taxonomy are
/// used.
#[derive(Parser)]
#[command(
    name = "lrank",
    about = "Relevance scoring and ranking-quality evaluation for internship listing search",
    version,
    long_about = "Listing Rank scores internship listings against free-text queries using \
    position names, sphere tags, titles, descriptions and a technology taxonomy, and grades \
    ranked result lists with precision, DCG and NDCG."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/lrank.toml`. Weights, taxonomy, evaluation and
    /// label-export settings are read from this file.
    #[arg(long, global = true, default_value = "./config/lrank.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Score every listing of a documents file against a query.
    ///
    /// Results are printed in file order.
    Score {
        /// The search query.
        query: String,

        /// JSON array of listings or search hits, or a search response.
        #[arg(long)]
        documents: PathBuf,

        /// Include the per-step score breakdown.
        #[arg(long)]
        explain: bool,

        /// Print JSON even when stdout is a terminal.
        #[arg(long)]
        json: bool,
    },

    /// Re-rank a documents file by relevance.
    ///
    /// Sorts by score, highest first; listings with equal scores keep their
    /// input order.
    Rerank {
        /// The search query.
        query: String,

        /// JSON array of listings or search hits, or a search response.
        #[arg(long)]
        documents: PathBuf,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Drop listings scoring below this value.
        #[arg(long, default_value_t = 0.0)]
        min_score: f64,

        /// Print JSON even when stdout is a terminal.
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a ranked run.
    ///
    /// A run file is a JSON object mapping each query to its ranked
    /// results. Reports precision, DCG, IDCG and NDCG per query and the
    /// averages over all queries.
    Evaluate {
        /// Run file to evaluate.
        #[arg(long)]
        run: PathBuf,

        /// Second run to compare against.
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Model name for the report. Defaults to the run file name.
        #[arg(long)]
        model: Option<String>,

        /// Ignore `[evaluation].queries` and evaluate every query in the run.
        #[arg(long)]
        all_queries: bool,

        /// Output format. Defaults to `table` on a terminal, `json` otherwise.
        #[arg(long, value_enum)]
        format: Option<report::OutputFormat>,
    },

    /// Export relevance labels for every (query, listing) pair of a run.
    Labels {
        /// Run file to label.
        #[arg(long)]
        run: PathBuf,

        /// Write JSON Lines here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Ignore `[evaluation].queries` and label every query in the run.
        #[arg(long)]
        all_queries: bool,
    },

    /// Show query variants and detected taxonomy categories.
    Categories {
        /// The query to analyze.
        query: String,

        /// Print JSON even when stdout is a terminal.
        #[arg(long)]
        json: bool,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "lrank", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Score {
            query,
            documents,
            explain,
            json,
        } => {
            score::run_score(&cfg, &query, &documents, explain, json).await?;
        }
        Commands::Rerank {
            query,
            documents,
            limit,
            min_score,
            json,
        } => {
            score::run_rerank(&cfg, &query, &documents, limit, min_score, json).await?;
        }
        Commands::Evaluate {
            run,
            baseline,
            model,
            all_queries,
            format,
        } => {
            eval_cmd::run_evaluate(&cfg, &run, baseline, model, all_queries, format).await?;
        }
        Commands::Labels {
            run,
            output,
            all_queries,
        } => {
            labels::run_labels(&cfg, &run, output, all_queries).await?;
        }
        Commands::Categories { query, json } => {
            categories::run_categories(&cfg, &query, json)?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
