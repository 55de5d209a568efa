//! TOML configuration.
//!
//! Every section is optional. A missing file means "use the built-in
//! scoring contract"; a file that exists but does not parse or validate is
//! an error, so a typo in a weight table never silently falls back.
//!
//! ```toml
//! [weights]
//! category_match = 6.0
//! max_score = 10.0
//!
//! [term_weights]
//! common_term_position = 0.5
//!
//! [taxonomy]
//! replace_builtin = false
//! common_terms = ["developer", "junior", "стажер"]
//!
//! [taxonomy.categories]
//! rust = ["разработка", "системный", "backend"]
//!
//! [evaluation]
//! relevance_threshold = 0.5
//! queries = ["python", "qa"]
//!
//! [labels]
//! strip_tokens = ["&nbsp;", "<br>"]
//! ```

use anyhow::{bail, Context, Result};
use listing_rank_core::{
    RelevanceCalculator, RelevanceWeights, SearchEvaluator, Taxonomy, TaxonomyEntry, TermWeights,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub weights: RelevanceWeights,
    #[serde(default)]
    pub term_weights: TermWeights,
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaxonomyConfig {
    /// Start from an empty table instead of the built-in one.
    #[serde(default)]
    pub replace_builtin: bool,
    /// Replaces the built-in common-term list when present.
    #[serde(default)]
    pub common_terms: Option<Vec<String>>,
    /// `canonical = [related, ...]`, added to or overriding the table.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
    /// Restrict runs to these queries unless `--all-queries` is given.
    #[serde(default)]
    pub queries: Option<Vec<String>>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            queries: None,
        }
    }
}

fn default_relevance_threshold() -> f64 {
    listing_rank_core::evaluate::DEFAULT_RELEVANCE_THRESHOLD
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelsConfig {
    /// Markup fragments removed from exported label text.
    #[serde(default = "default_strip_tokens")]
    pub strip_tokens: Vec<String>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            strip_tokens: default_strip_tokens(),
        }
    }
}

fn default_strip_tokens() -> Vec<String> {
    ["&nbsp;", "<br>", "</b>", "<b>", "&amp; ", "<i>", "</i>", "<a>", "</a>"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn build_taxonomy(&self) -> Taxonomy {
        let mut taxonomy = if self.taxonomy.replace_builtin {
            Taxonomy::new(Vec::new(), Vec::new())
        } else {
            Taxonomy::builtin()
        };

        if let Some(terms) = &self.taxonomy.common_terms {
            taxonomy = taxonomy.with_common_terms(terms.iter().cloned());
        }
        for (canonical, related) in &self.taxonomy.categories {
            taxonomy = taxonomy.with_category(TaxonomyEntry::new(canonical, related.as_slice()));
        }
        taxonomy
    }

    pub fn build_calculator(&self) -> RelevanceCalculator {
        RelevanceCalculator::new(self.build_taxonomy(), self.weights, self.term_weights)
    }

    pub fn build_evaluator(&self) -> SearchEvaluator {
        SearchEvaluator::new(self.build_calculator())
            .with_threshold(self.evaluation.relevance_threshold)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.weights.validate()?;
    config.term_weights.validate()?;

    if !(0.0..=1.0).contains(&config.evaluation.relevance_threshold) {
        bail!("evaluation.relevance_threshold must be in [0.0, 1.0]");
    }

    for canonical in config.taxonomy.categories.keys() {
        if canonical.trim().is_empty() {
            bail!("taxonomy.categories keys must not be empty");
        }
    }

    if config.taxonomy.replace_builtin && config.taxonomy.categories.is_empty() {
        tracing::warn!("taxonomy.replace_builtin is set but no categories are configured");
    }

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using built-in defaults");
        Ok(Config::minimal())
    }
}
