//! `lrank categories`: show how a query is normalized and which taxonomy
//! categories it triggers.

use anyhow::Result;
use listing_rank_core::{Query, Taxonomy};
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryMatch {
    pub canonical: String,
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub variants: Vec<String>,
    /// Tokens the partial position match weighs as common terms.
    pub common_tokens: Vec<String>,
    pub categories: Vec<CategoryMatch>,
    /// Categories named literally in the query; these drive the sphere check.
    pub sphere_categories: Vec<String>,
}

pub fn analyze(taxonomy: &Taxonomy, raw: &str) -> QueryAnalysis {
    let query = Query::new(raw);
    QueryAnalysis {
        query: query.as_str().to_string(),
        variants: query.variants().iter().cloned().collect(),
        common_tokens: query
            .parts()
            .iter()
            .filter(|p| taxonomy.is_common_term(p))
            .cloned()
            .collect(),
        categories: taxonomy
            .detect_categories(&query)
            .into_iter()
            .map(|e| CategoryMatch {
                canonical: e.canonical.clone(),
                related: e.related.clone(),
            })
            .collect(),
        sphere_categories: taxonomy
            .named_in(query.as_str())
            .map(|e| e.canonical.clone())
            .collect(),
    }
}

pub fn run_categories(config: &Config, query: &str, json: bool) -> Result<()> {
    let analysis = analyze(&config.build_taxonomy(), query);

    if json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("Query:    {}", analysis.query);
    println!("Variants: {}", analysis.variants.join(" | "));
    if !analysis.common_tokens.is_empty() {
        println!("Common:   {}", analysis.common_tokens.join(", "));
    }
    if analysis.categories.is_empty() {
        println!("No categories detected.");
        return Ok(());
    }
    println!("Categories:");
    for c in &analysis.categories {
        let sphere = if analysis.sphere_categories.contains(&c.canonical) {
            " [sphere]"
        } else {
            ""
        };
        println!("  {}{}: {}", c.canonical, sphere, c.related.join(", "));
    }
    Ok(())
}
