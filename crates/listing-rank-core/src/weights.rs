//! Scoring weight tables.
//!
//! The weights define the whole scoring contract: the relevance waterfall
//! only ever emits one of these numbers (or a scaled copy of one), and the
//! final score is the raw score divided by [`RelevanceWeights::max_score`].
//! Changing a default changes every score the crate produces.
//!
//! | Match type                  | Default |
//! |-----------------------------|---------|
//! | `exact_position_match`      | 10.0    |
//! | `partial_position_match`    | 7.0     |
//! | `category_match`            | 6.0     |
//! | `sphere_match`              | 5.0     |
//! | `exact_description_match`   | 5.0     |
//! | `partial_description_match` | 4.0     |
//! | `title_match`               | 3.0     |
//! | `description_match`         | 2.0     |
//! | `max_score`                 | 10.0    |

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Weight per match type, on the `max_score` scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    /// Whole query found inside a position name.
    pub exact_position_match: f64,
    /// Scale for the token-overlap score of a position name.
    pub partial_position_match: f64,
    /// Text contains vocabulary of a category the query belongs to.
    pub category_match: f64,
    /// A position sphere belongs to a category the query belongs to.
    pub sphere_match: f64,
    pub exact_description_match: f64,
    pub partial_description_match: f64,
    /// Query found as a whole word in the listing title.
    pub title_match: f64,
    /// Query found as a whole word in the listing description.
    pub description_match: f64,
    /// Threshold reserved for callers; the calculator never reads it.
    pub minimum_tech_relevance: f64,
    /// Raw score that maps to a normalized score of 1.0.
    pub max_score: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            exact_position_match: 10.0,
            partial_position_match: 7.0,
            category_match: 6.0,
            sphere_match: 5.0,
            exact_description_match: 5.0,
            partial_description_match: 4.0,
            title_match: 3.0,
            description_match: 2.0,
            minimum_tech_relevance: 0.3,
            max_score: 10.0,
        }
    }
}

impl RelevanceWeights {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("exact_position_match", self.exact_position_match),
            ("partial_position_match", self.partial_position_match),
            ("category_match", self.category_match),
            ("sphere_match", self.sphere_match),
            ("exact_description_match", self.exact_description_match),
            ("partial_description_match", self.partial_description_match),
            ("title_match", self.title_match),
            ("description_match", self.description_match),
            ("minimum_tech_relevance", self.minimum_tech_relevance),
        ];
        for (name, value) in named {
            check_weight(name, value)?;
        }
        if !(self.max_score.is_finite() && self.max_score > 0.0) {
            bail!("weights.max_score must be > 0, got {}", self.max_score);
        }
        Ok(())
    }
}

/// Per-token weights used by the partial position-name match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermWeights {
    /// Generic token ("developer", "junior") found in a position name.
    pub common_term_position: f64,
    /// Any other token found in a position name.
    pub specific_term_position: f64,
    pub common_term_description: f64,
    pub specific_term_description: f64,
}

impl Default for TermWeights {
    fn default() -> Self {
        Self {
            common_term_position: 0.5,
            specific_term_position: 1.0,
            common_term_description: 0.3,
            specific_term_description: 0.7,
        }
    }
}

impl TermWeights {
    pub fn validate(&self) -> Result<()> {
        check_weight("term_weights.common_term_position", self.common_term_position)?;
        check_weight("term_weights.specific_term_position", self.specific_term_position)?;
        check_weight("term_weights.common_term_description", self.common_term_description)?;
        check_weight(
            "term_weights.specific_term_description",
            self.specific_term_description,
        )?;
        Ok(())
    }
}

fn check_weight(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a finite number >= 0, got {}", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        RelevanceWeights::default().validate().unwrap();
        TermWeights::default().validate().unwrap();
    }

    #[test]
    fn test_waterfall_ordering_of_defaults() {
        let w = RelevanceWeights::default();
        assert!(w.exact_position_match > w.partial_position_match);
        assert!(w.partial_position_match > w.category_match);
        assert!(w.category_match > w.sphere_match);
        assert!(w.sphere_match > w.title_match);
        assert!(w.title_match > w.description_match);
        assert_eq!(w.exact_position_match, w.max_score);
    }

    #[test]
    fn test_zero_max_score_rejected() {
        let w = RelevanceWeights {
            max_score: 0.0,
            ..Default::default()
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = RelevanceWeights {
            sphere_match: -1.0,
            ..Default::default()
        };
        let err = w.validate().unwrap_err();
        assert!(err.to_string().contains("sphere_match"));

        let t = TermWeights {
            common_term_position: f64::NAN,
            ..Default::default()
        };
        assert!(t.validate().is_err());
    }
}
