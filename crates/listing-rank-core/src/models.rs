//! Listing data model.
//!
//! A [`Document`] is one internship listing as produced by the crawler and
//! returned by the search service. Every field is optional: the crawler
//! writes `null` for data it could not fetch, and scoring treats a missing
//! field as empty text rather than an error.
//!
//! The only hard failure is structural: a value that is not a JSON object,
//! or a field holding the wrong JSON type, is rejected by
//! [`Document::from_value`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One internship listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Listing identifier assigned by the source site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Listing headline.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form listing description.
    #[serde(default)]
    pub description: Option<String>,
    /// Company metadata.
    #[serde(default)]
    pub company: Option<Company>,
    /// Roles offered by the listing, in source order.
    #[serde(default)]
    pub positions: Option<Vec<Position>>,
}

/// Company that published a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description_blocks: Option<Vec<ContentBlock>>,
}

/// A specific role or track inside a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Role name, e.g. "Python разработчик".
    #[serde(default)]
    pub name: Option<String>,
    /// Coarse professional-field tags.
    #[serde(default)]
    pub spheres: Option<Vec<Sphere>>,
    #[serde(default)]
    pub description: Option<PositionDescription>,
}

/// Professional-field tag attached to a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionDescription {
    #[serde(default)]
    pub blocks: Option<Vec<ContentBlock>>,
}

/// Rich-text block: a paragraph plus an optional bullet list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<String>>,
}

impl Document {
    /// Build a document from a JSON value.
    ///
    /// Search-service hits (`{"_id": .., "_source": {..}}`) are unwrapped to
    /// their `_source`. Anything that is not a JSON object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) if map.contains_key("_source") => {
                map.remove("_source").unwrap_or(Value::Null)
            }
            other => other,
        };

        if !value.is_object() {
            bail!(
                "Expected a JSON object for a document, found {}",
                json_type_name(&value)
            );
        }

        serde_json::from_value(value).context("Document has a field of the wrong type")
    }

    /// Build documents from a JSON array, preserving order.
    pub fn from_values(values: Vec<Value>) -> Result<Vec<Self>> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                Self::from_value(v).with_context(|| format!("Invalid document at index {}", i))
            })
            .collect()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Positions in source order; empty when absent or `null`.
    pub fn positions(&self) -> &[Position] {
        self.positions.as_deref().unwrap_or(&[])
    }

    pub fn company_caption(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.caption.as_deref())
    }
}

impl Position {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn spheres(&self) -> &[Sphere] {
        self.spheres.as_deref().unwrap_or(&[])
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        self.description
            .as_ref()
            .and_then(|d| d.blocks.as_deref())
            .unwrap_or(&[])
    }
}

impl ContentBlock {
    pub fn items(&self) -> &[String] {
        self.items.as_deref().unwrap_or(&[])
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
