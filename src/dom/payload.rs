use crate::dom::node::DomNode;
use crate::error::{RelayError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Kind assumed for payloads that do not declare a `type`
pub const DEFAULT_KIND: &str = "div";

/// Message envelope sent by the browser-side scraper
///
/// ```json
/// {"input": {"type": "div", "data": { ...DomNode... }}, "context": [], "actions": []}
/// ```
///
/// Only `input` is read; any other top-level keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub input: InputPayload,
}

/// The `input` member of an [`Envelope`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPayload {
    /// Payload kind (`"div"`, `"dom"`, `"script"`); absent on older scrapers
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Kind-specific data, decoded by the matching handler
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Parse an envelope from raw message text
    ///
    /// Nesting is not limited at parse time; deep snapshots are truncated by
    /// the extractor's depth guard instead.
    pub fn from_json(json: &str) -> Result<Self> {
        from_str_unbounded(json).map_err(|e| RelayError::InvalidPayload(e.to_string()))
    }
}

impl InputPayload {
    /// Payload kind, falling back to [`DEFAULT_KIND`]
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_KIND)
    }

    /// Interpret `data` as the root of a DOM snapshot
    pub fn dom_root(&self) -> Result<DomNode> {
        if self.data.is_null() {
            return Err(RelayError::InvalidPayload("input.data is missing".to_string()));
        }
        DomNode::deserialize(serde_stacker::Deserializer::new(&self.data))
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))
    }
}

/// Parse JSON of any nesting depth, growing the stack as needed
pub(crate) fn from_str_unbounded<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Decode an already-parsed value of any nesting depth
pub(crate) fn from_value_unbounded<T: DeserializeOwned>(value: serde_json::Value) -> serde_json::Result<T> {
    T::deserialize(serde_stacker::Deserializer::new(value))
}
