//! DOM snapshot model
//!
//! This module provides the typed form of the JSON produced by the
//! browser-side scraper. It includes:
//! - DomNode: one node of the snapshot, either text or element
//! - Envelope / InputPayload: the message wrapper carrying a snapshot

pub mod node;
pub mod payload;

pub use node::{DomNode, ELEMENT_NODE, TEXT_NODE};
pub use payload::{DEFAULT_KIND, Envelope, InputPayload};

use crate::error::Result;

/// Parse the DOM root carried by a scraper message
pub fn parse_snapshot(json: &str) -> Result<DomNode> {
    Envelope::from_json(json)?.input.dom_root()
}
