//! DOM-to-Markdown reassembly
//!
//! - Blacklist: phrases that mark injected page chrome
//! - detect_language: `language-*` class lookup under a code block
//! - DomExtractor: the traversal that produces the transcript

pub mod blacklist;
pub mod extractor;
pub mod language;

pub use blacklist::{Blacklist, COPY_CODE};
pub use extractor::{DEFAULT_MAX_DEPTH, DomExtractor, FENCE};
pub use language::detect_language;

use crate::error::Result;

/// Convert a scraper envelope (`{"input": {"data": ...}}`) into Markdown
pub fn extract_markdown(json: &str) -> Result<String> {
    Ok(DomExtractor::from_json(json)?.extract())
}
