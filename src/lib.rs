//! # dom-relay
//!
//! Reassembles chat-assistant replies scraped from a browser into Markdown, and
//! relays them between the browser and a local console over a WebSocket.
//!
//! ## Features
//!
//! - **DOM-to-Markdown**: Prose, inline code spans, and fenced code blocks with detected language tags
//! - **Chrome Filtering**: UI labels such as "Copy code" are dropped from the transcript
//! - **WebSocket Relay**: Receives DOM snapshots from the scraper, broadcasts console prompts back
//! - **Payload Handlers**: Per-`type` handling of scraper messages (`div`, `dom`, `script`)
//!
//! ## Running the Relay
//!
//! ```bash
//! # Listen on the address stored in config/config.json (127.0.0.1:9090 by default)
//! cargo run --bin dom-relay -- serve
//!
//! # Convert a captured message once
//! cargo run --bin dom-relay -- extract message.json
//! ```
//!
//! ## Library Usage
//!
//! ### Extracting a transcript
//!
//! ```rust
//! use dom_relay::markdown::extract_markdown;
//!
//! # fn main() -> dom_relay::Result<()> {
//! let message = r#"{"input": {"type": "div", "data": {
//!     "tagName": "P", "nodeType": 1, "attributes": {},
//!     "childNodes": [
//!         {"nodeType": 3, "nodeValue": "Use "},
//!         {"tagName": "CODE", "nodeType": 1, "childNodes": [{"nodeType": 3, "nodeValue": "Vec::new()"}]}
//!     ]
//! }}}"#;
//!
//! assert_eq!(extract_markdown(message)?, "Use `Vec::new()`\n");
//! # Ok(())
//! # }
//! ```
//!
//! ### Dispatching scraper messages
//!
//! ```rust
//! use dom_relay::{Envelope, HandlerContext, HandlerOutcome, HandlerRegistry};
//!
//! # fn main() -> dom_relay::Result<()> {
//! let registry = HandlerRegistry::with_defaults();
//! let envelope = Envelope::from_json(r#"{"input": {"type": "script", "data": []}}"#)?;
//!
//! let outcome = registry.dispatch(envelope.input, &HandlerContext::default())?;
//! assert!(matches!(outcome, HandlerOutcome::Noted(_)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Typed DOM snapshot and message envelope
//! - [`markdown`]: Blacklist, language detection, and the Markdown extractor
//! - [`handlers`]: Payload handlers and their registry
//! - [`config`]: JSON-backed configuration trees and relay settings
//! - [`error`]: Error types and result aliases
//! - `relay`: WebSocket relay server (requires the `relay` feature)

pub mod config;
pub mod dom;
pub mod error;
pub mod handlers;
pub mod markdown;

#[cfg(feature = "relay")]
pub mod relay;

pub use config::{AppConfig, RelayConfig};
pub use dom::{DomNode, Envelope, InputPayload};
pub use error::{RelayError, Result};
pub use handlers::{HandlerContext, HandlerOutcome, HandlerRegistry, PayloadHandler};
pub use markdown::{Blacklist, DomExtractor, detect_language, extract_markdown};

#[cfg(feature = "relay")]
pub use relay::{Hub, RelayServer, Transcript};
