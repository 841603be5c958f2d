//! Payload handlers
//!
//! Each scraper message carries an `input.type`. Handlers are registered per type
//! and receive the decoded `input.data`:
//! - `div`: one chat message container, reassembled into Markdown
//! - `dom`: the whole document, reassembled the same way
//! - `script`: page scripts, summarized only

pub mod script;
pub mod transcript;

pub use script::{ScriptHandler, ScriptSource};
pub use transcript::TranscriptHandler;

use crate::dom::InputPayload;
use crate::dom::payload::from_value_unbounded;
use crate::error::{RelayError, Result};
use crate::markdown::Blacklist;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

/// Shared inputs available to every handler
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    pub blacklist: Blacklist,
}

impl HandlerContext {
    pub fn new(blacklist: Blacklist) -> Self {
        Self { blacklist }
    }
}

/// What a handler produced for one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A Markdown transcript to hand to the consumer
    Transcript(String),
    /// Nothing to forward; the string summarizes what was seen
    Noted(String),
}

/// A handler for one payload kind, with typed data
pub trait PayloadHandler: Send + Sync {
    type Data: DeserializeOwned;

    /// The `input.type` this handler accepts
    fn kind(&self) -> &str;

    fn handle_typed(&self, data: Self::Data, context: &HandlerContext) -> Result<HandlerOutcome>;
}

/// Object-safe form of [`PayloadHandler`] used by the registry
pub trait DynPayloadHandler: Send + Sync {
    fn kind(&self) -> &str;

    fn handle(&self, data: serde_json::Value, context: &HandlerContext) -> Result<HandlerOutcome>;
}

impl<T: PayloadHandler> DynPayloadHandler for T {
    fn kind(&self) -> &str {
        PayloadHandler::kind(self)
    }

    fn handle(&self, data: serde_json::Value, context: &HandlerContext) -> Result<HandlerOutcome> {
        let typed: T::Data =
            from_value_unbounded(data).map_err(|e| RelayError::HandlerFailed {
                kind: PayloadHandler::kind(self).to_string(),
                reason: e.to_string(),
            })?;
        self.handle_typed(typed, context)
    }
}

/// Handlers keyed by payload kind
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<String, Box<dyn DynPayloadHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `div`, `dom`, and `script` handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TranscriptHandler::new("div"));
        registry.register(TranscriptHandler::new("dom"));
        registry.register(ScriptHandler);
        registry
    }

    /// Register a handler, replacing any previous handler for the same kind
    pub fn register<H: PayloadHandler + 'static>(&mut self, handler: H) {
        let kind = PayloadHandler::kind(&handler).to_string();
        self.handlers.insert(kind, Box::new(handler));
    }

    pub fn get(&self, kind: &str) -> Option<&dyn DynPayloadHandler> {
        self.handlers.get(kind).map(|h| h.as_ref())
    }

    /// Registered kinds, in registration order
    pub fn kinds(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route a payload to the handler registered for its kind
    pub fn dispatch(&self, payload: InputPayload, context: &HandlerContext) -> Result<HandlerOutcome> {
        let kind = payload.kind().to_string();
        let handler = self
            .get(&kind)
            .ok_or_else(|| RelayError::UnsupportedPayload(kind.clone()))?;

        log::debug!("Dispatching '{}' payload", kind);
        handler.handle(payload.data, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct EchoData {
        message: String,
    }

    struct EchoHandler;

    impl PayloadHandler for EchoHandler {
        type Data = EchoData;

        fn kind(&self) -> &str {
            "echo"
        }

        fn handle_typed(&self, data: EchoData, _context: &HandlerContext) -> Result<HandlerOutcome> {
            Ok(HandlerOutcome::Noted(data.message))
        }
    }

    fn payload(kind: Option<&str>, data: serde_json::Value) -> InputPayload {
        InputPayload {
            kind: kind.map(str::to_string),
            data,
        }
    }

    #[test]
    fn test_defaults() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.kinds(), vec!["div", "dom", "script"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_dispatch_custom_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register(EchoHandler);

        let outcome = registry
            .dispatch(payload(Some("echo"), json!({"message": "hi"})), &HandlerContext::default())
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::Noted("hi".to_string()));
    }

    #[test]
    fn test_missing_kind_routes_to_div() {
        let registry = HandlerRegistry::with_defaults();
        let data = json!({"tagName": "P", "nodeType": 1, "childNodes": [{"nodeType": 3, "nodeValue": "hello"}]});

        let outcome = registry.dispatch(payload(None, data), &HandlerContext::default()).unwrap();
        assert_eq!(outcome, HandlerOutcome::Transcript("hello\n".to_string()));
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let registry = HandlerRegistry::with_defaults();
        let err = registry
            .dispatch(payload(Some("video"), json!({})), &HandlerContext::default())
            .unwrap_err();

        assert!(matches!(err, RelayError::UnsupportedPayload(kind) if kind == "video"));
    }

    #[test]
    fn test_bad_data_is_handler_failure() {
        let mut registry = HandlerRegistry::new();
        registry.register(EchoHandler);

        let err = registry
            .dispatch(payload(Some("echo"), json!([1, 2])), &HandlerContext::default())
            .unwrap_err();
        assert!(matches!(err, RelayError::HandlerFailed { kind, .. } if kind == "echo"));
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = HandlerRegistry::with_defaults();
        registry.register(TranscriptHandler::new("div"));

        assert_eq!(registry.len(), 3);
    }
}
