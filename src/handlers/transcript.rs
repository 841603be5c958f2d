use crate::dom::DomNode;
use crate::error::Result;
use crate::handlers::{HandlerContext, HandlerOutcome, PayloadHandler};
use crate::markdown::DomExtractor;

/// Reassembles a DOM snapshot payload into a Markdown transcript
#[derive(Debug, Clone)]
pub struct TranscriptHandler {
    kind: String,
}

impl TranscriptHandler {
    /// Create a handler answering to the given payload kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Default for TranscriptHandler {
    fn default() -> Self {
        Self::new(crate::dom::DEFAULT_KIND)
    }
}

impl PayloadHandler for TranscriptHandler {
    type Data = DomNode;

    fn kind(&self) -> &str {
        &self.kind
    }

    fn handle_typed(&self, data: DomNode, context: &HandlerContext) -> Result<HandlerOutcome> {
        let markdown = DomExtractor::new(data)
            .with_blacklist(context.blacklist.clone())
            .extract();

        Ok(HandlerOutcome::Transcript(markdown))
    }
}
