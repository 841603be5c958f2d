use crate::error::Result;
use crate::handlers::{HandlerContext, HandlerOutcome, PayloadHandler};
use serde::{Deserialize, Serialize};

/// One `<script>` collected by the scraper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSource {
    /// URL of an external script; absent for inline scripts
    #[serde(default)]
    pub src: Option<String>,

    #[serde(default)]
    pub content: String,
}

/// Accepts `script` payloads and records what arrived without forwarding it
#[derive(Debug, Clone, Default)]
pub struct ScriptHandler;

impl PayloadHandler for ScriptHandler {
    type Data = Vec<ScriptSource>;

    fn kind(&self) -> &str {
        "script"
    }

    fn handle_typed(&self, data: Vec<ScriptSource>, _context: &HandlerContext) -> Result<HandlerOutcome> {
        let external = data.iter().filter(|s| s.src.is_some()).count();
        let bytes: usize = data.iter().map(|s| s.content.len()).sum();

        Ok(HandlerOutcome::Noted(format!(
            "{} scripts ({} external, {} bytes)",
            data.len(),
            external,
            bytes
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::DynPayloadHandler;
    use serde_json::json;

    #[test]
    fn test_script_summary() {
        let data = json!([
            {"src": "https://cdn.example.com/app.js", "content": "var a=1;"},
            {"content": "console.log(1)"}
        ]);

        let outcome = ScriptHandler.handle(data, &HandlerContext::default()).unwrap();
        assert_eq!(
            outcome,
            HandlerOutcome::Noted("2 scripts (1 external, 22 bytes)".to_string())
        );
    }

    #[test]
    fn test_empty_script_list() {
        let outcome = ScriptHandler
            .handle(json!([]), &HandlerContext::default())
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::Noted("0 scripts (0 external, 0 bytes)".to_string()));
    }
}
