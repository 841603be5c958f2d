/// Phrase injected next to code blocks by the chat UI's copy button
pub const COPY_CODE: &str = "Copy code";

/// Phrases whose presence marks a text node as page chrome rather than content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    phrases: Vec<String>,
}

impl Blacklist {
    /// Create a blacklist from the given phrases; empty phrases are dropped
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Check whether `text` contains any blacklisted phrase (case-sensitive substring)
    pub fn is_blacklisted(&self, text: Option<&str>) -> bool {
        match text {
            Some(text) => self.phrases.iter().any(|phrase| text.contains(phrase.as_str())),
            None => false,
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new([COPY_CODE])
    }
}
