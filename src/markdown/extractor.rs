use crate::dom::{DomNode, parse_snapshot};
use crate::error::Result;
use crate::markdown::blacklist::Blacklist;
use crate::markdown::language::detect_language;
use log::{debug, warn};

/// Nesting depth beyond which subtrees are skipped
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Markdown code fence
pub const FENCE: &str = "```";

/// Elements that end their line once their content has been written
const BLOCK_TAGS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "BLOCKQUOTE", "BR", "DD", "DETAILS", "DIV", "DL", "DT",
    "FIGCAPTION", "FIGURE", "FOOTER", "FORM", "H1", "H2", "H3", "H4", "H5", "H6", "HEADER", "HR",
    "LI", "MAIN", "NAV", "OL", "P", "PRE", "SECTION", "SUMMARY", "TABLE", "TBODY", "TFOOT",
    "THEAD", "TR", "UL",
];

/// Code-fence state carried through one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CodeBlockState {
    /// Currently inside a `<pre>` subtree
    inside_code_block: bool,
    /// The opening fence already carries `language`
    language_added: bool,
    /// Language detected for the current block, empty if none
    language: String,
}

/// Reassembles a chat message's DOM snapshot into Markdown
///
/// Prose text is copied verbatim, `<pre>` subtrees become fenced blocks tagged
/// with the language found in their `language-*` classes, and unlabeled
/// single-text `<code>` elements become inline spans. Text containing a
/// blacklisted phrase is dropped.
///
/// ```
/// use dom_relay::{DomExtractor, DomNode};
///
/// let root = DomNode::element("P").with_children(vec![
///     DomNode::text("Call "),
///     DomNode::element("CODE").with_children(vec![DomNode::text("main()")]),
/// ]);
/// assert_eq!(DomExtractor::new(root).extract(), "Call `main()`\n");
/// ```
#[derive(Debug, Clone)]
pub struct DomExtractor {
    root: DomNode,
    blacklist: Blacklist,
    max_depth: usize,
}

impl DomExtractor {
    /// Create an extractor over `root` with the default blacklist
    pub fn new(root: DomNode) -> Self {
        debug!("Initialised DomExtractor over {} nodes", root.count_nodes());
        Self {
            root,
            blacklist: Blacklist::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an extractor from a scraper envelope, reading `input.data`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(parse_snapshot(json)?))
    }

    /// Builder method: replace the blacklist
    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Builder method: set the depth guard
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk the snapshot and return the Markdown transcript
    ///
    /// Each call starts from fresh state, so repeated calls yield the same output.
    pub fn extract(&self) -> String {
        let mut traversal = Traversal::new(&self.blacklist, self.max_depth);
        traversal.visit(&self.root, 0);
        traversal.output
    }
}

/// Per-call traversal context
struct Traversal<'a> {
    blacklist: &'a Blacklist,
    max_depth: usize,
    state: CodeBlockState,
    output: String,
}

impl<'a> Traversal<'a> {
    fn new(blacklist: &'a Blacklist, max_depth: usize) -> Self {
        Self {
            blacklist,
            max_depth,
            state: CodeBlockState::default(),
            output: String::new(),
        }
    }

    fn visit(&mut self, node: &DomNode, depth: usize) {
        if depth >= self.max_depth {
            warn!("Skipping DOM subtree nested deeper than {} levels", self.max_depth);
            return;
        }

        // Inside a fence every <code> is plain content, never an inline span
        let code_tag = if self.state.inside_code_block {
            None
        } else {
            unlabeled_code_content(node)
        };

        match (node, code_tag) {
            (_, Some(content)) => self.visit_text(content, true),
            (DomNode::Text { value }, None) => self.visit_text(value.as_deref(), false),
            (DomNode::Element { .. }, None) if node.is_tag("PRE") => self.visit_pre(node, depth),
            (DomNode::Element { children, .. }, None) => {
                for child in children {
                    self.visit(child, depth + 1);
                }
            }
        }

        if is_block(node) {
            self.output.push('\n');
        }
    }

    fn visit_text(&mut self, value: Option<&str>, code_tag: bool) {
        if self.blacklist.is_blacklisted(value) {
            return;
        }
        let text = value.unwrap_or_default();
        let state = &self.state;

        // A toolbar label equal to the fence language is already in the opener
        let is_fence_label =
            state.inside_code_block && state.language_added && text == state.language;

        if !is_fence_label && !code_tag {
            self.output.push_str(text);
        } else if state.inside_code_block && !state.language_added {
            // label for a fence that has not been opened yet
        } else if state.inside_code_block && state.language_added && text != state.language {
            // stray label that does not match the fence
        } else if code_tag && state.language.is_empty() {
            self.output.push('`');
            self.output.push_str(text);
            self.output.push('`');
        }
    }

    fn visit_pre(&mut self, node: &DomNode, depth: usize) {
        self.state.inside_code_block = true;
        self.state.language = detect_language(node);

        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push_str(FENCE);
        self.output.push_str(&self.state.language);
        self.output.push('\n');
        self.state.language_added = !self.state.language.is_empty();

        for child in node.children() {
            self.visit(child, depth + 1);
        }

        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push_str(FENCE);

        self.state = CodeBlockState::default();
    }
}

/// Text of a `<code>` element holding exactly one text child and no language marker
fn unlabeled_code_content(node: &DomNode) -> Option<Option<&str>> {
    if !node.is_tag("CODE") {
        return None;
    }
    match node.children() {
        [DomNode::Text { value }] if detect_language(node).is_empty() => Some(value.as_deref()),
        _ => None,
    }
}

fn is_block(node: &DomNode) -> bool {
    node.tag()
        .is_some_and(|tag| BLOCK_TAGS.iter().any(|block| tag.eq_ignore_ascii_case(block)))
}
