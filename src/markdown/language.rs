use crate::dom::DomNode;
use once_cell::sync::Lazy;
use regex::Regex;

static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"language-(\w+)").expect("language pattern is valid"));

/// Detect the source language of a code block
///
/// Scans the `class` attribute of `node` and of every descendant, depth-first in
/// document order, and returns the token following the first `language-` marker.
/// Returns an empty string when no marker exists anywhere in the subtree.
pub fn detect_language(node: &DomNode) -> String {
    let mut classes = Vec::new();
    collect_classes(node, &mut classes);

    classes
        .iter()
        .find_map(|class| LANGUAGE_CLASS.captures(class))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn collect_classes<'a>(node: &'a DomNode, classes: &mut Vec<&'a str>) {
    if let Some(class) = node.attribute("class") {
        classes.push(class);
    }
    for child in node.children() {
        collect_classes(child, classes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_on_code_child() {
        let pre = DomNode::element("PRE").with_children(vec![
            DomNode::element("CODE")
                .with_attribute("class", "!whitespace-pre hljs language-javascript")
                .with_children(vec![DomNode::text("let x = 1;")]),
        ]);

        assert_eq!(detect_language(&pre), "javascript");
    }

    #[test]
    fn test_language_two_levels_away() {
        // Toolbar badge lives beside the body, not under it
        let pre = DomNode::element("PRE").with_children(vec![
            DomNode::element("DIV").with_children(vec![
                DomNode::element("DIV")
                    .with_attribute("class", "flex items-center")
                    .with_children(vec![
                        DomNode::element("SPAN")
                            .with_attribute("class", "language-python")
                            .with_children(vec![DomNode::text("python")]),
                    ]),
            ]),
            DomNode::element("CODE").with_children(vec![DomNode::text("print(1)")]),
        ]);

        assert_eq!(detect_language(&pre), "python");
    }

    #[test]
    fn test_own_class_counts() {
        let code = DomNode::element("CODE").with_attribute("class", "language-rust");
        assert_eq!(detect_language(&code), "rust");
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let pre = DomNode::element("PRE").with_children(vec![
            DomNode::element("SPAN").with_attribute("class", "language-bash"),
            DomNode::element("CODE").with_attribute("class", "language-rust"),
        ]);

        assert_eq!(detect_language(&pre), "bash");
    }

    #[test]
    fn test_no_marker_yields_empty() {
        let pre = DomNode::element("PRE").with_children(vec![
            DomNode::element("SPAN").with_attribute("class", "hljs-variable language_"),
            DomNode::text("language-css"),
        ]);

        assert_eq!(detect_language(&pre), "");
    }

    #[test]
    fn test_marker_needs_word_characters() {
        let code = DomNode::element("CODE").with_attribute("class", "language- hljs");
        assert_eq!(detect_language(&code), "");
    }
}
