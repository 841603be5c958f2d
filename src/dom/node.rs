use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `Node.ELEMENT_NODE` in the browser's nodeType enumeration
pub const ELEMENT_NODE: u16 = 1;

/// `Node.TEXT_NODE` in the browser's nodeType enumeration
pub const TEXT_NODE: u16 = 3;

/// One node of a serialized DOM snapshot
///
/// The scraper emits every node with the same loose shape
/// (`tagName`, `nodeType`, `nodeValue`, `attributes`, `childNodes`), any of which
/// may be missing or null. Deserialization selects a variant by `nodeType`:
/// `3` becomes [`DomNode::Text`], anything else becomes [`DomNode::Element`].
/// Comments and other node kinds therefore act as opaque containers with no
/// text of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum DomNode {
    /// Text node (`nodeType == 3`)
    Text { value: Option<String> },

    /// Element node, or any node kind that is not text
    Element {
        /// Tag name as reported by the browser (`"PRE"`, `"svg"`, ...)
        tag: Option<String>,
        /// Attributes in document order
        attributes: IndexMap<String, String>,
        /// Children in document order
        children: Vec<DomNode>,
    },
}

/// Wire shape produced by the browser-side scraper
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag_name: Option<String>,

    #[serde(default)]
    node_type: Option<u16>,

    #[serde(default)]
    node_value: Option<String>,

    #[serde(default)]
    attributes: Option<IndexMap<String, String>>,

    #[serde(default)]
    child_nodes: Option<Vec<RawNode>>,
}

impl From<RawNode> for DomNode {
    fn from(raw: RawNode) -> Self {
        if raw.node_type == Some(TEXT_NODE) {
            return DomNode::Text { value: raw.node_value };
        }

        DomNode::Element {
            tag: raw.tag_name,
            attributes: raw.attributes.unwrap_or_default(),
            children: raw
                .child_nodes
                .unwrap_or_default()
                .into_iter()
                .map(DomNode::from)
                .collect(),
        }
    }
}

impl From<DomNode> for RawNode {
    fn from(node: DomNode) -> Self {
        match node {
            DomNode::Text { value } => RawNode {
                tag_name: None,
                node_type: Some(TEXT_NODE),
                node_value: value,
                attributes: Some(IndexMap::new()),
                child_nodes: Some(Vec::new()),
            },
            DomNode::Element { tag, attributes, children } => RawNode {
                tag_name: tag,
                node_type: Some(ELEMENT_NODE),
                node_value: None,
                attributes: Some(attributes),
                child_nodes: Some(children.into_iter().map(RawNode::from).collect()),
            },
        }
    }
}

impl DomNode {
    /// Create a text node
    pub fn text(value: impl Into<String>) -> Self {
        DomNode::Text { value: Some(value.into()) }
    }

    /// Create an element node with no attributes or children
    pub fn element(tag: impl Into<String>) -> Self {
        DomNode::Element {
            tag: Some(tag.into()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder method: set an attribute (no-op on text nodes)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let DomNode::Element { attributes, .. } = &mut self {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Builder method: set children (no-op on text nodes)
    pub fn with_children(mut self, new_children: Vec<DomNode>) -> Self {
        if let DomNode::Element { children, .. } = &mut self {
            *children = new_children;
        }
        self
    }

    /// Add a single child (no-op on text nodes)
    pub fn add_child(&mut self, child: DomNode) {
        if let DomNode::Element { children, .. } = self {
            children.push(child);
        }
    }

    /// Tag name, if this is an element that reported one
    pub fn tag(&self) -> Option<&str> {
        match self {
            DomNode::Element { tag, .. } => tag.as_deref(),
            DomNode::Text { .. } => None,
        }
    }

    /// Check if this is an element with the given tag, ignoring ASCII case
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DomNode::Text { .. })
    }

    /// Get attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            DomNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            DomNode::Text { .. } => None,
        }
    }

    /// Children in document order; always empty for text nodes
    pub fn children(&self) -> &[DomNode] {
        match self {
            DomNode::Element { children, .. } => children,
            DomNode::Text { .. } => &[],
        }
    }

    /// Text content of a text node
    pub fn text_value(&self) -> Option<&str> {
        match self {
            DomNode::Text { value } => value.as_deref(),
            DomNode::Element { .. } => None,
        }
    }

    /// Count this node and all of its descendants
    pub fn count_nodes(&self) -> usize {
        1 + self.children().iter().map(DomNode::count_nodes).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_from_json() {
        let json = r#"{"nodeType":3,"nodeValue":"hello","attributes":{},"childNodes":[]}"#;
        let node: DomNode = serde_json::from_str(json).unwrap();

        assert_eq!(node, DomNode::text("hello"));
        assert!(node.is_text());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_element_from_json() {
        let json = r#"{
            "tagName": "CODE",
            "nodeType": 1,
            "nodeValue": null,
            "attributes": {"class": "hljs language-rust", "data-x": ""},
            "childNodes": [{"nodeType": 3, "nodeValue": "fn main() {}"}]
        }"#;
        let node: DomNode = serde_json::from_str(json).unwrap();

        assert!(node.is_tag("code"));
        assert_eq!(node.attribute("class"), Some("hljs language-rust"));
        assert_eq!(node.attribute("data-x"), Some(""));
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].text_value(), Some("fn main() {}"));
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        // Element without tagName, attributes, or childNodes
        let node: DomNode = serde_json::from_str(r#"{"nodeType":1}"#).unwrap();
        assert_eq!(node.tag(), None);
        assert!(node.children().is_empty());

        // Text node with a null value
        let node: DomNode = serde_json::from_str(r#"{"nodeType":3,"nodeValue":null}"#).unwrap();
        assert_eq!(node, DomNode::Text { value: None });
    }

    #[test]
    fn test_comment_node_is_opaque_container() {
        let json = r#"{"nodeType":8,"nodeValue":"a comment","attributes":{},"childNodes":[]}"#;
        let node: DomNode = serde_json::from_str(json).unwrap();

        assert!(!node.is_text());
        assert_eq!(node.text_value(), None);
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let json = r#"{"tagName":"svg","nodeType":1,"attributes":{"stroke":"a","fill":"b","class":"c"}}"#;
        let node: DomNode = serde_json::from_str(json).unwrap();

        match node {
            DomNode::Element { attributes, .. } => {
                let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["stroke", "fill", "class"]);
            }
            DomNode::Text { .. } => panic!("expected element"),
        }
    }

    #[test]
    fn test_serialization_uses_scraper_shape() {
        let node = DomNode::element("P").with_children(vec![DomNode::text("Hi")]);
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["tagName"], "P");
        assert_eq!(value["nodeType"], 1);
        assert_eq!(value["childNodes"][0]["nodeType"], 3);
        assert_eq!(value["childNodes"][0]["nodeValue"], "Hi");

        let back: DomNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_builders_ignore_text_nodes() {
        let mut text = DomNode::text("x").with_attribute("class", "y");
        text.add_child(DomNode::text("z"));

        assert_eq!(text, DomNode::text("x"));
    }

    #[test]
    fn test_count_nodes() {
        let tree = DomNode::element("DIV").with_children(vec![
            DomNode::element("P").with_children(vec![DomNode::text("a"), DomNode::text("b")]),
            DomNode::text("c"),
        ]);

        assert_eq!(tree.count_nodes(), 5);
    }
}
