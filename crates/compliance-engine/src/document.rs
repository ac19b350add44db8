//! Structured document model
//!
//! Documents arrive as rich-text node trees (`{"type": "doc", "content": [...]}`).
//! Every node occupies a range in an integer coordinate space assigned by a
//! single depth-first traversal:
//!
//! - a text leaf occupies one address per character
//! - an atom (hard break, horizontal rule, image) occupies one address
//! - a container occupies `2 + size(children)`: an opening and a closing token
//!
//! The root's own tokens are not counted, so its first child starts at 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::highlight::HighlightMark;

/// Node types that flatten with separators at entry and exit
pub const BLOCK_TYPES: &[&str] = &[
    "paragraph",
    "heading",
    "listItem",
    "bulletList",
    "orderedList",
    "blockquote",
    "horizontalRule",
    "table",
    "tableRow",
    "tableCell",
];

/// Node types that occupy a single address and hold no children
pub const ATOM_TYPES: &[&str] = &["hardBreak", "horizontalRule", "image"];

/// How a node participates in the coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    HardBreak,
    Atom,
    Container,
}

/// One node of a structured document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Value>,
}

impl DocNode {
    pub fn new(node_type: impl Into<String>, content: Vec<DocNode>) -> Self {
        Self {
            node_type: node_type.into(),
            text: None,
            content,
            attrs: None,
        }
    }

    pub fn doc(content: Vec<DocNode>) -> Self {
        Self::new("doc", content)
    }

    pub fn paragraph(content: Vec<DocNode>) -> Self {
        Self::new("paragraph", content)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            node_type: "text".to_string(),
            text: Some(text.into()),
            content: Vec::new(),
            attrs: None,
        }
    }

    pub fn hard_break() -> Self {
        Self::new("hardBreak", Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self.node_type.as_str() {
            "text" => NodeKind::Text,
            "hardBreak" => NodeKind::HardBreak,
            t if ATOM_TYPES.contains(&t) => NodeKind::Atom,
            _ => NodeKind::Container,
        }
    }

    /// True for nodes that get synthesized separators when flattened
    pub fn is_block_boundary(&self) -> bool {
        BLOCK_TYPES.contains(&self.node_type.as_str())
    }

    /// Number of coordinate addresses this node occupies
    pub fn node_size(&self) -> usize {
        match self.kind() {
            NodeKind::Text => self.text.as_deref().map_or(0, |t| t.chars().count()),
            NodeKind::HardBreak | NodeKind::Atom => 1,
            NodeKind::Container => 2 + self.content_size(),
        }
    }

    /// Size of this node's children, i.e. the addressable range inside it
    pub fn content_size(&self) -> usize {
        self.content.iter().map(DocNode::node_size).sum()
    }

    /// Visit every descendant in document order with its start address.
    /// Addresses are relative to the start of this node's content.
    pub fn descendants<F>(&self, mut f: F)
    where
        F: FnMut(&DocNode, usize),
    {
        walk(&self.content, 0, &mut f);
    }
}

fn walk<F>(nodes: &[DocNode], start: usize, f: &mut F)
where
    F: FnMut(&DocNode, usize),
{
    let mut pos = start;
    for node in nodes {
        f(node, pos);
        if node.kind() == NodeKind::Container {
            walk(&node.content, pos + 1, f);
        }
        pos += node.node_size();
    }
}

/// Read access to document content plus the mutable highlight layer
pub trait AnnotatedDocument {
    /// Root node, or `None` when the document has no content
    fn root(&self) -> Option<&DocNode>;

    /// Currently applied highlight marks
    fn marks(&self) -> &[HighlightMark];

    /// Swap in a complete new mark set, returning the previous one
    fn replace_marks(&mut self, marks: Vec<HighlightMark>) -> Vec<HighlightMark>;

    /// Addressable size of the document. A bare text root is its own content.
    fn content_size(&self) -> usize {
        self.root().map_or(0, |root| match root.kind() {
            NodeKind::Text => root.node_size(),
            _ => root.content_size(),
        })
    }
}

/// In-memory document with its annotation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub content: Option<DocNode>,
    #[serde(default)]
    marks: Vec<HighlightMark>,
}

impl StructuredDocument {
    pub fn new(root: DocNode) -> Self {
        Self {
            content: Some(root),
            marks: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Plain text becomes a single text leaf at address 0
    pub fn from_plain_text(text: impl Into<String>) -> Self {
        Self::new(DocNode::doc(vec![DocNode::text(text)]))
    }

    /// Build a document from loosely shaped editor content.
    ///
    /// Accepts a node tree, a bare string, an object carrying a top-level
    /// `text` field, or an array of nodes. Anything else yields an empty
    /// document.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::empty(),
            Value::String(s) => Self::from_plain_text(s.clone()),
            Value::Array(_) => match serde_json::from_value::<Vec<DocNode>>(value.clone()) {
                Ok(nodes) => Self::new(DocNode::doc(nodes)),
                Err(e) => {
                    warn!("Unparseable document content array: {}", e);
                    Self::empty()
                }
            },
            Value::Object(map) => {
                if !map.contains_key("type") {
                    if let Some(Value::String(s)) = map.get("text") {
                        return Self::from_plain_text(s.clone());
                    }
                }
                match serde_json::from_value::<DocNode>(value.clone()) {
                    Ok(root) => Self::new(root),
                    Err(e) => {
                        warn!("Unparseable document content: {}", e);
                        Self::empty()
                    }
                }
            }
            other => {
                warn!("Unsupported document content shape: {}", other);
                Self::empty()
            }
        }
    }
}

impl AnnotatedDocument for StructuredDocument {
    fn root(&self) -> Option<&DocNode> {
        self.content.as_ref()
    }

    fn marks(&self) -> &[HighlightMark] {
        &self.marks
    }

    fn replace_marks(&mut self, marks: Vec<HighlightMark>) -> Vec<HighlightMark> {
        std::mem::replace(&mut self.marks, marks)
    }
}
