//! Document flattening with a reversible position map
//!
//! `flatten` walks a document once and produces:
//! - the position-mapped text, where `position_map[i]` is the coordinate of
//!   character `i` (text characters and synthesized separators alike)
//! - a whitespace-collapsed, trimmed `search_text` for presence checks
//!
//! All offsets exposed here are character offsets, not byte offsets.

use crate::document::{DocNode, NodeKind};

/// Flattened document text and its coordinate mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatText {
    text: String,
    position_map: Vec<usize>,
    search_text: String,
    /// Byte offset of each character in `text`
    char_starts: Vec<usize>,
}

impl FlatText {
    /// Position-mapped text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position_map(&self) -> &[usize] {
        &self.position_map
    }

    /// Whitespace-collapsed variant used for boolean presence checks
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.position_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position_map.is_empty()
    }

    /// Coordinate of the character at `offset`
    pub fn coordinate(&self, offset: usize) -> Option<usize> {
        self.position_map.get(offset).copied()
    }

    /// Convert a byte offset into `text` to a character offset
    pub fn char_offset(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&b| b < byte)
    }

    /// Byte offset of character `offset` (text length when past the end)
    pub fn byte_offset(&self, offset: usize) -> usize {
        self.char_starts
            .get(offset)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let start = self.byte_offset(start);
        let end = self.byte_offset(end).max(start);
        &self.text[start..end]
    }

    /// Character offset of the first exact (case-sensitive) occurrence
    pub fn find_exact(&self, needle: &str) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.text.find(needle).map(|byte| self.char_offset(byte))
    }

    fn from_parts(text: String, position_map: Vec<usize>) -> Self {
        let char_starts = text.char_indices().map(|(i, _)| i).collect();
        let search_text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            text,
            position_map,
            search_text,
            char_starts,
        }
    }
}

/// Flatten a document tree. `None` flattens to empty text and an empty map.
pub fn flatten(root: Option<&DocNode>) -> FlatText {
    let Some(root) = root else {
        return FlatText::default();
    };

    let mut flattener = Flattener::default();
    if root.kind() == NodeKind::Text {
        // A bare text root has no surrounding tokens
        flattener.visit(root, 0);
    } else {
        let mut pos = 0;
        for child in &root.content {
            flattener.visit(child, pos);
            pos += child.node_size();
        }
    }

    FlatText::from_parts(flattener.text, flattener.map)
}

#[derive(Default)]
struct Flattener {
    text: String,
    map: Vec<usize>,
    last_was_separator: bool,
}

impl Flattener {
    fn visit(&mut self, node: &DocNode, pos: usize) {
        match node.kind() {
            NodeKind::Text => {
                if let Some(text) = node.text.as_deref() {
                    for (i, c) in text.chars().enumerate() {
                        self.push_char(c, pos + i);
                    }
                }
            }
            NodeKind::HardBreak => self.push_separator(pos),
            NodeKind::Atom => {
                if node.is_block_boundary() {
                    self.push_separator(pos);
                }
            }
            NodeKind::Container => {
                let is_block = node.is_block_boundary();
                if is_block {
                    self.push_separator(pos);
                }
                let mut child_pos = pos + 1;
                for child in &node.content {
                    self.visit(child, child_pos);
                    child_pos += child.node_size();
                }
                if is_block {
                    self.push_separator(pos + node.node_size() - 1);
                }
            }
        }
    }

    fn push_char(&mut self, c: char, coordinate: usize) {
        self.text.push(c);
        self.map.push(coordinate);
        self.last_was_separator = false;
    }

    /// Separators never lead the output and never repeat
    fn push_separator(&mut self, coordinate: usize) {
        if self.map.is_empty() || self.last_was_separator {
            return;
        }
        self.text.push(' ');
        self.map.push(coordinate);
        self.last_was_separator = true;
    }
}
