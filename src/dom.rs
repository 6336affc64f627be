//! DOM Operations Adapter
//!
//! Thin layer over `dom_query` that exposes exactly what the tree builder reads
//! from a parsed document: node kind, lowercase tag name, attributes and text.
//! Parsing is html5ever's, so malformed markup is repaired the way browsers do
//! it and never fails.

use std::collections::BTreeMap;

// Re-export core types for external use
pub use dom_query::{Document, NodeRef};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// What the builder should do with a parsed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with a tag name.
    Element,
    /// Character data.
    Text,
    /// Comments, doctypes and processing instructions.
    Other,
}

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Classify a parsed node.
#[inline]
#[must_use]
pub fn kind(node: &NodeRef) -> NodeKind {
    if node.is_element() {
        NodeKind::Element
    } else if node.is_text() {
        NodeKind::Text
    } else {
        NodeKind::Other
    }
}

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Get all attributes, keyed by local name
///
/// Returns an empty map for non-elements.
#[must_use]
pub fn attributes(node: &NodeRef) -> BTreeMap<String, String> {
    node.attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|s| s.to_string())
}

/// Get the character data of a text node, untrimmed
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text(node: &NodeRef) -> StrTendril {
    node.text()
}

/// Get child nodes (elements, text and everything else) in document order
#[inline]
#[must_use]
pub fn child_nodes<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
}
