//! Document tree shared by every pipeline stage.
//!
//! The tree lives in an arena: nodes are addressed by [`NodeId`] and a node's
//! `parent` is an index, not a reference. Ownership flows strictly top-down
//! through `children`; `parent` only serves sibling and ancestor lookups.
//!
//! Stages detach or replace nodes in place. Detached nodes stay in the arena
//! until [`Document::compact`] rebuilds it from the reachable set.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Tag of text leaves.
pub const TEXT_TAG: &str = "#text";

/// Tag of the synthetic root.
pub const DOCUMENT_TAG: &str = "document";

/// Index of a node inside its [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single element, text leaf, or the synthetic root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Lowercase tag name, [`TEXT_TAG`] or [`DOCUMENT_TAG`].
    pub tag: String,
    /// Original, untrimmed text of a text leaf; empty for elements.
    pub text: String,
    /// Attributes as written; empty unless the builder preserved them.
    pub attributes: BTreeMap<String, String>,
    /// Children in reading order.
    pub children: Vec<NodeId>,
    /// Non-owning back reference.
    pub parent: Option<NodeId>,
    /// Distance from the root.
    pub depth: usize,
    /// Pre-order sequence number assigned at build time.
    pub index: usize,
    /// Generated text whose line structure must survive rendering.
    pub verbatim: bool,
}

impl Node {
    /// An element node with no children.
    #[must_use]
    pub fn element(tag: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            attributes,
            children: Vec::new(),
            parent: None,
            depth: 0,
            index: 0,
            verbatim: false,
        }
    }

    /// A text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::element(TEXT_TAG, BTreeMap::new())
        }
    }

    /// A text leaf whose line breaks are kept by the renderer.
    #[must_use]
    pub fn verbatim_text(text: impl Into<String>) -> Self {
        Self {
            verbatim: true,
            ..Self::text(text)
        }
    }

    /// Whether this is a text leaf.
    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    /// Case-insensitive tag comparison.
    #[inline]
    #[must_use]
    pub fn tag_is(&self, name: &str) -> bool {
        self.tag.eq_ignore_ascii_case(name)
    }

    /// Whether the tag is one of `names` (case-insensitive).
    #[must_use]
    pub fn tag_in(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.tag_is(name))
    }

    /// Attribute value, if present.
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Non-empty attribute value after trimming.
    #[must_use]
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// The `class` attribute, or `""`.
    #[must_use]
    pub fn class(&self) -> &str {
        self.attr("class").unwrap_or_default()
    }

    /// Heading level for `h1`..`h6`.
    #[must_use]
    pub fn heading_level(&self) -> Option<usize> {
        let tag = self.tag.as_bytes();
        match tag {
            [b'h' | b'H', level @ b'1'..=b'6'] => Some(usize::from(level - b'0')),
            _ => None,
        }
    }
}

/// Structural counts over the reachable tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Every reachable node, root included.
    pub total_nodes: usize,
    /// `#text` leaves.
    pub text_nodes: usize,
    /// Everything that is not a text leaf.
    pub element_nodes: usize,
    /// Deepest level below the root.
    pub max_depth: usize,
    /// Characters of trimmed text across all leaves.
    pub text_characters: usize,
}

/// An arena-backed document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// A document holding only an empty `document` root.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::element(DOCUMENT_TAG, BTreeMap::new())],
            root: NodeId(0),
        }
    }

    /// The root node id.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node.
    ///
    /// Ids are only minted by this document, so indexing cannot go out of bounds.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Children of `id` in reading order.
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of `id`; `None` for the root or a detached node.
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of nodes reachable from the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descendants(self.root).count()
    }

    /// True when the root has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Number of arena slots, including detached nodes.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `node` as the last child of `parent` and returns its id.
    ///
    /// `depth` is derived from the parent; `index` is left as given.
    pub fn append_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.depth = self.node(parent).depth + 1;
        self.nodes.push(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Unlinks `id` (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
        self.node_mut(id).parent = None;
    }

    /// Replaces the node value at `id`, keeping its position, depth and index.
    ///
    /// The old children become unreachable.
    pub fn replace(&mut self, id: NodeId, mut node: Node) {
        let old = self.node(id);
        node.parent = old.parent;
        node.depth = old.depth;
        node.index = old.index;
        for &child in &node.children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes[id.0] = node;
    }

    /// Swaps in a fresh, empty `document` root, keeping nothing.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Pre-order iterator over `id` and its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// Siblings before `id`, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => siblings[..pos].iter().rev().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Siblings after `id`, nearest first.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => siblings[pos + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// First descendant (excluding `id`) whose tag is `tag`.
    #[must_use]
    pub fn find_descendant(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id).skip(1).find(|&d| self.node(d).tag_is(tag))
    }

    /// First direct child whose tag is `tag`.
    #[must_use]
    pub fn find_child(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.node(c).tag_is(tag))
    }

    /// Trimmed text of every leaf below `id`, joined with single spaces.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for leaf in self.descendants(id) {
            let node = self.node(leaf);
            if !node.is_text() {
                continue;
            }
            let text = node.text.trim();
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        out
    }

    /// Untouched text of every leaf below `id`, concatenated.
    #[must_use]
    pub fn raw_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .map(|leaf| self.node(leaf))
            .filter(|node| node.is_text())
            .map(|node| node.text.as_str())
            .collect()
    }

    /// Trimmed text of the direct text children of `id`, joined with spaces.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|&c| self.node(c))
            .filter(|n| n.is_text())
            .map(|n| n.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Non-blank text leaves in reading order.
    #[must_use]
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&id| {
                let node = self.node(id);
                node.is_text() && !node.text.trim().is_empty()
            })
            .collect()
    }

    /// Counts over the reachable tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let root_depth = self.node(self.root).depth;
        for id in self.descendants(self.root) {
            let node = self.node(id);
            stats.total_nodes += 1;
            stats.max_depth = stats.max_depth.max(node.depth.saturating_sub(root_depth));
            if node.is_text() {
                stats.text_nodes += 1;
                stats.text_characters += node.text.trim().chars().count();
            } else {
                stats.element_nodes += 1;
            }
        }
        stats
    }

    /// Rebuilds the arena from the reachable nodes, dropping detached slots.
    ///
    /// Depth is recomputed; `index` keeps its build-time value.
    #[must_use]
    pub fn compact(&self) -> Self {
        let mut out = Self {
            nodes: Vec::with_capacity(self.nodes.len()),
            root: NodeId(0),
        };
        let mut root = self.node(self.root).clone();
        root.children.clear();
        root.parent = None;
        root.depth = 0;
        out.nodes.push(root);

        let mut stack = vec![(self.root, out.root)];
        while let Some((old, new)) = stack.pop() {
            for &child in self.children(old) {
                let mut copy = self.node(child).clone();
                copy.children.clear();
                let new_child = out.append_child(new, copy);
                stack.push((child, new_child));
            }
        }
        out
    }

    /// Indented, human-readable dump: `[index] tag (attrs)` / `[index] #text: "…"`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, self.root, 0);
        out
    }

    fn write_text(&self, out: &mut String, id: NodeId, level: usize) {
        let node = self.node(id);
        let indent = "  ".repeat(level);
        if node.is_text() {
            let text = node.text.trim();
            if !text.is_empty() {
                let _ = writeln!(out, "{indent}[{}] {}: \"{text}\"", node.index, node.tag);
            }
        } else if node.attributes.is_empty() {
            let _ = writeln!(out, "{indent}[{}] {}", node.index, node.tag);
        } else {
            let attrs = node
                .attributes
                .iter()
                .map(|(k, v)| format!("{k}=\"{v}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{indent}[{}] {} ({attrs})", node.index, node.tag);
        }
        for &child in &node.children {
            self.write_text(out, child, level + 1);
        }
    }

    /// Nested JSON dump of the reachable tree (parents omitted).
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization errors.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&NodeView {
            doc: self,
            id: self.root,
        })
    }
}

/// Pre-order traversal produced by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev());
        Some(id)
    }
}

struct NodeView<'a> {
    doc: &'a Document,
    id: NodeId,
}

struct ChildrenView<'a> {
    doc: &'a Document,
    ids: &'a [NodeId],
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.doc.node(self.id);
        let mut state = serializer.serialize_struct("Node", 6)?;
        state.serialize_field("tag", &node.tag)?;
        state.serialize_field("text", &node.text)?;
        if node.attributes.is_empty() {
            state.skip_field("attributes")?;
        } else {
            state.serialize_field("attributes", &node.attributes)?;
        }
        if node.children.is_empty() {
            state.skip_field("children")?;
        } else {
            state.serialize_field(
                "children",
                &ChildrenView {
                    doc: self.doc,
                    ids: &node.children,
                },
            )?;
        }
        state.serialize_field("depth", &node.depth)?;
        state.serialize_field("index", &node.index)?;
        state.end()
    }
}

impl Serialize for ChildrenView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter().map(|&id| NodeView { doc: self.doc, id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// document > body > (p > "Hello ", strong > "world"), (div.note > "Tail")
    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::empty();
        let body = doc.append_child(doc.root(), Node::element("body", BTreeMap::new()));
        let p = doc.append_child(body, Node::element("p", BTreeMap::new()));
        doc.append_child(p, Node::text("Hello "));
        let strong = doc.append_child(p, Node::element("strong", BTreeMap::new()));
        doc.append_child(strong, Node::text("world"));
        let div = doc.append_child(body, Node::element("div", attrs(&[("class", "note")])));
        doc.append_child(div, Node::text("  Tail  "));
        (doc, p, div)
    }

    #[test]
    fn test_text_content_joins_trimmed_leaves() {
        let (doc, p, div) = sample();
        assert_eq!(doc.text_content(p), "Hello world");
        assert_eq!(doc.text_content(div), "Tail");
        assert_eq!(doc.raw_text(div), "  Tail  ");
    }

    #[test]
    fn test_detach_removes_subtree_from_traversal() {
        let (mut doc, p, _) = sample();
        let before = doc.len();
        doc.detach(p);
        assert_eq!(doc.len(), before - 4);
        assert_eq!(doc.text_content(doc.root()), "Tail");
        assert_eq!(doc.parent(p), None);
    }

    #[test]
    fn test_replace_keeps_position() {
        let (mut doc, p, _) = sample();
        let body = doc.parent(p).unwrap();
        doc.replace(p, Node::verbatim_text("An image: cat"));
        assert_eq!(doc.children(body)[0], p);
        assert!(doc.node(p).is_text());
        assert!(doc.node(p).verbatim);
        assert_eq!(doc.node(p).depth, 2);
        assert_eq!(doc.parent(p), Some(body));
    }

    #[test]
    fn test_compact_drops_unreachable_slots() {
        let (mut doc, p, _) = sample();
        doc.detach(p);
        let compacted = doc.compact();
        assert_eq!(compacted.arena_len(), compacted.len());
        assert_eq!(compacted.text_content(compacted.root()), "Tail");
        assert_eq!(compacted.to_text(), doc.to_text());
    }

    #[test]
    fn test_siblings_nearest_first() {
        let mut doc = Document::empty();
        let root = doc.root();
        let a = doc.append_child(root, Node::text("a"));
        let b = doc.append_child(root, Node::text("b"));
        let c = doc.append_child(root, Node::text("c"));
        let d = doc.append_child(root, Node::text("d"));
        assert_eq!(doc.preceding_siblings(c), vec![b, a]);
        assert_eq!(doc.following_siblings(b), vec![c, d]);
        assert!(doc.preceding_siblings(root).is_empty());
    }

    #[test]
    fn test_stats_counts_nodes() {
        let (doc, _, _) = sample();
        let stats = doc.stats();
        assert_eq!(stats.total_nodes, 8);
        assert_eq!(stats.text_nodes, 3);
        assert_eq!(stats.element_nodes, 5);
        assert_eq!(stats.max_depth, 4);
        assert_eq!(stats.text_characters, "Hello".len() + "world".len() + "Tail".len());
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(Node::element("h3", BTreeMap::new()).heading_level(), Some(3));
        assert_eq!(Node::element("h7", BTreeMap::new()).heading_level(), None);
        assert_eq!(Node::element("header", BTreeMap::new()).heading_level(), None);
    }

    #[test]
    fn test_to_text_dump() {
        let (doc, _, _) = sample();
        let dump = doc.to_text();
        assert!(dump.starts_with("[0] document\n"));
        assert!(dump.contains("    [0] div (class=\"note\")"));
        assert!(dump.contains("#text: \"Tail\""));
    }

    #[test]
    fn test_to_json_nests_children() {
        let (doc, _, _) = sample();
        let json = doc.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tag"], "document");
        assert_eq!(value["children"][0]["tag"], "body");
        assert_eq!(value["children"][0]["children"][1]["attributes"]["class"], "note");
        assert!(value.get("parent").is_none());
    }
}
