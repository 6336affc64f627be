//! Link Density Testing
//!
//! Accounts for how much of a subtree's text sits inside anchors. Navigation
//! menus, tag clouds and "related posts" blocks are mostly link text, while
//! article prose links sparingly.

use crate::tree::{Document, NodeId};

/// Subtrees with fewer words than this are too small to judge.
pub const MIN_WORDS: usize = 5;

/// Subtrees with fewer characters than this are too small to judge.
pub const MIN_CHARS: usize = 50;

/// Text accounting for one subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Characters of trimmed text below an `a` element.
    pub link_chars: usize,
    /// Characters of trimmed text in the whole subtree.
    pub total_chars: usize,
    /// Whitespace-separated words in the whole subtree.
    pub word_count: usize,
    /// Number of `a` elements.
    pub link_count: usize,
}

impl LinkStats {
    /// Collect link heuristics for the subtree rooted at `id`.
    #[must_use]
    pub fn collect(doc: &Document, id: NodeId) -> Self {
        let mut stats = Self::default();
        let mut stack = vec![(id, false)];
        while let Some((current, in_link)) = stack.pop() {
            let node = doc.node(current);
            if node.is_text() {
                let text = node.text.trim();
                let chars = text.chars().count();
                stats.total_chars += chars;
                stats.word_count += text.split_whitespace().count();
                if in_link {
                    stats.link_chars += chars;
                }
                continue;
            }
            let is_link = node.tag_is("a");
            if is_link {
                stats.link_count += 1;
            }
            for &child in node.children.iter().rev() {
                stack.push((child, in_link || is_link));
            }
        }
        stats
    }

    /// Share of text inside links, `0.0` for an empty subtree.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn density(&self) -> f64 {
        if self.total_chars == 0 {
            return 0.0;
        }
        self.link_chars as f64 / self.total_chars as f64
    }

    /// Whether there is enough text for the density to mean anything.
    #[must_use]
    pub fn is_judgeable(&self) -> bool {
        self.word_count >= MIN_WORDS && self.total_chars >= MIN_CHARS
    }

    /// Judgeable and denser than `max_density`.
    #[must_use]
    pub fn exceeds(&self, max_density: f64) -> bool {
        self.is_judgeable() && self.density() > max_density
    }
}
