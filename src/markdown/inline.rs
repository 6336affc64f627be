//! Inline rendering: text runs, emphasis, code spans, links and line breaks.

use super::style::{code_span, collapse_whitespace, escape_markdown};
use super::{Renderer, Step};
use crate::tags::{self, INLINE_TAG_SET};
use crate::tree::{Node, NodeId};

/// Whether a node flows inline with its siblings.
pub(super) fn is_inline(node: &Node) -> bool {
    if node.is_text() {
        return !node.verbatim;
    }
    tags::contains(&INLINE_TAG_SET, &node.tag)
}

/// Accumulates inline output, merging whitespace across node boundaries.
#[derive(Debug, Default)]
pub(super) struct InlineBuffer {
    out: String,
}

impl InlineBuffer {
    fn at_boundary(&self) -> bool {
        self.out.is_empty() || self.out.ends_with([' ', '\n'])
    }

    /// A single separating space, unless one is already there.
    pub(super) fn push_space(&mut self) {
        if !self.at_boundary() {
            self.out.push(' ');
        }
    }

    /// Plain text with whitespace collapsed.
    pub(super) fn push_text(&mut self, text: &str, escape: bool) {
        let collapsed = collapse_whitespace(text);
        let body = match collapsed.strip_prefix(' ') {
            Some(rest) => {
                self.push_space();
                rest
            }
            None => collapsed.as_str(),
        };
        self.out.push_str(&escape_markdown(body, !escape));
    }

    /// Replacement text whose line structure must survive.
    pub(super) fn push_verbatim(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.push_space();
        self.out.push_str(text);
    }

    pub(super) fn push_break(&mut self) {
        let kept = self.out.trim_end_matches(' ').len();
        self.out.truncate(kept);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
    }

    /// Pushes `rendered` in place of `inner`, carrying over the whitespace
    /// that surrounded `inner` so neighbouring words stay apart.
    pub(super) fn push_decorated(&mut self, inner: &str, rendered: &str) {
        if inner.starts_with(char::is_whitespace) {
            self.push_space();
        }
        if rendered.is_empty() {
            return;
        }
        self.out.push_str(rendered);
        if inner.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    pub(super) fn as_raw(&self) -> &str {
        &self.out
    }

    pub(super) fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

impl Renderer<'_> {
    /// Inline markdown for a run of sibling nodes, trimmed.
    pub(super) fn render_inline(&self, ids: &[NodeId]) -> Step<String> {
        let mut buf = InlineBuffer::default();
        self.inline_nodes(ids, &mut buf)?;
        Ok(buf.finish())
    }

    /// Untrimmed inline markdown of a node's children.
    fn inline_children(&self, id: NodeId) -> Step<String> {
        let mut buf = InlineBuffer::default();
        self.inline_nodes(self.doc.children(id), &mut buf)?;
        Ok(buf.as_raw().to_string())
    }

    /// Whitespace-only text between siblings is gone after building, so
    /// adjacent elements (`<a>x</a> <a>y</a>`) get a space between them.
    fn inline_nodes(&self, ids: &[NodeId], buf: &mut InlineBuffer) -> Step<()> {
        let mut previous_element = false;
        for &id in ids {
            let node = self.doc.node(id);
            let element = !node.is_text() && !node.tag_is("br");
            if element && previous_element {
                buf.push_space();
            }
            previous_element = element;
            self.inline_node(id, buf)?;
        }
        Ok(())
    }

    fn inline_node(&self, id: NodeId, buf: &mut InlineBuffer) -> Step<()> {
        self.check()?;
        let node = self.doc.node(id);

        if node.is_text() {
            if node.verbatim {
                buf.push_verbatim(&node.text);
            } else {
                buf.push_text(&node.text, self.config.escape_text);
            }
            return Ok(());
        }

        match node.tag.to_ascii_lowercase().as_str() {
            "strong" | "b" => {
                let inner = self.inline_children(id)?;
                buf.push_decorated(&inner, &wrap(&inner, self.config.emphasis_style.strong()));
            }
            "em" | "i" => {
                let inner = self.inline_children(id)?;
                buf.push_decorated(&inner, &wrap(&inner, self.config.emphasis_style.emphasis()));
            }
            "code" => {
                let raw = collapse_whitespace(&self.doc.raw_text(id));
                let content = raw.trim();
                let rendered = if content.is_empty() { String::new() } else { code_span(content) };
                buf.push_decorated(&raw, &rendered);
            }
            "a" => {
                let inner = self.inline_children(id)?;
                let label = inner.trim();
                let href = node.attr("href").map(str::trim).filter(|h| !h.is_empty());
                let rendered = match href {
                    Some(href) if label.is_empty() => format!("[{href}]({href})"),
                    Some(href) => format!("[{label}]({href})"),
                    None => label.to_string(),
                };
                buf.push_decorated(&inner, &rendered);
            }
            "br" => buf.push_break(),
            _ if is_inline(node) => self.inline_nodes(self.doc.children(id), buf)?,
            // Block content pulled into an inline run stays word-separated.
            _ => {
                buf.push_space();
                self.inline_nodes(self.doc.children(id), buf)?;
                buf.push_space();
            }
        }
        Ok(())
    }
}

fn wrap(inner: &str, marker: &str) -> String {
    let content = inner.trim();
    if content.is_empty() {
        String::new()
    } else {
        format!("{marker}{content}{marker}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_merges_spaces() {
        let mut buf = InlineBuffer::default();
        buf.push_text("Hello  ", false);
        buf.push_text("  world", false);
        buf.push_space();
        assert_eq!(buf.finish(), "Hello world");
    }

    #[test]
    fn test_buffer_break_trims_line_end() {
        let mut buf = InlineBuffer::default();
        buf.push_text("one ", false);
        buf.push_break();
        buf.push_text(" two", false);
        assert_eq!(buf.finish(), "one\ntwo");
    }

    #[test]
    fn test_buffer_decorated_keeps_outer_spacing() {
        let mut buf = InlineBuffer::default();
        buf.push_text("a", false);
        buf.push_decorated(" b ", "**b**");
        buf.push_text("c", false);
        assert_eq!(buf.finish(), "a **b** c");
    }

    #[test]
    fn test_buffer_escapes_only_when_asked() {
        let mut buf = InlineBuffer::default();
        buf.push_text("a_b ", true);
        buf.push_text("c_d", false);
        assert_eq!(buf.finish(), r"a\_b c_d");
    }

    #[test]
    fn test_verbatim_keeps_lines() {
        let mut buf = InlineBuffer::default();
        buf.push_text("See", false);
        buf.push_verbatim("\nAn image: Cat\n*Mittens*\n");
        assert_eq!(buf.finish(), "See An image: Cat\n*Mittens*");
    }
}
