//! Block renderers: headings, paragraphs, lists, blockquotes and code blocks.

use super::inline::is_inline;
use super::style::{code_fence, collapse_whitespace, escape_markdown, heading};
use super::{Renderer, Step};
use crate::options::CodeBlockStyle;
use crate::patterns::LANGUAGE_CLASS;
use crate::tree::{Node, NodeId};

/// Structural elements with a dedicated markdown form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `h1`-`h6`
    Heading,
    /// `p`
    Paragraph,
    /// `ul`, `ol`
    List,
    /// `blockquote`
    Blockquote,
    /// `pre`
    CodeBlock,
}

impl BlockKind {
    /// Every block kind, in matching order.
    pub const ALL: [Self; 5] = [
        Self::Heading,
        Self::Paragraph,
        Self::List,
        Self::Blockquote,
        Self::CodeBlock,
    ];

    /// Whether this renderer handles `node`.
    #[must_use]
    pub fn can_render(self, node: &Node) -> bool {
        match self {
            Self::Heading => node.heading_level().is_some(),
            Self::Paragraph => node.tag_is("p"),
            Self::List => node.tag_in(&["ul", "ol"]),
            Self::Blockquote => node.tag_is("blockquote"),
            Self::CodeBlock => node.tag_is("pre"),
        }
    }

    /// First block kind that handles `node`; `None` sends it through the generic pass.
    #[must_use]
    pub fn classify(node: &Node) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.can_render(node))
    }
}

impl Renderer<'_> {
    /// Markdown for one block, or `None` when it has nothing to show.
    pub(super) fn render_block(&self, kind: BlockKind, id: NodeId) -> Step<Option<String>> {
        self.check()?;
        let rendered = match kind {
            BlockKind::Heading => self.heading(id),
            BlockKind::Paragraph => self.render_inline(self.doc.children(id))?,
            BlockKind::List => {
                let mut lines = Vec::new();
                self.list_lines(id, 0, &mut lines)?;
                lines.join("\n")
            }
            BlockKind::Blockquote => self.blockquote(id)?,
            BlockKind::CodeBlock => self.code_block(id),
        };
        Ok((!rendered.is_empty()).then_some(rendered))
    }

    fn heading(&self, id: NodeId) -> String {
        let node = self.doc.node(id);
        let text = collapse_whitespace(&self.doc.raw_text(id));
        let text = escape_markdown(text.trim(), !self.config.escape_text);
        match node.heading_level() {
            Some(level) if !text.is_empty() => heading(&text, level, self.config.heading_style),
            _ => String::new(),
        }
    }

    fn list_lines(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) -> Step<()> {
        let style = &self.config.list_style;
        let ordered = self.doc.node(id).tag_is("ol");
        let indent = " ".repeat(depth * style.indent_size);
        let mut number = 0;

        for &child in self.doc.children(id) {
            self.check()?;
            let node = self.doc.node(child);
            if node.tag_in(&["ul", "ol"]) {
                self.list_lines(child, depth + 1, lines)?;
                continue;
            }
            if !node.tag_is("li") {
                continue;
            }

            let (nested, content): (Vec<NodeId>, Vec<NodeId>) = self
                .doc
                .children(child)
                .iter()
                .copied()
                .partition(|&c| self.doc.node(c).tag_in(&["ul", "ol"]));

            let text = self.render_inline(&content)?;
            if !text.is_empty() {
                number += 1;
                let marker = if ordered {
                    style.ordered_format.marker(number)
                } else {
                    style.unordered_marker.to_string()
                };
                let continuation = " ".repeat(indent.len() + marker.chars().count() + 1);
                for (i, line) in text.lines().enumerate() {
                    if i == 0 {
                        lines.push(format!("{indent}{marker} {line}"));
                    } else {
                        lines.push(format!("{continuation}{line}"));
                    }
                }
            }
            for list in nested {
                self.list_lines(list, depth + 1, lines)?;
            }
        }
        Ok(())
    }

    fn blockquote(&self, id: NodeId) -> Step<String> {
        let mut segments = Vec::new();
        let mut run = Vec::new();
        for &child in self.doc.children(id) {
            let node = self.doc.node(child);
            if is_inline(node) {
                run.push(child);
                continue;
            }
            segments.push(self.render_inline(&run)?);
            run.clear();
            segments.push(self.render_inline(&[child])?);
        }
        segments.push(self.render_inline(&run)?);
        segments.retain(|s| !s.is_empty());

        let separator = if self.config.blockquote_paragraphs { "\n\n" } else { " " };
        let body = segments.join(separator);
        Ok(body
            .lines()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn code_block(&self, id: NodeId) -> String {
        let code = self.doc.find_descendant(id, "code");
        let language = [code, Some(id)]
            .into_iter()
            .flatten()
            .find_map(|n| {
                LANGUAGE_CLASS
                    .captures(self.doc.node(n).class())
                    .map(|caps| caps[1].to_string())
            })
            .unwrap_or_default();

        let raw = self.doc.raw_text(id);
        let content = raw.strip_prefix('\n').unwrap_or(&raw).trim_end();
        if content.trim().is_empty() {
            return String::new();
        }

        match self.config.code_block_style {
            CodeBlockStyle::Fenced => {
                let fence = code_fence(content);
                format!("{fence}{language}\n{content}\n{fence}")
            }
            CodeBlockStyle::Indented => content
                .lines()
                .map(|line| if line.is_empty() { String::new() } else { format!("    {line}") })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
