//! Markdown Renderer
//!
//! Turns a Document Tree into markdown. Elements with a dedicated form
//! (headings, paragraphs, lists, blockquotes, code blocks) go through their
//! [`BlockKind`] renderer; every other element falls through to a generic pass
//! that renders its children in place, grouping runs of inline content into
//! paragraphs.
//!
//! # Module Structure
//!
//! - `blocks`: block kinds and their renderers
//! - `inline`: emphasis, code spans, links, line breaks
//! - `style`: syntax helpers and text escaping

mod blocks;
mod inline;
mod style;

pub use blocks::BlockKind;
pub use style::{code_fence, collapse_whitespace, escape_markdown};

use crate::cancel::CancelToken;
use crate::error::{Error, Interrupted, Result};
use crate::options::RenderConfig;
use crate::tree::{Document, NodeId};

use inline::is_inline;

type Step<T> = std::result::Result<T, Interrupted>;

/// Renders Document Trees to markdown.
///
/// # Example
///
/// ```rust
/// use essenz::{build, BuildOptions, MarkdownRenderer, RenderConfig};
///
/// let doc = build("<h2>Notes</h2><ul><li>one</li><li>two</li></ul>", &BuildOptions::default());
/// let markdown = MarkdownRenderer::new(RenderConfig::default()).render(&doc);
/// assert_eq!(markdown, "## Notes\n\n- one\n- two\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    config: RenderConfig,
}

impl MarkdownRenderer {
    /// A renderer with the given style configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `doc`. The output always ends with exactly one newline.
    #[must_use]
    pub fn render(&self, doc: &Document) -> String {
        // Without a token the walk cannot be interrupted.
        Renderer::new(doc, &self.config, None).run().unwrap_or_default()
    }

    /// Render `doc`, checking `cancel` at each visited node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when interrupted.
    pub fn render_with_cancel(&self, doc: &Document, cancel: &CancelToken) -> Result<String> {
        Renderer::new(doc, &self.config, Some(cancel))
            .run()
            .map_err(Error::Render)
    }
}

/// Render `doc` with the given configuration.
#[must_use]
pub fn render(doc: &Document, config: &RenderConfig) -> String {
    MarkdownRenderer::new(config.clone()).render(doc)
}

/// One rendered block. Code blocks are emitted byte for byte.
#[derive(Debug)]
struct Block {
    text: String,
    code: bool,
}

impl Block {
    fn prose(text: String) -> Self {
        Self { text, code: false }
    }
}

/// State of one render walk.
struct Renderer<'a> {
    doc: &'a Document,
    config: &'a RenderConfig,
    cancel: Option<&'a CancelToken>,
}

impl<'a> Renderer<'a> {
    fn new(doc: &'a Document, config: &'a RenderConfig, cancel: Option<&'a CancelToken>) -> Self {
        Self { doc, config, cancel }
    }

    fn check(&self) -> Step<()> {
        match self.cancel {
            Some(cancel) => cancel.check(),
            None => Ok(()),
        }
    }

    fn run(&self) -> Step<String> {
        let mut blocks = Vec::new();
        self.render_node(self.doc.root(), &mut blocks)?;
        Ok(assemble(&blocks))
    }

    fn render_node(&self, id: NodeId, blocks: &mut Vec<Block>) -> Step<()> {
        self.check()?;
        let node = self.doc.node(id);
        if node.is_text() {
            let text = if node.verbatim {
                node.text.trim().to_string()
            } else {
                self.render_inline(&[id])?
            };
            if !text.is_empty() {
                blocks.push(Block::prose(text));
            }
            return Ok(());
        }
        if node.tag_is("head") {
            return Ok(());
        }
        match BlockKind::classify(node) {
            Some(kind) => {
                if let Some(text) = self.render_block(kind, id)? {
                    blocks.push(Block {
                        text,
                        code: kind == BlockKind::CodeBlock,
                    });
                }
            }
            None => self.render_children(id, blocks)?,
        }
        Ok(())
    }

    /// Generic pass: block children render on their own, inline runs become paragraphs.
    fn render_children(&self, id: NodeId, blocks: &mut Vec<Block>) -> Step<()> {
        let mut run: Vec<NodeId> = Vec::new();
        for &child in self.doc.children(id) {
            if is_inline(self.doc.node(child)) {
                run.push(child);
                continue;
            }
            self.flush_run(&mut run, blocks)?;
            self.render_node(child, blocks)?;
        }
        self.flush_run(&mut run, blocks)
    }

    fn flush_run(&self, run: &mut Vec<NodeId>, blocks: &mut Vec<Block>) -> Step<()> {
        if run.is_empty() {
            return Ok(());
        }
        let text = self.render_inline(run)?;
        run.clear();
        if !text.is_empty() {
            blocks.push(Block::prose(text));
        }
        Ok(())
    }
}

/// Joins blocks with one blank line between them. Prose blocks lose trailing
/// spaces and repeated blank lines; code blocks are left untouched. The
/// document ends with exactly one newline.
fn assemble(blocks: &[Block]) -> String {
    let parts: Vec<String> = blocks
        .iter()
        .map(|block| if block.code { block.text.clone() } else { tidy(&block.text) })
        .filter(|text| !text.is_empty())
        .collect();
    let joined = parts.join("\n\n");
    let body = joined.trim_start_matches('\n').trim_end();
    format!("{body}\n")
}

fn tidy(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
