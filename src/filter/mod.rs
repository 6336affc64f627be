//! Content Filter
//!
//! Removes non-article subtrees from a [`Document`] with an ordered set of
//! [`Rule`]s:
//!
//! - `semantic-tag` (100) and `class-pattern` (80) are unconditional: they
//!   drop a node even when it is whitelisted.
//! - Whitelisted nodes (tag name, or `.class` substring of the class list)
//!   skip the remaining rules for themselves only; their children are judged
//!   independently.
//! - `link-density` (60) and `length` (40) judge everything else.
//!
//! An excluded node is dropped with its whole subtree. Passes repeat until one
//! removes nothing, so filtering an already-filtered tree is a no-op.

mod rules;

pub use rules::{Rule, SMALL_DOCUMENT_FACTOR, UNCONDITIONAL_PRIORITY};

use std::collections::BTreeMap;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{Error, Interrupted, Result};
use crate::options::FilterConfig;
use crate::tags::{self, HEADING_TAG_SET};
use crate::tree::{Document, NodeId};

/// Document-wide statistics, computed once per pass and threaded through every
/// rule evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStats {
    /// Characters of trimmed text across all leaves.
    pub total_text_length: usize,
    /// `h1`..`h6` elements.
    pub heading_count: usize,
    /// `p` elements.
    pub paragraph_count: usize,
    /// Characters of trimmed text inside `a` elements.
    pub link_text_length: usize,
    /// `total_text_length / paragraph_count`, or `0.0` without paragraphs.
    pub average_paragraph_length: f64,
}

impl DocumentStats {
    /// Collect statistics over the reachable tree.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn collect(doc: &Document) -> Self {
        let mut stats = Self::default();
        let mut stack = vec![(doc.root(), false)];
        while let Some((id, in_link)) = stack.pop() {
            let node = doc.node(id);
            if node.is_text() {
                let len = node.text.trim().chars().count();
                stats.total_text_length += len;
                if in_link {
                    stats.link_text_length += len;
                }
                continue;
            }
            if tags::contains(&HEADING_TAG_SET, &node.tag) {
                stats.heading_count += 1;
            } else if node.tag_is("p") {
                stats.paragraph_count += 1;
            }
            let is_link = node.tag_is("a");
            stack.extend(node.children.iter().rev().map(|&c| (c, in_link || is_link)));
        }
        if stats.paragraph_count > 0 {
            stats.average_paragraph_length = stats.total_text_length as f64 / stats.paragraph_count as f64;
        }
        stats
    }
}

/// What a rule sees besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Active configuration.
    pub config: &'a FilterConfig,
    /// Statistics of the whole document for this pass.
    pub document_stats: &'a DocumentStats,
    /// Depth of the node being judged, relative to the root.
    pub depth: usize,
}

/// Counters accumulated over a filtering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Passes run, including the final pass that removed nothing.
    pub passes: usize,
    /// Rule evaluations performed (nodes visited).
    pub nodes_processed: usize,
    /// Nodes removed, counting every node of each dropped subtree.
    pub nodes_removed: usize,
    /// Exclusions per rule name.
    pub rules_applied: BTreeMap<&'static str, usize>,
    /// Nodes that skipped the lower-priority rules through the whitelist.
    pub whitelisted: usize,
}

/// Rule-based boilerplate remover.
///
/// # Example
///
/// ```rust
/// use essenz::{build, BuildOptions, ContentFilter, FilterConfig};
///
/// let doc = build(r#"<nav class="main-nav"><a href="/">Home</a></nav><p>Story</p>"#,
///     &BuildOptions::default());
/// let filtered = ContentFilter::new(FilterConfig::default()).filter(doc);
/// assert_eq!(filtered.text_content(filtered.root()), "Story");
/// ```
#[derive(Debug, Clone)]
pub struct ContentFilter {
    config: FilterConfig,
    rules: Vec<Rule>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl ContentFilter {
    /// A filter running the default rule set.
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self::with_rules(config, Rule::DEFAULT)
    }

    /// A filter running only `rules`, ordered by descending priority.
    #[must_use]
    pub fn with_rules(config: FilterConfig, rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().collect();
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
        rules.dedup();
        Self { config, rules }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// The active rules, highest priority first.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Filter a tree. Never returns a missing root: if the root itself is
    /// excluded, an empty `document` placeholder comes back.
    #[must_use]
    pub fn filter(&self, doc: Document) -> Document {
        let mut stats = FilterStats::default();
        match self.run(doc, None, &mut stats) {
            Ok(doc) => doc,
            // Without a token the run cannot be interrupted.
            Err(_) => Document::empty(),
        }
    }

    /// Filter a tree, checking `cancel` at every visited node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filter`] when interrupted.
    pub fn filter_with_cancel(&self, doc: Document, cancel: &CancelToken) -> Result<Document> {
        let mut stats = FilterStats::default();
        self.run(doc, Some(cancel), &mut stats).map_err(Error::Filter)
    }

    /// Filter a tree and report what happened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filter`] when interrupted.
    pub fn filter_with_stats(&self, doc: Document, cancel: &CancelToken) -> Result<(Document, FilterStats)> {
        let mut stats = FilterStats::default();
        let doc = self.run(doc, Some(cancel), &mut stats).map_err(Error::Filter)?;
        Ok((doc, stats))
    }

    fn run(
        &self,
        mut doc: Document,
        cancel: Option<&CancelToken>,
        stats: &mut FilterStats,
    ) -> std::result::Result<Document, Interrupted> {
        loop {
            stats.passes += 1;
            let document_stats = DocumentStats::collect(&doc);
            let ctx = FilterContext {
                config: &self.config,
                document_stats: &document_stats,
                depth: 0,
            };
            let removed_before = stats.nodes_removed;

            let root = doc.root();
            if self.visit(&mut doc, root, ctx, cancel, stats)? == Verdict::Excluded {
                return Ok(Document::empty());
            }
            if stats.nodes_removed == removed_before {
                return Ok(doc.compact());
            }
        }
    }

    fn visit(
        &self,
        doc: &mut Document,
        id: NodeId,
        ctx: FilterContext<'_>,
        cancel: Option<&CancelToken>,
        stats: &mut FilterStats,
    ) -> std::result::Result<Verdict, Interrupted> {
        if let Some(cancel) = cancel {
            cancel.check()?;
        }
        stats.nodes_processed += 1;

        if let Some(rule) = self.excluding_rule(doc, id, &ctx, stats) {
            stats.nodes_removed += doc.descendants(id).count();
            *stats.rules_applied.entry(rule.name()).or_default() += 1;
            doc.detach(id);
            return Ok(Verdict::Excluded);
        }

        let child_ctx = FilterContext {
            depth: ctx.depth + 1,
            ..ctx
        };
        let children = doc.children(id).to_vec();
        for child in children {
            self.visit(doc, child, child_ctx, cancel, stats)?;
        }
        Ok(Verdict::Kept)
    }

    fn excluding_rule(
        &self,
        doc: &Document,
        id: NodeId,
        ctx: &FilterContext<'_>,
        stats: &mut FilterStats,
    ) -> Option<Rule> {
        let (unconditional, conditional): (Vec<Rule>, Vec<Rule>) =
            self.rules.iter().copied().partition(|rule| rule.is_unconditional());

        if let Some(rule) = unconditional.into_iter().find(|r| r.should_exclude(doc, id, ctx)) {
            self.log_exclusion(doc, id, rule);
            return Some(rule);
        }

        if self.is_whitelisted(doc, id) {
            stats.whitelisted += 1;
            if self.config.debug_mode {
                debug!(tag = %doc.node(id).tag, "preserving whitelisted node");
            }
            return None;
        }

        let rule = conditional.into_iter().find(|r| r.should_exclude(doc, id, ctx))?;
        self.log_exclusion(doc, id, rule);
        Some(rule)
    }

    fn log_exclusion(&self, doc: &Document, id: NodeId, rule: Rule) {
        if self.config.debug_mode {
            let node = doc.node(id);
            debug!(rule = rule.name(), tag = %node.tag, class = node.class(), "excluding node");
        }
    }

    /// Tag name match (case-insensitive) or `.class` substring match.
    #[must_use]
    pub fn is_whitelisted(&self, doc: &Document, id: NodeId) -> bool {
        let node = doc.node(id);
        if node.is_text() {
            return false;
        }
        self.config.preserve_whitelist.iter().any(|selector| {
            match selector.strip_prefix('.') {
                Some(class) => !class.is_empty() && node.class().contains(class),
                None => node.tag_is(selector),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Kept,
    Excluded,
}

/// Filter a tree with the default rule set.
#[must_use]
pub fn filter(doc: Document, config: &FilterConfig) -> Document {
    ContentFilter::new(config.clone()).filter(doc)
}
