//! Exclusion rules for the content filter.
//!
//! The rule set is closed: four heuristics, each with a fixed priority. Rules
//! at or above [`UNCONDITIONAL_PRIORITY`] override whitelist protection.

use crate::link_density::LinkStats;
use crate::patterns::{EXCLUDED_CLASS_TOKEN, HIDDEN_CLASS, IMPORTANT_CLASS};
use crate::tags::{self, HEADING_TAG_SET, IMPORTANT_TAG_SET, INLINE_TAG_SET, ITEM_TAG_SET};
use crate::tags::{EMPTY_TAG_SET, SEMANTIC_EXCLUDED_TAG_SET, STRUCTURAL_TAG_SET};
use crate::tree::{Document, NodeId};

use super::FilterContext;

/// Rules with at least this priority ignore the whitelist.
pub const UNCONDITIONAL_PRIORITY: u32 = 80;

/// Documents with less text than `min_content_length` times this are too
/// small for the length rule to judge.
///
/// With the default minimum of 20 characters, a document needs 200
/// characters of trimmed text before short blocks are dropped outside
/// aggressive mode. Below that, every short block may be the content.
pub const SMALL_DOCUMENT_FACTOR: usize = 10;

/// A subtree exclusion heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// Page chrome tags: `nav`, `header`, `footer`, `aside`, `script`, `style`, `noscript`.
    SemanticTag,
    /// Boilerplate vocabulary in `class` or `id`.
    ClassPattern,
    /// Mostly-link subtrees with enough text to judge.
    LinkDensity,
    /// Short blocks with nothing important inside.
    Length,
}

impl Rule {
    /// The default rule set, highest priority first.
    pub const DEFAULT: [Self; 4] = [Self::SemanticTag, Self::ClassPattern, Self::LinkDensity, Self::Length];

    /// Evaluation order key; higher runs first.
    #[must_use]
    pub fn priority(self) -> u32 {
        match self {
            Self::SemanticTag => 100,
            Self::ClassPattern => 80,
            Self::LinkDensity => 60,
            Self::Length => 40,
        }
    }

    /// Name used in logs and statistics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SemanticTag => "semantic-tag",
            Self::ClassPattern => "class-pattern",
            Self::LinkDensity => "link-density",
            Self::Length => "length",
        }
    }

    /// Whether the rule fires regardless of whitelist protection.
    #[must_use]
    pub fn is_unconditional(self) -> bool {
        self.priority() >= UNCONDITIONAL_PRIORITY
    }

    /// Whether the subtree at `id` should be dropped.
    #[must_use]
    pub fn should_exclude(self, doc: &Document, id: NodeId, ctx: &FilterContext<'_>) -> bool {
        if doc.node(id).is_text() {
            return false;
        }
        match self {
            Self::SemanticTag => tags::contains(&SEMANTIC_EXCLUDED_TAG_SET, &doc.node(id).tag),
            Self::ClassPattern => matches_class_pattern(doc, id),
            Self::LinkDensity => exceeds_link_density(doc, id, ctx),
            Self::Length => too_short(doc, id, ctx),
        }
    }
}

fn matches_class_pattern(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    ["class", "id"]
        .into_iter()
        .filter_map(|name| node.attr(name))
        .any(|value| EXCLUDED_CLASS_TOKEN.is_match(value) || HIDDEN_CLASS.is_match(value))
}

fn exceeds_link_density(doc: &Document, id: NodeId, ctx: &FilterContext<'_>) -> bool {
    if tags::contains(&STRUCTURAL_TAG_SET, &doc.node(id).tag) {
        return false;
    }
    LinkStats::collect(doc, id).exceeds(ctx.config.max_link_density)
}

fn too_short(doc: &Document, id: NodeId, ctx: &FilterContext<'_>) -> bool {
    let node = doc.node(id);
    let tag = node.tag.as_str();

    if tags::contains(&INLINE_TAG_SET, tag)
        || tags::contains(&ITEM_TAG_SET, tag)
        || tags::contains(&EMPTY_TAG_SET, tag)
    {
        return false;
    }
    if tags::contains(&STRUCTURAL_TAG_SET, tag) || tags::contains(&HEADING_TAG_SET, tag) {
        return false;
    }

    // Outside aggressive mode, `div` wrappers and whole small documents are
    // left alone: see `SMALL_DOCUMENT_FACTOR`.
    let aggressive = ctx.config.aggressive_mode;
    if !aggressive {
        if node.tag_is("div") {
            return false;
        }
        let small_document = ctx.config.min_content_length.saturating_mul(SMALL_DOCUMENT_FACTOR);
        if ctx.document_stats.total_text_length < small_document {
            return false;
        }
    }

    if doc.text_content(id).chars().count() >= ctx.config.min_content_length {
        return false;
    }
    !has_important_content(doc, id)
}

/// Whether the subtree holds a heading, media, table, list, quote or code,
/// or carries an important/highlight/note/warning/alert class.
fn has_important_content(doc: &Document, id: NodeId) -> bool {
    doc.descendants(id).any(|d| {
        let node = doc.node(d);
        !node.is_text()
            && (tags::contains(&IMPORTANT_TAG_SET, &node.tag) || IMPORTANT_CLASS.is_match(node.class()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::filter::DocumentStats;
    use crate::options::{BuildOptions, FilterConfig};

    fn judge(rule: Rule, html: &str, target: &str, config: &FilterConfig) -> bool {
        let doc = build(html, &BuildOptions::default());
        let stats = DocumentStats::collect(&doc);
        let ctx = FilterContext {
            config,
            document_stats: &stats,
            depth: 0,
        };
        let id = doc
            .descendants(doc.root())
            .find(|&id| {
                let node = doc.node(id);
                node.attr("id") == Some(target) || node.tag_is(target)
            })
            .unwrap();
        rule.should_exclude(&doc, id, &ctx)
    }

    #[test]
    fn test_priorities_descend() {
        let priorities: Vec<u32> = Rule::DEFAULT.iter().map(|r| r.priority()).collect();
        assert_eq!(priorities, vec![100, 80, 60, 40]);
        assert!(Rule::ClassPattern.is_unconditional());
        assert!(!Rule::LinkDensity.is_unconditional());
    }

    #[test]
    fn test_semantic_tag_rule() {
        let config = FilterConfig::default();
        assert!(judge(Rule::SemanticTag, "<nav>x</nav>", "nav", &config));
        assert!(judge(Rule::SemanticTag, "<aside>x</aside>", "aside", &config));
        assert!(!judge(Rule::SemanticTag, "<p>x</p>", "p", &config));
    }

    #[test]
    fn test_class_pattern_rule() {
        let config = FilterConfig::default();
        assert!(judge(Rule::ClassPattern, r#"<div id="x" class="main-nav">a</div>"#, "x", &config));
        assert!(judge(Rule::ClassPattern, r#"<div id="sidebar-left">a</div>"#, "sidebar-left", &config));
        assert!(judge(Rule::ClassPattern, r#"<div id="x" class="sr-only">a</div>"#, "x", &config));
        assert!(!judge(Rule::ClassPattern, r#"<div id="x" class="shadow-lg">a</div>"#, "x", &config));
    }

    #[test]
    fn test_class_pattern_hidden_and_layout_markers() {
        let config = FilterConfig::default();
        for class in ["is-hidden", "hidden-xs", "overflow-hidden", "site-footer", "page-header", "aside-widget"] {
            let html = format!(r#"<div id="x" class="{class}">a</div>"#);
            assert!(judge(Rule::ClassPattern, &html, "x", &config), "{class}");
        }
        assert!(judge(Rule::ClassPattern, r#"<div id="hidden-panel">a</div>"#, "hidden-panel", &config));
        assert!(!judge(Rule::ClassPattern, r#"<div id="x" class="headerless lead">a</div>"#, "x", &config));
    }

    #[test]
    fn test_link_density_needs_enough_text() {
        let config = FilterConfig::default();
        let tiny = r#"<div id="x"><a href="/1">A</a> <a href="/2">B</a> <a href="/3">C</a> <a href="/4">D</a> <a href="/5">E</a></div>"#;
        assert!(!judge(Rule::LinkDensity, tiny, "x", &config));

        let dense = r#"<div id="x"><a href="/1">First related article title</a>
            <a href="/2">Second related article title</a> and</div>"#;
        assert!(judge(Rule::LinkDensity, dense, "x", &config));
    }

    #[test]
    fn test_link_density_exempts_structural() {
        let config = FilterConfig::default();
        let html = r#"<article><a href="/1">First related article title</a>
            <a href="/2">Second related article title</a></article>"#;
        assert!(!judge(Rule::LinkDensity, html, "article", &config));
    }

    fn long_document(fragment: &str) -> String {
        format!(
            "<article><p>{}</p>{fragment}</article>",
            "Plenty of ordinary article prose to read here. ".repeat(10)
        )
    }

    #[test]
    fn test_length_rule_drops_short_blocks() {
        let config = FilterConfig::default();
        let html = long_document(r#"<p id="x">Share this</p>"#);
        assert!(judge(Rule::Length, &html, "x", &config));
    }

    #[test]
    fn test_length_rule_vetoes() {
        let config = FilterConfig::default();
        let important = long_document(r#"<p id="x" class="note">Heads up</p>"#);
        assert!(!judge(Rule::Length, &important, "x", &config));

        let with_image = long_document(r#"<p id="x"><img src="a.png"></p>"#);
        assert!(!judge(Rule::Length, &with_image, "x", &config));

        let heading = long_document(r#"<h2 id="x">Intro</h2>"#);
        assert!(!judge(Rule::Length, &heading, "x", &config));

        let inline = long_document(r#"<p><b id="x">Hi</b> there</p>"#);
        assert!(!judge(Rule::Length, &inline, "x", &config));
    }

    #[test]
    fn test_length_rule_spares_small_documents() {
        let config = FilterConfig::default();
        assert!(!judge(Rule::Length, r#"<p id="x">Hi</p>"#, "x", &config));

        let aggressive = FilterConfig {
            aggressive_mode: true,
            ..FilterConfig::default()
        };
        assert!(judge(Rule::Length, r#"<p id="x">Hi</p>"#, "x", &aggressive));
    }

    #[test]
    fn test_length_rule_small_document_boundary() {
        let config = FilterConfig::default();
        let threshold = config.min_content_length * SMALL_DOCUMENT_FACTOR;
        let html = |filler: usize| format!(r#"<p>{}</p><p id="x">Tiny</p>"#, "w".repeat(filler));

        let below = html(threshold - "Tiny".len() - 1);
        assert!(!judge(Rule::Length, &below, "x", &config));

        let at = html(threshold - "Tiny".len());
        assert!(judge(Rule::Length, &at, "x", &config));
    }

    #[test]
    fn test_length_rule_div_only_in_aggressive_mode() {
        let html = long_document(r#"<div id="x">tiny</div>"#);
        assert!(!judge(Rule::Length, &html, "x", &FilterConfig::default()));
        let aggressive = FilterConfig {
            aggressive_mode: true,
            ..FilterConfig::default()
        };
        assert!(judge(Rule::Length, &html, "x", &aggressive));
    }
}
