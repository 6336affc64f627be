//! Tree Builder: HTML markup to [`Document`].
//!
//! Parsing is forgiving (html5ever through `dom_query`): unmatched and implicit
//! tags are closed the way browsers close them, so every input yields a tree.
//! The walk below then copies the parsed DOM into the arena, dropping script
//! and style content, optionally dropping navigation chrome and hidden
//! elements, and truncating pathological nesting at `max_depth`.

use crate::cancel::CancelToken;
use crate::dom::{self, NodeKind, NodeRef};
use crate::encoding;
use crate::error::{Error, Result};
use crate::options::BuildOptions;
use crate::patterns::HIDDEN_CLASS;
use crate::tree::{Document, Node, NodeId};

/// Subtrees that never carry readable content.
const ALWAYS_DROPPED: &[&str] = &["script", "style", "noscript"];

/// Page chrome dropped when `filter_navigation` is set.
const NAVIGATION_TAGS: &[&str] = &["nav", "header", "footer", "aside", "menu"];

/// Build a tree from HTML markup.
///
/// Never fails: malformed markup is repaired by the parser.
///
/// # Example
///
/// ```rust
/// use essenz::{build, BuildOptions};
///
/// let doc = build("<p>Hello <b>world", &BuildOptions::default());
/// assert_eq!(doc.text_content(doc.root()), "Hello world");
/// ```
#[must_use]
pub fn build(html: &str, options: &BuildOptions) -> Document {
    let mut walker = Walker::new(options, None);
    walker.run(html);
    walker.doc
}

/// Build a tree, checking `cancel` at every visited node.
///
/// # Errors
///
/// Returns [`Error::Build`] when the token is cancelled or its deadline passes;
/// the partial tree is discarded.
pub fn build_with_cancel(html: &str, options: &BuildOptions, cancel: &CancelToken) -> Result<Document> {
    let mut walker = Walker::new(options, Some(cancel));
    walker.run(html);
    match walker.interrupted {
        Some(reason) => Err(Error::Build(reason)),
        None => Ok(walker.doc),
    }
}

/// Build a tree from raw bytes, detecting and transcoding the charset first.
#[must_use]
pub fn build_bytes(html: &[u8], options: &BuildOptions) -> Document {
    build(&encoding::transcode_to_utf8(html), options)
}

/// Whether an element is hidden through its class list or inline style.
fn is_hidden(node: &NodeRef) -> bool {
    if dom::get_attribute(node, "class").is_some_and(|class| HIDDEN_CLASS.is_match(&class)) {
        return true;
    }
    dom::get_attribute(node, "style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

struct Walker<'a> {
    options: &'a BuildOptions,
    cancel: Option<&'a CancelToken>,
    doc: Document,
    next_index: usize,
    /// Depth of enclosing `pre` elements.
    preformatted: usize,
    interrupted: Option<crate::error::Interrupted>,
}

impl<'a> Walker<'a> {
    fn new(options: &'a BuildOptions, cancel: Option<&'a CancelToken>) -> Self {
        Self {
            options,
            cancel,
            doc: Document::empty(),
            next_index: 1,
            preformatted: 0,
            interrupted: None,
        }
    }

    fn run(&mut self, html: &str) {
        let parsed = dom::parse(html);
        let root = self.doc.root();
        for child in dom::child_nodes(&parsed.root()) {
            if !self.visit(&child, root, 1) {
                break;
            }
        }
    }

    /// Copies `node` under `parent`. Returns `false` once the run was interrupted.
    fn visit(&mut self, node: &NodeRef, parent: NodeId, depth: usize) -> bool {
        if depth > self.options.max_depth {
            return true;
        }
        if let Some(cancel) = self.cancel {
            if let Err(reason) = cancel.check() {
                self.interrupted = Some(reason);
                return false;
            }
        }

        match dom::kind(node) {
            NodeKind::Element => self.visit_element(node, parent, depth),
            NodeKind::Text => {
                self.visit_text(node, parent);
                true
            }
            NodeKind::Other => true,
        }
    }

    fn visit_element(&mut self, node: &NodeRef, parent: NodeId, depth: usize) -> bool {
        let Some(tag) = dom::tag_name(node) else {
            return true;
        };
        if ALWAYS_DROPPED.contains(&tag.as_str()) {
            return true;
        }
        if self.options.filter_navigation && (NAVIGATION_TAGS.contains(&tag.as_str()) || is_hidden(node)) {
            return true;
        }

        let attributes = if self.options.preserve_attributes {
            dom::attributes(node)
        } else {
            Default::default()
        };
        let preformatted = tag == "pre";
        let mut element = Node::element(tag, attributes);
        element.index = self.take_index();
        let id = self.doc.append_child(parent, element);

        if preformatted {
            self.preformatted += 1;
        }
        let mut completed = true;
        for child in dom::child_nodes(node) {
            if !self.visit(&child, id, depth + 1) {
                completed = false;
                break;
            }
        }
        if preformatted {
            self.preformatted -= 1;
        }
        completed
    }

    /// Whitespace-only text is dropped unless it sits inside `pre`, where it
    /// separates lines.
    fn visit_text(&mut self, node: &NodeRef, parent: NodeId) {
        let text = dom::text(node);
        if text.trim().is_empty() && self.preformatted == 0 && !self.options.include_whitespace_only_text {
            return;
        }
        let mut leaf = Node::text(text.to_string());
        leaf.index = self.take_index();
        self.doc.append_child(parent, leaf);
    }

    fn take_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Interrupted;

    fn tags(doc: &Document) -> Vec<String> {
        doc.descendants(doc.root())
            .map(|id| doc.node(id).tag.clone())
            .collect()
    }

    #[test]
    fn test_builds_html_skeleton() {
        let doc = build("<p>Hello</p>", &BuildOptions::default());
        let tags = tags(&doc);
        assert_eq!(tags[0], "document");
        assert!(tags.contains(&"html".to_string()));
        assert!(tags.contains(&"body".to_string()));
        assert!(tags.contains(&"p".to_string()));
        assert_eq!(doc.text_content(doc.root()), "Hello");
    }

    #[test]
    fn test_script_style_noscript_always_dropped() {
        let html = "<p>keep</p><script>var x;</script><style>p{}</style><noscript>js off</noscript>";
        let doc = build(html, &BuildOptions::default());
        assert_eq!(doc.text_content(doc.root()), "keep");
    }

    #[test]
    fn test_navigation_kept_without_filtering() {
        let doc = build("<nav>Home</nav><p>Body</p>", &BuildOptions::default());
        assert_eq!(doc.text_content(doc.root()), "Home Body");
    }

    #[test]
    fn test_navigation_and_hidden_dropped_with_filtering() {
        let options = BuildOptions {
            filter_navigation: true,
            ..BuildOptions::default()
        };
        let html = r#"
            <header>Site</header><nav>Home</nav><aside>Ad</aside><footer>(c)</footer>
            <div class="sr-only">Skip</div>
            <div style="DISPLAY : none">Gone</div>
            <div style="visibility:hidden">Invisible</div>
            <div class="overflow-hidden">Layout</div>
            <div class="is-hidden">Toggle</div>
            <span class="hidden-xs">Desktop only</span>
            <p>Body</p>"#;
        let doc = build(html, &options);
        assert_eq!(doc.text_content(doc.root()), "Body");
    }

    #[test]
    fn test_whitespace_inside_pre_survives() {
        let html = "<div>\n</div><pre><code><span>fn a()</span>\n<span>fn b()</span></code></pre>";
        let doc = build(html, &BuildOptions::default());
        let texts: Vec<&str> = doc
            .descendants(doc.root())
            .filter(|&id| doc.node(id).is_text())
            .map(|id| doc.node(id).text.as_str())
            .collect();
        assert_eq!(texts, vec!["fn a()", "\n", "fn b()"]);
    }

    #[test]
    fn test_text_keeps_untrimmed_original() {
        let doc = build("<p>  spaced   out  </p>", &BuildOptions::default());
        let leaf = doc.text_nodes()[0];
        assert_eq!(doc.node(leaf).text, "  spaced   out  ");
    }

    #[test]
    fn test_whitespace_only_text() {
        let html = "<div><p>a</p>\n   <p>b</p></div>";
        let dropped = build(html, &BuildOptions::default());
        let kept = build(
            html,
            &BuildOptions {
                include_whitespace_only_text: true,
                ..BuildOptions::default()
            },
        );
        assert!(kept.len() > dropped.len());
    }

    #[test]
    fn test_attributes_optional() {
        let html = r#"<p class="lead" id="x">t</p>"#;
        let with = build(html, &BuildOptions::default());
        let without = build(
            html,
            &BuildOptions {
                preserve_attributes: false,
                ..BuildOptions::default()
            },
        );
        let p_with = with.find_descendant(with.root(), "p").unwrap();
        let p_without = without.find_descendant(without.root(), "p").unwrap();
        assert_eq!(with.node(p_with).class(), "lead");
        assert!(without.node(p_without).attributes.is_empty());
    }

    #[test]
    fn test_max_depth_truncates() {
        let html = format!("{}deep{}", "<div>".repeat(50), "</div>".repeat(50));
        let options = BuildOptions {
            max_depth: 10,
            ..BuildOptions::default()
        };
        let doc = build(&html, &options);
        assert!(doc.stats().max_depth <= 10);
        assert_eq!(doc.text_content(doc.root()), "");
    }

    #[test]
    fn test_indices_are_preorder() {
        let doc = build("<p>a</p><p>b</p>", &BuildOptions::default());
        let indices: Vec<usize> = doc
            .descendants(doc.root())
            .map(|id| doc.node(id).index)
            .collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
        assert_eq!(indices[0], 0);
    }

    #[test]
    fn test_malformed_markup_builds() {
        for html in ["", "<", "<<>>", "</p></div>", "<table><tr><td>x", "<p>a<p>b<li>c"] {
            let doc = build(html, &BuildOptions::default());
            assert!(doc.node(doc.root()).tag_is("document"), "input {html:?}");
        }
    }

    #[test]
    fn test_cancelled_build_errors() {
        let token = CancelToken::none();
        token.cancel();
        let err = build_with_cancel("<p>x</p>", &BuildOptions::default(), &token).unwrap_err();
        assert!(matches!(err, Error::Build(Interrupted::Cancelled)));
        assert_eq!(err.to_string(), "failed to build tree: operation cancelled");
    }

    #[test]
    fn test_build_bytes_transcodes() {
        let html = b"<meta charset=\"windows-1252\"><p>Caf\xE9</p>";
        let doc = build_bytes(html, &BuildOptions::default());
        assert_eq!(doc.text_content(doc.root()), "Caf\u{e9}");
    }
}
