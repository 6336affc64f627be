//! Media Substitutor
//!
//! Replaces media subtrees (`img`, `picture`, `video`, `audio`, `canvas`,
//! `svg`, social-embed blockquotes, and `figure`s wrapping any of them) with a
//! single text leaf describing the media in words:
//!
//! ```text
//! An image: A fluffy orange cat sitting in a sunny window
//! *Mittens, aged 3*
//! ```
//!
//! # Module Structure
//!
//! - `detectors`: media kinds and the detectors that recognise them
//! - `context`: surrounding words and caption lookup
//! - `describe`: description synthesis from URL and context

pub mod context;
pub mod describe;
pub mod detectors;

pub use detectors::{detect, is_decorative, Detector, MediaElement, MediaKind, SocialPlatform, SocialPost};

use tracing::trace;

use crate::cancel::CancelToken;
use crate::error::{Error, Interrupted, Result};
use crate::options::{ImageFormat, MediaConfig};
use crate::tags::{self, MEDIA_TAG_SET};
use crate::tree::{Document, Node, NodeId};

/// Everything known about one media element, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReplacement {
    /// Detected kind.
    pub kind: MediaKind,
    /// Final description (author-supplied, synthesized, or the kind's fallback noun).
    pub description: String,
    /// Media URL, if known.
    pub url: Option<String>,
    /// Associated caption, if any.
    pub caption: Option<String>,
    /// Surrounding words used for synthesis.
    pub context: String,
    /// Embedded post details.
    pub social: Option<SocialPost>,
}

impl MediaReplacement {
    /// Replacement text for the media element.
    #[must_use]
    pub fn to_markdown(&self, config: &MediaConfig) -> String {
        match self.kind {
            MediaKind::SocialEmbed => self.social_markdown(),
            MediaKind::Image | MediaKind::Video | MediaKind::Audio => {
                let mut out = match (&self.url, config.image_format) {
                    (Some(url), ImageFormat::Markdown) if self.kind == MediaKind::Image => {
                        format!("![{}]({url})", self.description.replace(['[', ']'], ""))
                    }
                    _ => self.descriptive(config.include_urls),
                };
                if let Some(caption) = self.caption.as_deref().filter(|c| *c != self.description) {
                    out.push_str(&format!("\n*{caption}*"));
                }
                out
            }
            MediaKind::Interactive | MediaKind::Unknown => {
                format!("{}: {}", self.kind.label(), self.description)
            }
        }
    }

    fn descriptive(&self, include_url: bool) -> String {
        let mut out = format!("{}: {}", self.kind.label(), self.description);
        if include_url {
            if let Some(url) = &self.url {
                out.push_str(&format!(" ({url})"));
            }
        }
        out
    }

    fn social_markdown(&self) -> String {
        let Some(post) = &self.social else {
            return format!("> {}", self.description);
        };
        let mut lines: Vec<String> = post
            .lines
            .iter()
            .flat_map(|line| line.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("> {line}"))
            .collect();
        if lines.is_empty() {
            lines.push(format!("> {} post", post.platform.name()));
        }
        if let Some(handle) = &post.handle {
            lines.push(format!("> \u{2014} {handle} on {}", post.platform.name()));
        }
        lines.join("\n")
    }
}

/// Counters for one substitution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    /// Media subtrees collapsed into text.
    pub replaced: usize,
    /// Decorative images dropped.
    pub removed: usize,
}

/// Whether `id` is a media element the substitutor replaces.
#[must_use]
pub fn is_media_element(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    if tags::contains(&MEDIA_TAG_SET, &node.tag) {
        return true;
    }
    if node.tag_is("blockquote") {
        return SocialPlatform::from_class(node.class()).is_some();
    }
    if node.tag_is("figure") {
        return doc.descendants(id).skip(1).any(|d| is_media_element(doc, d));
    }
    false
}

/// Replaces media with descriptive text, in place.
///
/// # Example
///
/// ```rust
/// use essenz::{build, BuildOptions, MediaConfig, MediaSubstitutor};
///
/// let mut doc = build(r#"<p>Before</p><img src="cat.jpg" alt="A cat"><p>After</p>"#,
///     &BuildOptions::default());
/// MediaSubstitutor::new(MediaConfig::default()).substitute(&mut doc);
/// assert!(doc.text_content(doc.root()).contains("An image: A cat"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MediaSubstitutor {
    config: MediaConfig,
}

impl MediaSubstitutor {
    /// A substitutor with the given configuration.
    #[must_use]
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Substitute every media element.
    pub fn substitute(&self, doc: &mut Document) {
        let mut stats = SubstitutionStats::default();
        // Without a token the walk cannot be interrupted.
        let _ = self.visit(doc, doc.root(), None, &mut stats);
    }

    /// Substitute every media element, checking `cancel` at each visited node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] when interrupted; the tree is then partially
    /// substituted and must be discarded.
    pub fn substitute_with_cancel(&self, doc: &mut Document, cancel: &CancelToken) -> Result<()> {
        self.substitute_with_stats(doc, cancel).map(|_| ())
    }

    /// Substitute and report what happened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] when interrupted.
    pub fn substitute_with_stats(&self, doc: &mut Document, cancel: &CancelToken) -> Result<SubstitutionStats> {
        let mut stats = SubstitutionStats::default();
        self.visit(doc, doc.root(), Some(cancel), &mut stats)
            .map_err(Error::Media)?;
        Ok(stats)
    }

    /// Describe the media element at `id` without touching the tree.
    #[must_use]
    pub fn replacement_for(&self, doc: &Document, id: NodeId) -> MediaReplacement {
        let target = if doc.node(id).tag_is("figure") {
            doc.descendants(id)
                .skip(1)
                .find(|&d| !doc.node(d).tag_is("figure") && is_media_element(doc, d))
                .unwrap_or(id)
        } else {
            id
        };

        let element = detect(doc, target).unwrap_or_else(|| unknown_element(doc, target));
        let context = context::extract_context(doc, id, self.config.context_radius);
        let caption = context::find_caption(doc, id);

        let description = element
            .description
            .clone()
            .or_else(|| {
                self.config
                    .generate_descriptions
                    .then(|| {
                        describe::generate(
                            element.url.as_deref(),
                            &context,
                            self.config.max_description_length,
                        )
                    })
                    .flatten()
            })
            .unwrap_or_else(|| element.kind.fallback().to_string());

        MediaReplacement {
            kind: element.kind,
            description,
            url: element.url,
            caption,
            context,
            social: element.social,
        }
    }

    fn visit(
        &self,
        doc: &mut Document,
        id: NodeId,
        cancel: Option<&CancelToken>,
        stats: &mut SubstitutionStats,
    ) -> std::result::Result<(), Interrupted> {
        if let Some(cancel) = cancel {
            cancel.check()?;
        }

        if is_media_element(doc, id) {
            if self.drop_decorative(doc, id, stats) {
                return Ok(());
            }
            if is_media_element(doc, id) {
                let replacement = self.replacement_for(doc, id);
                trace!(kind = ?replacement.kind, tag = %doc.node(id).tag, "replacing media");
                doc.replace(id, Node::verbatim_text(replacement.to_markdown(&self.config)));
                stats.replaced += 1;
                return Ok(());
            }
        }

        let children = doc.children(id).to_vec();
        for child in children {
            self.visit(doc, child, cancel, stats)?;
        }
        Ok(())
    }

    /// Removes decorative images at or below `id` unless they are wanted.
    /// Returns `true` when `id` itself was removed.
    fn drop_decorative(&self, doc: &mut Document, id: NodeId, stats: &mut SubstitutionStats) -> bool {
        if self.config.include_decorative_images {
            return false;
        }
        let decorative: Vec<NodeId> = doc
            .descendants(id)
            .filter(|&d| doc.node(d).tag_in(&["img", "picture"]) && is_decorative(doc, d))
            .collect();
        let mut removed_self = false;
        for d in decorative {
            // An img inside an already-removed picture is gone too.
            if d != id && !doc.ancestors(d).any(|a| a == id) {
                continue;
            }
            doc.detach(d);
            stats.removed += 1;
            removed_self |= d == id;
            if removed_self {
                break;
            }
        }
        removed_self
    }
}

fn unknown_element(doc: &Document, id: NodeId) -> MediaElement {
    let node = doc.node(id);
    MediaElement {
        kind: MediaKind::Unknown,
        description: node
            .non_empty_attr("alt")
            .or_else(|| node.non_empty_attr("title"))
            .map(str::to_string),
        url: node.non_empty_attr("src").map(str::to_string),
        social: None,
    }
}

/// Substitute media in place with the given configuration.
pub fn substitute(doc: &mut Document, config: &MediaConfig) {
    MediaSubstitutor::new(config.clone()).substitute(doc);
}
