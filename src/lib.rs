//! # essenz
//!
//! Distills rendered HTML into clean, importance-ordered markdown.
//!
//! A document flows through four stages, each owning the tree it receives:
//!
//! ```text
//! HTML → Tree Builder → Content Filter → Media Substitutor → Markdown Renderer → markdown
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use essenz::distill;
//!
//! let html = "<h1>T</h1><p>Hi <strong>there</strong></p><nav>Home</nav>";
//! let markdown = distill(html)?;
//! assert_eq!(markdown, "# T\n\nHi **there**\n");
//! # Ok::<(), essenz::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Forgiving parsing**: malformed markup always yields a tree
//! - **Rule-based filtering**: semantic tags, class/ID vocabulary, link density
//!   and length heuristics, with a whitelist for protected containers
//! - **Media in words**: images, video, audio, embeds and canvases become
//!   descriptive text, synthesized from URL and context when the author gave none
//! - **Configurable markdown**: ATX/Setext headings, list markers and indent,
//!   emphasis markers, fenced or indented code
//! - **Cancellation**: every stage checks a [`CancelToken`] at each node
//!
//! Fetching rendered HTML for a URL is left to an [`source::HtmlSource`]
//! supplied by the caller.

mod cancel;
mod error;
mod options;
mod patterns;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Document Tree: arena of nodes with traversal helpers.
pub mod tree;

/// Tree Builder.
pub mod builder;

/// Content Filter and its rules.
pub mod filter;

/// Link density accounting for boilerplate detection.
pub mod link_density;

/// Tag name groups shared by the stages.
pub mod tags;

/// Media Substitutor.
pub mod media;

/// Markdown Renderer.
pub mod markdown;

/// HTML sources: the renderer collaborator seam.
pub mod source;

/// Character encoding detection and transcoding.
pub mod encoding;

/// URL utilities for media filenames and hosts.
pub mod url_utils;

use tracing::debug;

// Public API - re-exports
pub use builder::{build, build_bytes, build_with_cancel};
pub use cancel::CancelToken;
pub use error::{Error, Interrupted, Result};
pub use filter::{ContentFilter, FilterStats, Rule};
pub use markdown::{BlockKind, MarkdownRenderer};
pub use media::{MediaKind, MediaSubstitutor, SubstitutionStats};
pub use options::{
    parse_unordered_marker, BuildOptions, CodeBlockStyle, EmphasisStyle, FilterConfig,
    HeadingStyle, ImageFormat, ListStyle, MediaConfig, Options, OrderedFormat, ParseStyleError,
    RenderConfig,
};
pub use source::{FileSource, HtmlSource, ReadinessOptions};
pub use tree::{Document, Node, NodeId};

/// Distills an HTML document using default options.
///
/// # Example
///
/// ```rust
/// use essenz::distill;
///
/// let markdown = distill("<article><p>Content</p></article>")?;
/// assert_eq!(markdown, "Content\n");
/// # Ok::<(), essenz::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn distill(html: &str) -> Result<String> {
    distill_with_options(html, &Options::default())
}

/// Distills an HTML document with custom options.
///
/// # Example
///
/// ```rust
/// use essenz::{distill_with_options, HeadingStyle, Options, RenderConfig};
///
/// let options = Options {
///     render: RenderConfig {
///         heading_style: HeadingStyle::Setext,
///         ..RenderConfig::default()
///     },
///     ..Options::default()
/// };
/// let markdown = distill_with_options("<h1>Title</h1>", &options)?;
/// assert_eq!(markdown, "Title\n=====\n");
/// # Ok::<(), essenz::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn distill_with_options(html: &str, options: &Options) -> Result<String> {
    distill_with_cancel(html, options, &CancelToken::none())
}

/// Distills an HTML document, aborting when `cancel` fires.
///
/// # Errors
///
/// Returns the stage-tagged interruption when the token is cancelled or its
/// deadline passes. The partial result is discarded.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use essenz::{distill_with_cancel, CancelToken, Options};
///
/// let token = CancelToken::with_timeout(Duration::from_secs(5));
/// let markdown = distill_with_cancel("<p>Quick</p>", &Options::default(), &token)?;
/// assert_eq!(markdown, "Quick\n");
/// # Ok::<(), essenz::Error>(())
/// ```
pub fn distill_with_cancel(html: &str, options: &Options, cancel: &CancelToken) -> Result<String> {
    debug!(input_len = html.len(), "distilling document");

    let doc = builder::build_with_cancel(html, &options.build, cancel)?;
    debug!(nodes = doc.len(), "tree built");

    let (mut doc, filtered) =
        ContentFilter::new(options.filter.clone()).filter_with_stats(doc, cancel)?;
    debug!(
        nodes = doc.len(),
        removed = filtered.nodes_removed,
        passes = filtered.passes,
        "tree filtered"
    );

    let media = MediaSubstitutor::new(options.media.clone()).substitute_with_stats(&mut doc, cancel)?;
    debug!(replaced = media.replaced, removed = media.removed, "media substituted");

    let markdown = MarkdownRenderer::new(options.render.clone()).render_with_cancel(&doc, cancel)?;
    debug!(output_len = markdown.len(), "markdown rendered");
    Ok(markdown)
}

/// Distills HTML bytes, detecting the character encoding first.
///
/// The encoding comes from a byte-order mark, `<meta charset="...">` or
/// `<meta http-equiv="Content-Type" content="...; charset=...">`, defaulting
/// to UTF-8. Invalid sequences become U+FFFD rather than errors.
///
/// # Example
///
/// ```rust
/// use essenz::{distill_bytes, Options};
///
/// let html = b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>";
/// let markdown = distill_bytes(html, &Options::default())?;
/// assert_eq!(markdown, "Café\n");
/// # Ok::<(), essenz::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn distill_bytes(html: &[u8], options: &Options) -> Result<String> {
    distill_with_options(&encoding::transcode_to_utf8(html), options)
}

/// Fetches `target` from `source` and distills the markup.
///
/// # Errors
///
/// Returns whatever the source reports when it cannot produce markup, or a
/// stage error from the pipeline.
pub fn distill_from<S>(
    source: &S,
    target: &str,
    readiness: &ReadinessOptions,
    options: &Options,
) -> Result<String>
where
    S: HtmlSource + ?Sized,
{
    let html = source.fetch(target, readiness)?;
    debug!(target, "fetched html");
    distill_with_options(&html, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_with_navigation_filtering() {
        let html = "<h1>T</h1><p>Hi <strong>there</strong></p><nav>Home</nav>";
        assert_eq!(distill(html).unwrap(), "# T\n\nHi **there**\n");
    }

    #[test]
    fn test_distill_from_closure_source() {
        let source = |target: &str, _: &ReadinessOptions| -> Result<String> {
            Ok(format!("<p>Fetched {target}</p>"))
        };
        let markdown = distill_from(&source, "page", &ReadinessOptions::default(), &Options::default()).unwrap();
        assert_eq!(markdown, "Fetched page\n");
    }

    #[test]
    fn test_source_errors_propagate() {
        let source = |target: &str, _: &ReadinessOptions| -> Result<String> {
            Err(Error::Source {
                target: target.to_string(),
                message: "renderer unavailable".to_string(),
            })
        };
        let err = distill_from(&source, "https://example.com", &ReadinessOptions::default(), &Options::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch https://example.com: renderer unavailable");
        assert!(!err.is_interrupted());
    }

    #[test]
    fn test_cancelled_run_is_interrupted() {
        let token = CancelToken::none();
        token.cancel();
        let err = distill_with_cancel("<p>x</p>", &Options::default(), &token).unwrap_err();
        assert!(err.is_interrupted());
        assert_eq!(err.to_string(), "failed to build tree: operation cancelled");
    }
}
