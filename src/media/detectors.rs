//! Media detectors.
//!
//! Each [`Detector`] recognises one family of media elements and pulls out
//! what it can describe them with: an author-supplied description, a URL, or
//! for embedded posts, the post text and its author.

use crate::patterns::PARENTHESIZED_HANDLE;
use crate::tree::{Document, NodeId};
use crate::url_utils;

/// What a media element turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `img`, `picture`
    Image,
    /// `video`
    Video,
    /// `audio`
    Audio,
    /// A blockquote carrying a known social-embed class
    SocialEmbed,
    /// `canvas`, `svg`
    Interactive,
    /// A media element no detector could handle
    Unknown,
}

impl MediaKind {
    /// Lead-in of the replacement text (`An image`, `A video`, ...).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "An image",
            Self::Video => "A video",
            Self::Audio => "An audio",
            Self::SocialEmbed => "A social media post",
            Self::Interactive => "An interactive element",
            Self::Unknown => "A media element",
        }
    }

    /// Noun used when nothing better describes the element.
    #[must_use]
    pub fn fallback(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::SocialEmbed => "social media post",
            Self::Interactive => "interactive element",
            Self::Unknown => "media element",
        }
    }
}

/// Platforms whose embed markup is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    /// `blockquote.twitter-tweet`
    Twitter,
    /// `blockquote.instagram-media`
    Instagram,
    /// `blockquote.linkedin-embed`
    LinkedIn,
}

impl SocialPlatform {
    /// Platform named by an embed's class list.
    #[must_use]
    pub fn from_class(class: &str) -> Option<Self> {
        let class = class.to_ascii_lowercase();
        if class.contains("twitter-tweet") {
            Some(Self::Twitter)
        } else if class.contains("instagram-media") {
            Some(Self::Instagram)
        } else if class.contains("linkedin-embed") {
            Some(Self::LinkedIn)
        } else {
            None
        }
    }

    /// Display name used in attributions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::LinkedIn => "LinkedIn",
        }
    }

    fn domains(self) -> &'static [&'static str] {
        match self {
            Self::Twitter => &["twitter.com", "x.com"],
            Self::Instagram => &["instagram.com"],
            Self::LinkedIn => &["linkedin.com"],
        }
    }

    fn is_platform_url(self, href: &str) -> bool {
        self.domains().iter().any(|domain| url_utils::is_on_domain(href, domain))
    }
}

/// Text and author of an embedded post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPost {
    /// Where the post was embedded from.
    pub platform: SocialPlatform,
    /// Post text, one entry per paragraph.
    pub lines: Vec<String>,
    /// Author handle, when one could be resolved.
    pub handle: Option<String>,
}

/// What a detector extracted from a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaElement {
    /// Detected kind.
    pub kind: MediaKind,
    /// Author-supplied or structural description.
    pub description: Option<String>,
    /// Media URL, if any.
    pub url: Option<String>,
    /// Embedded post details for [`MediaKind::SocialEmbed`].
    pub social: Option<SocialPost>,
}

impl MediaElement {
    fn new(kind: MediaKind, description: Option<String>, url: Option<String>) -> Self {
        Self {
            kind,
            description,
            url,
            social: None,
        }
    }
}

/// A strategy recognising one family of media elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    /// `img`, `picture`
    Image,
    /// `video`
    Video,
    /// `audio`
    Audio,
    /// Social-embed blockquotes
    SocialEmbed,
    /// `canvas`, `svg`
    Interactive,
}

impl Detector {
    /// Every detector, highest priority first.
    pub const ALL: [Self; 5] = [Self::Image, Self::Video, Self::Audio, Self::SocialEmbed, Self::Interactive];

    /// Evaluation order key; higher runs first.
    #[must_use]
    pub fn priority(self) -> u32 {
        match self {
            Self::Image => 100,
            Self::Video => 90,
            Self::Audio => 80,
            Self::SocialEmbed => 70,
            Self::Interactive => 60,
        }
    }

    /// Whether this detector recognises the node.
    #[must_use]
    pub fn can_handle(self, doc: &Document, id: NodeId) -> bool {
        let node = doc.node(id);
        match self {
            Self::Image => node.tag_in(&["img", "picture"]),
            Self::Video => node.tag_is("video"),
            Self::Audio => node.tag_is("audio"),
            Self::SocialEmbed => node.tag_is("blockquote") && SocialPlatform::from_class(node.class()).is_some(),
            Self::Interactive => node.tag_in(&["canvas", "svg"]),
        }
    }

    /// Pull a description out of the node; `None` when this detector finds nothing usable.
    #[must_use]
    pub fn extract(self, doc: &Document, id: NodeId) -> Option<MediaElement> {
        if !self.can_handle(doc, id) {
            return None;
        }
        match self {
            Self::Image => extract_image(doc, id),
            Self::Video => Some(extract_playable(doc, id, MediaKind::Video)),
            Self::Audio => Some(extract_playable(doc, id, MediaKind::Audio)),
            Self::SocialEmbed => extract_social(doc, id),
            Self::Interactive => Some(extract_interactive(doc, id)),
        }
    }
}

/// Run detectors in priority order; the first that extracts something wins.
#[must_use]
pub fn detect(doc: &Document, id: NodeId) -> Option<MediaElement> {
    let mut detectors = Detector::ALL;
    detectors.sort_by(|a, b| b.priority().cmp(&a.priority()));
    detectors.into_iter().find_map(|detector| detector.extract(doc, id))
}

/// The `img` behind an image element (itself, or the one inside a `picture`).
fn image_node(doc: &Document, id: NodeId) -> Option<NodeId> {
    if doc.node(id).tag_is("img") {
        Some(id)
    } else {
        doc.find_descendant(id, "img")
    }
}

fn extract_image(doc: &Document, id: NodeId) -> Option<MediaElement> {
    match image_node(doc, id) {
        Some(img) => {
            let node = doc.node(img);
            let description = node
                .non_empty_attr("alt")
                .or_else(|| node.non_empty_attr("title"))
                .map(str::to_string);
            let url = node
                .non_empty_attr("src")
                .or_else(|| node.non_empty_attr("data-src"))
                .map(str::to_string);
            Some(MediaElement::new(MediaKind::Image, description, url))
        }
        // A picture without an img still names its sources.
        None => {
            let source = doc.find_descendant(id, "source")?;
            let url = doc
                .node(source)
                .non_empty_attr("srcset")
                .and_then(|srcset| srcset.split([',', ' ']).find(|s| !s.is_empty()))
                .map(str::to_string);
            Some(MediaElement::new(MediaKind::Image, None, url))
        }
    }
}

fn extract_playable(doc: &Document, id: NodeId, kind: MediaKind) -> MediaElement {
    let node = doc.node(id);
    let labelled = node
        .non_empty_attr("title")
        .or_else(|| node.non_empty_attr("aria-label"))
        .map(str::to_string);

    let source = doc
        .descendants(id)
        .skip(1)
        .find(|&d| doc.node(d).tag_is("source") && doc.node(d).non_empty_attr("src").is_some());
    let url = node
        .non_empty_attr("src")
        .or_else(|| source.and_then(|s| doc.node(s).non_empty_attr("src")))
        .map(str::to_string);
    let format = source
        .and_then(|s| doc.node(s).non_empty_attr("type"))
        .and_then(|mime| mime.split(';').next())
        .and_then(|mime| mime.split_once('/'))
        .map(|(_, subtype)| subtype.trim().to_ascii_uppercase())
        .filter(|subtype| !subtype.is_empty());

    let description = labelled.or_else(|| {
        let stem = url
            .as_deref()
            .map(url_utils::file_stem)
            .map(|stem| stem.replace(['-', '_'], " ").trim().to_string())
            .filter(|stem| !stem.is_empty());
        match (stem, format) {
            (None, None) => None,
            (stem, None) => stem,
            (stem, Some(format)) => Some(format!(
                "{} ({format} format)",
                stem.as_deref().unwrap_or(kind.fallback())
            )),
        }
    });

    MediaElement::new(kind, description, url)
}

fn extract_interactive(doc: &Document, id: NodeId) -> MediaElement {
    let node = doc.node(id);
    let description = if node.tag_is("svg") {
        node.non_empty_attr("title")
            .map(str::to_string)
            .or_else(|| {
                doc.find_child(id, "title")
                    .map(|title| doc.text_content(title))
                    .filter(|text| !text.is_empty())
            })
            .or_else(|| node.non_empty_attr("aria-label").map(str::to_string))
            .unwrap_or_else(|| "vector graphic".to_string())
    } else {
        node.non_empty_attr("title")
            .or_else(|| node.non_empty_attr("aria-label"))
            .unwrap_or("interactive canvas element")
            .to_string()
    };
    MediaElement::new(MediaKind::Interactive, Some(description), None)
}

fn extract_social(doc: &Document, id: NodeId) -> Option<MediaElement> {
    let platform = SocialPlatform::from_class(doc.node(id).class())?;

    let mut lines: Vec<String> = doc
        .children(id)
        .iter()
        .copied()
        .filter(|&child| doc.node(child).tag_is("p"))
        .map(|p| doc.text_content(p))
        .filter(|text| !text.is_empty() && !text.starts_with("http"))
        .collect();
    if lines.is_empty() {
        let own = doc.own_text(id);
        if !own.is_empty() {
            lines.push(own);
        }
    }

    let handle = resolve_handle(doc, id, platform);
    let url = links(doc, id)
        .find_map(|(href, _)| platform.is_platform_url(&href).then_some(href));

    Some(MediaElement {
        kind: MediaKind::SocialEmbed,
        description: (!lines.is_empty()).then(|| lines.join(" ")),
        url,
        social: Some(SocialPost {
            platform,
            lines,
            handle,
        }),
    })
}

/// `(href, trimmed text)` of every anchor below `id`.
fn links<'a>(doc: &'a Document, id: NodeId) -> impl Iterator<Item = (String, String)> + 'a {
    doc.descendants(id)
        .filter(move |&d| doc.node(d).tag_is("a"))
        .map(move |a| {
            (
                doc.node(a).attr("href").unwrap_or_default().to_string(),
                doc.text_content(a),
            )
        })
}

/// Author handle of an embedded post.
///
/// Tried in order: anchor text starting with `@`, anchor text of a link to the
/// platform (Instagram, LinkedIn), a `(@handle)` in the quote's text, the first
/// path segment of a status link.
fn resolve_handle(doc: &Document, id: NodeId, platform: SocialPlatform) -> Option<String> {
    if let Some(handle) = links(doc, id)
        .find_map(|(_, text)| text.starts_with('@').then(|| first_word(&text)))
    {
        return Some(handle);
    }

    if platform != SocialPlatform::Twitter {
        if let Some(text) = links(doc, id).find_map(|(href, text)| {
            (platform.is_platform_url(&href) && !text.is_empty() && !text.starts_with("http")).then_some(text)
        }) {
            return Some(
                PARENTHESIZED_HANDLE
                    .captures(&text)
                    .map_or(text.clone(), |caps| format!("@{}", &caps[1])),
            );
        }
    }

    let text = doc.text_content(id);
    if let Some(caps) = PARENTHESIZED_HANDLE.captures(&text) {
        return Some(format!("@{}", &caps[1]));
    }

    links(doc, id).find_map(|(href, _)| {
        if !platform.is_platform_url(&href) {
            return None;
        }
        let segments = url_utils::path_segments(&href);
        match segments.as_slice() {
            [user, status, ..] if status == "status" || status == "posts" => Some(format!("@{user}")),
            _ => None,
        }
    })
}

fn first_word(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_string()
}

/// Whether an image carries no content: marked presentational or hidden,
/// explicitly empty `alt`, or a missing `alt` on an icon-sized image.
#[must_use]
pub fn is_decorative(doc: &Document, id: NodeId) -> bool {
    let Some(img) = image_node(doc, id) else {
        return false;
    };
    let node = doc.node(img);

    if matches!(node.attr("role").map(str::trim), Some("presentation" | "none")) {
        return true;
    }
    if node.attr("aria-hidden").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")) {
        return true;
    }
    match node.attr("alt") {
        Some(alt) => alt.trim().is_empty(),
        None => {
            let dimension = |name: &str| {
                node.attr(name)
                    .map(|v| v.trim().trim_end_matches("px"))
                    .and_then(|v| v.parse::<u32>().ok())
            };
            matches!((dimension("width"), dimension("height")), (Some(w), Some(h)) if w <= 16 && h <= 16)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::options::BuildOptions;

    fn first(html: &str, tag: &str) -> (Document, NodeId) {
        let doc = build(html, &BuildOptions::default());
        let id = doc.find_descendant(doc.root(), tag).unwrap();
        (doc, id)
    }

    #[test]
    fn test_image_prefers_alt_then_title() {
        let (doc, id) = first(r#"<img src="/a/cat.jpg" alt=" A cat " title="ignored">"#, "img");
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.kind, MediaKind::Image);
        assert_eq!(element.description.as_deref(), Some("A cat"));
        assert_eq!(element.url.as_deref(), Some("/a/cat.jpg"));

        let (doc, id) = first(r#"<img data-src="lazy.png" title="Chart">"#, "img");
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.description.as_deref(), Some("Chart"));
        assert_eq!(element.url.as_deref(), Some("lazy.png"));
    }

    #[test]
    fn test_picture_uses_inner_img() {
        let (doc, id) = first(
            r#"<picture><source srcset="big.webp 2x"><img src="small.jpg" alt="Harbor"></picture>"#,
            "picture",
        );
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.description.as_deref(), Some("Harbor"));
        assert_eq!(element.url.as_deref(), Some("small.jpg"));
    }

    #[test]
    fn test_video_from_source_with_format() {
        let (doc, id) = first(
            r#"<video controls><source src="/media/product_demo-v2.mp4" type="video/mp4"></video>"#,
            "video",
        );
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.kind, MediaKind::Video);
        assert_eq!(element.description.as_deref(), Some("product demo v2 (MP4 format)"));
        assert_eq!(element.url.as_deref(), Some("/media/product_demo-v2.mp4"));
    }

    #[test]
    fn test_audio_title_wins() {
        let (doc, id) = first(r#"<audio src="ep-12.mp3" title="Episode 12"></audio>"#, "audio");
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.kind, MediaKind::Audio);
        assert_eq!(element.description.as_deref(), Some("Episode 12"));
    }

    #[test]
    fn test_bare_video_has_no_description() {
        let (doc, id) = first("<video></video>", "video");
        assert_eq!(detect(&doc, id).unwrap().description, None);
    }

    #[test]
    fn test_interactive_descriptions() {
        let (doc, id) = first("<svg><title>Sales by region</title><rect></rect></svg>", "svg");
        assert_eq!(detect(&doc, id).unwrap().description.as_deref(), Some("Sales by region"));

        let (doc, id) = first("<svg><rect></rect></svg>", "svg");
        assert_eq!(detect(&doc, id).unwrap().description.as_deref(), Some("vector graphic"));

        let (doc, id) = first("<canvas></canvas>", "canvas");
        let element = detect(&doc, id).unwrap();
        assert_eq!(element.kind, MediaKind::Interactive);
        assert_eq!(element.description.as_deref(), Some("interactive canvas element"));
    }

    #[test]
    fn test_tweet_with_parenthesized_handle() {
        let html = r#"<blockquote class="twitter-tweet"><p>Rust 2024 is out!</p>
            &mdash; Rust Language (@rustlang)
            <a href="https://twitter.com/rustlang/status/1">Feb 20, 2025</a></blockquote>"#;
        let (doc, id) = first(html, "blockquote");
        let element = detect(&doc, id).unwrap();
        let post = element.social.unwrap();
        assert_eq!(post.platform, SocialPlatform::Twitter);
        assert_eq!(post.lines, vec!["Rust 2024 is out!"]);
        assert_eq!(post.handle.as_deref(), Some("@rustlang"));
    }

    #[test]
    fn test_tweet_handle_from_status_url() {
        let html = r#"<blockquote class="twitter-tweet"><p>Hello</p>
            <a href="https://x.com/ferris/status/42">link</a></blockquote>"#;
        let (doc, id) = first(html, "blockquote");
        let post = detect(&doc, id).unwrap().social.unwrap();
        assert_eq!(post.handle.as_deref(), Some("@ferris"));
    }

    #[test]
    fn test_instagram_handle_from_platform_link() {
        let html = r#"<blockquote class="instagram-media"><p>Sunset</p>
            <a href="https://www.instagram.com/p/abc/">A post shared by Jane (@jane.doe)</a></blockquote>"#;
        let (doc, id) = first(html, "blockquote");
        let post = detect(&doc, id).unwrap().social.unwrap();
        assert_eq!(post.platform, SocialPlatform::Instagram);
        assert_eq!(post.handle.as_deref(), Some("@jane.doe"));
    }

    #[test]
    fn test_plain_blockquote_is_not_media() {
        let (doc, id) = first("<blockquote><p>Quote</p></blockquote>", "blockquote");
        assert!(detect(&doc, id).is_none());
    }

    #[test]
    fn test_decorative_heuristic() {
        let cases = [
            (r#"<img src="a.png" alt="">"#, true),
            (r#"<img src="a.png" role="presentation" alt="x">"#, true),
            (r#"<img src="a.png" aria-hidden="true" alt="x">"#, true),
            (r#"<img src="dot.gif" width="1" height="1">"#, true),
            (r#"<img src="icon.png" width="16px" height="16">"#, true),
            (r#"<img src="photo.jpg" width="640" height="480">"#, false),
            (r#"<img src="photo.jpg">"#, false),
            (r#"<img src="photo.jpg" alt="Photo">"#, false),
        ];
        for (html, expected) in cases {
            let (doc, id) = first(html, "img");
            assert_eq!(is_decorative(&doc, id), expected, "{html}");
        }
    }
}
