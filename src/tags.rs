//! Tag catalogs shared by the filter, media and markdown stages.
//!
//! Arrays for iteration, `HashSet`s for O(1) lookup. Tag names in a built tree
//! are already lowercase; [`contains`] also accepts hand-built mixed-case trees.

use std::collections::HashSet;
use std::sync::LazyLock;

// === Tag Lists (arrays for iteration) ===

/// Heading tags: h1-h6
pub static HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Page chrome and non-content tags, excluded unconditionally by the filter
pub static SEMANTIC_EXCLUDED_TAGS: [&str; 7] =
    ["nav", "header", "footer", "aside", "script", "style", "noscript"];

/// Document skeleton and sectioning containers
pub static STRUCTURAL_TAGS: [&str; 7] =
    ["document", "html", "head", "body", "main", "article", "section"];

/// Phrasing content: rendered inline, never judged on its own length
pub static INLINE_TAGS: [&str; 34] = [
    "a", "abbr", "b", "bdi", "bdo", "big", "br", "cite", "code", "data", "del", "dfn", "em",
    "font", "i", "img", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "tt", "u", "var", "wbr",
];

/// List, table and caption components: judged through their container
pub static ITEM_TAGS: [&str; 15] = [
    "li", "dt", "dd", "tr", "td", "th", "thead", "tbody", "tfoot", "caption", "figcaption",
    "colgroup", "col", "option", "summary",
];

/// Descendants that make a short block worth keeping
pub static IMPORTANT_TAGS: [&str; 17] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "img", "picture", "video", "audio", "svg", "canvas",
    "table", "ul", "ol", "dl", "blockquote",
];

/// Code containers, also important for the length rule
pub static CODE_TAGS: [&str; 2] = ["code", "pre"];

/// Elements the media substitutor replaces
pub static MEDIA_TAGS: [&str; 6] = ["img", "picture", "video", "audio", "canvas", "svg"];

/// Void and embed elements that carry no text of their own
pub static EMPTY_TAGS: [&str; 8] = ["br", "hr", "wbr", "source", "track", "embed", "iframe", "object"];

// === Tag Sets (HashSets for O(1) lookup) ===

/// `HEADING_TAGS` as a `HashSet`
pub static HEADING_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HEADING_TAGS.into_iter().collect());

/// `SEMANTIC_EXCLUDED_TAGS` as a `HashSet`
pub static SEMANTIC_EXCLUDED_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SEMANTIC_EXCLUDED_TAGS.into_iter().collect());

/// `STRUCTURAL_TAGS` as a `HashSet`
pub static STRUCTURAL_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STRUCTURAL_TAGS.into_iter().collect());

/// `INLINE_TAGS` as a `HashSet`
pub static INLINE_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INLINE_TAGS.into_iter().collect());

/// `ITEM_TAGS` as a `HashSet`
pub static ITEM_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ITEM_TAGS.into_iter().collect());

/// `IMPORTANT_TAGS` and `CODE_TAGS` as one `HashSet`
pub static IMPORTANT_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| IMPORTANT_TAGS.into_iter().chain(CODE_TAGS).collect());

/// `MEDIA_TAGS` as a `HashSet`
pub static MEDIA_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| MEDIA_TAGS.into_iter().collect());

/// `EMPTY_TAGS` as a `HashSet`
pub static EMPTY_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| EMPTY_TAGS.into_iter().collect());

/// Case-insensitive membership test.
#[must_use]
pub fn contains(set: &HashSet<&'static str>, tag: &str) -> bool {
    if set.contains(tag) {
        return true;
    }
    tag.bytes().any(|b| b.is_ascii_uppercase()) && set.contains(tag.to_ascii_lowercase().as_str())
}
