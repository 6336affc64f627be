//! Context analysis around media elements: nearby words and captions.

use crate::tree::{Document, NodeId};

/// Words of text surrounding a media node, limited to `radius` words.
///
/// Takes the nearest preceding and the nearest following sibling that carry
/// text. Without either, falls back to the direct text of the closest
/// ancestor that has some. Replacement text produced earlier in the same run
/// is skipped.
#[must_use]
pub fn extract_context(doc: &Document, id: NodeId, radius: usize) -> String {
    let sibling_text = |siblings: Vec<NodeId>| {
        siblings
            .into_iter()
            .filter(|&s| !doc.node(s).verbatim)
            .map(|s| doc.text_content(s))
            .find(|text| !text.is_empty())
    };

    let parts: Vec<String> = [
        sibling_text(doc.preceding_siblings(id)),
        sibling_text(doc.following_siblings(id)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let context = if parts.is_empty() {
        doc.ancestors(id)
            .map(|ancestor| doc.own_text(ancestor))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    } else {
        parts.join(" ")
    };

    limit_words(&context, radius)
}

/// Caption associated with a media node.
///
/// A `figcaption` inside the node, then the `figcaption` of the nearest
/// enclosing `figure`, then the node's `title` attribute.
#[must_use]
pub fn find_caption(doc: &Document, id: NodeId) -> Option<String> {
    let figcaption_text = |scope: NodeId| {
        doc.find_descendant(scope, "figcaption")
            .map(|caption| doc.text_content(caption))
            .filter(|text| !text.is_empty())
    };

    figcaption_text(id)
        .or_else(|| {
            doc.ancestors(id)
                .find(|&a| doc.node(a).tag_is("figure"))
                .and_then(figcaption_text)
        })
        .or_else(|| doc.node(id).non_empty_attr("title").map(str::to_string))
}

/// First `max_words` words of `text`, with `...` appended when cut.
#[must_use]
pub fn limit_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    format!("{}...", words[..max_words].join(" "))
}
