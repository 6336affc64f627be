//! Description synthesis for media without an author-supplied description.
//!
//! Words come from two places: the media URL's filename (`modern-office-lobby.jpg`)
//! and visually descriptive terms in the surrounding text.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::patterns::FILENAME_SEPARATOR;
use crate::url_utils;

/// Terms in surrounding text that say something about what an image shows.
static DESCRIPTIVE_VOCABULARY: [&str; 24] = [
    "architecture", "building", "design", "chart", "graph", "diagram", "photo", "picture",
    "illustration", "screenshot", "logo", "icon", "modern", "vintage", "colorful", "large",
    "small", "beautiful", "office", "exterior", "interior", "glass", "steel", "concrete",
];

/// Filename tokens too generic to describe anything.
static COMMON_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
        "had", "day", "get", "use", "man", "new", "now", "way", "may", "say", "img", "src", "alt",
        "jpg", "png", "gif", "jpeg",
    ]
    .into_iter()
    .collect()
});

/// Meaningful words of a URL's filename: extension stripped, split on `-`, `_`
/// and whitespace, lowercased, tokens of two characters or less, bare numbers
/// and common words dropped.
#[must_use]
pub fn words_from_url(url: &str) -> Vec<String> {
    let stem = url_utils::file_stem(url);
    FILENAME_SEPARATOR
        .split(&stem)
        .map(|word| word.trim().to_lowercase())
        .filter(|word| word.chars().count() > 2 && !COMMON_WORDS.contains(word.as_str()))
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// Words of `context` containing a descriptive vocabulary term, in order, without repeats.
#[must_use]
pub fn words_from_context(context: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    context
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| DESCRIPTIVE_VOCABULARY.iter().any(|term| word.contains(term)))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Builds a description from the URL's filename and the context's descriptive
/// words, joined with `", "` and cut to `max_len` characters (plus `...`).
///
/// Returns `None` when neither source yields a word.
#[must_use]
pub fn generate(url: Option<&str>, context: &str, max_len: usize) -> Option<String> {
    let parts: Vec<String> = [
        url.map(words_from_url).unwrap_or_default(),
        words_from_context(context),
    ]
    .into_iter()
    .filter(|words| !words.is_empty())
    .map(|words| words.join(" "))
    .collect();

    if parts.is_empty() {
        return None;
    }
    Some(truncate(&parts.join(", "), max_len))
}

/// `text` cut to `max_len` characters with `...` appended when cut.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_from_url() {
        assert_eq!(
            words_from_url("https://cdn.example.com/img/modern-office_lobby-01.jpg?w=800"),
            vec!["modern", "office", "lobby"]
        );
        assert_eq!(words_from_url("/img/IMG_2041.JPG"), Vec::<String>::new());
        assert!(words_from_url("").is_empty());
    }

    #[test]
    fn test_words_from_context() {
        assert_eq!(
            words_from_context("A Modern, glass-walled office. Modern design!"),
            vec!["modern", "glass-walled", "office", "design"]
        );
        assert!(words_from_context("nothing relevant here").is_empty());
    }

    #[test]
    fn test_generate_joins_sources() {
        let description = generate(Some("/a/harbor-sunset.jpg"), "a beautiful evening", 200);
        assert_eq!(description.as_deref(), Some("harbor sunset, beautiful"));
        assert_eq!(generate(None, "", 200), None);
        assert_eq!(generate(Some("/a/x.png"), "plain words", 200), None);
    }

    #[test]
    fn test_generate_truncates() {
        let description = generate(Some("/a/quarterly-revenue-growth-chart.png"), "", 10).unwrap();
        assert_eq!(description, "quarterly...");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }
}
