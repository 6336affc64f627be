//! Compiled regex patterns used across the pipeline.
//!
//! All patterns are compiled once on first use with `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Boilerplate Detection Patterns
// =============================================================================

/// Matches class/id values carrying a boilerplate vocabulary word as a whole token.
///
/// Tokens are delimited by the start/end of the value, whitespace, `-`, `_` or `.`,
/// so `main-nav`, `ad_slot`, `site-footer` and `hidden-xs` match while `shadow`,
/// `loader` and `navy` do not. Compound entries (`you-might-like`, `sr-only`)
/// match as a run of tokens.
pub static EXCLUDED_CLASS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s._-])(?:nav|navbar|navigation|menu|sidebar|aside|header|footer|ad|ads|advert|advertisement|sponsor|sponsored|promo|social|share|sharing|comment|comments|disqus|related|similar|you-might-like|breadcrumb|breadcrumbs|pagination|pager|skip|sr-only|screen-reader|hidden|invisible)(?:$|[\s._-])",
    )
    .expect("EXCLUDED_CLASS_TOKEN regex")
});

/// Matches a class list containing a hidden marker anywhere (`is-hidden`,
/// `hidden-xs`, `sr-only`).
pub static HIDDEN_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hidden|invisible|sr-only").expect("HIDDEN_CLASS regex"));

/// Matches class names that mark a short block as worth keeping.
pub static IMPORTANT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(important|highlight|note|warning|alert)").expect("IMPORTANT_CLASS regex")
});

// =============================================================================
// Media Patterns
// =============================================================================

/// Separators inside media filenames.
pub static FILENAME_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_\s]+").expect("FILENAME_SEPARATOR regex"));

/// `(@handle)` attribution inside an embedded post's text.
pub static PARENTHESIZED_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(@([\w.]{1,30})\)").expect("PARENTHESIZED_HANDLE regex"));

// =============================================================================
// Markdown Patterns
// =============================================================================

/// Language hint on a code element (`language-rust`, `lang-go`).
pub static LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([A-Za-z0-9_+#.-]+)").expect("LANGUAGE_CLASS regex")
});

/// Runs of backticks, used to size code fences and spans.
pub static BACKTICK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+").expect("BACKTICK_RUN regex"));

// =============================================================================
// Charset Detection Patterns
// =============================================================================

/// `<meta charset="...">`
pub static CHARSET_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("CHARSET_META regex")
});

/// `<meta http-equiv="Content-Type" content="...; charset=...">`
pub static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("CONTENT_TYPE_CHARSET regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));
