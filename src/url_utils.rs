//! URL Utility Functions
//!
//! Media URLs are mined for words: the filename feeds description synthesis,
//! and the host and path of an embedded post's link identify its author.
//! Relative and malformed URLs are common in scraped markup, so every helper
//! degrades to an empty result instead of failing.

use url::Url;

/// Parse an absolute URL.
///
/// Returns `None` for relative references and anything unparseable.
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return None;
    }
    Url::parse(trimmed).ok()
}

/// Extract filename from a URL.
///
/// Returns the last path segment, stripped of query parameters and fragment identifiers.
/// Works with absolute URLs, relative paths, and bare filenames.
///
/// # Examples
///
/// ```
/// use essenz::url_utils::extract_filename;
///
/// assert_eq!(extract_filename("https://example.com/images/photo.jpg"), "photo.jpg");
/// assert_eq!(extract_filename("https://example.com/images/photo.jpg?v=123"), "photo.jpg");
/// assert_eq!(extract_filename("/path/to/image.png#section"), "image.png");
/// assert_eq!(extract_filename("https://example.com/"), "");
/// ```
#[must_use]
pub fn extract_filename(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("data:") {
        return String::new();
    }

    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let filename = without_query.rsplit('/').next().unwrap_or("").trim();

    if filename.is_empty() || filename == "." || filename == ".." {
        return String::new();
    }

    filename.to_string()
}

/// Filename without its extension (`sunset-over-bay.jpg` → `sunset-over-bay`).
///
/// A leading dot is not treated as an extension separator.
#[must_use]
pub fn file_stem(url: &str) -> String {
    let filename = extract_filename(url);
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename[..pos].to_string(),
        _ => filename,
    }
}

/// Lowercase host without a leading `www.`.
#[must_use]
pub fn host(url_str: &str) -> Option<String> {
    let url = parse_url(url_str)?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}

/// Whether `url_str` points at `domain` or one of its subdomains.
#[must_use]
pub fn is_on_domain(url_str: &str, domain: &str) -> bool {
    host(url_str).is_some_and(|h| h == domain || h.ends_with(&format!(".{domain}")))
}

/// Non-empty path segments of an absolute URL.
#[must_use]
pub fn path_segments(url_str: &str) -> Vec<String> {
    parse_url(url_str)
        .and_then(|url| {
            url.path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).map(str::to_string).collect())
        })
        .unwrap_or_default()
}
