//! Markdown syntax helpers shared by the block and inline renderers.

use crate::options::HeadingStyle;
use crate::patterns::{BACKTICK_RUN, WHITESPACE_NORMALIZE};

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '>'];

/// Escape Markdown special characters in text content.
///
/// Prevents accidental Markdown interpretation of content that contains
/// literal asterisks, underscores, brackets, etc.
///
/// # Characters Escaped
///
/// - `\` → `\\` (backslash)
/// - `` ` `` → `` \` `` (backtick - prevents code spans)
/// - `*` → `\*` (asterisk - prevents italic/bold)
/// - `_` → `\_` (underscore - prevents italic/bold)
/// - `[` → `\[` and `]` → `\]` (brackets - prevent links)
/// - `<` → `\<` (angle bracket - prevents HTML)
/// - `>` → `\>` (angle bracket - prevents blockquotes)
///
/// # Examples
///
/// ```
/// use essenz::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*", false), r"\*not italic\*");
/// assert_eq!(escape_markdown("my_variable_name", false), r"my\_variable\_name");
///
/// // Code is never escaped
/// assert_eq!(escape_markdown("*text*", true), "*text*");
/// ```
#[must_use]
pub fn escape_markdown(text: &str, in_code_block: bool) -> String {
    if in_code_block || text.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + text.len() / 4);

    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }

    result
}

/// Runs of whitespace collapsed to single spaces. Leading and trailing space is kept.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text, " ").into_owned()
}

/// Heading line(s) for `text` at `level` (1-6).
///
/// Setext underlines only exist for levels 1 and 2; deeper levels fall back to ATX.
#[must_use]
pub fn heading(text: &str, level: usize, style: HeadingStyle) -> String {
    match (style, level) {
        (HeadingStyle::Setext, 1) => format!("{text}\n{}", "=".repeat(text.chars().count())),
        (HeadingStyle::Setext, 2) => format!("{text}\n{}", "-".repeat(text.chars().count())),
        _ => format!("{} {text}", "#".repeat(level.clamp(1, 6))),
    }
}

fn longest_backtick_run(text: &str) -> usize {
    BACKTICK_RUN
        .find_iter(text)
        .map(|m| m.as_str().len())
        .max()
        .unwrap_or(0)
}

/// A backtick fence long enough to wrap `content`: three, or one more than its longest run.
#[must_use]
pub fn code_fence(content: &str) -> String {
    "`".repeat((longest_backtick_run(content) + 1).max(3))
}

/// `content` as an inline code span.
#[must_use]
pub fn code_span(content: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(content) + 1);
    if content.starts_with('`') || content.ends_with('`') {
        format!("{ticks} {content} {ticks}")
    } else {
        format!("{ticks}{content}{ticks}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown(r"a\b", false), r"a\\b");
        assert_eq!(escape_markdown("[link](x)", false), r"\[link\](x)");
        assert_eq!(escape_markdown("<tag> `x`", false), r"\<tag\> \`x\`");
        assert_eq!(escape_markdown("", false), "");
        assert_eq!(escape_markdown("plain text", false), "plain text");
    }

    #[test]
    fn test_collapse_whitespace_keeps_edges() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
    }

    #[test]
    fn test_heading_styles() {
        assert_eq!(heading("Title", 1, HeadingStyle::Atx), "# Title");
        assert_eq!(heading("Deep", 4, HeadingStyle::Atx), "#### Deep");
        assert_eq!(heading("Título", 1, HeadingStyle::Setext), "Título\n======");
        assert_eq!(heading("Sub", 2, HeadingStyle::Setext), "Sub\n---");
        assert_eq!(heading("Deep", 3, HeadingStyle::Setext), "### Deep");
    }

    #[test]
    fn test_fences_outgrow_content() {
        assert_eq!(code_fence("plain"), "```");
        assert_eq!(code_fence("a ``` b"), "````");
        assert_eq!(code_span("x()"), "`x()`");
        assert_eq!(code_span("a`b"), "``a`b``");
        assert_eq!(code_span("`tick"), "`` `tick ``");
    }
}
