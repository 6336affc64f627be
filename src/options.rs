//! Configuration for every pipeline stage.
//!
//! Each stage has its own struct with public fields and documented defaults;
//! `Options` bundles the four for the `distill` entry points. Configuration is
//! immutable once built and may be shared read-only across concurrent runs.

use std::str::FromStr;

/// Tree Builder configuration.
///
/// # Example
///
/// ```rust
/// use essenz::BuildOptions;
///
/// let options = BuildOptions {
///     filter_navigation: true,
///     ..BuildOptions::default()
/// };
/// assert_eq!(options.max_depth, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BuildOptions {
    /// Drop `nav`, `header`, `footer`, `aside` and `menu` subtrees, plus elements
    /// hidden through their class or inline style.
    ///
    /// Default: `false`
    pub filter_navigation: bool,

    /// Copy element attributes into the tree.
    ///
    /// The filter's class/ID rule, link rendering and media detection all read
    /// attributes, so turning this off produces a much barer result.
    ///
    /// Default: `true`
    pub preserve_attributes: bool,

    /// Keep text nodes that contain only whitespace.
    ///
    /// Default: `false`
    pub include_whitespace_only_text: bool,

    /// Nodes deeper than this are silently dropped.
    ///
    /// Default: `100`
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            filter_navigation: false,
            preserve_attributes: true,
            include_whitespace_only_text: false,
            max_depth: 100,
        }
    }
}

/// Content Filter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Maximum share of a subtree's text that may sit inside links.
    ///
    /// Default: `0.3`
    pub max_link_density: f64,

    /// Containers with less text than this (characters) are dropped by the length rule.
    ///
    /// Default: `20`
    pub min_content_length: usize,

    /// Tag names (`main`) and class selectors (`.content`) protected from the
    /// lower-priority rules.
    ///
    /// Default: `main`, `article`, `.content`, `.post`, `.entry`
    pub preserve_whitelist: Vec<String>,

    /// Judge `div` containers by length too, even in small documents.
    ///
    /// Default: `false`
    pub aggressive_mode: bool,

    /// Log every exclusion and whitelist decision at `debug` level.
    ///
    /// Default: `false`
    pub debug_mode: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_link_density: 0.3,
            min_content_length: 20,
            preserve_whitelist: ["main", "article", ".content", ".post", ".entry"]
                .into_iter()
                .map(String::from)
                .collect(),
            aggressive_mode: false,
            debug_mode: false,
        }
    }
}

/// Media Substitutor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Synthesize a description from the URL and nearby text when none exists.
    ///
    /// Default: `true`
    pub generate_descriptions: bool,

    /// Upper bound for synthesized descriptions (characters).
    ///
    /// Default: `200`
    pub max_description_length: usize,

    /// Words of surrounding text gathered as context.
    ///
    /// Default: `20`
    pub context_radius: usize,

    /// Describe decorative images instead of removing them.
    ///
    /// Default: `false`
    pub include_decorative_images: bool,

    /// Append the media URL to image, video and audio replacements.
    ///
    /// Default: `false`
    pub include_urls: bool,

    /// How images are written out.
    ///
    /// Default: `ImageFormat::Descriptive`
    pub image_format: ImageFormat,
}

/// Image replacement syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    /// `An image: <description>`
    #[default]
    Descriptive,
    /// `![<description>](<url>)` when the URL is known, descriptive otherwise.
    Markdown,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            generate_descriptions: true,
            max_description_length: 200,
            context_radius: 20,
            include_decorative_images: false,
            include_urls: false,
            image_format: ImageFormat::Descriptive,
        }
    }
}

/// Heading syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadingStyle {
    /// `# Title`
    #[default]
    Atx,
    /// Underlined with `===` / `---` for levels 1 and 2, ATX below that.
    Setext,
}

/// Numbering format for ordered lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderedFormat {
    /// `1.`
    #[default]
    Period,
    /// `1)`
    Paren,
}

impl OrderedFormat {
    /// Marker for item number `n`.
    #[must_use]
    pub fn marker(self, n: usize) -> String {
        match self {
            Self::Period => format!("{n}."),
            Self::Paren => format!("{n})"),
        }
    }
}

/// List layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStyle {
    /// Bullet for unordered items: `-`, `*` or `+`.
    pub unordered_marker: char,
    /// Numbering format for ordered items.
    pub ordered_format: OrderedFormat,
    /// Spaces added per nesting level.
    pub indent_size: usize,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            unordered_marker: '-',
            ordered_format: OrderedFormat::Period,
            indent_size: 2,
        }
    }
}

/// Emphasis marker pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmphasisStyle {
    /// `*em*` and `**strong**`
    #[default]
    Asterisk,
    /// `_em_` and `__strong__`
    Underscore,
}

impl EmphasisStyle {
    /// Marker wrapped around emphasized text.
    #[must_use]
    pub fn emphasis(self) -> &'static str {
        match self {
            Self::Asterisk => "*",
            Self::Underscore => "_",
        }
    }

    /// Marker wrapped around strong text.
    #[must_use]
    pub fn strong(self) -> &'static str {
        match self {
            Self::Asterisk => "**",
            Self::Underscore => "__",
        }
    }
}

/// Code block syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodeBlockStyle {
    /// Backtick fences carrying the language hint.
    #[default]
    Fenced,
    /// Four-space indentation; the language hint is lost.
    Indented,
}

/// Markdown Renderer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Default: `HeadingStyle::Atx`
    pub heading_style: HeadingStyle,
    /// Default: `-` bullets, `1.` numbering, two-space indent
    pub list_style: ListStyle,
    /// Default: `EmphasisStyle::Asterisk`
    pub emphasis_style: EmphasisStyle,
    /// Default: `CodeBlockStyle::Fenced`
    pub code_block_style: CodeBlockStyle,

    /// Keep paragraph breaks inside blockquotes as empty `>` lines instead of
    /// joining the paragraphs with single spaces.
    ///
    /// Default: `false`
    pub blockquote_paragraphs: bool,

    /// Backslash-escape markdown-significant characters in plain text.
    ///
    /// Default: `false`
    pub escape_text: bool,
}

/// Configuration for a whole pipeline run.
///
/// # Example
///
/// ```rust
/// use essenz::{Options, RenderConfig, EmphasisStyle};
///
/// let options = Options {
///     render: RenderConfig {
///         emphasis_style: EmphasisStyle::Underscore,
///         ..RenderConfig::default()
///     },
///     ..Options::default()
/// };
/// assert!(options.build.filter_navigation);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Tree Builder stage.
    pub build: BuildOptions,
    /// Content Filter stage.
    pub filter: FilterConfig,
    /// Media Substitutor stage.
    pub media: MediaConfig,
    /// Markdown Renderer stage.
    pub render: RenderConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            build: BuildOptions {
                filter_navigation: true,
                ..BuildOptions::default()
            },
            filter: FilterConfig::default(),
            media: MediaConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// A style name that none of the style enums recognise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} style: {value:?}")]
pub struct ParseStyleError {
    kind: &'static str,
    value: String,
}

impl ParseStyleError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl FromStr for HeadingStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atx" => Ok(Self::Atx),
            "setext" => Ok(Self::Setext),
            _ => Err(ParseStyleError::new("heading", s)),
        }
    }
}

impl FromStr for EmphasisStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asterisk" | "*" => Ok(Self::Asterisk),
            "underscore" | "_" => Ok(Self::Underscore),
            _ => Err(ParseStyleError::new("emphasis", s)),
        }
    }
}

impl FromStr for CodeBlockStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fenced" => Ok(Self::Fenced),
            "indented" => Ok(Self::Indented),
            _ => Err(ParseStyleError::new("code block", s)),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "descriptive" | "text" => Ok(Self::Descriptive),
            "markdown" => Ok(Self::Markdown),
            _ => Err(ParseStyleError::new("image format", s)),
        }
    }
}

impl FromStr for OrderedFormat {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1." | "period" => Ok(Self::Period),
            "1)" | "paren" => Ok(Self::Paren),
            _ => Err(ParseStyleError::new("ordered list", s)),
        }
    }
}

/// Parses an unordered list bullet name (`dash`, `asterisk`, `plus`) or the bullet itself.
///
/// # Errors
///
/// Returns `ParseStyleError` for anything else.
pub fn parse_unordered_marker(s: &str) -> Result<char, ParseStyleError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "dash" | "-" => Ok('-'),
        "asterisk" | "*" => Ok('*'),
        "plus" | "+" => Ok('+'),
        _ => Err(ParseStyleError::new("list", s)),
    }
}
