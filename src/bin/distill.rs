//! Reads HTML from a file path argument or stdin and prints markdown to stdout.
//!
//! Style comes from the environment:
//!
//! - `ESSENZ_HEADING_STYLE`: `atx` | `setext`
//! - `ESSENZ_LIST_MARKER`: `dash` | `asterisk` | `plus`
//! - `ESSENZ_ORDERED_FORMAT`: `1.` | `1)`
//! - `ESSENZ_LIST_INDENT`: spaces per nesting level
//! - `ESSENZ_EMPHASIS`: `asterisk` | `underscore`
//! - `ESSENZ_CODE_STYLE`: `fenced` | `indented`
//! - `ESSENZ_IMAGE_FORMAT`: `descriptive` | `markdown`
//!
//! Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, Read, Write};
use std::str::FromStr;

use essenz::{
    distill_with_options, encoding, parse_unordered_marker, CodeBlockStyle, EmphasisStyle,
    FileSource, HeadingStyle, HtmlSource, ImageFormat, Options, OrderedFormat, ReadinessOptions,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn env_style<T>(name: &str, parse: impl Fn(&str) -> Result<T, String>) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match parse(&value) {
        Ok(parsed) => Some(parsed),
        Err(reason) => {
            warn!(variable = name, %reason, "ignoring invalid style");
            None
        }
    }
}

fn parsed<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}

fn options_from_env() -> Options {
    let mut options = Options::default();
    let render = &mut options.render;
    if let Some(style) = env_style("ESSENZ_HEADING_STYLE", parsed::<HeadingStyle>) {
        render.heading_style = style;
    }
    if let Some(marker) = env_style("ESSENZ_LIST_MARKER", |v| parse_unordered_marker(v).map_err(|e| e.to_string())) {
        render.list_style.unordered_marker = marker;
    }
    if let Some(format) = env_style("ESSENZ_ORDERED_FORMAT", parsed::<OrderedFormat>) {
        render.list_style.ordered_format = format;
    }
    if let Some(indent) = env_style("ESSENZ_LIST_INDENT", parsed::<usize>) {
        render.list_style.indent_size = indent;
    }
    if let Some(style) = env_style("ESSENZ_EMPHASIS", parsed::<EmphasisStyle>) {
        render.emphasis_style = style;
    }
    if let Some(style) = env_style("ESSENZ_CODE_STYLE", parsed::<CodeBlockStyle>) {
        render.code_block_style = style;
    }
    if let Some(format) = env_style("ESSENZ_IMAGE_FORMAT", parsed::<ImageFormat>) {
        options.media.image_format = format;
    }
    options
}

fn read_input() -> essenz::Result<String> {
    match std::env::args().nth(1) {
        Some(path) => FileSource.fetch(&path, &ReadinessOptions::default()),
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            Ok(encoding::transcode_to_utf8(&bytes))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let html = match read_input() {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let output = match distill_with_options(&html, &options_from_env()) {
        Ok(markdown) => markdown,
        Err(e) => {
            eprintln!("Warning: could not distill input ({e}); showing it unprocessed");
            html
        }
    };

    let mut stdout = io::stdout().lock();
    if stdout.write_all(output.as_bytes()).is_err() {
        std::process::exit(1);
    }
}
