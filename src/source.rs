//! Where HTML comes from.
//!
//! Producing fully rendered markup for a URL (driving a headless browser,
//! waiting for hydration) happens outside this crate. Callers hand the
//! pipeline anything implementing [`HtmlSource`]; the crate ships only
//! [`FileSource`] for local files. Closures work too, which keeps tests on
//! canned fixtures:
//!
//! ```rust
//! use essenz::source::{HtmlSource, ReadinessOptions};
//!
//! let canned = |_target: &str, _readiness: &ReadinessOptions| -> essenz::Result<String> {
//!     Ok("<p>fixture</p>".to_string())
//! };
//! let html = canned.fetch("https://example.com", &ReadinessOptions::default())?;
//! assert_eq!(html, "<p>fixture</p>");
//! # Ok::<(), essenz::Error>(())
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::encoding;
use crate::error::{Error, Result};

/// JavaScript frameworks whose hydration a renderer can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    /// React root mounted
    React,
    /// Vue app mounted
    Vue,
    /// Angular zone stable
    Angular,
    /// Next.js data hydrated
    NextJs,
}

impl FromStr for Framework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "react" => Ok(Self::React),
            "vue" => Ok(Self::Vue),
            "angular" => Ok(Self::Angular),
            "next" | "nextjs" | "next.js" => Ok(Self::NextJs),
            other => Err(Error::Source {
                target: other.to_string(),
                message: "unknown framework".to_string(),
            }),
        }
    }
}

/// What a renderer should wait for before handing back markup.
///
/// Every wait is bounded by `timeout`; when it runs out the renderer returns
/// whatever markup is present instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessOptions {
    /// CSS selector that must match before the page counts as ready.
    pub wait_for_selector: Option<String>,

    /// Quiet network window to wait for.
    pub network_idle: Option<Duration>,

    /// Framework hydration signal to wait for.
    pub framework: Option<Framework>,

    /// Upper bound on all waiting.
    ///
    /// Default: 5 seconds
    pub timeout: Duration,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            wait_for_selector: None,
            network_idle: None,
            framework: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Produces rendered HTML for a URL or path.
pub trait HtmlSource {
    /// Fetch the markup behind `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Source`] or [`Error::Io`] when no markup could be produced.
    fn fetch(&self, target: &str, readiness: &ReadinessOptions) -> Result<String>;
}

impl<F> HtmlSource for F
where
    F: Fn(&str, &ReadinessOptions) -> Result<String>,
{
    fn fetch(&self, target: &str, readiness: &ReadinessOptions) -> Result<String> {
        self(target, readiness)
    }
}

/// Reads HTML from the local filesystem.
///
/// Bytes are transcoded to UTF-8 using the document's declared charset.
/// Pages on disk are already rendered, so readiness options are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl HtmlSource for FileSource {
    fn fetch(&self, target: &str, _readiness: &ReadinessOptions) -> Result<String> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Err(Error::Source {
                target: target.to_string(),
                message: "remote targets need a browser-backed source".to_string(),
            });
        }
        let path = Path::new(target.strip_prefix("file://").unwrap_or(target));
        let bytes = std::fs::read(path)?;
        let decoded = encoding::decode(&bytes);
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            encoding = decoded.encoding.name(),
            "read local html"
        );
        Ok(decoded.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("essenz-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_file_source_transcodes() {
        let path = temp_file(
            "latin1.html",
            b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>",
        );
        let html = FileSource
            .fetch(path.to_str().unwrap(), &ReadinessOptions::default())
            .unwrap();
        assert!(html.contains("Café"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_file_source_accepts_file_scheme() {
        let path = temp_file("scheme.html", b"<p>ok</p>");
        let target = format!("file://{}", path.display());
        let html = FileSource.fetch(&target, &ReadinessOptions::default()).unwrap();
        assert_eq!(html, "<p>ok</p>");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_file_source_errors() {
        let err = FileSource
            .fetch("/definitely/not/here.html", &ReadinessOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        let err = FileSource
            .fetch("https://example.com", &ReadinessOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Source { .. }));
    }

    #[test]
    fn test_framework_names() {
        assert_eq!("React".parse::<Framework>().unwrap(), Framework::React);
        assert_eq!("next.js".parse::<Framework>().unwrap(), Framework::NextJs);
        assert!("svelte".parse::<Framework>().is_err());
    }

    #[test]
    fn test_default_readiness() {
        let readiness = ReadinessOptions::default();
        assert_eq!(readiness.timeout, Duration::from_secs(5));
        assert!(readiness.wait_for_selector.is_none());
    }
}
