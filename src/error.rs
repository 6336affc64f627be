//! Error types for essenz.
//!
//! The pipeline never rejects markup, so the only failure a stage can produce on
//! its own is an interruption (cancellation or an expired deadline). Each stage
//! tags that interruption with its own context before handing it upward.

/// Why an in-flight traversal stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The caller cancelled the run.
    #[error("operation cancelled")]
    Cancelled,

    /// The run's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Error type for distillation operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Tree construction was interrupted.
    #[error("failed to build tree: {0}")]
    Build(#[source] Interrupted),

    /// Content filtering was interrupted.
    #[error("failed to filter tree: {0}")]
    Filter(#[source] Interrupted),

    /// Media substitution was interrupted.
    #[error("failed to generate media replacement: {0}")]
    Media(#[source] Interrupted),

    /// Markdown rendering was interrupted.
    #[error("failed to render tree: {0}")]
    Render(#[source] Interrupted),

    /// The HTML source could not produce a document.
    #[error("failed to fetch {target}: {message}")]
    Source {
        /// URL or path that was requested.
        target: String,
        /// Collaborator-supplied reason.
        message: String,
    },

    /// Reading input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the interruption behind a stage error, if any.
    #[must_use]
    pub fn interruption(&self) -> Option<Interrupted> {
        match self {
            Self::Build(i) | Self::Filter(i) | Self::Media(i) | Self::Render(i) => Some(*i),
            Self::Source { .. } | Self::Io(_) => None,
        }
    }

    /// True when the run was cancelled or timed out; the partial result must be discarded.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interruption().is_some()
    }
}

/// Result type alias for distillation operations.
pub type Result<T> = std::result::Result<T, Error>;
