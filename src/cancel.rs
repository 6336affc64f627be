//! Cancellation and deadline signalling for pipeline runs.
//!
//! Every traversal checks its token once per visited node, so a run stops
//! promptly when a controller cancels it or its deadline passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Interrupted;

/// Shared cancellation flag with an optional deadline.
///
/// Clones share the same flag: cancelling one cancels them all.
///
/// # Example
///
/// ```rust
/// use essenz::CancelToken;
///
/// let token = CancelToken::none();
/// let worker_copy = token.clone();
/// assert!(worker_copy.check().is_ok());
///
/// token.cancel();
/// assert!(worker_copy.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when `cancel` is called.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A token that expires `timeout` from now.
    ///
    /// A timeout too large to represent as an instant never expires.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::none(),
        }
    }

    /// A token that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Requests cancellation of every run observing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// The deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the interruption reason if the run must stop.
    ///
    /// # Errors
    ///
    /// `Interrupted::Cancelled` after `cancel`, `Interrupted::DeadlineExceeded`
    /// once the deadline has passed.
    #[inline]
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
