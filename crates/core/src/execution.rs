//! Progress reporting and cooperative cancellation.
//!
//! Engines receive an [`ExecutionContext`] instead of holding a callback to
//! their host: the context carries an optional progress sink and a shared
//! cancellation flag, and the engine polls it at row or queue-pop
//! granularity. A default context never cancels and reports nowhere, so
//! library callers that don't care pay nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Sink for coarse-grained progress updates.
///
/// `percent` is in `0..=100` and is non-decreasing for a given `label`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, label: &str, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn report(&self, label: &str, percent: u8) {
        self(label, percent)
    }
}

/// Shared flag for requesting cooperative cancellation.
///
/// Clones share the same flag, so one handle can be kept by the caller
/// while another travels into the engine via [`ExecutionContext`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Engines notice at their next poll point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-call execution environment for an engine: progress + cancellation.
#[derive(Default)]
pub struct ExecutionContext {
    reporter: Option<Box<dyn ProgressReporter>>,
    token: CancellationToken,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a progress sink.
    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Use an externally held cancellation token.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Forward a progress update to the attached sink, if any.
    pub fn report(&self, label: &str, percent: u8) {
        if let Some(reporter) = &self.reporter {
            reporter.report(label, percent.min(100));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Poll point: returns `Error::Cancelled` once cancellation is requested.
    pub fn checkpoint(&self) -> Result<()> {
        if self.token.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU8;

    #[test]
    fn test_default_context_never_cancels() {
        let ctx = ExecutionContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.checkpoint().is_ok());
        ctx.report("noop", 50); // no sink attached, must not panic
    }

    #[test]
    fn test_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = ExecutionContext::new().with_token(token.clone());

        assert!(ctx.checkpoint().is_ok());
        token.cancel();
        assert!(matches!(ctx.checkpoint(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_reporter_receives_clamped_percent() {
        let last = Arc::new(AtomicU8::new(0));
        let sink = last.clone();
        let ctx = ExecutionContext::new().with_reporter(move |_label: &str, pct: u8| {
            sink.store(pct, Ordering::Relaxed);
        });

        ctx.report("pass", 42);
        assert_eq!(last.load(Ordering::Relaxed), 42);
        ctx.report("pass", 250);
        assert_eq!(last.load(Ordering::Relaxed), 100);
    }
}
