//! The conversion job descriptor that crosses the thread boundary.
//!
//! A [`ConversionRequest`] owns copies of everything one job needs: both
//! paths, the resolved options, the verdict slot, and the caller's
//! completion handler. The caller's original buffers may not outlive the
//! `convert` call, so nothing in here borrows from them.
//!
//! Ownership discipline replaces locking: exactly one execution context
//! owns a request at any time. The blocking task owns it while the engine
//! runs and is the only writer of the verdict; the runtime reads the
//! verdict only after the join handoff.

use crate::error::ConversionFailed;
use crate::options::ConversionOptions;
use std::fmt;

/// Final outcome of a conversion job, set exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The job has not completed. Never observable through the callback.
    Pending,
    /// Every protocol stage succeeded.
    Succeeded,
    /// Some protocol stage was rejected.
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pending => write!(f, "pending"),
            Verdict::Succeeded => write!(f, "succeeded"),
            Verdict::Failed => write!(f, "failed"),
        }
    }
}

/// Caller-supplied completion handler.
///
/// Invoked exactly once per request with a two-slot result: the error slot
/// and the success flag. Exactly one of `(None, true)` or
/// `(Some(ConversionFailed), false)` is ever delivered.
pub type CompletionCallback = Box<dyn FnOnce(Option<ConversionFailed>, bool) + Send + 'static>;

/// One conversion job.
pub struct ConversionRequest {
    source: String,
    destination: String,
    options: ConversionOptions,
    verdict: Verdict,
    callback: Option<CompletionCallback>,
}

impl ConversionRequest {
    pub(crate) fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        options: ConversionOptions,
        callback: CompletionCallback,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            options,
            verdict: Verdict::Pending,
            callback: Some(callback),
        }
    }

    /// Path of the document to convert.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path the PDF is exported to.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// The job's resolved options.
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The job's verdict; [`Verdict::Pending`] until the export pipeline
    /// has finished with the request.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Record the final verdict. Write-once: a second write is a logic
    /// error, asserted in debug builds and ignored in release builds.
    pub(crate) fn finish(&mut self, verdict: Verdict) {
        debug_assert!(
            self.verdict == Verdict::Pending,
            "verdict written twice (was {}, now {verdict})",
            self.verdict,
        );
        debug_assert!(verdict != Verdict::Pending, "cannot finish as pending");
        if self.verdict == Verdict::Pending {
            self.verdict = verdict;
        }
    }

    /// Detach the completion handler from the request.
    ///
    /// The dispatcher calls this before the blocking handoff so that a
    /// panicking engine implementation cannot take the handler down with
    /// the blocking task; the handler must survive to be invoked exactly
    /// once on every path.
    pub(crate) fn take_callback(&mut self) -> Option<CompletionCallback> {
        self.callback.take()
    }
}

impl fmt::Debug for ConversionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRequest")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("options", &self.options)
            .field("verdict", &self.verdict)
            .field(
                "callback",
                &self.callback.as_ref().map(|_| "<completion handler>"),
            )
            .finish()
    }
}
