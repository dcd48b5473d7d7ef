//! Completion reporting: one callback invocation per finished job.
//!
//! Runs only on the originating runtime, after the join handoff, so the
//! verdict it reads is final. The callback is an `FnOnce` consumed by its
//! invocation, which makes a second delivery unrepresentable; the request
//! and everything it owns drop once the caller of [`deliver`] lets go of
//! it.

use crate::error::ConversionFailed;
use crate::request::{CompletionCallback, ConversionRequest, Verdict};
use tracing::{error, info, warn};

/// Invoke the completion handler for a finished request.
///
/// Succeeded maps to `(None, true)`, anything else to
/// `(Some(ConversionFailed), false)`. A pending verdict here is a
/// dispatcher bug; it is reported to the caller as a failure rather than
/// silently dropped.
pub(crate) fn deliver(request: &ConversionRequest, callback: Option<CompletionCallback>) {
    match request.verdict() {
        Verdict::Succeeded => {
            info!(
                source = request.source(),
                destination = request.destination(),
                "conversion succeeded"
            );
            invoke(callback, None);
        }
        Verdict::Failed => {
            warn!(
                source = request.source(),
                destination = request.destination(),
                "conversion failed"
            );
            invoke(callback, Some(ConversionFailed));
        }
        Verdict::Pending => {
            debug_assert!(false, "reporter observed a pending verdict");
            error!(
                source = request.source(),
                "reporter observed a pending verdict, reporting failure"
            );
            invoke(callback, Some(ConversionFailed));
        }
    }
}

/// Failure delivery for a job whose request did not survive the background
/// execution (a panicking engine implementation).
pub(crate) fn deliver_failure(callback: Option<CompletionCallback>) {
    invoke(callback, Some(ConversionFailed));
}

fn invoke(callback: Option<CompletionCallback>, outcome: Option<ConversionFailed>) {
    match callback {
        Some(callback) => {
            let success = outcome.is_none();
            callback(outcome, success);
        }
        None => {
            debug_assert!(false, "completion handler missing at delivery");
            error!("completion handler missing at delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConversionOptions;
    use std::sync::{Arc, Mutex};

    type Observed = Arc<Mutex<Vec<(bool, bool)>>>;

    fn observing_request(verdict: Verdict) -> (ConversionRequest, Observed) {
        let observed: Observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let mut request = ConversionRequest::new(
            "in.docx",
            "out.pdf",
            ConversionOptions::default(),
            Box::new(move |error, success| {
                sink.lock().unwrap().push((error.is_some(), success));
            }),
        );
        request.finish(verdict);
        (request, observed)
    }

    #[test]
    fn succeeded_delivers_empty_error_and_true() {
        let (mut request, observed) = observing_request(Verdict::Succeeded);
        let callback = request.take_callback();
        deliver(&request, callback);
        assert_eq!(*observed.lock().unwrap(), vec![(false, true)]);
    }

    #[test]
    fn failed_delivers_error_and_false() {
        let (mut request, observed) = observing_request(Verdict::Failed);
        let callback = request.take_callback();
        deliver(&request, callback);
        assert_eq!(*observed.lock().unwrap(), vec![(true, false)]);
    }

    #[test]
    fn deliver_failure_reports_error_and_false() {
        let observed: Observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        deliver_failure(Some(Box::new(move |error, success| {
            sink.lock().unwrap().push((error.is_some(), success));
        })));
        assert_eq!(*observed.lock().unwrap(), vec![(true, false)]);
    }
}
