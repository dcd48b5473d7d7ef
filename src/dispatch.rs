//! Job dispatch: hand a request to the blocking pool and bring it back.
//!
//! `convert` is a constant-time enqueue; it returns before the conversion
//! starts. The spawned runtime task is the originating-context leg of the
//! job: it detaches the completion handler, moves the request into
//! `spawn_blocking` (the blocking task owns the request exclusively while
//! the engine runs), awaits the join handoff, and then invokes the
//! reporter. The reporter therefore never observes a pending verdict, and
//! the callback never runs on a blocking-pool thread or synchronously
//! inside `convert`.

use crate::engine::ExportEngine;
use crate::error::{ConversionFailed, ConvertError, UsageError};
use crate::export;
use crate::options::ConversionOptions;
use crate::report;
use crate::request::ConversionRequest;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Entry point for conversion jobs: owns the engine and the runtime handle
/// the jobs are dispatched onto.
///
/// One `Converter` serves any number of concurrent calls. Each call gets
/// its own [`ConversionRequest`] and its own background execution; jobs
/// share nothing but the engine value itself, which every implementation
/// of [`ExportEngine`] must tolerate (`Send + Sync`). Cloning a
/// `Converter` is cheap.
#[derive(Clone)]
pub struct Converter {
    engine: Arc<dyn ExportEngine>,
    runtime: Handle,
}

impl Converter {
    /// Build a converter dispatching onto the ambient tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime. Use
    /// [`Converter::with_runtime`] to supply a handle explicitly.
    pub fn new(engine: Arc<dyn ExportEngine>) -> Self {
        Self::with_runtime(engine, Handle::current())
    }

    /// Build a converter dispatching onto an explicit runtime handle.
    pub fn with_runtime(engine: Arc<dyn ExportEngine>, runtime: Handle) -> Self {
        Self { engine, runtime }
    }

    /// Convert the document at `source` to a PDF at `destination`,
    /// reporting the outcome through `callback` exactly once.
    ///
    /// `options` is a loosely-typed JSON object; see
    /// [`ConversionOptions::resolve`] for the recognized keys. The call
    /// returns as soon as the job is enqueued. The callback runs later, on
    /// the runtime, never synchronously within this call, with either
    /// `(None, true)` or `(Some(ConversionFailed), false)`.
    ///
    /// # Errors
    /// A malformed call (empty path, bad options bag) is rejected
    /// synchronously as [`UsageError`]; no job is constructed and the
    /// callback is not invoked.
    pub fn convert(
        &self,
        source: &str,
        destination: &str,
        options: &Value,
        callback: impl FnOnce(Option<ConversionFailed>, bool) + Send + 'static,
    ) -> Result<(), UsageError> {
        let options = ConversionOptions::resolve(options)?;
        self.convert_with(source, destination, options, callback)
    }

    /// Typed variant of [`Converter::convert`]: accepts already resolved
    /// [`ConversionOptions`] and skips bag resolution.
    pub fn convert_with(
        &self,
        source: &str,
        destination: &str,
        options: ConversionOptions,
        callback: impl FnOnce(Option<ConversionFailed>, bool) + Send + 'static,
    ) -> Result<(), UsageError> {
        if source.is_empty() {
            return Err(UsageError::EmptySourcePath);
        }
        if destination.is_empty() {
            return Err(UsageError::EmptyDestinationPath);
        }

        let request = ConversionRequest::new(source, destination, options, Box::new(callback));
        info!(source, destination, "conversion job enqueued");
        self.runtime.spawn(run_job(Arc::clone(&self.engine), request));
        Ok(())
    }

    /// Await a conversion instead of supplying a callback.
    ///
    /// Bridges the callback contract onto a oneshot channel and resolves
    /// once the job's single completion fires.
    pub async fn convert_async(
        &self,
        source: &str,
        destination: &str,
        options: &Value,
    ) -> Result<(), ConvertError> {
        let (tx, rx) = oneshot::channel();
        self.convert(source, destination, options, move |error, _success| {
            let _ = tx.send(error);
        })?;

        match rx.await {
            Ok(None) => Ok(()),
            Ok(Some(failed)) => Err(ConvertError::Conversion(failed)),
            // Sender dropped without firing: the runtime shut down mid-job.
            Err(_) => Err(ConvertError::Conversion(ConversionFailed)),
        }
    }
}

/// The originating-context leg of one job.
async fn run_job(engine: Arc<dyn ExportEngine>, mut request: ConversionRequest) {
    // Detached before the handoff: a panicking engine implementation must
    // not take the completion handler down with the blocking task.
    let callback = request.take_callback();
    let source = request.source().to_owned();

    let joined = tokio::task::spawn_blocking(move || {
        export::run(engine.as_ref(), &mut request);
        request
    })
    .await;

    match joined {
        Ok(request) => report::deliver(&request, callback),
        Err(join_error) => {
            error!(source = %source, error = %join_error, "conversion aborted before completing");
            report::deliver_failure(callback);
        }
    }
}
