//! # topdf
//!
//! Document-to-PDF conversion orchestration over a pluggable export engine.
//!
//! ## Why this crate?
//!
//! The engine that decodes a source document and encodes the PDF is an
//! external collaborator behind the [`ExportEngine`] trait; it is opaque,
//! blocking, and CPU/IO-heavy. What this crate provides is everything
//! around one engine run: resolving a loosely-typed options bag into a
//! complete configuration, carrying an owned job descriptor across the
//! thread boundary, sequencing the engine's open/configure/export/close
//! protocol with guaranteed teardown, and firing the caller's completion
//! handler exactly once with the job's verdict.
//!
//! ## Pipeline Overview
//!
//! ```text
//! convert(source, destination, options, callback)
//!  |
//!  +- 1. Resolve   options bag -> ConversionOptions (defaults applied)
//!  +- 2. Enqueue   ConversionRequest -> tokio blocking pool (constant-time)
//!  +- 3. Export    init -> open -> configure -> export -> teardown (blocking)
//!  +- 4. Report    verdict -> callback, once, on the originating runtime
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use topdf::{
//!     Converter, DocumentHandle, EngineResult, ExportEngine, ExportFormat, ExportHandle,
//!     InitOptions,
//! };
//!
//! struct NativeEngine; // your binding to the real export engine
//! # impl ExportEngine for NativeEngine {
//! #     fn init(&self, _: InitOptions) -> EngineResult<()> { Ok(()) }
//! #     fn open_document(&self, _: &str) -> EngineResult<DocumentHandle> { Ok(DocumentHandle(1)) }
//! #     fn set_font_directory(&self, _: DocumentHandle, _: &str) -> EngineResult<()> { Ok(()) }
//! #     fn enable_watermark(&self, _: DocumentHandle) -> EngineResult<()> { Ok(()) }
//! #     fn set_watermark_path(&self, _: DocumentHandle, _: &str) -> EngineResult<()> { Ok(()) }
//! #     fn open_export(&self, _: DocumentHandle, _: ExportFormat, _: &str) -> EngineResult<ExportHandle> { Ok(ExportHandle(1)) }
//! #     fn run_export(&self, _: ExportHandle) -> EngineResult<()> { Ok(()) }
//! #     fn close_export(&self, _: ExportHandle) -> EngineResult<()> { Ok(()) }
//! #     fn close_document(&self, _: DocumentHandle) -> EngineResult<()> { Ok(()) }
//! #     fn deinit(&self) -> EngineResult<()> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), topdf::ConvertError> {
//!     let converter = Converter::new(Arc::new(NativeEngine));
//!
//!     // Callback form: returns immediately, completion arrives later.
//!     converter.convert(
//!         "quarterly-report.docx",
//!         "quarterly-report.pdf",
//!         &serde_json::json!({ "fontdirectory": "/usr/share/fonts/custom" }),
//!         |error, success| match error {
//!             None => println!("exported (success = {success})"),
//!             Some(err) => eprintln!("{err}"),
//!         },
//!     )?;
//!
//!     // Or await the verdict directly.
//!     converter
//!         .convert_async("slides.odp", "slides.pdf", &serde_json::json!({}))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! * The completion callback fires exactly once per accepted call, on the
//!   originating runtime, never synchronously inside `convert` and never on
//!   a blocking-pool thread.
//! * Engine resources are released on every exit path, in reverse order of
//!   acquisition, including when a stage fails partway through.
//! * Concurrent jobs are fully independent: no two jobs share a request,
//!   an options instance, or engine handles.
//! * Malformed calls are rejected synchronously as [`UsageError`] without
//!   constructing a job; a failed conversion is reported asynchronously as
//!   a single generic [`ConversionFailed`], never retried.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod dispatch;
pub mod engine;
pub mod error;
mod export;
pub mod options;
mod report;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use dispatch::Converter;
pub use engine::{
    DocumentHandle, EngineError, EngineResult, ExportEngine, ExportFormat, ExportHandle,
    InitOptions,
};
pub use error::{ConversionFailed, ConvertError, UsageError};
pub use options::{ConversionOptions, DEFAULT_FONT_DIRECTORY};
pub use request::{CompletionCallback, ConversionRequest, Verdict};
