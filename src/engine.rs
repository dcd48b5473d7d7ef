//! The export-engine collaborator interface.
//!
//! topdf drives an external document engine; it does not implement one. The
//! engine is modelled as an object-safe trait mirroring exactly the native
//! call surface the orchestration layer needs: instance lifecycle
//! (init/deinit), document open/close, per-document option calls, and
//! export open/run/close. Every call reports an ok/error status, which the
//! export pipeline folds into the job verdict.
//!
//! Handles are opaque tokens minted by the engine. The orchestration layer
//! never interprets them; it only passes them back into later calls.

use thiserror::Error;

/// A native engine call that was rejected.
///
/// `call` names the native entry point, `status` is the engine's own status
/// code. Both exist for diagnostics only; the caller-facing contract
/// collapses every engine error into a generic conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{call} returned native status {status}")]
pub struct EngineError {
    pub call: &'static str,
    pub status: i32,
}

impl EngineError {
    pub fn new(call: &'static str, status: i32) -> Self {
        Self { call, status }
    }
}

/// Shorthand for results of native engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Opaque token for an open source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(pub u64);

/// Opaque token for an open export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportHandle(pub u64);

/// Engine initialisation flags.
///
/// The default disables both persistence toggles: each job initialises the
/// engine with no stored option state loaded and none saved back, so jobs
/// cannot observe one another through the engine's option store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Load option state the engine persisted in an earlier run.
    pub load_stored_options: bool,
    /// Save this run's option state back for later runs.
    pub save_stored_options: bool,
}

/// Output format of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExportFormat {
    Pdf,
}

/// The native call surface of the external export engine.
///
/// Implementations must be `Send + Sync`: one engine value is shared across
/// concurrent jobs and every call runs on a blocking-pool thread. The
/// orchestration layer guarantees the call ordering (init before any other
/// call, open before configure/export, close/deinit last) and guarantees
/// that every successfully opened handle is closed and every successful
/// init is paired with a deinit, on every code path.
pub trait ExportEngine: Send + Sync {
    /// Initialise the engine instance for one job.
    fn init(&self, options: InitOptions) -> EngineResult<()>;

    /// Open the source document at `path` for reading.
    fn open_document(&self, path: &str) -> EngineResult<DocumentHandle>;

    /// Point the engine's font search at `path`.
    fn set_font_directory(&self, document: DocumentHandle, path: &str) -> EngineResult<()>;

    /// Turn watermarking on for `document`.
    fn enable_watermark(&self, document: DocumentHandle) -> EngineResult<()>;

    /// Configure the watermark source file for `document`.
    fn set_watermark_path(&self, document: DocumentHandle, path: &str) -> EngineResult<()>;

    /// Open an export of `document` in `format`, targeting `destination`.
    fn open_export(
        &self,
        document: DocumentHandle,
        format: ExportFormat,
        destination: &str,
    ) -> EngineResult<ExportHandle>;

    /// Run a previously opened export to completion.
    fn run_export(&self, export: ExportHandle) -> EngineResult<()>;

    /// Close an export handle.
    fn close_export(&self, export: ExportHandle) -> EngineResult<()>;

    /// Close an open document handle.
    fn close_document(&self, document: DocumentHandle) -> EngineResult<()>;

    /// Tear the engine instance down.
    fn deinit(&self) -> EngineResult<()>;
}
