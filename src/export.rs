//! The engine adapter: runs the export protocol for one job.
//!
//! Stage order is fixed: init, open source, apply options, open export, run
//! export. The first rejected call decides the verdict and later stages are
//! not attempted. Teardown (close export, close document, deinit) is
//! structural rather than conditional: every acquired resource sits in a
//! drop guard, so release runs on every exit path, in reverse order of
//! acquisition, and can never change an already-decided verdict. Teardown
//! rejections are logged and otherwise ignored.

use crate::engine::{
    DocumentHandle, EngineError, ExportEngine, ExportFormat, ExportHandle, InitOptions,
};
use crate::options::ConversionOptions;
use crate::request::{ConversionRequest, Verdict};
use std::fmt;
use tracing::{debug, warn};

/// Protocol stage, retained for diagnostics only. The caller sees a single
/// generic failure regardless of which stage was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    OpenDocument,
    Configure,
    OpenExport,
    RunExport,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Init => write!(f, "init"),
            Stage::OpenDocument => write!(f, "open-document"),
            Stage::Configure => write!(f, "configure"),
            Stage::OpenExport => write!(f, "open-export"),
            Stage::RunExport => write!(f, "run-export"),
        }
    }
}

struct StageError {
    stage: Stage,
    error: EngineError,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(EngineError) -> StageError {
        move |error| StageError { stage, error }
    }
}

/// Run the full protocol for `request`, writing its verdict exactly once.
///
/// Blocking; runs on a blocking-pool thread with exclusive ownership of the
/// request.
pub(crate) fn run(engine: &dyn ExportEngine, request: &mut ConversionRequest) {
    debug!(
        source = request.source(),
        destination = request.destination(),
        "starting conversion"
    );

    match export_document(
        engine,
        request.source(),
        request.destination(),
        request.options(),
    ) {
        Ok(()) => {
            debug!(source = request.source(), "conversion succeeded");
            request.finish(Verdict::Succeeded);
        }
        Err(failure) => {
            warn!(
                source = request.source(),
                stage = %failure.stage,
                error = %failure.error,
                "conversion failed"
            );
            request.finish(Verdict::Failed);
        }
    }
}

fn export_document(
    engine: &dyn ExportEngine,
    source: &str,
    destination: &str,
    options: &ConversionOptions,
) -> Result<(), StageError> {
    engine
        .init(InitOptions::default())
        .map_err(StageError::at(Stage::Init))?;
    // Guards are declared in acquisition order; scope exit drops them in
    // reverse, which is exactly the teardown order the engine requires.
    let _session = EngineSession { engine };

    let document = engine
        .open_document(source)
        .map_err(StageError::at(Stage::OpenDocument))?;
    let document = OpenDocument {
        engine,
        handle: document,
    };

    apply_options(engine, document.handle, options).map_err(StageError::at(Stage::Configure))?;

    let export = engine
        .open_export(document.handle, ExportFormat::Pdf, destination)
        .map_err(StageError::at(Stage::OpenExport))?;
    let export = OpenExport {
        engine,
        handle: export,
    };

    engine
        .run_export(export.handle)
        .map_err(StageError::at(Stage::RunExport))?;

    Ok(())
}

/// Push the resolved options into the engine.
///
/// The font directory is always set. Watermark calls happen only when a
/// watermark path is present; when absent, no watermark call is made at
/// all. Every call's status participates in the verdict.
fn apply_options(
    engine: &dyn ExportEngine,
    document: DocumentHandle,
    options: &ConversionOptions,
) -> Result<(), EngineError> {
    engine.set_font_directory(document, &options.font_directory)?;

    if let Some(watermark) = options.watermark.as_deref() {
        engine.enable_watermark(document)?;
        engine.set_watermark_path(document, watermark)?;
    }

    Ok(())
}

// Drop guards for the three engine resources. Release failures must not
// mask the verdict, so they are logged at debug level and swallowed.

struct EngineSession<'a> {
    engine: &'a dyn ExportEngine,
}

impl Drop for EngineSession<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.engine.deinit() {
            debug!(%error, "engine deinit rejected during teardown");
        }
    }
}

struct OpenDocument<'a> {
    engine: &'a dyn ExportEngine,
    handle: DocumentHandle,
}

impl Drop for OpenDocument<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.engine.close_document(self.handle) {
            debug!(%error, "document close rejected during teardown");
        }
    }
}

struct OpenExport<'a> {
    engine: &'a dyn ExportEngine,
    handle: ExportHandle,
}

impl Drop for OpenExport<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.engine.close_export(self.handle) {
            debug!(%error, "export close rejected during teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineResult;
    use std::sync::Mutex;

    /// Engine double recording every call (with its path arguments) and
    /// optionally rejecting one named call.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingEngine {
        fn ok() -> Self {
            Self::default()
        }

        fn rejecting(call: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(call),
            }
        }

        fn record(&self, name: &'static str, entry: String) -> EngineResult<()> {
            self.calls.lock().unwrap().push(entry);
            if self.fail_on == Some(name) {
                Err(EngineError::new(name, -1))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, name: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| entry.split(' ').next() == Some(name))
                .count()
        }
    }

    impl ExportEngine for RecordingEngine {
        fn init(&self, _options: InitOptions) -> EngineResult<()> {
            self.record("init", "init".into())
        }

        fn open_document(&self, path: &str) -> EngineResult<DocumentHandle> {
            self.record("open_document", format!("open_document {path}"))?;
            Ok(DocumentHandle(1))
        }

        fn set_font_directory(&self, _document: DocumentHandle, path: &str) -> EngineResult<()> {
            self.record("set_font_directory", format!("set_font_directory {path}"))
        }

        fn enable_watermark(&self, _document: DocumentHandle) -> EngineResult<()> {
            self.record("enable_watermark", "enable_watermark".into())
        }

        fn set_watermark_path(&self, _document: DocumentHandle, path: &str) -> EngineResult<()> {
            self.record("set_watermark_path", format!("set_watermark_path {path}"))
        }

        fn open_export(
            &self,
            _document: DocumentHandle,
            _format: ExportFormat,
            destination: &str,
        ) -> EngineResult<ExportHandle> {
            self.record("open_export", format!("open_export {destination}"))?;
            Ok(ExportHandle(2))
        }

        fn run_export(&self, _export: ExportHandle) -> EngineResult<()> {
            self.record("run_export", "run_export".into())
        }

        fn close_export(&self, _export: ExportHandle) -> EngineResult<()> {
            self.record("close_export", "close_export".into())
        }

        fn close_document(&self, _document: DocumentHandle) -> EngineResult<()> {
            self.record("close_document", "close_document".into())
        }

        fn deinit(&self) -> EngineResult<()> {
            self.record("deinit", "deinit".into())
        }
    }

    fn request_with(options: ConversionOptions) -> ConversionRequest {
        ConversionRequest::new("in.docx", "out.pdf", options, Box::new(|_, _| {}))
    }

    fn run_with(engine: &RecordingEngine, options: ConversionOptions) -> Verdict {
        let mut request = request_with(options);
        run(engine, &mut request);
        request.verdict()
    }

    #[test]
    fn success_path_issues_the_full_protocol_in_order() {
        let engine = RecordingEngine::ok();
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Succeeded);
        assert_eq!(
            engine.calls(),
            vec![
                "init",
                "open_document in.docx",
                "set_font_directory /usr/share/fonts/truetype/msttcorefonts",
                "open_export out.pdf",
                "run_export",
                "close_export",
                "close_document",
                "deinit",
            ]
        );
    }

    #[test]
    fn watermark_calls_are_issued_between_font_and_export() {
        let engine = RecordingEngine::ok();
        let options = ConversionOptions {
            font_directory: "/opt/fonts".into(),
            watermark: Some("/assets/draft.png".into()),
        };
        let verdict = run_with(&engine, options);

        assert_eq!(verdict, Verdict::Succeeded);
        assert_eq!(
            engine.calls(),
            vec![
                "init",
                "open_document in.docx",
                "set_font_directory /opt/fonts",
                "enable_watermark",
                "set_watermark_path /assets/draft.png",
                "open_export out.pdf",
                "run_export",
                "close_export",
                "close_document",
                "deinit",
            ]
        );
    }

    #[test]
    fn no_watermark_means_no_watermark_calls_at_all() {
        let engine = RecordingEngine::ok();
        run_with(&engine, ConversionOptions::default());

        assert_eq!(engine.count("enable_watermark"), 0);
        assert_eq!(engine.count("set_watermark_path"), 0);
    }

    #[test]
    fn init_failure_tears_nothing_down() {
        let engine = RecordingEngine::rejecting("init");
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(engine.calls(), vec!["init"]);
    }

    #[test]
    fn open_document_failure_still_deinits() {
        let engine = RecordingEngine::rejecting("open_document");
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(engine.count("deinit"), 1);
        assert_eq!(engine.count("close_document"), 0);
        assert_eq!(engine.count("open_export"), 0);
    }

    #[test]
    fn font_directory_rejection_fails_the_job() {
        let engine = RecordingEngine::rejecting("set_font_directory");
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(engine.count("open_export"), 0);
        assert_eq!(engine.count("close_document"), 1);
        assert_eq!(engine.count("deinit"), 1);
    }

    #[test]
    fn watermark_rejection_fails_the_job() {
        for call in ["enable_watermark", "set_watermark_path"] {
            let engine = RecordingEngine::rejecting(call);
            let options = ConversionOptions {
                font_directory: "/opt/fonts".into(),
                watermark: Some("/assets/draft.png".into()),
            };
            let verdict = run_with(&engine, options);

            assert_eq!(verdict, Verdict::Failed, "rejected call: {call}");
            assert_eq!(engine.count("open_export"), 0, "rejected call: {call}");
            assert_eq!(engine.count("close_document"), 1, "rejected call: {call}");
            assert_eq!(engine.count("deinit"), 1, "rejected call: {call}");
        }
    }

    #[test]
    fn open_export_failure_closes_document_but_not_export() {
        let engine = RecordingEngine::rejecting("open_export");
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(engine.count("close_export"), 0);
        assert_eq!(engine.count("close_document"), 1);
        assert_eq!(engine.count("deinit"), 1);
    }

    #[test]
    fn run_export_failure_closes_everything_in_reverse_order() {
        let engine = RecordingEngine::rejecting("run_export");
        let verdict = run_with(&engine, ConversionOptions::default());

        assert_eq!(verdict, Verdict::Failed);
        let calls = engine.calls();
        assert_eq!(
            &calls[calls.len() - 3..],
            &["close_export", "close_document", "deinit"]
        );
    }

    #[test]
    fn teardown_rejection_does_not_mask_success() {
        for call in ["close_export", "close_document", "deinit"] {
            let engine = RecordingEngine::rejecting(call);
            let verdict = run_with(&engine, ConversionOptions::default());
            assert_eq!(verdict, Verdict::Succeeded, "rejected call: {call}");
        }
    }
}
