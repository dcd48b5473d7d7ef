//! Error types for the topdf library.
//!
//! Two distinct error types reflect two distinct failure categories:
//!
//! * [`UsageError`] — the call itself was malformed (empty path, options bag
//!   of the wrong shape). Detected before any job is constructed and
//!   returned synchronously from [`crate::Converter::convert`]; the
//!   completion callback never runs for these.
//!
//! * [`ConversionFailed`] — the job ran and some stage of the engine
//!   protocol was rejected. Always delivered asynchronously through the
//!   completion callback's error slot, never returned synchronously, never
//!   retried.
//!
//! [`ConversionFailed`] carries no cause on purpose: the caller contract is
//! a single generic failure. Which stage failed is emitted as a `tracing`
//! diagnostic by the export pipeline instead.

use thiserror::Error;

/// A malformed `convert` call, rejected before a job is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The source path was empty.
    #[error("expected a non-empty source path")]
    EmptySourcePath,

    /// The destination path was empty.
    #[error("expected a non-empty destination path")]
    EmptyDestinationPath,

    /// The options bag was not a JSON object.
    #[error("expected an options object, got {found}")]
    OptionsNotAnObject {
        /// JSON type of the value that was supplied instead.
        found: &'static str,
    },

    /// A recognized option key held a value of the wrong shape.
    #[error("option '{key}' must be {expected}")]
    InvalidOption {
        key: &'static str,
        expected: &'static str,
    },
}

/// The single, deliberately cause-free failure reported through the
/// completion callback's error slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to convert file")]
pub struct ConversionFailed;

/// Union of both categories, returned by
/// [`crate::Converter::convert_async`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Conversion(#[from] ConversionFailed),
}
