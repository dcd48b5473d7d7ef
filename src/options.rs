//! Options resolution: a loosely-typed caller bag into a complete, owned
//! [`ConversionOptions`].
//!
//! Callers hand over a `serde_json::Value` object with at most two
//! recognized keys, `fontdirectory` and `watermark`. Resolution copies the
//! supplied strings verbatim (trailing slashes and all, no normalisation)
//! and applies the fixed font-directory default when the caller omitted it.
//! Unrecognized keys are ignored without error.
//!
//! Path *existence* is deliberately not validated here. A wrong path is a
//! conversion failure, not a usage error: it surfaces later when the engine
//! rejects the open or configure call.

use crate::error::UsageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Font directory used when the caller does not supply one.
pub const DEFAULT_FONT_DIRECTORY: &str = "/usr/share/fonts/truetype/msttcorefonts";

/// Resolved per-job configuration. Immutable once built; each job owns its
/// own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Directory the engine searches for fonts.
    pub font_directory: String,

    /// Watermark source path. `None` means watermarking is left entirely
    /// unconfigured for the job; no watermark-related engine call is made
    /// at all, not even a "disabled" one.
    pub watermark: Option<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            font_directory: DEFAULT_FONT_DIRECTORY.to_string(),
            watermark: None,
        }
    }
}

impl ConversionOptions {
    /// Resolve a caller-supplied options bag.
    ///
    /// Recognized keys:
    /// * `fontdirectory` — non-empty string; copied verbatim. Absent means
    ///   [`DEFAULT_FONT_DIRECTORY`].
    /// * `watermark` — string; copied verbatim. Absent means no
    ///   watermarking.
    ///
    /// # Errors
    /// [`UsageError::OptionsNotAnObject`] when `bag` is not a JSON object,
    /// [`UsageError::InvalidOption`] when a recognized key holds a value of
    /// the wrong shape.
    pub fn resolve(bag: &Value) -> Result<Self, UsageError> {
        let object = bag.as_object().ok_or(UsageError::OptionsNotAnObject {
            found: json_type_name(bag),
        })?;

        let font_directory = match object.get("fontdirectory") {
            None => DEFAULT_FONT_DIRECTORY.to_string(),
            Some(value) => match value.as_str() {
                Some(path) if !path.is_empty() => path.to_string(),
                _ => {
                    return Err(UsageError::InvalidOption {
                        key: "fontdirectory",
                        expected: "a non-empty string",
                    })
                }
            },
        };

        let watermark = match object.get("watermark") {
            None => None,
            Some(value) => match value.as_str() {
                Some(path) => Some(path.to_string()),
                None => {
                    return Err(UsageError::InvalidOption {
                        key: "watermark",
                        expected: "a string",
                    })
                }
            },
        };

        Ok(Self {
            font_directory,
            watermark,
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
