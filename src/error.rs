//! Error types for the contactscribe library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ScribeError`] is **fatal**: the export cannot proceed at all (missing
//!   or unparsable input, unsupported language, PDF could not be written).
//!   Returned as `Err(ScribeError)` from the top-level `export*` functions.
//!   No output file is ever left behind when one of these is returned.
//!
//! * [`RecordError`] is **non-fatal**: a single vCard component was malformed
//!   but the rest of the file is fine. Collected in
//!   [`crate::output::ExportOutput::skipped`] so callers can report the
//!   skipped contacts instead of losing the whole address book to one bad
//!   entry.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the contactscribe library.
///
/// Per-contact failures use [`RecordError`] and are collected alongside the
/// output rather than propagated here.
#[derive(Debug, Error)]
pub enum ScribeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is neither `.csv` nor `.vcf`.
    #[error("Unsupported file format.")]
    UnsupportedFormat { path: PathBuf },

    /// The file has a supported extension but its content cannot be parsed.
    #[error("Cannot read '{path}': {detail}")]
    InputFormat { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The requested output language has no label dictionary.
    #[error("Unsupported language '{code}'. Supported languages: {supported}")]
    UnsupportedLanguage { code: String, supported: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The PDF backend rejected the document.
    #[error("PDF rendering failed: {0}")]
    RenderFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<lopdf::Error> for ScribeError {
    fn from(e: lopdf::Error) -> Self {
        ScribeError::RenderFailed(e.to_string())
    }
}

/// A non-fatal error for a single vCard component.
///
/// The component is dropped from the batch; every other contact is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("Contact #{index} (line {line}): {reason}")]
pub struct RecordError {
    /// 1-based position of the component in the file.
    pub index: usize,
    /// 1-based line on which the component's `BEGIN:VCARD` appeared.
    pub line: usize,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display_is_exact() {
        let e = ScribeError::UnsupportedFormat {
            path: PathBuf::from("contacts.xlsx"),
        };
        assert_eq!(e.to_string(), "Unsupported file format.");
    }

    #[test]
    fn unsupported_language_lists_supported() {
        let e = ScribeError::UnsupportedLanguage {
            code: "fr".into(),
            supported: "en, es".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'fr'"), "got: {msg}");
        assert!(msg.contains("en, es"), "got: {msg}");
    }

    #[test]
    fn record_error_display() {
        let e = RecordError {
            index: 3,
            line: 17,
            reason: "missing END:VCARD".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("line 17"));
        assert!(msg.contains("missing END:VCARD"));
    }

    #[test]
    fn input_format_display() {
        let e = ScribeError::InputFormat {
            path: PathBuf::from("a.csv"),
            detail: "missing header row".into(),
        };
        assert!(e.to_string().contains("missing header row"));
    }
}
