//! Input resolution: validate the user-supplied path and pick a source
//! adapter from its extension.
//!
//! Dispatch is a pure function of the extension string, so the set of
//! supported formats is a closed enum rather than runtime sniffing. The file
//! is only opened here to surface missing/unreadable files as precise
//! errors before any parsing starts.

use crate::error::ScribeError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported address-book formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    VCard,
}

impl InputFormat {
    /// Select a format from a file extension (case-insensitive, without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(InputFormat::Csv),
            "vcf" => Some(InputFormat::VCard),
            _ => None,
        }
    }

    /// Select a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A validated input file together with its detected format.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub format: InputFormat,
}

/// Validate `path` and detect its format.
///
/// The extension is checked first so an unsupported file fails with
/// [`ScribeError::UnsupportedFormat`] even when it does not exist.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<ResolvedInput, ScribeError> {
    let path = path.as_ref().to_path_buf();

    let format = InputFormat::from_path(&path)
        .ok_or_else(|| ScribeError::UnsupportedFormat { path: path.clone() })?;

    if !path.exists() {
        return Err(ScribeError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ScribeError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ScribeError::FileNotFound { path });
        }
    }

    debug!("Resolved {:?} input: {}", format, path.display());
    Ok(ResolvedInput { path, format })
}

/// Read the whole file as UTF-8 text.
pub(crate) fn read_utf8(path: &Path) -> Result<String, ScribeError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScribeError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ScribeError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ScribeError::InputFormat {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;
    String::from_utf8(bytes).map_err(|e| ScribeError::InputFormat {
        path: path.to_path_buf(),
        detail: format!("not valid UTF-8 (byte offset {})", e.utf8_error().valid_up_to()),
    })
}
