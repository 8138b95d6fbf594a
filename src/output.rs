//! Result types returned by the export entry points.

use crate::error::{RecordError, ScribeError};
use crate::model::ContactBatch;
use crate::pipeline::input::InputFormat;
use serde::Serialize;
use std::path::Path;

/// Contacts read from one input file, before any layout.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedContacts {
    pub format: InputFormat,
    /// Records sorted by last name, then first name.
    pub contacts: ContactBatch,
    /// vCard components dropped because they were malformed. Always empty for
    /// CSV input.
    pub skipped: Vec<RecordError>,
}

/// A rendered contact directory held in memory.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The complete PDF file.
    pub pdf: Vec<u8>,
    pub contacts: ContactBatch,
    pub skipped: Vec<RecordError>,
    pub stats: ExportStats,
}

impl ExportOutput {
    /// Atomically write the PDF to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ScribeError> {
        crate::convert::write_atomic(path.as_ref(), &self.pdf)
    }
}

/// Summary numbers for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Contacts printed in the directory.
    pub contacts: usize,
    /// Malformed vCard components that were skipped.
    pub skipped_records: usize,
    pub pages: usize,
    pub draw_commands: usize,
    pub pdf_bytes: usize,
    pub total_duration_ms: u64,
}
