//! CSV source adapter.
//!
//! The header row defines the field set for the whole batch: every column
//! becomes a field key, verbatim and in left-to-right order, and every row
//! carries all of them (short rows are padded with empty strings). A row
//! with more cells than the header, or a quoted cell that never closes, is
//! an input error. The only columns with special meaning are the first/last
//! name columns, recognised from a small list of common export headers.

use crate::error::ScribeError;
use crate::model::{ContactBatch, ContactRecord, NameKeys};
use crate::pipeline::{input, normalize};
use std::path::Path;
use tracing::{debug, info};

/// Header names recognised as the first-name column, in priority order.
pub const FIRST_NAME_COLUMNS: &[&str] = &["Nombre", "First Name", "First name", "Given Name"];

/// Header names recognised as the last-name column, in priority order.
pub const LAST_NAME_COLUMNS: &[&str] = &["Apellidos", "Last Name", "Last name", "Family Name"];

/// Parse a CSV file into a sorted batch.
pub fn load_csv(path: &Path) -> Result<ContactBatch, ScribeError> {
    let text = input::read_utf8(path)?;
    let records = parse_csv(&text, path)?;
    info!("Parsed {} contacts from CSV", records.len());
    Ok(normalize::normalize(records))
}

/// Parse CSV text into records in row order.
///
/// `path` is only used for error messages.
pub fn parse_csv(text: &str, path: &Path) -> Result<Vec<ContactRecord>, ScribeError> {
    let format_err = |detail: String| ScribeError::InputFormat {
        path: path.to_path_buf(),
        detail,
    };

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if let Some(line) = unterminated_quote(text) {
        return Err(format_err(format!(
            "unterminated quoted field starting at line {line}"
        )));
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format_err(format!("invalid header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(format_err("missing header row".into()));
    }

    let name_keys = detect_name_keys(&headers);
    debug!(
        "CSV header: {} columns, name columns {:?}/{:?}",
        headers.len(),
        name_keys.first,
        name_keys.last
    );

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            format_err(format!("malformed row at line {line}: {e}"))
        })?;
        if row.len() > headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            return Err(format_err(format!(
                "line {line}: expected {} fields, found {}",
                headers.len(),
                row.len()
            )));
        }

        let mut record = ContactRecord::new(name_keys);
        for (i, header) in headers.iter().enumerate() {
            record.push_field(header.as_str(), row.get(i).unwrap_or(""));
        }
        records.push(record);
    }

    Ok(records)
}

/// Line on which a quoted field opens without ever being closed.
///
/// A quote only opens a field when it is the field's first character; inside
/// a quoted field `""` is an escaped quote.
fn unterminated_quote(text: &str) -> Option<usize> {
    let mut line = 1;
    let mut open_at: Option<usize> = None;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if open_at.is_some() {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => open_at = None,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if field_start => {
                open_at = Some(line);
                field_start = false;
            }
            ',' => field_start = true,
            '\n' => {
                line += 1;
                field_start = true;
            }
            '\r' => {}
            _ => field_start = false,
        }
    }
    open_at
}

/// Pick the name columns present in `headers`, falling back to the
/// canonical keys (which then hold empty values for every row).
fn detect_name_keys(headers: &[String]) -> NameKeys {
    let find = |candidates: &'static [&'static str]| -> Option<&'static str> {
        candidates
            .iter()
            .copied()
            .find(|c| headers.iter().any(|h| h == c))
    };
    NameKeys {
        first: find(FIRST_NAME_COLUMNS).unwrap_or(NameKeys::CANONICAL.first),
        last: find(LAST_NAME_COLUMNS).unwrap_or(NameKeys::CANONICAL.last),
    }
}
