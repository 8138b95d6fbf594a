//! Export entry points.
//!
//! [`export`] runs the whole pipeline in memory and returns the PDF bytes.
//! [`export_to_file`] adds the only side effect: an atomic write of those
//! bytes next to (or instead of) the default output path. Keeping rendering
//! and writing apart means a failure anywhere before the final rename leaves
//! no file behind.

use crate::config::ExportConfig;
use crate::error::ScribeError;
use crate::i18n::Translator;
use crate::output::{ExportOutput, ExportStats, LoadedContacts};
use crate::pipeline::input::{self, InputFormat};
use crate::pipeline::{csv, layout, render, vcard};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Read and normalise the contacts in `path` without rendering anything.
///
/// # Errors
/// Fatal input problems: unsupported extension, missing or unreadable file,
/// content that is not CSV/vCard at all. With
/// `config.skip_invalid_records == false` the first malformed vCard component
/// is fatal as well.
pub fn load_contacts(
    path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<LoadedContacts, ScribeError> {
    let resolved = input::resolve_input(path)?;

    let (contacts, skipped) = match resolved.format {
        InputFormat::Csv => (csv::load_csv(&resolved.path)?, Vec::new()),
        InputFormat::VCard => vcard::load_vcard(&resolved.path)?,
    };

    if !config.skip_invalid_records {
        if let Some(first) = skipped.first() {
            return Err(ScribeError::InputFormat {
                path: resolved.path,
                detail: first.to_string(),
            });
        }
    }
    Ok(LoadedContacts {
        format: resolved.format,
        contacts,
        skipped,
    })
}

/// Export the contacts in `path` to a PDF held in memory.
///
/// This is the primary entry point for the library.
pub fn export(path: impl AsRef<Path>, config: &ExportConfig) -> Result<ExportOutput, ScribeError> {
    let start = Instant::now();
    let path = path.as_ref();
    info!("Starting export: {}", path.display());

    // ── Step 1: Parse and sort ───────────────────────────────────────────
    let loaded = load_contacts(path, config)?;

    // ── Step 2: Paginate ─────────────────────────────────────────────────
    let translator = Translator::new(config.language);
    let export_date = config.resolved_export_date();
    let layout = layout::layout(
        &loaded.contacts,
        &translator,
        &config.geometry,
        export_date,
    );

    // ── Step 3: Render ───────────────────────────────────────────────────
    let pdf = render::render_pdf(&layout, config.geometry.page_size, config.compress)?;

    let stats = ExportStats {
        contacts: loaded.contacts.len(),
        skipped_records: loaded.skipped.len(),
        pages: layout.pages,
        draw_commands: layout.commands.len(),
        pdf_bytes: pdf.len(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Export complete: {} contacts on {} pages, {}ms",
        stats.contacts, stats.pages, stats.total_duration_ms
    );

    Ok(ExportOutput {
        pdf,
        contacts: loaded.contacts,
        skipped: loaded.skipped,
        stats,
    })
}

/// Export `path` and write the PDF to `output_path`.
///
/// Uses an atomic write (temp file in the destination directory, then
/// rename) so an existing file is either fully replaced or left untouched.
pub fn export_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportStats, ScribeError> {
    let output = export(path, config)?;
    let target = output_path.as_ref();
    write_atomic(target, &output.pdf)?;
    info!("Wrote {}", target.display());
    Ok(output.stats)
}

/// `<dir>/<stem>.pdf` for an input at `<dir>/<stem>.<ext>`.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("pdf")
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), ScribeError> {
    let write_err = |source: std::io::Error| ScribeError::OutputWriteFailed {
        path: target.to_path_buf(),
        source,
    };

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    debug!("Staged {} bytes in {}", bytes.len(), tmp.path().display());

    tmp.persist(target).map_err(|e| write_err(e.error))?;
    Ok(())
}
