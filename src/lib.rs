//! # contactscribe
//!
//! Render an address book (CSV export or vCard file) as a printable PDF
//! contact directory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! contacts.csv / contacts.vcf
//!  │
//!  ├─ 1. Input      check the extension, existence and permissions
//!  ├─ 2. Parse      CSV rows or vCard components → ordered field maps
//!  ├─ 3. Normalize  stable sort by (last name, first name)
//!  ├─ 4. Layout     paginate into draw commands, labels translated
//!  ├─ 5. Render     replay onto a lopdf canvas (Helvetica, A4)
//!  └─ 6. Output     atomic write of contacts.pdf
//! ```
//!
//! The whole document is built in memory; the file system is only touched
//! to read the input and, in [`export_to_file`], for one final rename.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contactscribe::{default_output_path, export_to_file, ExportConfig, Language};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::builder().language(Language::Es).build()?;
//!     let input = "contacts.vcf";
//!     let stats = export_to_file(input, default_output_path(input), &config)?;
//!     eprintln!("{} contacts on {} pages", stats.contacts, stats.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `contactscribe` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! contactscribe = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod i18n;
pub mod model;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder, PageGeometry, PageSize};
pub use convert::{default_output_path, export, export_to_file, load_contacts};
pub use error::{RecordError, ScribeError};
pub use i18n::{translate, Language, Translator};
pub use model::{ContactBatch, ContactRecord, NameKeys};
pub use output::{ExportOutput, ExportStats, LoadedContacts};
pub use pipeline::input::InputFormat;
