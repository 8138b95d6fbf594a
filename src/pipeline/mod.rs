//! Pipeline stages for address-book-to-PDF export.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ csv | vcard ──▶ normalize ──▶ layout ──▶ render
//! (dispatch)  (adapters)     (sort)      (draw cmds)  (lopdf)
//! ```
//!
//! 1. [`input`]: validate the path and pick the adapter from its extension
//! 2. [`csv`]: header-driven CSV rows → canonical records
//! 3. [`vcard`]: vCard components → canonical records, skipping bad ones
//! 4. [`normalize`]: stable (last name, first name) sort into a batch
//! 5. [`layout`]: paginate the batch into draw commands (uses [`fonts`]
//!    for word-wrap metrics)
//! 6. [`render`]: replay draw commands onto a [`render::Canvas`]

pub mod csv;
pub mod fonts;
pub mod input;
pub mod layout;
pub mod normalize;
pub mod render;
pub mod vcard;
