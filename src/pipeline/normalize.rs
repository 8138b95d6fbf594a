//! Contact normalization: turn raw adapter output into a [`ContactBatch`].
//!
//! Both adapters hand over records in source order. Normalization guarantees
//! the reserved name keys are present and sorts by (last name, first name).
//! `sort_by` is a stable merge sort, so contacts with identical names keep
//! their relative order from the source file.

use crate::model::{ContactBatch, ContactRecord};
use tracing::debug;

/// Sort `records` into a batch, filling in missing reserved name fields.
pub fn normalize(records: Vec<ContactRecord>) -> ContactBatch {
    let mut records: Vec<ContactRecord> = records
        .into_iter()
        .map(|mut r| {
            if r.get(r.name_keys().first).is_none() {
                r.set_first_name("");
            }
            if r.get(r.name_keys().last).is_none() {
                r.set_last_name("");
            }
            r
        })
        .collect();

    records.sort_by(ContactRecord::cmp_by_name);
    debug!("Normalized {} contacts", records.len());
    ContactBatch::from_sorted(records)
}
