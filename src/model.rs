//! Canonical contact model shared by both source adapters.
//!
//! CSV columns and vCard properties have nothing in common structurally, so
//! a record is an open-ended, ordered `key → value` map rather than a struct
//! with named fields. The only keys the rest of the pipeline relies on are
//! the two reserved name keys, which every record is guaranteed to carry.

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

/// The pair of field keys holding a record's first and last name.
///
/// vCard records always use [`NameKeys::CANONICAL`]; CSV records use
/// whichever name columns the header row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NameKeys {
    pub first: &'static str,
    pub last: &'static str,
}

impl NameKeys {
    pub const CANONICAL: NameKeys = NameKeys {
        first: "First name",
        last: "Last name",
    };
}

impl Default for NameKeys {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// One contact: an ordered mapping from field key to string value.
///
/// # Invariants
/// - Both reserved name keys are present (possibly with an empty value).
/// - Values are plain strings; absence is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    #[serde(skip)]
    name_keys: NameKeys,
    #[serde(flatten)]
    fields: IndexMap<String, String>,
}

impl ContactRecord {
    /// Create an empty record whose reserved name fields are set to `""`.
    pub fn new(name_keys: NameKeys) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(name_keys.first.to_string(), String::new());
        fields.insert(name_keys.last.to_string(), String::new());
        Self { name_keys, fields }
    }

    pub fn name_keys(&self) -> NameKeys {
        self.name_keys
    }

    pub fn first_name(&self) -> &str {
        self.get(self.name_keys.first).unwrap_or("")
    }

    pub fn last_name(&self) -> &str {
        self.get(self.name_keys.last).unwrap_or("")
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.fields
            .insert(self.name_keys.first.to_string(), value.into());
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.fields
            .insert(self.name_keys.last.to_string(), value.into());
    }

    /// First and last name, trimmed and joined by a single space.
    pub fn full_name(&self) -> String {
        let first = self.first_name().trim();
        let last = self.last_name().trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Add a field, merging with any value already stored under `key`.
    ///
    /// An empty existing value is replaced; two non-empty values are joined
    /// with `", "`. An empty incoming value never clobbers data but still
    /// registers the key, so CSV columns keep a fixed shape per batch.
    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(key.into()) {
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
            }
            indexmap::map::Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.trim().is_empty() {
                    *existing = value;
                } else if !value.trim().is_empty() {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
            }
        }
    }

    /// All fields in insertion order, reserved name keys included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fields other than the reserved names whose value is non-blank.
    pub fn populated_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        let keys = self.name_keys;
        self.fields()
            .filter(move |(k, _)| *k != keys.first && *k != keys.last)
            .filter(|(_, v)| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ordering key: (last name, first name), byte-wise and case-sensitive.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.last_name()
            .cmp(other.last_name())
            .then_with(|| self.first_name().cmp(other.first_name()))
    }
}

/// Normalized contacts, sorted by (last name, first name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactBatch {
    records: Vec<ContactRecord>,
}

impl ContactBatch {
    /// Wrap records that are already in batch order.
    ///
    /// Use [`crate::pipeline::normalize::normalize`] to build a batch from
    /// raw adapter output.
    pub(crate) fn from_sorted(records: Vec<ContactRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContactRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContactBatch {
    type Item = &'a ContactRecord;
    type IntoIter = std::slice::Iter<'a, ContactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_reserved_keys() {
        let r = ContactRecord::new(NameKeys::CANONICAL);
        assert_eq!(r.get("First name"), Some(""));
        assert_eq!(r.get("Last name"), Some(""));
        assert_eq!(r.populated_fields().count(), 0);
    }

    #[test]
    fn full_name_trims_and_joins() {
        let mut r = ContactRecord::new(NameKeys::CANONICAL);
        r.set_first_name("  Ana ");
        r.set_last_name(" Gómez");
        assert_eq!(r.full_name(), "Ana Gómez");

        r.set_last_name("");
        assert_eq!(r.full_name(), "Ana");
    }

    #[test]
    fn push_field_merges_duplicates() {
        let mut r = ContactRecord::new(NameKeys::CANONICAL);
        r.push_field("Phone (CELL)", "111");
        r.push_field("Phone (CELL)", "222");
        assert_eq!(r.get("Phone (CELL)"), Some("111, 222"));

        r.push_field("Note", "");
        r.push_field("Note", "hello");
        r.push_field("Note", "  ");
        assert_eq!(r.get("Note"), Some("hello"));
    }

    #[test]
    fn populated_fields_skip_names_and_blanks() {
        let mut r = ContactRecord::new(NameKeys::CANONICAL);
        r.set_first_name("Ana");
        r.push_field("Title", "   ");
        r.push_field("Email (home)", "ana@example.com");
        let fields: Vec<_> = r.populated_fields().collect();
        assert_eq!(fields, vec![("Email (home)", "ana@example.com")]);
    }

    #[test]
    fn serializes_fields_in_order() {
        let mut r = ContactRecord::new(NameKeys::CANONICAL);
        r.set_first_name("Ana");
        r.push_field("Title", "CTO");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"First name":"Ana","Last name":"","Title":"CTO"}"#);
    }
}
