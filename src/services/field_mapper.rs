//! Column mapping: which source column feeds which lead field
//!
//! The mapping is seeded by a header-name heuristic and then edited by the
//! operator. Manual choices are sticky: re-running the heuristic only fills
//! fields the operator has not touched, until the mapping is reset.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::defaults::EMPTY_PREVIEW;
use crate::error::MappingIncomplete;
use crate::services::csv_parser::ParsedTable;
use crate::types::FieldDef;

/// Logical field key → source header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    bindings: BTreeMap<String, String>,
    manual: BTreeSet<String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped header for `field`, if any
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.bindings
            .get(field)
            .map(String::as_str)
            .filter(|h| !h.is_empty())
    }

    /// Operator edit of a single field. `None` means "ignore this field".
    pub fn set(&mut self, field: &str, header: Option<String>) {
        match header.filter(|h| !h.is_empty()) {
            Some(header) => {
                self.bindings.insert(field.to_string(), header);
            }
            None => {
                self.bindings.remove(field);
            }
        }
        self.manual.insert(field.to_string());
    }

    pub fn is_manual(&self, field: &str) -> bool {
        self.manual.contains(field)
    }

    /// Drop every binding and every manual mark
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.manual.clear();
    }

    /// Re-run the header heuristic for every field the operator has not set.
    ///
    /// Fields are visited in `fields` order and headers in `headers` order; the
    /// first unclaimed matching header wins and is then claimed, so one header
    /// feeds at most one field. Headers bound by manual choices count as claimed.
    pub fn apply_auto_map(&mut self, headers: &[String], fields: &[FieldDef]) {
        let mut claimed: HashSet<String> = self
            .manual
            .iter()
            .filter_map(|field| self.bindings.get(field).cloned())
            .collect();

        for field in fields {
            if self.manual.contains(field.key) {
                continue;
            }

            let found = headers
                .iter()
                .find(|h| !claimed.contains(h.as_str()) && header_matches(h, field));

            match found {
                Some(header) => {
                    claimed.insert(header.clone());
                    self.bindings.insert(field.key.to_string(), header.clone());
                }
                None => {
                    self.bindings.remove(field.key);
                }
            }
        }
    }

    /// Required fields without a mapped header, in schema order
    pub fn missing_required<'a>(&self, fields: &'a [FieldDef]) -> Vec<&'a FieldDef> {
        fields
            .iter()
            .filter(|f| f.required && self.header_for(f.key).is_none())
            .collect()
    }

    pub fn require_complete(&self, fields: &[FieldDef]) -> Result<(), MappingIncomplete> {
        let missing = self.missing_required(fields);
        if missing.is_empty() {
            return Ok(());
        }
        Err(MappingIncomplete {
            missing: missing.iter().map(|f| f.label.to_string()).collect(),
        })
    }

    /// (field key, header) pairs currently bound
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Lower-cased header contains the field key, or equals the field label
fn header_matches(header: &str, field: &FieldDef) -> bool {
    let header = header.to_lowercase();
    header.contains(&field.key.to_lowercase()) || header == field.label.to_lowercase()
}

/// Fresh mapping seeded by the header heuristic
pub fn auto_map(headers: &[String], fields: &[FieldDef]) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    mapping.apply_auto_map(headers, fields);
    mapping
}

/// True iff every required field has a mapped header
pub fn validate(mapping: &FieldMapping, fields: &[FieldDef]) -> bool {
    mapping.missing_required(fields).is_empty()
}

/// First data row as the operator sees it in the mapping step
pub fn preview(
    table: &ParsedTable,
    mapping: &FieldMapping,
    fields: &[FieldDef],
) -> Vec<(&'static str, String)> {
    let first = table.row(0);
    fields
        .iter()
        .map(|field| {
            let value = match (first, mapping.header_for(field.key)) {
                (Some(row), Some(header)) => row.get(header),
                _ => "",
            };
            let shown = if value.is_empty() { EMPTY_PREVIEW } else { value };
            (field.label, shown.to_string())
        })
        .collect()
}
