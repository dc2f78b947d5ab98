//! Column mapping between spreadsheet headers and record fields
//!
//! The backing store is a spreadsheet whose columns carry human-readable
//! headers ("No. OT", "Cliente", ...). The rest of the crate works with stable
//! field names (`no_ot`, `cliente`, ...). A [`ColumnMapping`] translates in
//! both directions.
//!
//! Translation is lossy on purpose: headers without a mapping entry are dropped
//! when reading, and fields without a reverse entry are dropped when writing.
//! Nothing is reported; a record is simply missing those fields.

mod sheets;

pub use sheets::Sheet;

use serde_json::Value;
use tracing::trace;

use crate::types::{Record, Row};

/// Ordered header → field dictionary, usable in both directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<(String, String)>,
}

impl ColumnMapping {
    /// Build a mapping from `(header, field)` pairs, keeping declaration order
    pub fn new<H, F>(pairs: impl IntoIterator<Item = (H, F)>) -> Self
    where
        H: Into<String>,
        F: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(h, f)| (h.into(), f.into()))
                .collect(),
        }
    }

    /// Field name for a spreadsheet header
    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, f)| f.as_str())
    }

    /// Spreadsheet header for a field name. When several headers map to the
    /// same field the first declared one wins.
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, f)| f == field)
            .map(|(h, _)| h.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(h, _)| h.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, f)| f.as_str())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(h, f)| (h.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Turn a positional row into a field-keyed record.
///
/// `headers[i]` names `row[i]`. Headers missing from `mapping` are dropped, as
/// are headers past the end of the row.
pub fn row_to_record(row: &[Value], headers: &[String], mapping: &ColumnMapping) -> Record {
    let mut record = Record::new();
    for (i, header) in headers.iter().enumerate() {
        let Some(field) = mapping.field_for(header) else {
            trace!(header = %header, "dropping unmapped header");
            continue;
        };
        if let Some(value) = row.get(i) {
            record.insert(field.to_string(), value.clone());
        }
    }
    record
}

/// Turn a header-keyed row (the endpoint's GET shape) into a field-keyed record.
///
/// Only `headers` are considered, in their order; a header absent from this
/// particular row is skipped.
pub fn keyed_row_to_record(row: &Row, headers: &[String], mapping: &ColumnMapping) -> Record {
    let mut record = Record::new();
    for header in headers {
        let Some(field) = mapping.field_for(header) else {
            trace!(header = %header, "dropping unmapped header");
            continue;
        };
        if let Some(value) = row.get(header) {
            record.insert(field.to_string(), value.clone());
        }
    }
    record
}

/// Turn a field-keyed record into a header-keyed row for submission.
///
/// Fields without a reverse mapping entry are dropped.
pub fn record_to_row(record: &Record, mapping: &ColumnMapping) -> Row {
    let mut row = Row::new();
    for (field, value) in record {
        match mapping.header_for(field) {
            Some(header) => {
                row.insert(header.to_string(), value.clone());
            }
            None => trace!(field = %field, "dropping field without header"),
        }
    }
    row
}

/// Fields of `record` the sheet has no column for
pub fn unknown_fields(sheet: Sheet, record: &Record) -> Vec<String> {
    let mapping = sheet.mapping();
    record
        .keys()
        .filter(|field| mapping.header_for(field).is_none())
        .cloned()
        .collect()
}

/// Headers of a fetched sheet, taken from the keys of its first row
pub fn headers_of(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}
