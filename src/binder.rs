//! Column map construction and per-row binding.

use rustc_hash::FxHashMap;

use crate::error::BindError;
use crate::pipeline::{NameInterceptor, Pipeline, ValueInterceptor};
use crate::record::Record;
use crate::resolve::{column_of, resolve_cell};
use crate::traits::RowData;

/// Column identifier → property name, built once per sheet from the header
/// row and never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct ColumnMap {
    entries: FxHashMap<String, String>,
}

impl ColumnMap {
    /// Build the map from the header row: extract each cell's column
    /// identifier, resolve its value and run it through the name pipeline.
    /// A repeated column identifier is a construction error, never a silent
    /// overwrite.
    pub fn from_header(
        header: &RowData,
        shared: &[String],
        names: &Pipeline<dyn NameInterceptor>,
    ) -> Result<Self, BindError> {
        let mut entries = FxHashMap::default();
        for cell in &header.cells {
            let column = column_of(&cell.reference)?.to_string();
            let resolved = resolve_cell(cell, shared)?;
            let property = names.transform(resolved.as_deref().unwrap_or(""))?;
            if entries.insert(column.clone(), property).is_some() {
                return Err(BindError::DuplicateHeaderColumn { column });
            }
        }
        Ok(Self { entries })
    }

    pub fn property_for(&self, column: &str) -> Option<&str> {
        self.entries.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind one data row against the column map.
///
/// Returns `Ok(Some(record))` when at least one bound property ended up
/// with a non-default value, `Ok(None)` (the discard signal) when the row
/// was blank by every mapped column's default-value test. Cells in columns
/// the map does not know are skipped silently.
pub fn bind_row<T: Record>(
    row: &RowData,
    map: &ColumnMap,
    shared: &[String],
    values: &Pipeline<dyn ValueInterceptor>,
) -> Result<Option<T>, BindError> {
    let mut record = T::default();
    let mut meaningful = false;
    for cell in &row.cells {
        let column = column_of(&cell.reference)?;
        let Some(property) = map.property_for(column) else {
            continue;
        };
        let meta = T::properties()
            .iter()
            .find(|p| p.name == property)
            .ok_or_else(|| BindError::PropertyNotFound {
                column: column.to_string(),
                property: property.to_string(),
            })?;
        let Some(resolved) = resolve_cell(cell, shared)? else {
            // No payload: the field keeps its default.
            continue;
        };
        let value = values.transform(meta, &resolved)?;
        meaningful |= record.set_property(meta.name, value)?;
    }
    Ok(meaningful.then_some(record))
}
