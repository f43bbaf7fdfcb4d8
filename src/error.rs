use std::fmt;

use crate::record::ValueType;

/// Opaque failure raised inside a user-supplied interceptor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can abort a parse.
///
/// All variants are fatal to the current parse call: there are no partial
/// results. Failures raised while binding a data row get one extra
/// [`BindError::Row`] frame carrying the document row number before they
/// reach the caller. A blank row is not an error (see `bind_row`).
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("worksheet '{name}' not found")]
    SheetNotFound { name: String },

    #[error("malformed cell reference '{reference}': no leading column letters")]
    MalformedCellReference { reference: String },

    #[error("duplicate header cell in column {column}")]
    DuplicateHeaderColumn { column: String },

    #[error("cell {reference}: shared string index {index} out of range (table has {len} entries)")]
    SharedStringIndexOutOfRange {
        reference: String,
        index: usize,
        len: usize,
    },

    #[error("cell {reference}: invalid shared string index '{raw}'")]
    InvalidSharedStringIndex { reference: String, raw: String },

    #[error("column {column} maps to property '{property}' which does not exist on the target record")]
    PropertyNotFound { column: String, property: String },

    #[error("interceptor '{interceptor}' failed (original value '{original}', current value '{current}')")]
    Interceptor {
        interceptor: String,
        original: String,
        current: String,
        #[source]
        source: BoxError,
    },

    #[error("cannot bind '{value}' to property '{property}' of type {expected}")]
    IncompatibleValue {
        property: String,
        value: String,
        expected: ValueType,
    },

    #[error("row {row}: {source}")]
    Row {
        row: u32,
        #[source]
        source: Box<BindError>,
    },

    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },
}

impl BindError {
    /// Wrap an error crossing the document-reader boundary.
    pub fn from_backend(backend: &str, err: impl fmt::Display) -> Self {
        BindError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    /// Add the row-context frame applied at the row-processing boundary.
    pub fn with_row(self, row: u32) -> Self {
        BindError::Row {
            row,
            source: Box::new(self),
        }
    }
}
