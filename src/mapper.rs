//! The parse orchestrator: drives a whole sheet through the column map
//! builder and the row binder.

use std::sync::Arc;

use crate::binder::{ColumnMap, bind_row};
use crate::error::BindError;
use crate::pipeline::{NameInterceptor, Pipeline, ValueInterceptor};
use crate::record::Record;
use crate::traits::SheetReader;

#[cfg(feature = "xlsx")]
use std::io::Read;
#[cfg(feature = "xlsx")]
use std::path::Path;

#[cfg(feature = "xlsx")]
use crate::backends::XlsxReader;

/// Maps sheets to record sequences.
///
/// A mapper is configure-then-use: register interceptors first, then call
/// the parse methods. Parsing takes `&self`, so one configured mapper can
/// serve several parses (and threads) at once; registration needs
/// `&mut self` and therefore cannot race a running parse.
#[derive(Clone, Default)]
pub struct SheetMapper {
    names: Pipeline<dyn NameInterceptor>,
    values: Pipeline<dyn ValueInterceptor>,
}

impl SheetMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The header-name interceptor registry.
    pub fn name_interceptors(&mut self) -> &mut Pipeline<dyn NameInterceptor> {
        &mut self.names
    }

    /// The cell-value interceptor registry.
    pub fn value_interceptors(&mut self) -> &mut Pipeline<dyn ValueInterceptor> {
        &mut self.values
    }

    /// Builder-style registration.
    pub fn with_name_interceptor(mut self, interceptor: impl NameInterceptor + 'static) -> Self {
        self.names.register(Arc::new(interceptor));
        self
    }

    /// Builder-style registration.
    pub fn with_value_interceptor(mut self, interceptor: impl ValueInterceptor + 'static) -> Self {
        self.values.register(Arc::new(interceptor));
        self
    }

    /// Parse a sheet from an already-open document reader.
    ///
    /// `sheet_name` selects the worksheet by exact name; `None` takes the
    /// first worksheet in document order. The first row is always the
    /// header; every following row becomes at most one record, in order.
    /// Parsing is fail-fast: the first row-time error aborts the parse,
    /// wrapped with that row's document index.
    pub fn parse_with<T, B>(
        &self,
        backend: &mut B,
        sheet_name: Option<&str>,
    ) -> Result<Vec<T>, BindError>
    where
        T: Record,
        B: SheetReader,
    {
        let sheets = backend
            .sheet_names()
            .map_err(|e| BindError::from_backend("reader", e))?;
        let sheet = match sheet_name {
            Some(name) => sheets
                .iter()
                .find(|s| s.as_str() == name)
                .cloned()
                .ok_or_else(|| BindError::SheetNotFound {
                    name: name.to_string(),
                })?,
            // A workbook without sheets has nothing to parse.
            None => match sheets.into_iter().next() {
                Some(first) => first,
                None => return Ok(Vec::new()),
            },
        };

        let shared = backend
            .shared_strings()
            .map_err(|e| BindError::from_backend("reader", e))?;
        let rows = backend
            .read_rows(&sheet)
            .map_err(|e| BindError::from_backend("reader", e))?;

        let mut rows = rows.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let map = ColumnMap::from_header(&header, &shared, &self.names)?;

        let mut records = Vec::new();
        #[cfg(feature = "tracing")]
        let mut discarded = 0usize;
        for row in rows {
            match bind_row::<T>(&row, &map, &shared, &self.values)
                .map_err(|e| e.with_row(row.index))?
            {
                Some(record) => records.push(record),
                None => {
                    #[cfg(feature = "tracing")]
                    {
                        discarded += 1;
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sheet = %sheet,
            records = records.len(),
            discarded,
            "sheet parsed"
        );

        Ok(records)
    }

    /// Parse from an xlsx file on disk using the bundled backend.
    #[cfg(feature = "xlsx")]
    pub fn parse_path<T, P>(&self, path: P, sheet_name: Option<&str>) -> Result<Vec<T>, BindError>
    where
        T: Record,
        P: AsRef<Path>,
    {
        let mut backend =
            XlsxReader::open_path(path).map_err(|e| BindError::from_backend("xlsx", e))?;
        self.parse_with(&mut backend, sheet_name)
    }

    /// Parse from an open xlsx byte stream using the bundled backend.
    #[cfg(feature = "xlsx")]
    pub fn parse_reader<T>(
        &self,
        reader: Box<dyn Read + Send + Sync>,
        sheet_name: Option<&str>,
    ) -> Result<Vec<T>, BindError>
    where
        T: Record,
    {
        let mut backend =
            XlsxReader::open_reader(reader).map_err(|e| BindError::from_backend("xlsx", e))?;
        self.parse_with(&mut backend, sheet_name)
    }
}
