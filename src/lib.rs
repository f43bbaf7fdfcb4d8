//! Map spreadsheet rows onto typed records.
//!
//! The first row of a worksheet is treated as the header: each header cell
//! yields a column-identifier → property-name entry after passing through
//! an ordered pipeline of name interceptors. Every following row is bound
//! onto a fresh record: cell values are resolved (shared-string
//! indirection, boolean decoding), folded through the value-interceptor
//! pipeline and stored on the property the column maps to. Rows where
//! every bound property ends up at its default value are dropped.
//!
//! ```no_run
//! use sheetbind::{SheetMapper, TrimNames, bind_record};
//!
//! bind_record! {
//!     struct Person {
//!         "FirstName" => first_name: String,
//!         "Age" => age: i64,
//!     }
//! }
//!
//! let mapper = SheetMapper::new().with_name_interceptor(TrimNames);
//! let people: Vec<Person> = mapper.parse_path("people.xlsx", None)?;
//! # Ok::<(), sheetbind::BindError>(())
//! ```

pub mod backends;
pub mod binder;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod traits;
pub mod value;

#[cfg(feature = "xlsx")]
pub use backends::{XlsxError, XlsxReader};
pub use binder::{ColumnMap, bind_row};
pub use error::{BindError, BoxError};
pub use mapper::SheetMapper;
pub use pipeline::{Interceptor, NameInterceptor, Pipeline, TrimNames, ValueInterceptor};
pub use record::{FieldType, PropertyMeta, Record, ValueType};
pub use resolve::{column_name, column_of, resolve_cell};
pub use traits::{CellKind, RawCell, RowData, SheetReader};
pub use value::CellValue;
