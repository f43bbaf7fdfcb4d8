use std::io::Read;
use std::path::Path;

/// Type tag carried by a raw cell.
///
/// `Inline` covers untagged cells as well: inline numbers, inline strings
/// and formula results all resolve to their text payload unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(Default)]
pub enum CellKind {
    Boolean,
    SharedString,
    #[default]
    Inline,
}

/// A cell exactly as the document stores it: address, unresolved text
/// payload and type tag. Shared-string indirection and boolean decoding
/// happen later, in the resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCell {
    /// A1-style reference, e.g. `"C7"`.
    pub reference: String,
    /// Raw text payload; `None` when the cell has no value element.
    pub text: Option<String>,
    pub kind: CellKind,
}

impl RawCell {
    pub fn new(reference: impl Into<String>, text: Option<String>, kind: CellKind) -> Self {
        Self {
            reference: reference.into(),
            text,
            kind,
        }
    }

    /// An inline (untagged) cell with a text payload.
    pub fn inline(reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(reference, Some(text.into()), CellKind::Inline)
    }

    /// A cell storing an index into the shared-string table.
    pub fn shared(reference: impl Into<String>, index: usize) -> Self {
        Self::new(reference, Some(index.to_string()), CellKind::SharedString)
    }

    /// A boolean-tagged cell (`"1"`/`"0"` payload, as xlsx stores them).
    pub fn boolean(reference: impl Into<String>, flag: bool) -> Self {
        let text = if flag { "1" } else { "0" };
        Self::new(reference, Some(text.to_string()), CellKind::Boolean)
    }

    /// A cell with no value payload.
    pub fn empty(reference: impl Into<String>) -> Self {
        Self::new(reference, None, CellKind::Inline)
    }
}

/// One worksheet row in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowData {
    /// 1-based document row number, used for error context.
    pub index: u32,
    pub cells: Vec<RawCell>,
}

impl RowData {
    pub fn new(index: u32, cells: Vec<RawCell>) -> Self {
        Self { index, cells }
    }
}

/// Read-only document reader boundary.
///
/// Implementations expose worksheet enumeration, per-sheet rows in document
/// order and the workbook shared-string table. The mapper never mutates the
/// document. `&mut self` on the read methods leaves room for backends that
/// decode parts lazily.
pub trait SheetReader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_reader(reader: Box<dyn Read + Send + Sync>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Worksheet names in document order.
    fn sheet_names(&self) -> Result<Vec<String>, Self::Error>;

    /// The workbook shared-string table. A workbook without one reports an
    /// empty table, not an error.
    fn shared_strings(&mut self) -> Result<Vec<String>, Self::Error>;

    /// All rows of the named sheet, in document order.
    fn read_rows(&mut self, sheet: &str) -> Result<Vec<RowData>, Self::Error>;
}
