//! Bundled read-only xlsx document reader.
//!
//! Minimal OPC container walk: sheet names and part paths come from
//! `xl/workbook.xml` + `xl/_rels/workbook.xml.rels`, the shared-string
//! table from `xl/sharedStrings.xml` (rich-text runs concatenated,
//! phonetic runs skipped), and rows from the worksheet `sheetData`.
//! Shared-string indirection is deliberately left unresolved: cells are
//! surfaced raw, tagged with [`CellKind`], for the resolver to handle.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashMap;
use zip::ZipArchive;

use crate::resolve::column_name;
use crate::traits::{CellKind, RawCell, RowData, SheetReader};

/// Seekable byte source for the ZIP container.
pub trait ReadSeek: Read + Seek + Send + Sync {}
impl<T: Read + Seek + Send + Sync> ReadSeek for T {}

#[derive(Debug, thiserror::Error)]
pub enum XlsxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing workbook part '{0}'")]
    MissingPart(String),
    #[error("worksheet '{sheet}' references relationship '{rid}' which is not defined")]
    MissingRelationship { sheet: String, rid: String },
    #[error("unknown worksheet '{0}'")]
    UnknownSheet(String),
}

pub struct XlsxReader {
    archive: ZipArchive<Box<dyn ReadSeek>>,
    /// (sheet name, worksheet part path) in document order.
    sheets: Vec<(String, String)>,
    shared: Vec<String>,
}

impl XlsxReader {
    fn from_source(source: Box<dyn ReadSeek>) -> Result<Self, XlsxError> {
        let mut archive = ZipArchive::new(source)?;
        let sheets = read_workbook_sheets(&mut archive)?;
        let shared = read_shared_strings(&mut archive)?;
        Ok(Self {
            archive,
            sheets,
            shared,
        })
    }
}

impl SheetReader for XlsxReader {
    type Error = XlsxError;

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        Self::from_source(Box::new(File::open(path)?))
    }

    fn open_reader(mut reader: Box<dyn Read + Send + Sync>) -> Result<Self, Self::Error> {
        // ZIP central-directory reads need Seek, so drain the stream first.
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::open_bytes(data)
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_source(Box::new(Cursor::new(data)))
    }

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.sheets.iter().map(|(name, _)| name.clone()).collect())
    }

    fn shared_strings(&mut self) -> Result<Vec<String>, Self::Error> {
        Ok(self.shared.clone())
    }

    fn read_rows(&mut self, sheet: &str) -> Result<Vec<RowData>, Self::Error> {
        let part = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, part)| part.clone())
            .ok_or_else(|| XlsxError::UnknownSheet(sheet.to_string()))?;
        let xml = read_part(&mut self.archive, &part)?
            .ok_or_else(|| XlsxError::MissingPart(part.clone()))?;
        parse_sheet_rows(&xml)
    }
}

/// Read a ZIP entry into a string; `Ok(None)` when the part is absent.
fn read_part(
    archive: &mut ZipArchive<Box<dyn ReadSeek>>,
    name: &str,
) -> Result<Option<String>, XlsxError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_workbook_sheets(
    archive: &mut ZipArchive<Box<dyn ReadSeek>>,
) -> Result<Vec<(String, String)>, XlsxError> {
    let workbook = read_part(archive, "xl/workbook.xml")?
        .ok_or_else(|| XlsxError::MissingPart("xl/workbook.xml".to_string()))?;

    let mut reader = Reader::from_str(&workbook);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut declared: Vec<(String, String)> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rid = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = attr.unescape_value()?.into_owned(),
                        b"r:id" | b"id" => rid = attr.unescape_value()?.into_owned(),
                        _ => {}
                    }
                }
                declared.push((name, rid));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let rels = read_part(archive, "xl/_rels/workbook.xml.rels")?
        .ok_or_else(|| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".to_string()))?;
    let targets = read_relationships(&rels)?;

    let mut sheets = Vec::with_capacity(declared.len());
    for (name, rid) in declared {
        let target = targets
            .get(&rid)
            .ok_or_else(|| XlsxError::MissingRelationship {
                sheet: name.clone(),
                rid: rid.clone(),
            })?;
        // Targets are relative to xl/ unless they are package-absolute.
        let part = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{target}"),
        };
        sheets.push((name, part));
    }
    Ok(sheets)
}

fn read_relationships(xml: &str) -> Result<FxHashMap<String, String>, XlsxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut targets = FxHashMap::default();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value()?.into_owned(),
                        b"Target" => target = attr.unescape_value()?.into_owned(),
                        _ => {}
                    }
                }
                targets.insert(id, target);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

fn read_shared_strings(
    archive: &mut ZipArchive<Box<dyn ReadSeek>>,
) -> Result<Vec<String>, XlsxError> {
    // A workbook with only inline values has no sharedStrings part.
    let Some(xml) = read_part(archive, "xl/sharedStrings.xml")? else {
        return Ok(Vec::new());
    };

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" if current.is_some() => in_text = true,
                // Phonetic guide runs are not part of the displayed string.
                b"rPh" => {
                    reader.read_to_end_into(e.name(), &mut Vec::new())?;
                }
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(ref mut item) = current {
                    item.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(items)
}

struct PendingCell {
    reference: String,
    kind: CellKind,
    text: Option<String>,
}

fn pending_cell(e: &BytesStart<'_>, row: &RowData) -> Result<PendingCell, XlsxError> {
    let mut reference = None;
    let mut tag = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => reference = Some(attr.unescape_value()?.into_owned()),
            b"t" => tag = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    let reference = reference.unwrap_or_else(|| {
        // No explicit address: assume a dense row.
        format!("{}{}", column_name(row.cells.len() as u32), row.index)
    });
    Ok(PendingCell {
        reference,
        kind: cell_kind(tag.as_deref()),
        text: None,
    })
}

fn cell_kind(tag: Option<&str>) -> CellKind {
    match tag {
        Some("b") => CellKind::Boolean,
        Some("s") => CellKind::SharedString,
        // "n", "str", "inlineStr", "e" and untagged all pass through raw.
        _ => CellKind::Inline,
    }
}

fn parse_sheet_rows(xml: &str) -> Result<Vec<RowData>, XlsxError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<RowData> = Vec::new();
    let mut current_row: Option<RowData> = None;
    let mut last_index = 0u32;
    let mut cell: Option<PendingCell> = None;
    // Capturing inside <v> or an inline-string <t>; formula text is skipped.
    let mut capture = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            // Self-closing <row/> elements get no End event; flush any row
            // still open when the next one starts.
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                if let Some(prev) = current_row.take() {
                    rows.push(prev);
                }
                let mut index = None;
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r" {
                        index = attr.unescape_value()?.trim().parse::<u32>().ok();
                    }
                }
                let index = index.unwrap_or(last_index + 1);
                last_index = index;
                current_row = Some(RowData::new(index, Vec::new()));
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => {
                if let Some(row) = current_row.take() {
                    rows.push(row);
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let Some(row) = current_row.as_mut() else {
                    continue;
                };
                cell = Some(pending_cell(&e, row)?);
            }
            // A self-closing <c/> carries no payload at all.
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let Some(row) = current_row.as_mut() else {
                    continue;
                };
                let done = pending_cell(&e, row)?;
                row.cells
                    .push(RawCell::new(done.reference, done.text, done.kind));
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => {
                if let (Some(row), Some(done)) = (current_row.as_mut(), cell.take()) {
                    row.cells
                        .push(RawCell::new(done.reference, done.text, done.kind));
                }
                capture = false;
            }
            Event::Start(e)
                if cell.is_some() && matches!(e.local_name().as_ref(), b"v" | b"t") =>
            {
                capture = true;
            }
            Event::End(e) if matches!(e.local_name().as_ref(), b"v" | b"t") => {
                capture = false;
            }
            Event::Text(t) if capture => {
                if let Some(ref mut pending) = cell {
                    pending
                        .text
                        .get_or_insert_with(String::new)
                        .push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(row) = current_row.take() {
        rows.push(row);
    }

    Ok(rows)
}
