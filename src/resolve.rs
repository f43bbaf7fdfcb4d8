//! Cell value resolution and cell-reference helpers.

use crate::error::BindError;
use crate::traits::{CellKind, RawCell};

/// Extract the column identifier from an A1-style reference: the maximal
/// leading run of ASCII letters (`"AB7"` → `"AB"`). Case-sensitive; the
/// identifier is taken verbatim from the document.
pub fn column_of(reference: &str) -> Result<&str, BindError> {
    let end = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    if end == 0 {
        return Err(BindError::MalformedCellReference {
            reference: reference.to_string(),
        });
    }
    Ok(&reference[..end])
}

/// Column letters for a 0-based column index (0 → `"A"`, 26 → `"AA"`).
pub fn column_name(mut col: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    // Only ASCII uppercase bytes are ever pushed.
    String::from_utf8(letters).unwrap_or_default()
}

/// Resolve a raw cell to its canonical string value.
///
/// `Ok(None)` means absence, which is distinct from an empty string and is
/// returned for any cell without a text payload regardless of its type tag.
/// Boolean-tagged cells resolve to the words `"True"`/`"False"` so that
/// downstream interceptors keep operating on strings.
pub fn resolve_cell(cell: &RawCell, shared: &[String]) -> Result<Option<String>, BindError> {
    let Some(text) = cell.text.as_deref() else {
        return Ok(None);
    };
    match cell.kind {
        CellKind::Boolean => {
            let word = if text == "0" { "False" } else { "True" };
            Ok(Some(word.to_string()))
        }
        CellKind::SharedString => {
            let index: usize =
                text.trim()
                    .parse()
                    .map_err(|_| BindError::InvalidSharedStringIndex {
                        reference: cell.reference.clone(),
                        raw: text.to_string(),
                    })?;
            let entry =
                shared
                    .get(index)
                    .ok_or_else(|| BindError::SharedStringIndexOutOfRange {
                        reference: cell.reference.clone(),
                        index,
                        len: shared.len(),
                    })?;
            Ok(Some(entry.clone()))
        }
        CellKind::Inline => Ok(Some(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_table() -> Vec<String> {
        vec!["Alpha".to_string(), "Beta".to_string()]
    }

    #[test]
    fn column_of_strips_trailing_digits() {
        assert_eq!(column_of("A1").unwrap(), "A");
        assert_eq!(column_of("AB12").unwrap(), "AB");
        assert_eq!(column_of("XFD1048576").unwrap(), "XFD");
    }

    #[test]
    fn column_of_rejects_missing_letters() {
        assert!(matches!(
            column_of("42").unwrap_err(),
            BindError::MalformedCellReference { reference } if reference == "42"
        ));
        assert!(matches!(
            column_of("").unwrap_err(),
            BindError::MalformedCellReference { .. }
        ));
    }

    #[test]
    fn column_name_round_trips_boundaries() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn absent_payload_resolves_to_none() {
        let cell = RawCell::empty("A1");
        assert_eq!(resolve_cell(&cell, &shared_table()).unwrap(), None);
        // Absence wins over the type tag.
        let tagged = RawCell::new("B1", None, CellKind::Boolean);
        assert_eq!(resolve_cell(&tagged, &shared_table()).unwrap(), None);
    }

    #[test]
    fn boolean_zero_is_false_everything_else_true() {
        let falsy = RawCell::boolean("A1", false);
        assert_eq!(
            resolve_cell(&falsy, &[]).unwrap(),
            Some("False".to_string())
        );
        let truthy = RawCell::boolean("A2", true);
        assert_eq!(
            resolve_cell(&truthy, &[]).unwrap(),
            Some("True".to_string())
        );
        let odd = RawCell::new("A3", Some("yes".to_string()), CellKind::Boolean);
        assert_eq!(resolve_cell(&odd, &[]).unwrap(), Some("True".to_string()));
    }

    #[test]
    fn shared_string_resolves_by_index() {
        let cell = RawCell::shared("C2", 1);
        assert_eq!(
            resolve_cell(&cell, &shared_table()).unwrap(),
            Some("Beta".to_string())
        );
    }

    #[test]
    fn shared_string_out_of_range_names_cell() {
        let cell = RawCell::shared("C2", 5);
        let err = resolve_cell(&cell, &shared_table()).unwrap_err();
        match err {
            BindError::SharedStringIndexOutOfRange {
                reference,
                index,
                len,
            } => {
                assert_eq!(reference, "C2");
                assert_eq!(index, 5);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shared_string_garbage_index_is_rejected() {
        let cell = RawCell::new("D4", Some("x".to_string()), CellKind::SharedString);
        assert!(matches!(
            resolve_cell(&cell, &shared_table()).unwrap_err(),
            BindError::InvalidSharedStringIndex { .. }
        ));
    }

    #[test]
    fn inline_text_passes_through() {
        let cell = RawCell::inline("A1", "42.5");
        assert_eq!(resolve_cell(&cell, &[]).unwrap(), Some("42.5".to_string()));
    }
}
