//! Excel workbook reader.

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

use crate::parser::table::normalize_header;
use crate::types::{RawTable, RawValue};

/// Read one worksheet of a workbook into a [`RawTable`].
///
/// `sheet` is matched against the sheet names first and then tried as a
/// zero-based index. `None` selects the first sheet.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let names = workbook.sheet_names();
    let name = select_sheet(&names, sheet)
        .with_context(|| format!("Failed to pick a sheet in {}", path.display()))?
        .to_string();
    debug!("Reading sheet '{}' of {}", name, path.display());

    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("Failed to read sheet '{}' of {}", name, path.display()))?;

    Ok(table_from_range(&range))
}

fn select_sheet<'a>(names: &'a [String], sheet: Option<&str>) -> Result<&'a str> {
    let Some(wanted) = sheet else {
        return match names.first() {
            Some(first) => Ok(first),
            None => bail!("Workbook has no sheets"),
        };
    };

    let by_name = names.iter().find(|n| n.as_str() == wanted);
    let by_index = || wanted.parse::<usize>().ok().and_then(|i| names.get(i));
    match by_name.or_else(by_index) {
        Some(name) => Ok(name),
        None => bail!(
            "Sheet '{}' not found. Available sheets: {}",
            wanted,
            names.join(", ")
        ),
    }
}

/// Convert a workbook cell. Text goes through the same sentinel check as
/// delimited input; error cells read as missing.
pub fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Missing,
        Data::String(s) => RawValue::from_cell(s),
        Data::Int(n) => RawValue::Int(*n),
        Data::Float(x) => RawValue::Float(*x),
        other => RawValue::Text(other.to_string()),
    }
}

fn table_from_range(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| normalize_header(&cell.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{coerce_coordinate, normalize_chrom};
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();

        let notes = workbook.add_worksheet();
        notes.set_name("notes").unwrap();
        notes.write_string(0, 0, "exported from the lab sheet").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("transcripts").unwrap();
        for (col, name) in ["transcript", "chrom", "strand", "start", "end"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "T1").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        sheet.write_string(1, 2, "+").unwrap();
        sheet.write_number(1, 3, 1000.0).unwrap();
        sheet.write_number(1, 4, 2000.0).unwrap();
        sheet.write_string(2, 0, "T2").unwrap();
        sheet.write_string(2, 1, "chrX").unwrap();
        sheet.write_string(2, 2, "NA").unwrap();
        sheet.write_number(2, 4, 50.0).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_named_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.xlsx");
        write_fixture(&path);

        let table = read_workbook(&path, Some("transcripts")).unwrap();
        assert_eq!(table.headers(), &["transcript", "chrom", "strand", "start", "end"]);
        assert_eq!(table.len(), 2);

        let first = table.row(0).unwrap();
        assert_eq!(first.get("transcript"), Some(&RawValue::Text("T1".into())));
        assert_eq!(normalize_chrom(first.get("chrom").unwrap()), Some("chr1".into()));
        assert_eq!(coerce_coordinate(first.get("start").unwrap()), Some(Some(1000)));

        let second = table.row(1).unwrap();
        assert_eq!(second.get("strand"), Some(&RawValue::Missing));
        assert_eq!(second.get("start"), Some(&RawValue::Missing));
    }

    #[test]
    fn test_sheet_by_index_and_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.xlsx");
        write_fixture(&path);

        let by_index = read_workbook(&path, Some("1")).unwrap();
        assert_eq!(by_index.len(), 2);

        let first = read_workbook(&path, None).unwrap();
        assert_eq!(first.headers(), &["exported from the lab sheet"]);
        assert!(first.is_empty());
    }

    #[test]
    fn test_unknown_sheet_lists_available() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.xlsx");
        write_fixture(&path);

        let err = read_workbook(&path, Some("missing")).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("Sheet 'missing' not found"));
        assert!(msg.contains("notes, transcripts"));
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Empty), RawValue::Missing);
        assert_eq!(cell_value(&Data::String("NaN".into())), RawValue::Missing);
        assert_eq!(cell_value(&Data::String("-".into())), RawValue::Text("-".into()));
        assert_eq!(cell_value(&Data::Int(7)), RawValue::Int(7));
        assert_eq!(cell_value(&Data::Float(1.5)), RawValue::Float(1.5));
        assert_eq!(cell_value(&Data::Bool(true)), RawValue::Text("true".into()));
    }
}
