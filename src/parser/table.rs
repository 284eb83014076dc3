//! Table reader with gzip and workbook support.
//!
//! Reads CSV, TSV or Excel transcript tables into a [`RawTable`]. The first
//! record is the header; text cells are kept as text except for missing-value
//! sentinels.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::parser::excel::read_workbook;
use crate::parser::util::{create_buffered_reader, is_gzipped};
use crate::types::{RawTable, RawValue};

/// Layout of an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    /// Pick the format from the file extension, looking through a trailing `.gz`.
    ///
    /// `.tsv`, `.tab` and `.txt` are tab-separated, `.xlsx`/`.xlsm`/`.xls`/`.ods`
    /// are workbooks, and everything else is read as CSV.
    pub fn from_path(path: &Path) -> Result<Self> {
        let inner = if is_gzipped(path) {
            Path::new(path.file_stem().unwrap_or_default())
        } else {
            path
        };
        let ext = inner
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let format = match ext.as_str() {
            "tsv" | "tab" | "txt" => TableFormat::Tsv,
            "xlsx" | "xlsm" | "xls" | "ods" => TableFormat::Excel,
            _ => TableFormat::Csv,
        };
        if format == TableFormat::Excel && is_gzipped(path) {
            bail!("Compressed workbooks are not supported: {}", path.display());
        }
        Ok(format)
    }

    /// Field separator, or `None` for workbooks.
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            TableFormat::Csv => Some(b','),
            TableFormat::Tsv => Some(b'\t'),
            TableFormat::Excel => None,
        }
    }
}

pub(crate) fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a table file (supports .gz and Excel workbooks).
///
/// `sheet` picks a worksheet by name or zero-based index and only applies to
/// workbooks; the first sheet is used when it is `None`.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let format = TableFormat::from_path(path)?;
    if format == TableFormat::Excel {
        return read_workbook(path, sheet);
    }
    if let Some(sheet) = sheet {
        warn!("Ignoring sheet '{}' for delimited file {}", sheet, path.display());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open table file: {}", path.display()))?;
    let reader = create_buffered_reader(file, path);

    read_table_from(reader, format)
        .with_context(|| format!("Failed to read table: {}", path.display()))
}

/// Read a delimited table from any reader.
///
/// Rows whose cells are all empty are kept; only fully empty lines are skipped.
pub fn read_table_from<R: Read>(reader: R, format: TableFormat) -> Result<RawTable> {
    let Some(delimiter) = format.delimiter() else {
        bail!("Workbooks can only be read from a file path");
    };
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read header line")?
        .iter()
        .map(normalize_header)
        .collect();

    let mut table = RawTable::new(headers);

    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read record {}", line + 1))?;
        table.push_row(record.iter().map(RawValue::from_cell).collect());
    }

    Ok(table)
}
