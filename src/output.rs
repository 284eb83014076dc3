//! Report writing for tesmatch results.
//!
//! A report holds each input table with an extra flag column, plus a small
//! summary table. It is written either as an Excel workbook with one sheet
//! per table or as a directory of tab-separated files.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::matcher::Comparison;
use crate::normalize::TranscriptSet;
use crate::types::{RawTable, RawValue};

/// File name of the annotated A table.
pub const A_REPORT_FILE: &str = "A_with_match_in_B.tsv";
/// File name of the annotated B table.
pub const B_REPORT_FILE: &str = "B_with_match_in_A.tsv";
/// File name of the summary table.
pub const SUMMARY_FILE: &str = "summary.tsv";

/// Sheet names of the workbook report.
pub const A_SHEET: &str = "A_with_match_in_B";
pub const B_SHEET: &str = "B_with_match_in_A";
pub const SUMMARY_SHEET: &str = "summary";

/// Flag column appended to table A.
pub const A_FLAG_COLUMN: &str = "TES_found_in_B";
/// Flag column appended to table B.
pub const B_FLAG_COLUMN: &str = "TES_found_in_A";

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub a_matched: usize,
    pub b_matched: usize,
    pub tolerance: i64,
    pub a_dropped: usize,
    pub b_dropped: usize,
}

impl Summary {
    pub fn new(comparison: &Comparison, a: &TranscriptSet, b: &TranscriptSet) -> Self {
        Summary {
            a_matched: comparison.a_matched(),
            b_matched: comparison.b_matched(),
            tolerance: comparison.tolerance,
            a_dropped: a.dropped(),
            b_dropped: b.dropped(),
        }
    }

    /// `(metric, value)` rows of the summary table.
    pub fn metrics(&self) -> [(&'static str, i64); 5] {
        [
            ("A TES matched in B", self.a_matched as i64),
            ("B TES matched in A", self.b_matched as i64),
            ("tolerance_bp", self.tolerance),
            ("A rows dropped", self.a_dropped as i64),
            ("B rows dropped", self.b_dropped as i64),
        ]
    }

    /// Human-readable summary lines.
    pub fn lines(&self) -> [String; 2] {
        [
            format!(
                "File A has {} transcripts whose TES overlaps (±{} bp) with File B.",
                self.a_matched, self.tolerance
            ),
            format!(
                "File B has {} transcripts whose TES overlaps (±{} bp) with File A.",
                self.b_matched, self.tolerance
            ),
        ]
    }
}

/// Write `table` with an extra flag column; `flags` must be aligned with its rows.
pub fn write_annotated<W: Write>(
    writer: W,
    table: &RawTable,
    flags: &[bool],
    flag_column: &str,
    found_label: &str,
) -> Result<()> {
    let mut out = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut header: Vec<&str> = table.headers().iter().map(String::as_str).collect();
    header.push(flag_column);
    out.write_record(&header)?;

    for (row, found) in table.rows().zip(flags) {
        let mut record: Vec<String> = row.cells().iter().map(ToString::to_string).collect();
        record.push(if *found { found_label.to_string() } else { String::new() });
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Write the summary table.
pub fn write_summary<W: Write>(writer: W, summary: &Summary) -> Result<()> {
    let mut out = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    out.write_record(["metric", "value"])?;
    for (metric, value) in summary.metrics() {
        out.write_record([metric, value.to_string().as_str()])?;
    }

    out.flush()?;
    Ok(())
}

fn create_file(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write the full report into `dir`, creating it if needed.
pub fn write_report(
    dir: &Path,
    table_a: &RawTable,
    table_b: &RawTable,
    comparison: &Comparison,
    summary: &Summary,
    found_label: &str,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    write_annotated(
        create_file(dir, A_REPORT_FILE)?,
        table_a,
        &comparison.a_found_in_b,
        A_FLAG_COLUMN,
        found_label,
    )?;
    write_annotated(
        create_file(dir, B_REPORT_FILE)?,
        table_b,
        &comparison.b_found_in_a,
        B_FLAG_COLUMN,
        found_label,
    )?;
    write_summary(create_file(dir, SUMMARY_FILE)?, summary)?;

    Ok(())
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).context("Too many columns for a worksheet")
}

fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index).context("Too many rows for a worksheet")
}

/// Fill a worksheet with `table` plus a flag column. Numeric cells stay numeric.
fn write_annotated_sheet(
    sheet: &mut Worksheet,
    table: &RawTable,
    flags: &[bool],
    flag_column: &str,
    found_label: &str,
) -> Result<()> {
    let flag_col = column_number(table.headers().len())?;
    for (col, name) in table.headers().iter().enumerate() {
        sheet.write_string(0, column_number(col)?, name)?;
    }
    sheet.write_string(0, flag_col, flag_column)?;

    for (idx, (row, found)) in table.rows().zip(flags).enumerate() {
        let r = row_number(idx + 1)?;
        for (col, cell) in row.cells().iter().enumerate() {
            let c = column_number(col)?;
            match cell {
                RawValue::Missing => {}
                RawValue::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                RawValue::Int(n) => {
                    sheet.write_number(r, c, *n as f64)?;
                }
                RawValue::Float(x) => {
                    sheet.write_number(r, c, *x)?;
                }
            }
        }
        if *found {
            sheet.write_string(r, flag_col, found_label)?;
        }
    }
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, summary: &Summary) -> Result<()> {
    sheet.write_string(0, 0, "metric")?;
    sheet.write_string(0, 1, "value")?;
    for (idx, (metric, value)) in summary.metrics().into_iter().enumerate() {
        let r = row_number(idx + 1)?;
        sheet.write_string(r, 0, metric)?;
        sheet.write_number(r, 1, value as f64)?;
    }
    Ok(())
}

/// Write the full report as a workbook with one sheet per table.
pub fn write_workbook(
    path: &Path,
    table_a: &RawTable,
    table_b: &RawTable,
    comparison: &Comparison,
    summary: &Summary,
    found_label: &str,
) -> Result<()> {
    let mut workbook = Workbook::new();

    write_annotated_sheet(
        workbook.add_worksheet().set_name(A_SHEET)?,
        table_a,
        &comparison.a_found_in_b,
        A_FLAG_COLUMN,
        found_label,
    )?;
    write_annotated_sheet(
        workbook.add_worksheet().set_name(B_SHEET)?,
        table_b,
        &comparison.b_found_in_a,
        B_FLAG_COLUMN,
        found_label,
    )?;
    write_summary_sheet(workbook.add_worksheet().set_name(SUMMARY_SHEET)?, summary)?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))?;
    Ok(())
}

/// True when `path` should receive a workbook rather than a TSV directory.
pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

/// Write the report as a workbook when `path` ends in `.xlsx`, otherwise as
/// a directory of TSV files.
pub fn write_results(
    path: &Path,
    table_a: &RawTable,
    table_b: &RawTable,
    comparison: &Comparison,
    summary: &Summary,
    found_label: &str,
) -> Result<()> {
    if is_workbook_path(path) {
        write_workbook(path, table_a, table_b, comparison, summary, found_label)
    } else {
        write_report(path, table_a, table_b, comparison, summary, found_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::TempDir;

    fn small_table() -> RawTable {
        let mut table = RawTable::new(vec!["transcript".into(), "start".into()]);
        table.push_row(vec![RawValue::Text("A1".into()), RawValue::Int(10)]);
        table.push_row(vec![RawValue::Text("A2".into()), RawValue::Missing]);
        table
    }

    #[test]
    fn test_write_annotated() {
        let mut output = Vec::new();
        write_annotated(&mut output, &small_table(), &[true, false], A_FLAG_COLUMN, "Found").unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "transcript\tstart\tTES_found_in_B");
        assert_eq!(lines[1], "A1\t10\tFound");
        assert_eq!(lines[2], "A2\t\t");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_summary() {
        let summary = Summary {
            a_matched: 2,
            b_matched: 3,
            tolerance: 100,
            a_dropped: 1,
            b_dropped: 0,
        };
        let mut output = Vec::new();
        write_summary(&mut output, &summary).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("metric\tvalue\n"));
        assert!(text.contains("A TES matched in B\t2\n"));
        assert!(text.contains("B TES matched in A\t3\n"));
        assert!(text.contains("tolerance_bp\t100\n"));
        assert!(text.contains("A rows dropped\t1\n"));
    }

    #[test]
    fn test_summary_lines() {
        let summary = Summary {
            a_matched: 2,
            b_matched: 1,
            tolerance: 50,
            a_dropped: 0,
            b_dropped: 0,
        };
        let [a, b] = summary.lines();
        assert_eq!(a, "File A has 2 transcripts whose TES overlaps (±50 bp) with File B.");
        assert_eq!(b, "File B has 1 transcripts whose TES overlaps (±50 bp) with File A.");
    }

    #[test]
    fn test_is_workbook_path() {
        assert!(is_workbook_path(Path::new("out.xlsx")));
        assert!(is_workbook_path(Path::new("dir/OUT.XLSX")));
        assert!(!is_workbook_path(Path::new("tes_overlap_results")));
        assert!(!is_workbook_path(Path::new("out.xls")));
    }

    #[test]
    fn test_write_workbook_sheets_and_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let table = small_table();
        let comparison = Comparison {
            a_found_in_b: vec![true, false],
            b_found_in_a: vec![false, false],
            tolerance: 100,
        };
        let summary = Summary {
            a_matched: 1,
            b_matched: 0,
            tolerance: 100,
            a_dropped: 0,
            b_dropped: 2,
        };

        write_results(&path, &table, &table, &comparison, &summary, "Found").unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![A_SHEET, B_SHEET, SUMMARY_SHEET]);

        let a = workbook.worksheet_range(A_SHEET).unwrap();
        assert_eq!(a.get_value((0, 2)), Some(&Data::String(A_FLAG_COLUMN.into())));
        assert_eq!(a.get_value((1, 1)), Some(&Data::Float(10.0)));
        assert_eq!(a.get_value((1, 2)), Some(&Data::String("Found".into())));
        assert_eq!(a.get_value((2, 1)), Some(&Data::Empty));
        assert_eq!(a.get_value((2, 2)), Some(&Data::Empty));

        let b = workbook.worksheet_range(B_SHEET).unwrap();
        assert_eq!(b.get_value((0, 2)), Some(&Data::String(B_FLAG_COLUMN.into())));

        let s = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        assert_eq!(s.get_value((1, 0)), Some(&Data::String("A TES matched in B".into())));
        assert_eq!(s.get_value((1, 1)), Some(&Data::Float(1.0)));
        assert_eq!(s.get_value((5, 1)), Some(&Data::Float(2.0)));
    }
}
