//! Core data structures for tesmatch.
//!
//! This module contains the raw tabular representation supplied by the
//! readers and the canonical transcript record the matcher works on.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+' or '-'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
        }
    }

    /// Pick the 3' terminal coordinate of a feature spanning `start..=end`.
    pub fn tes(&self, start: i64, end: i64) -> i64 {
        match self {
            Strand::Positive => end,
            Strand::Negative => start,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cell values treated as absent when reading delimited text.
pub const MISSING_SENTINELS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// A single scalar cell of an input table.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawValue {
    /// Build a value from a text cell, mapping missing-value sentinels to `Missing`.
    pub fn from_cell(cell: &str) -> Self {
        if MISSING_SENTINELS.contains(&cell.trim()) {
            RawValue::Missing
        } else {
            RawValue::Text(cell.to_string())
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Missing => Ok(()),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Int(n) => write!(f, "{}", n),
            RawValue::Float(x) => write!(f, "{}", x),
        }
    }
}

/// An input table with no fixed schema.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    /// Header name -> column position. The first occurrence of a duplicated header wins.
    lookup: IndexMap<String, usize>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Create an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        let mut lookup = IndexMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            lookup.entry(name.clone()).or_insert(idx);
        }
        RawTable {
            headers,
            lookup,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.headers.len(), RawValue::Missing);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow a single row.
    pub fn row(&self, index: usize) -> Option<RawRow<'_>> {
        self.rows.get(index).map(|cells| RawRow { table: self, cells })
    }

    /// Iterate over rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |cells| RawRow { table: self, cells })
    }
}

/// A borrowed view of one table row addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    table: &'a RawTable,
    cells: &'a [RawValue],
}

impl<'a> RawRow<'a> {
    /// Value of the named column, `None` if the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a RawValue> {
        self.table
            .column_index(column)
            .and_then(|idx| self.cells.get(idx))
    }

    /// Value at a column position.
    pub fn at(&self, index: usize) -> Option<&'a RawValue> {
        self.cells.get(index)
    }

    pub fn cells(&self) -> &'a [RawValue] {
        self.cells
    }
}

/// The semantic columns a transcript table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Transcript,
    Chrom,
    Strand,
    Start,
    End,
}

/// Error type for parsing a role from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError;

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid role: expected one of transcript, chrom, strand, start, end"
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "transcript" => Ok(Role::Transcript),
            "chrom" => Ok(Role::Chrom),
            "strand" => Ok(Role::Strand),
            "start" => Ok(Role::Start),
            "end" => Ok(Role::End),
            _ => Err(ParseRoleError),
        }
    }
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 5] = [
        Role::Transcript,
        Role::Chrom,
        Role::Strand,
        Role::Start,
        Role::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Transcript => "transcript",
            Role::Chrom => "chrom",
            Role::Strand => "strand",
            Role::Start => "start",
            Role::End => "end",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grouping key for TES lookups: transcripts only match on the same chromosome and strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocusKey<'a> {
    pub chrom: &'a str,
    pub strand: Strand,
}

/// A validated transcript with its derived TES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTranscript {
    /// Position of the source row in its input table.
    pub row: usize,
    pub id: String,
    pub chrom: String,
    pub strand: Strand,
    pub start: i64,
    pub end: i64,
    pub tes: i64,
}

impl CanonicalTranscript {
    /// Create a transcript, deriving the TES from the strand.
    pub fn new(row: usize, id: String, chrom: String, strand: Strand, start: i64, end: i64) -> Self {
        CanonicalTranscript {
            row,
            id,
            chrom,
            strand,
            start,
            end,
            tes: strand.tes(start, end),
        }
    }

    pub fn locus(&self) -> LocusKey<'_> {
        LocusKey {
            chrom: &self.chrom,
            strand: self.strand,
        }
    }
}
