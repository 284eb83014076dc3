//! Record normalization.
//!
//! Turns raw table rows into [`CanonicalTranscript`] values. Every field goes
//! through an explicit validation step; a row that fails any of them is
//! dropped from the canonical set and counted, never reported as an error.

use std::fmt;

use tracing::debug;

use crate::columns::ColumnMapping;
use crate::error::ConfigError;
use crate::types::{CanonicalTranscript, RawRow, RawTable, RawValue, Role, Strand};

static MISSING: RawValue = RawValue::Missing;

/// Why a row was left out of the canonical set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowRejection {
    MissingChrom,
    MissingStrand,
    InvalidStrand,
    MissingStart,
    InvalidStart,
    MissingEnd,
    InvalidEnd,
}

impl RowRejection {
    pub const ALL: [RowRejection; 7] = [
        RowRejection::MissingChrom,
        RowRejection::MissingStrand,
        RowRejection::InvalidStrand,
        RowRejection::MissingStart,
        RowRejection::InvalidStart,
        RowRejection::MissingEnd,
        RowRejection::InvalidEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowRejection::MissingChrom => "missing chromosome",
            RowRejection::MissingStrand => "missing strand",
            RowRejection::InvalidStrand => "invalid strand",
            RowRejection::MissingStart => "missing start",
            RowRejection::InvalidStart => "invalid start",
            RowRejection::MissingEnd => "missing end",
            RowRejection::InvalidEnd => "invalid end",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of dropped rows per rejection reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    counts: [usize; 7],
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RowRejection) {
        self.counts[reason.slot()] += 1;
    }

    pub fn get(&self, reason: RowRejection) -> usize {
        self.counts[reason.slot()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Reasons with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (RowRejection, usize)> + '_ {
        RowRejection::ALL
            .into_iter()
            .map(move |r| (r, self.get(r)))
            .filter(|(_, n)| *n > 0)
    }
}

/// The canonical transcripts of one input table.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSet {
    /// Valid records, in original row order.
    pub records: Vec<CanonicalTranscript>,
    /// Number of rows in the source table.
    pub total_rows: usize,
    pub rejections: RejectionCounts,
}

impl TranscriptSet {
    /// Rows that did not make it into the canonical set.
    pub fn dropped(&self) -> usize {
        self.total_rows - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize a chromosome label.
///
/// Labels already starting with `chr` are kept, `M`/`MT` become `chrM`, and
/// anything else gets a `chr` prefix. Missing or blank values yield `None`.
pub fn normalize_chrom(value: &RawValue) -> Option<String> {
    let text = match value {
        RawValue::Missing => return None,
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Int(n) => n.to_string(),
        RawValue::Float(x) => match float_to_i64(*x) {
            Some(n) => n.to_string(),
            None if x.is_finite() => x.to_string(),
            None => return None,
        },
    };

    if text.is_empty() {
        return None;
    }
    if text.starts_with("chr") {
        return Some(text);
    }
    let upper = text.to_uppercase();
    if upper == "M" || upper == "MT" {
        return Some("chrM".to_string());
    }
    Some(format!("chr{}", text))
}

/// Coerce a coordinate cell to an integer.
///
/// Integral floats (`"1000.0"`) are accepted; fractional or non-numeric
/// values are not. The outer `Option` is `None` for missing cells.
pub fn coerce_coordinate(value: &RawValue) -> Option<Option<i64>> {
    match value {
        RawValue::Missing => None,
        RawValue::Int(n) => Some(Some(*n)),
        RawValue::Float(x) => Some(float_to_i64(*x)),
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(n) = s.parse::<i64>() {
                return Some(Some(n));
            }
            Some(s.parse::<f64>().ok().and_then(float_to_i64))
        }
    }
}

fn float_to_i64(x: f64) -> Option<i64> {
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

/// Validate a strand cell.
///
/// Surrounding whitespace is ignored, so `" - "` reads as `-`.
pub fn parse_strand(value: &RawValue) -> Result<Strand, RowRejection> {
    match value {
        RawValue::Missing => Err(RowRejection::MissingStrand),
        RawValue::Text(s) if s.trim().is_empty() => Err(RowRejection::MissingStrand),
        RawValue::Text(s) => s.trim().parse().map_err(|_| RowRejection::InvalidStrand),
        RawValue::Int(_) | RawValue::Float(_) => Err(RowRejection::InvalidStrand),
    }
}

fn transcript_id(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Column positions for each role, resolved once per table.
#[derive(Debug, Clone, Copy)]
struct ResolvedColumns([usize; 5]);

impl ResolvedColumns {
    fn new(table: &RawTable, mapping: &ColumnMapping) -> Result<Self, ConfigError> {
        let mut positions = [0usize; 5];
        for (slot, role) in positions.iter_mut().zip(Role::ALL) {
            let column = mapping.column(role);
            *slot = table
                .column_index(column)
                .ok_or_else(|| ConfigError::UnknownColumn {
                    column: column.to_string(),
                    available: table.headers().to_vec(),
                })?;
        }
        Ok(ResolvedColumns(positions))
    }

    fn position(&self, role: Role) -> usize {
        self.0[role as usize]
    }
}

fn build_record<'a, F>(row_index: usize, field: F) -> Result<CanonicalTranscript, RowRejection>
where
    F: Fn(Role) -> &'a RawValue,
{
    let start = coerce_coordinate(field(Role::Start))
        .ok_or(RowRejection::MissingStart)?
        .ok_or(RowRejection::InvalidStart)?;
    let end = coerce_coordinate(field(Role::End))
        .ok_or(RowRejection::MissingEnd)?
        .ok_or(RowRejection::InvalidEnd)?;
    let chrom = normalize_chrom(field(Role::Chrom)).ok_or(RowRejection::MissingChrom)?;
    let strand = parse_strand(field(Role::Strand))?;

    Ok(CanonicalTranscript::new(
        row_index,
        transcript_id(field(Role::Transcript)),
        chrom,
        strand,
        start,
        end,
    ))
}

/// Validate a single row against a mapping.
///
/// A mapped column that the row's table lacks is treated as a missing value.
pub fn validate_row(
    row_index: usize,
    row: &RawRow<'_>,
    mapping: &ColumnMapping,
) -> Result<CanonicalTranscript, RowRejection> {
    build_record(row_index, |role| {
        row.get(mapping.column(role)).unwrap_or(&MISSING)
    })
}

/// Normalize every row of a table.
///
/// Fails only when the mapping names a column the table does not have.
pub fn normalize(table: &RawTable, mapping: &ColumnMapping) -> Result<TranscriptSet, ConfigError> {
    let cols = ResolvedColumns::new(table, mapping)?;

    let mut set = TranscriptSet {
        records: Vec::with_capacity(table.len()),
        total_rows: table.len(),
        rejections: RejectionCounts::default(),
    };

    for (idx, row) in table.rows().enumerate() {
        let field = |role: Role| row.at(cols.position(role)).unwrap_or(&MISSING);
        match build_record(idx, field) {
            Ok(record) => set.records.push(record),
            Err(reason) => set.rejections.record(reason),
        }
    }

    debug!(
        total = set.total_rows,
        kept = set.records.len(),
        dropped = set.dropped(),
        "normalized transcript table"
    );
    for (reason, n) in set.rejections.iter() {
        debug!("{} rows dropped: {}", n, reason);
    }

    Ok(set)
}
