//! Two-way TES overlap detection.
//!
//! Each direction queries the other side's immutable index, so the two
//! directions (and the queries within one) run without any locking.

use rayon::prelude::*;
use tracing::debug;

use crate::matcher::index::TesIndex;
use crate::normalize::TranscriptSet;
use crate::types::CanonicalTranscript;

/// Flag every source record that has a target TES within `tol` bp.
///
/// The result is aligned with `source`, not with the original table rows.
pub fn compute_overlap<'a>(
    source: &'a [CanonicalTranscript],
    target: &TesIndex<'a>,
    tol: i64,
) -> Vec<bool> {
    source
        .par_iter()
        .map(|record| target.query(&record.locus(), record.tes, tol))
        .collect()
}

/// Expand record-aligned hits back to the row order of the source table.
///
/// Rows that were dropped during normalization come out as `false`.
pub fn scatter(set: &TranscriptSet, hits: &[bool]) -> Vec<bool> {
    let mut rows = vec![false; set.total_rows];
    for (record, hit) in set.records.iter().zip(hits) {
        rows[record.row] = *hit;
    }
    rows
}

/// Result of comparing two transcript tables in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Per row of A: some B transcript has a TES within tolerance.
    pub a_found_in_b: Vec<bool>,
    /// Per row of B: some A transcript has a TES within tolerance.
    pub b_found_in_a: Vec<bool>,
    pub tolerance: i64,
}

impl Comparison {
    /// Number of A rows with a match in B.
    pub fn a_matched(&self) -> usize {
        self.a_found_in_b.iter().filter(|hit| **hit).count()
    }

    /// Number of B rows with a match in A.
    pub fn b_matched(&self) -> usize {
        self.b_found_in_a.iter().filter(|hit| **hit).count()
    }
}

/// One direction: index `target` and look up every record of `source`.
fn one_direction(source: &TranscriptSet, target: &TranscriptSet, tol: i64) -> Vec<bool> {
    let index = TesIndex::from_records(&target.records);
    debug!(
        groups = index.group_count(),
        values = index.len(),
        "built TES index"
    );
    let hits = compute_overlap(&source.records, &index, tol);
    scatter(source, &hits)
}

/// Compare two transcript sets in both directions with a shared tolerance.
pub fn compare(a: &TranscriptSet, b: &TranscriptSet, tol: i64) -> Comparison {
    let (a_found_in_b, b_found_in_a) =
        rayon::join(|| one_direction(a, b, tol), || one_direction(b, a, tol));

    Comparison {
        a_found_in_b,
        b_found_in_a,
        tolerance: tol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn tx(row: usize, chrom: &str, strand: Strand, start: i64, end: i64) -> CanonicalTranscript {
        CanonicalTranscript::new(row, format!("T{}", row), chrom.to_string(), strand, start, end)
    }

    #[test]
    fn test_compute_overlap_aligned_with_source() {
        let target = vec![tx(0, "chr1", Strand::Positive, 0, 500)];
        let index = TesIndex::from_records(&target);
        let source = vec![
            tx(0, "chr1", Strand::Positive, 0, 450),
            tx(1, "chr1", Strand::Positive, 0, 700),
            tx(2, "chr1", Strand::Negative, 500, 900),
        ];
        assert_eq!(compute_overlap(&source, &index, 50), vec![true, false, false]);
    }

    #[test]
    fn test_scatter_fills_dropped_rows() {
        let set = TranscriptSet {
            records: vec![
                tx(1, "chr1", Strand::Positive, 0, 10),
                tx(3, "chr1", Strand::Positive, 0, 10),
            ],
            total_rows: 5,
            ..TranscriptSet::default()
        };
        assert_eq!(
            scatter(&set, &[true, true]),
            vec![false, true, false, true, false]
        );
    }

    #[test]
    fn test_compare_empty_sets() {
        let empty = TranscriptSet::default();
        let one = TranscriptSet {
            records: vec![tx(0, "chr1", Strand::Positive, 0, 10)],
            total_rows: 1,
            ..TranscriptSet::default()
        };
        let result = compare(&one, &empty, 100);
        assert_eq!(result.a_found_in_b, vec![false]);
        assert!(result.b_found_in_a.is_empty());
        assert_eq!(result.a_matched(), 0);
        assert_eq!(result.b_matched(), 0);
    }
}
