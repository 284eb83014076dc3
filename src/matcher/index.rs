//! Grouped window index.
//!
//! Values are partitioned by a discrete key and kept sorted within each
//! partition, so "is there any value in `[lo, hi]` for this key" costs two
//! binary searches.

use ahash::AHashMap;
use std::hash::Hash;

use crate::types::{CanonicalTranscript, LocusKey};

/// Sorted values grouped by an equality key.
#[derive(Debug, Clone)]
pub struct WindowIndex<K, V> {
    groups: AHashMap<K, Vec<V>>,
    len: usize,
}

impl<K, V> Default for WindowIndex<K, V> {
    fn default() -> Self {
        WindowIndex {
            groups: AHashMap::new(),
            len: 0,
        }
    }
}

impl<K, V> WindowIndex<K, V>
where
    K: Eq + Hash,
    V: Ord + Copy,
{
    /// Group `items` by `key_fn` and sort each group by `value_fn`.
    pub fn build<I, T, FK, FV>(items: I, key_fn: FK, value_fn: FV) -> Self
    where
        I: IntoIterator<Item = T>,
        FK: Fn(&T) -> K,
        FV: Fn(&T) -> V,
    {
        let mut groups: AHashMap<K, Vec<V>> = AHashMap::new();
        let mut len = 0;
        for item in items {
            groups.entry(key_fn(&item)).or_default().push(value_fn(&item));
            len += 1;
        }
        for values in groups.values_mut() {
            values.sort_unstable();
        }
        WindowIndex { groups, len }
    }

    /// Positions bounding the values of `key` that fall in `[lo, hi]`.
    fn bounds(&self, key: &K, lo: V, hi: V) -> Option<(usize, usize)> {
        let values = self.groups.get(key)?;
        let lower = values.partition_point(|v| *v < lo);
        let upper = values.partition_point(|v| *v <= hi);
        Some((lower, upper))
    }

    /// True if `key` has at least one value in `[lo, hi]`. Unknown keys have none.
    pub fn contains_range(&self, key: &K, lo: V, hi: V) -> bool {
        self.bounds(key, lo, hi)
            .is_some_and(|(lower, upper)| upper > lower)
    }

    /// Number of values of `key` in `[lo, hi]`.
    pub fn count_range(&self, key: &K, lo: V, hi: V) -> usize {
        self.bounds(key, lo, hi)
            .map_or(0, |(lower, upper)| upper.saturating_sub(lower))
    }

    /// Sorted values stored for `key`.
    pub fn group(&self, key: &K) -> Option<&[V]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of indexed values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// TES positions grouped by chromosome and strand.
pub type TesIndex<'a> = WindowIndex<LocusKey<'a>, i64>;

impl<'a> WindowIndex<LocusKey<'a>, i64> {
    /// Index the TES of every record.
    pub fn from_records(records: &'a [CanonicalTranscript]) -> Self {
        Self::build(records, |r| r.locus(), |r| r.tes)
    }

    /// True if any TES on the same chromosome and strand lies within `center ± tol`.
    pub fn query(&self, key: &LocusKey<'a>, center: i64, tol: i64) -> bool {
        self.contains_range(key, center.saturating_sub(tol), center.saturating_add(tol))
    }
}
