use crate::{Error, Ion};
use std::cmp::Ordering;

/// Reference cross-link masses, sorted by ascending mass. Entries sharing
/// a mass are all retained, ordered by label.
#[derive(Clone, Debug, Default)]
pub struct CandidateIndex {
    candidates: Vec<Ion>,
}

impl CandidateIndex {
    pub fn build<I: IntoIterator<Item = Ion>>(entries: I) -> Self {
        let mut candidates = entries.into_iter().collect::<Vec<_>>();
        candidates.sort_unstable_by(|a, b| {
            a.mass
                .total_cmp(&b.mass)
                .then_with(|| a.label.cmp(&b.label))
        });
        Self { candidates }
    }

    /// Like [`CandidateIndex::build`], but refuse to index any entry with a
    /// non-finite or non-positive mass
    pub fn try_build<I: IntoIterator<Item = Ion>>(entries: I) -> Result<Self, Error> {
        let candidates = entries
            .into_iter()
            .map(|ion| ion.check_mass().map(|_| ion))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::build(candidates))
    }

    /// Return all candidates with `low <= mass <= high`
    pub fn range_query(&self, low: f64, high: f64) -> &[Ion] {
        if low.is_nan() || high.is_nan() || low > high {
            return &[];
        }
        let (lo, hi) = binary_search_slice(&self.candidates, |ion| ion.mass, low, high);
        &self.candidates[lo..hi]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ion> {
        self.candidates.iter()
    }
}

/// Return the indices (`left`, `right`) into `slice`, which must be sorted
/// by `key`, such that exactly the values with `low <= key <= high` are
/// contained in `slice[left..right]`
///
/// # Invariants
///
/// * `key(slice[left - 1]) < low || left == 0`
/// * `key(slice[right]) > high || right == slice.len()`
/// * `0 <= left <= right <= slice.len()`
#[inline]
pub fn binary_search_slice<T, F>(slice: &[T], key: F, low: f64, high: f64) -> (usize, usize)
where
    F: Fn(&T) -> f64,
{
    let left_idx = slice.partition_point(|a| key(a).total_cmp(&low) == Ordering::Less);
    let right_idx = left_idx
        + slice[left_idx..].partition_point(|a| key(a).total_cmp(&high) != Ordering::Greater);
    (left_idx, right_idx)
}
