use crate::database::CandidateIndex;
use crate::heap::smallest_k;
use crate::mass;
use crate::Ion;
use serde::Serialize;
use std::cmp::Ordering;

/// A candidate within tolerance of a scan, and its absolute mass error
#[derive(Clone, Debug, Serialize)]
pub struct Match {
    pub error: f64,
    pub candidate: Ion,
}

impl Match {
    pub fn new(scan: &Ion, candidate: &Ion) -> Self {
        Self {
            error: (scan.mass - candidate.mass).abs(),
            candidate: candidate.clone(),
        }
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Match {}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending error; ties are broken by candidate mass, then by label, so
/// that the retained top-k never depends on index iteration order
impl Ord for Match {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error
            .total_cmp(&other.error)
            .then_with(|| self.candidate.mass.total_cmp(&other.candidate.mass))
            .then_with(|| self.candidate.label.cmp(&other.candidate.label))
    }
}

/// The best candidates for a single scan, sorted by ascending error
#[derive(Clone, Debug, Serialize)]
pub struct ScanResult {
    pub scan: Ion,
    pub matches: Vec<Match>,
}

#[derive(Copy, Clone, Debug)]
pub struct Matcher<'db> {
    pub index: &'db CandidateIndex,
    /// Relative tolerance, e.g. 0.00001 for 10 ppm
    pub relative_error: f64,
    /// Maximum number of candidates reported per scan
    pub top: usize,
}

impl<'db> Matcher<'db> {
    pub fn new(index: &'db CandidateIndex, relative_error: f64, top: usize) -> Self {
        Self {
            index,
            relative_error,
            top,
        }
    }

    /// Scan mass is not validated here; a non-positive mass gives an
    /// inverted window and therefore no matches
    pub fn match_scan(&self, scan: &Ion) -> ScanResult {
        if self.top == 0 {
            return ScanResult {
                scan: scan.clone(),
                matches: Vec::new(),
            };
        }

        let (lo, hi) = mass::bounds(scan.mass, self.relative_error);
        let mut matches = self
            .index
            .range_query(lo, hi)
            .iter()
            .map(|candidate| Match::new(scan, candidate))
            .collect::<Vec<_>>();

        smallest_k(&mut matches, self.top);

        ScanResult {
            scan: scan.clone(),
            matches,
        }
    }
}

pub fn match_scan(
    index: &CandidateIndex,
    scan: &Ion,
    relative_error: f64,
    top: usize,
) -> ScanResult {
    Matcher::new(index, relative_error, top).match_scan(scan)
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn index() -> CandidateIndex {
        CandidateIndex::build(vec![
            Ion::new(100.0, "A"),
            Ion::new(100.00001, "B"),
            Ion::new(105.0, "C"),
        ])
    }

    fn labels(result: &ScanResult) -> Vec<&str> {
        result
            .matches
            .iter()
            .map(|m| m.candidate.label.as_str())
            .collect()
    }

    #[test]
    fn closest_candidates() {
        let result = match_scan(&index(), &Ion::new(100.0, "scan"), 0.0001, 2);
        assert_eq!(labels(&result), vec!["A", "B"]);
        assert_eq!(result.matches[0].error, 0.0);
        assert!((result.matches[1].error - 0.00001).abs() < 1E-9);
        assert_eq!(result.scan.label, "scan");
    }

    #[test]
    fn top_zero() {
        let result = match_scan(&index(), &Ion::new(100.0, "scan"), 0.5, 0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn exact_only() {
        let result = match_scan(&index(), &Ion::new(100.00001, "scan"), 0.0, 10);
        assert_eq!(labels(&result), vec!["B"]);
        assert_eq!(result.matches[0].error, 0.0);
    }

    #[test]
    fn no_candidates_in_window() {
        let result = match_scan(&index(), &Ion::new(200.0, "scan"), 0.00001, 10);
        assert!(result.matches.is_empty());

        let result = match_scan(&CandidateIndex::default(), &Ion::new(100.0, "scan"), 0.1, 10);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn duplicates_and_ties() {
        let index = CandidateIndex::build(vec![
            Ion::new(101.0, "z"),
            Ion::new(99.0, "y"),
            Ion::new(100.0, "dup2"),
            Ion::new(100.0, "dup1"),
        ]);
        let result = match_scan(&index, &Ion::new(100.0, "scan"), 0.05, 10);
        // Equal error: lower candidate mass wins, then label
        assert_eq!(labels(&result), vec!["dup1", "dup2", "y", "z"]);

        let result = match_scan(&index, &Ion::new(100.0, "scan"), 0.05, 3);
        assert_eq!(labels(&result), vec!["dup1", "dup2", "y"]);
    }

    #[test]
    fn error_is_exact_difference() {
        let scan = Ion::new(1234.5678, "scan");
        let index = CandidateIndex::build(vec![Ion::new(1234.56, "a"), Ion::new(1234.58, "b")]);
        for m in match_scan(&index, &scan, 0.001, 10).matches {
            assert_eq!(m.error, (scan.mass - m.candidate.mass).abs());
        }
    }

    #[quickcheck]
    fn matches_within_tolerance(candidates: Vec<(u16, u8)>, scan: u16, ppm: u16, top: u8) -> bool {
        let index = CandidateIndex::build(
            candidates
                .iter()
                .enumerate()
                .map(|(ix, (whole, frac))| {
                    Ion::new(*whole as f64 + *frac as f64 / 256.0 + 1.0, ix.to_string())
                }),
        );
        let scan = Ion::new(scan as f64 + 1.0, "scan");
        let relative_error = mass::ppm_to_relative(ppm as f64 * 10.0);
        let result = match_scan(&index, &scan, relative_error, top as usize);

        result.matches.len() <= top as usize
            && result.matches.windows(2).all(|w| w[0].error <= w[1].error)
            && result
                .matches
                .iter()
                .all(|m| m.error <= scan.mass * relative_error + 1E-9)
    }

    #[quickcheck]
    fn construction_order_independent(candidates: Vec<(u8, u8)>, scan: u8) -> bool {
        let ions = candidates
            .iter()
            .map(|(mass, label)| Ion::new(*mass as f64 / 4.0 + 10.0, label.to_string()))
            .collect::<Vec<_>>();
        let mut reversed = ions.clone();
        reversed.reverse();

        let scan = Ion::new(scan as f64 / 4.0 + 10.0, "scan");
        let a = match_scan(&CandidateIndex::build(ions), &scan, 0.05, 5);
        let b = match_scan(&CandidateIndex::build(reversed), &scan, 0.05, 5);

        a.matches.len() == b.matches.len()
            && a
                .matches
                .iter()
                .zip(&b.matches)
                .all(|(x, y)| x.candidate == y.candidate && x.error == y.error)
    }
}
