use crate::dispatch::{ScanFailure, ScanOutcome};
use crate::scoring::ScanResult;
use serde::Serialize;

/// One reportable scan/candidate pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub scan_id: String,
    pub scan_mass: f64,
    pub xlink_id: String,
    pub xlink_mass: f64,
    pub error: f64,
}

pub const HEADERS: [&str; 5] = ["scan_id", "scan_mass", "xlink_id", "xlink_mass", "error"];

/// Flatten scan results into rows, keeping the scan order of `results` and
/// the ascending-error order within each scan
pub fn aggregate<'a, I>(results: I) -> Vec<Row>
where
    I: IntoIterator<Item = &'a ScanResult>,
{
    results
        .into_iter()
        .flat_map(|result| {
            result.matches.iter().map(move |m| Row {
                scan_id: result.scan.label.clone(),
                scan_mass: result.scan.mass,
                xlink_id: m.candidate.label.clone(),
                xlink_mass: m.candidate.mass,
                error: m.error,
            })
        })
        .collect()
}

/// Split dispatcher output into successes and failures, both in input order
pub fn partition(outcomes: Vec<ScanOutcome>) -> (Vec<ScanResult>, Vec<ScanFailure>) {
    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(failure) => failures.push(failure),
        }
    }
    (results, failures)
}
