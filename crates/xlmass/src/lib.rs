pub mod database;
pub mod dispatch;
pub mod heap;
pub mod mass;
pub mod mgf;
pub mod reference;
pub mod report;
pub mod scoring;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line {line}: {reason}")]
    Input { line: usize, reason: String },
    #[error("degenerate mass {mass} for `{label}`")]
    DegenerateInput { label: String, mass: f64 },
    #[error("worker failed while matching `{scan}`: {message}")]
    WorkerFailure { scan: String, message: String },
    #[error("batch cancelled before scan was matched")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("unable to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single mass value with an opaque identifier - either an observed
/// precursor (scan title) or a reference cross-link candidate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ion {
    pub mass: f64,
    pub label: String,
}

impl Ion {
    pub fn new<S: Into<String>>(mass: f64, label: S) -> Self {
        Self {
            mass,
            label: label.into(),
        }
    }

    /// Masses must be finite and strictly positive to produce a sensible
    /// tolerance window
    pub fn check_mass(&self) -> Result<(), Error> {
        if self.mass.is_finite() && self.mass > 0.0 {
            Ok(())
        } else {
            Err(Error::DegenerateInput {
                label: self.label.clone(),
                mass: self.mass,
            })
        }
    }
}

pub fn read_candidates<P: AsRef<Path>>(path: P) -> Result<Vec<Ion>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(reference::parse(&contents))
}

pub fn read_mgf<P: AsRef<Path>>(path: P) -> Result<Vec<Ion>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(mgf::MgfReader::default().parse(&contents))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn degenerate_masses() {
        assert!(Ion::new(1024.5, "ok").check_mass().is_ok());
        for mass in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match Ion::new(mass, "bad").check_mass() {
                Err(Error::DegenerateInput { label, .. }) => assert_eq!(label, "bad"),
                other => panic!("expected degenerate input, got {:?}", other),
            }
        }
    }
}
