use super::input::Search;
use anyhow::Context;
use log::info;
use serde::Serialize;
use std::time::Instant;
use xlmass_core::database::CandidateIndex;
use xlmass_core::dispatch::Dispatcher;
use xlmass_core::report::{aggregate, partition};

pub struct Runner {
    pub index: CandidateIndex,
    pub parameters: Search,
    start: Instant,
}

/// Counts reported at the end of a run
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub candidates: usize,
    pub scans: usize,
    pub failed_scans: usize,
    pub matches: usize,
    pub runtime_secs: u64,
}

impl Runner {
    pub fn new(parameters: Search) -> anyhow::Result<Self> {
        let start = Instant::now();

        let candidates = xlmass_core::read_candidates(&parameters.candidates_path)
            .with_context(|| {
                format!(
                    "Failed to read candidates from `{}`",
                    parameters.candidates_path
                )
            })?;
        let index = CandidateIndex::try_build(candidates).with_context(|| {
            format!(
                "Failed to build candidate index from `{}`",
                parameters.candidates_path
            )
        })?;

        info!(
            "loaded {} candidate masses in {:#?}",
            index.len(),
            start.elapsed()
        );

        Ok(Self {
            index,
            parameters,
            start,
        })
    }

    pub fn run(self) -> anyhow::Result<Summary> {
        let io_time = Instant::now();
        let scans = xlmass_core::read_mgf(&self.parameters.scans_path).with_context(|| {
            format!("Failed to read scans from `{}`", self.parameters.scans_path)
        })?;
        info!(
            "read {} scans from `{}` in {:#?}",
            scans.len(),
            self.parameters.scans_path,
            io_time.elapsed()
        );

        let mut dispatcher = Dispatcher::new(self.parameters.workers)?;
        let outcomes = dispatcher.match_all(
            &self.index,
            &scans,
            self.parameters.relative_error,
            self.parameters.top,
        );
        let (results, failures) = partition(outcomes);
        if !failures.is_empty() {
            log::warn!("{} of {} scans could not be matched", failures.len(), scans.len());
        }

        let rows = aggregate(&results);
        let destination = self.write_rows(&rows)?;
        info!("wrote {} matches to {}", rows.len(), destination);

        let summary = Summary {
            candidates: self.index.len(),
            scans: scans.len(),
            failed_scans: failures.len(),
            matches: rows.len(),
            runtime_secs: self.start.elapsed().as_secs(),
        };
        log::debug!("{}", serde_json::to_string_pretty(&summary)?);
        info!("finished in {}s", summary.runtime_secs);
        Ok(summary)
    }
}
