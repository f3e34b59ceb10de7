//! Run per-scan matching on a fixed-size worker pool

use crate::database::CandidateIndex;
use crate::scoring::{Matcher, ScanResult};
use crate::{Error, Ion};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_WORKERS: usize = 8;

/// A scan that could not be matched, and why
#[derive(Debug)]
pub struct ScanFailure {
    pub scan: Ion,
    pub error: Error,
}

pub type ScanOutcome = Result<ScanResult, ScanFailure>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Scans currently being matched
    pub in_flight: usize,
    /// Scans that ran to completion (successfully or not)
    pub completed: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    pool: rayon::ThreadPool,
    workers: usize,
    in_flight: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    cancelled: Arc<AtomicBool>,
}

/// Tracks a running task; decremented on drop so that a panicking task is
/// still accounted for
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

impl Dispatcher {
    pub fn new(workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::Configuration(
                "worker pool size must be at least 1".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|ix| format!("xlmass-worker-{}", ix))
            .build()?;

        Ok(Self {
            pool,
            workers,
            in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Setting the returned flag stops any scan that has not started yet;
    /// scans that are already running are allowed to finish. The flag is
    /// cleared once the batch returns, so the dispatcher can be reused
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            in_flight: self.in_flight.load(Ordering::Acquire),
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }

    /// Match every scan against `index`. The output has one entry per scan,
    /// in the same order as `scans`
    pub fn match_all(
        &mut self,
        index: &CandidateIndex,
        scans: &[Ion],
        relative_error: f64,
        top: usize,
    ) -> Vec<ScanOutcome> {
        let matcher = Matcher::new(index, relative_error, top);
        self.dispatch(scans, |scan| Ok(matcher.match_scan(scan)))
    }

    /// Run `task` for every scan on the worker pool. Scans with a degenerate
    /// mass are rejected without calling `task`, and a panic inside `task`
    /// only fails the scan it was called with.
    ///
    /// Counters are reset per batch; `&mut self` keeps batches on one
    /// dispatcher from overlapping
    pub fn dispatch<F>(&mut self, scans: &[Ion], task: F) -> Vec<ScanOutcome>
    where
        F: Fn(&Ion) -> Result<ScanResult, Error> + Sync,
    {
        self.in_flight.store(0, Ordering::Release);
        self.completed.store(0, Ordering::Release);
        self.failed.store(0, Ordering::Release);
        let start = Instant::now();

        let this = &*self;
        let outcomes = this.pool.install(|| {
            scans
                .par_iter()
                .map(|scan| this.run_one(scan, &task, start))
                .collect::<Vec<_>>()
        });

        let duration = Instant::now().duration_since(start).as_millis() as usize;
        let stats = self.stats();
        let rate = stats.completed * 1000 / (duration + 1);
        log::info!(
            "- matched {} scans on {} workers: {:8} ms ({} scans/s)",
            stats.completed,
            self.workers,
            duration,
            rate
        );
        if self.cancelled.swap(false, Ordering::AcqRel) {
            log::warn!(
                "batch cancelled, {} of {} scans were not matched",
                scans.len().saturating_sub(stats.completed),
                scans.len()
            );
        }
        outcomes
    }

    fn run_one<F>(&self, scan: &Ion, task: &F, start: Instant) -> ScanOutcome
    where
        F: Fn(&Ion) -> Result<ScanResult, Error> + Sync,
    {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(ScanFailure {
                scan: scan.clone(),
                error: Error::Cancelled,
            });
        }

        let outcome = scan.check_mass().and_then(|_| {
            let _guard = InFlight::enter(&self.in_flight);
            match panic::catch_unwind(AssertUnwindSafe(|| task(scan))) {
                Ok(result) => result,
                Err(payload) => Err(Error::WorkerFailure {
                    scan: scan.label.clone(),
                    message: panic_message(payload.as_ref()),
                }),
            }
        });

        let prev = self.completed.fetch_add(1, Ordering::AcqRel);
        if prev > 0 && prev % 10_000 == 0 {
            let duration = Instant::now().duration_since(start).as_millis() as usize;
            let rate = prev * 1000 / (duration + 1);
            log::trace!("- matched {} scans ({} scans/s)", prev, rate);
        }

        outcome.map_err(|error| {
            self.failed.fetch_add(1, Ordering::AcqRel);
            log::warn!("skipping scan `{}`: {}", scan.label, error);
            ScanFailure {
                scan: scan.clone(),
                error,
            }
        })
    }
}
