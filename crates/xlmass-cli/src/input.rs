use anyhow::{ensure, Context};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use xlmass_core::dispatch::DEFAULT_WORKERS;
use xlmass_core::mass::{ppm_to_relative, relative_to_ppm};

pub const DEFAULT_RELATIVE_ERROR: f64 = 0.00001;
pub const DEFAULT_TOP: usize = 10;

#[derive(Serialize, Clone, Debug)]
/// Actual matching parameters - may include overrides or default values not set by user
pub struct Search {
    pub version: String,
    pub candidates_path: String,
    pub scans_path: String,
    pub relative_error: f64,
    pub top: usize,
    pub workers: usize,
    pub separator: char,

    #[serde(skip_serializing)]
    pub output: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
/// Input parameters deserialized from an optional JSON file
pub struct Input {
    candidates: Option<String>,
    scans: Option<String>,
    relative_error: Option<f64>,
    ppm: Option<f64>,
    top: Option<usize>,
    workers: Option<usize>,
    separator: Option<String>,
    output: Option<String>,
}

/// `\t` may be given literally on the command line; otherwise the first
/// character of the argument is the separator
fn parse_separator(s: &str) -> anyhow::Result<char> {
    let sep = match s {
        "\\t" | "tab" => '\t',
        _ => s
            .chars()
            .next()
            .context("`separator` must not be empty")?,
    };
    ensure!(
        sep.is_ascii(),
        "`separator` must be a single ASCII character, got `{}`",
        sep
    );
    Ok(sep)
}

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let mut input = match matches.get_one::<String>("parameters") {
            Some(path) => Input::load(path)
                .with_context(|| format!("Failed to read parameters from `{path}`"))?,
            None => Input::default(),
        };

        // Handle JSON configuration overrides
        if let Some(candidates) = matches.get_one::<String>("candidates") {
            log::trace!("overriding `candidates` parameter.");
            input.candidates = Some(candidates.into());
        }
        if let Some(scans) = matches.get_one::<String>("scans") {
            log::trace!("overriding `scans` parameter.");
            input.scans = Some(scans.into());
        }
        if let Some(separator) = matches.get_one::<String>("separator") {
            log::trace!("overriding `separator` parameter.");
            input.separator = Some(separator.into());
        }
        if let Some(relative_error) = matches.get_one::<f64>("relative-error").copied() {
            log::trace!("overriding `relative_error` parameter.");
            input.relative_error = Some(relative_error);
            input.ppm = None;
        }
        if let Some(ppm) = matches.get_one::<f64>("ppm").copied() {
            log::trace!("overriding `ppm` parameter.");
            input.ppm = Some(ppm);
            input.relative_error = None;
        }
        if let Some(top) = matches.get_one::<usize>("top").copied() {
            input.top = Some(top);
        }
        if let Some(workers) = matches.get_one::<usize>("workers").copied() {
            input.workers = Some(workers);
        }
        if let Some(output) = matches.get_one::<String>("output") {
            input.output = Some(output.into());
        }

        ensure!(
            input.candidates.is_some(),
            "`candidates` must be set. For more information try '--help'"
        );
        ensure!(
            input.scans.is_some(),
            "`scans` must be set. For more information try '--help'"
        );

        Ok(input)
    }

    pub fn load<S: AsRef<str>>(path: S) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&contents).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Search> {
        ensure!(
            self.relative_error.is_none() || self.ppm.is_none(),
            "only one of `relative_error` and `ppm` may be set"
        );
        let relative_error = match (self.relative_error, self.ppm) {
            (Some(relative_error), _) => relative_error,
            (None, Some(ppm)) => ppm_to_relative(ppm),
            (None, None) => DEFAULT_RELATIVE_ERROR,
        };
        ensure!(
            (0.0..1.0).contains(&relative_error),
            "`relative_error` must be within [0, 1), got {}",
            relative_error
        );
        if relative_to_ppm(relative_error) > 1000.0 {
            log::warn!(
                "relative error of {} ppm is wider than expected for precursor matching",
                relative_to_ppm(relative_error)
            );
        }

        let workers = self.workers.unwrap_or(DEFAULT_WORKERS);
        ensure!(workers > 0, "`workers` must be at least 1");
        if workers > num_cpus::get() {
            log::warn!(
                "{} workers requested, but only {} CPUs are available",
                workers,
                num_cpus::get()
            );
        }

        let top = self.top.unwrap_or(DEFAULT_TOP);
        if top == 0 {
            log::warn!("`top` is 0: no matches will be reported");
        }

        let separator = match self.separator {
            Some(s) => parse_separator(&s)?,
            None => '\t',
        };

        Ok(Search {
            version: clap::crate_version!().into(),
            candidates_path: self
                .candidates
                .context("'candidates' must be provided!")?,
            scans_path: self.scans.context("'scans' must be provided!")?,
            relative_error,
            top,
            workers,
            separator,
            output: self.output,
        })
    }
}
