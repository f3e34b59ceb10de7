//! Minimal MGF reader: every `BEGIN IONS` block is reduced to its neutral
//! precursor mass(es) and title. Fragment peaks are ignored.

use crate::mass::neutral_mass;
use crate::{Error, Ion};
use regex::Regex;

#[derive(Clone)]
pub struct DefaultParams {
    regex_for_charge: Regex,
    charge_array: Option<Vec<u8>>,
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            regex_for_charge: Regex::new(r"(\d+)[+-]?").expect("valid charge regex"),
            charge_array: None,
        }
    }
}

impl DefaultParams {
    fn parse_charges(&self, line_no: usize, charge_str: &str) -> Result<Vec<u8>, Error> {
        let mut charge_array = Vec::new();
        for cap in self.regex_for_charge.captures_iter(charge_str) {
            match cap[1].parse::<u8>() {
                Ok(charge) if charge > 0 => charge_array.push(charge),
                _ => {
                    return Err(Error::Input {
                        line: line_no,
                        reason: format!("invalid charge state `{}`", charge_str),
                    })
                }
            }
        }
        if charge_array.is_empty() {
            return Err(Error::Input {
                line: line_no,
                reason: format!("invalid charge state `{}`", charge_str),
            });
        }
        Ok(charge_array)
    }
}

#[derive(Default, Clone)]
pub struct QueryData {
    default_params: DefaultParams,
    scans: Vec<Ion>,

    in_query: bool,
    line_no: usize,
    query_start: usize,
    title: Option<String>,
    precursor_mz: Option<f64>,
    precursor_charge_array: Option<Vec<u8>>,
    /// Set once an error has been reported for the current block
    skip_query: bool,
}

impl QueryData {
    pub fn default_with_params(default_params: DefaultParams) -> Self {
        Self {
            default_params,
            ..Default::default()
        }
    }

    pub fn init(&mut self) {
        self.in_query = false;
        self.title = None;
        self.precursor_mz = None;
        self.precursor_charge_array = self.default_params.charge_array.clone();
        self.skip_query = false;
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::Input {
            line: self.query_start,
            reason: format!(
                "skipping ions block `{}`: {}",
                self.title.as_deref().unwrap_or_default(),
                reason
            ),
        }
    }

    /// Emit one scan per charge state of the current block. A block with a
    /// degenerate neutral mass at any charge state is rejected as a whole
    pub fn finish_query(&mut self) -> Result<(), Error> {
        if self.skip_query {
            return Ok(());
        }
        let title = self.title.clone().ok_or_else(|| self.malformed("missing TITLE"))?;
        let mz = self
            .precursor_mz
            .ok_or_else(|| self.malformed("missing PEPMASS"))?;
        let charges = self
            .precursor_charge_array
            .clone()
            .ok_or_else(|| self.malformed("missing CHARGE"))?;

        let ions = charges
            .into_iter()
            .map(|charge| Ion::new(neutral_mass(mz, charge), title.clone()))
            .collect::<Vec<_>>();
        for ion in &ions {
            ion.check_mass().map_err(|e| self.malformed(&e.to_string()))?;
        }
        self.scans.extend(ions);
        Ok(())
    }
}

pub struct DefaultParser;

impl DefaultParser {
    pub fn get_parsers(&self) -> Vec<fn(&str, &mut QueryData) -> Result<bool, Error>> {
        vec![Self::parse_begin, Self::parse_charge]
    }

    pub fn parse_begin(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if line.starts_with("BEGIN IONS") {
            query_data.init();
            query_data.in_query = true;
            query_data.query_start = query_data.line_no;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn parse_charge(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if let Some(charge_str) = line.strip_prefix("CHARGE=") {
            let charges = query_data
                .default_params
                .parse_charges(query_data.line_no, charge_str)?;
            query_data.default_params.charge_array = Some(charges);
            return Ok(true);
        }
        Ok(false)
    }
}

pub struct QueryParser;

impl QueryParser {
    pub fn get_parsers(&self) -> Vec<fn(&str, &mut QueryData) -> Result<bool, Error>> {
        vec![
            Self::parse_end,
            Self::parse_begin,
            Self::parse_pepmass,
            Self::parse_title,
            Self::parse_charge,
        ]
    }

    pub fn parse_pepmass(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if let Some(pepmass_str) = line.strip_prefix("PEPMASS=") {
            let mz_str = pepmass_str
                .split_ascii_whitespace()
                .next()
                .unwrap_or_default();
            match mz_str.parse::<f64>() {
                Ok(mz) => query_data.precursor_mz = Some(mz),
                Err(_) => {
                    query_data.skip_query = true;
                    return Err(Error::Input {
                        line: query_data.line_no,
                        reason: format!("could not parse precursor m/z `{}`", pepmass_str),
                    })
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    pub fn parse_title(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if let Some(title) = line.strip_prefix("TITLE=") {
            query_data.title = Some(title.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn parse_charge(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if let Some(charge_str) = line.strip_prefix("CHARGE=") {
            let charges = query_data
                .default_params
                .parse_charges(query_data.line_no, charge_str)
                .map_err(|e| {
                    query_data.skip_query = true;
                    e
                })?;
            query_data.precursor_charge_array = Some(charges);
            return Ok(true);
        }
        Ok(false)
    }

    /// A new block before `END IONS` means the previous one was truncated
    pub fn parse_begin(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if line.starts_with("BEGIN IONS") {
            let truncated = !query_data.skip_query;
            let err = query_data.malformed("missing END IONS");
            DefaultParser::parse_begin(line, query_data)?;
            if truncated {
                return Err(err);
            }
            return Ok(true);
        }
        Ok(false)
    }

    pub fn parse_end(line: &str, query_data: &mut QueryData) -> Result<bool, Error> {
        if line.starts_with("END IONS") {
            let res = query_data.finish_query();
            query_data.init();
            res?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[derive(Default)]
pub struct MgfReader {
    default_params: DefaultParams,
}

impl MgfReader {
    /// Parse MGF contents into neutral precursor masses, in file order.
    /// Malformed blocks are logged and skipped
    pub fn parse(&self, contents: &str) -> Vec<Ion> {
        let (scans, errors) = self.parse_with_errors(contents);
        for err in &errors {
            log::warn!("{}", err);
        }
        if !errors.is_empty() {
            log::warn!("encountered {} malformed MGF entries", errors.len());
        }
        scans
    }

    /// Parse MGF contents, returning the skipped entries instead of logging
    /// them. Each malformed block is reported once
    pub fn parse_with_errors(&self, contents: &str) -> (Vec<Ion>, Vec<Error>) {
        let default_parsers = DefaultParser.get_parsers();
        let query_parsers = QueryParser.get_parsers();

        let mut query_data = QueryData::default_with_params(self.default_params.clone());
        let mut errors = Vec::new();

        for (ix, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            query_data.line_no = ix + 1;

            let parsers = match query_data.in_query {
                true => &query_parsers,
                false => &default_parsers,
            };
            for parser in parsers {
                match parser(line, &mut query_data) {
                    Ok(true) => break,
                    Ok(false) => continue,
                    Err(err) => {
                        errors.push(err);
                        break;
                    }
                }
            }
        }

        if query_data.in_query && !query_data.skip_query {
            errors.push(query_data.malformed("missing END IONS"));
        }
        (query_data.scans, errors)
    }
}
