use rayon::prelude::*;
use std::io::Write;
use xlmass_core::report::{Row, HEADERS};

use crate::Runner;

/// Masses and errors are always written with 8 decimal places
fn format_mass(mass: f64) -> String {
    format!("{:.8}", mass)
}

impl Runner {
    pub fn serialize_row(&self, row: &Row) -> csv::ByteRecord {
        let mut record = csv::ByteRecord::new();
        record.push_field(row.scan_id.as_bytes());
        record.push_field(format_mass(row.scan_mass).as_bytes());
        record.push_field(row.xlink_id.as_bytes());
        record.push_field(format_mass(row.xlink_mass).as_bytes());
        record.push_field(format_mass(row.error).as_bytes());
        record
    }

    /// Write rows to the configured output file, or to stdout if none is
    /// set. Fields are written verbatim, without quoting. Returns a
    /// description of where the rows went
    pub fn write_rows(&self, rows: &[Row]) -> anyhow::Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.parameters.separator as u8)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(vec![]);

        wtr.write_byte_record(&csv::ByteRecord::from(HEADERS.to_vec()))?;
        for record in rows
            .par_iter()
            .map(|row| self.serialize_row(row))
            .collect::<Vec<_>>()
        {
            wtr.write_byte_record(&record)?;
        }

        wtr.flush()?;
        let bytes = wtr.into_inner()?;
        match &self.parameters.output {
            Some(path) => {
                std::fs::write(path, bytes)?;
                Ok(path.clone())
            }
            None => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(&bytes)?;
                lock.flush()?;
                Ok("stdout".into())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::format_mass;

    #[test]
    fn eight_decimals() {
        assert_eq!(format_mass(1500.0), "1500.00000000");
        assert_eq!(format_mass(0.000012345678), "0.00001235");
    }
}
