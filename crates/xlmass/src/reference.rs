//! Reference list of cross-link candidate masses: one whitespace-delimited
//! entry per line, mass first and identifier last

use crate::{Error, Ion};

/// Parse a single line. Blank lines and `#` comments yield `Ok(None)`
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Ion>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_ascii_whitespace();
    let mass_str = tokens.next().unwrap_or_default();
    let mass = mass_str.parse::<f64>().map_err(|e| Error::Input {
        line: line_no,
        reason: format!("could not parse mass value `{}`: {}", mass_str, e),
    })?;
    let label = tokens.last().unwrap_or(mass_str);

    let ion = Ion::new(mass, label);
    ion.check_mass()?;
    Ok(Some(ion))
}

/// Parse every line of a reference list. Lines that cannot be parsed are
/// logged and skipped
pub fn parse(contents: &str) -> Vec<Ion> {
    let mut skipped = 0;
    let candidates = contents
        .lines()
        .enumerate()
        .filter_map(|(ix, line)| match parse_line(ix + 1, line) {
            Ok(ion) => ion,
            Err(err) => {
                log::warn!("skipping reference entry on line {}: {}", ix + 1, err);
                skipped += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    if skipped > 0 {
        log::warn!("skipped {} malformed reference entries", skipped);
    }
    candidates
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_reference_list() {
        let contents = r#"
        # mass  peptide_a peptide_b id
        1523.77412 PEPTIDEK-LINKERK xl_1
        1523.77412	duplicate
        abc xl_bad
        2011.0
        -12.0 negative

        nan xl_nan
        987.5 a b c xl_last
        "#;

        let candidates = parse(contents);
        let labels = candidates
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["xl_1", "duplicate", "2011.0", "xl_last"]);
        assert_eq!(candidates[0].mass, 1523.77412);
        assert_eq!(candidates[1].mass, 1523.77412);
        assert_eq!(candidates[2].mass, 2011.0);
    }

    #[test]
    fn line_errors() {
        assert!(matches!(
            parse_line(3, "xyz abc"),
            Err(Error::Input { line: 3, .. })
        ));
        assert!(matches!(
            parse_line(4, "0 zero"),
            Err(Error::DegenerateInput { .. })
        ));
        assert!(matches!(parse_line(5, "   "), Ok(None)));
        assert_eq!(
            parse_line(6, "100.5 only").unwrap(),
            Some(Ion::new(100.5, "only"))
        );
    }
}
