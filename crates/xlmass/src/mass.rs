pub const PROTON: f64 = 1.007276466812;

/// Neutral (uncharged) mass of a precursor observed at `mz` with `charge`
pub fn neutral_mass(mz: f64, charge: u8) -> f64 {
    let z = charge as f64;
    mz * z - z * PROTON
}

/// Compute the inclusive (`lower`, `upper`) window (in Da) around `center`
/// for a relative tolerance, e.g. 0.00001 for 10 ppm
pub fn bounds(center: f64, relative_error: f64) -> (f64, f64) {
    (
        center * (1.0 - relative_error),
        center * (1.0 + relative_error),
    )
}

pub fn ppm_to_relative(ppm: f64) -> f64 {
    ppm / 1_000_000.0
}

pub fn relative_to_ppm(relative_error: f64) -> f64 {
    relative_error * 1_000_000.0
}
