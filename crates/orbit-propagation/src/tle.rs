//! Synthetic two-line mean-element records from ECI state vectors.
//!
//! SGP4 is designed for mean elements; these records carry osculating
//! elements derived from a single state with drag terms zeroed, which is
//! adequate for visualization-grade propagation. Layout is the standard
//! two-line format: 68 data characters plus a mod-10 checksum digit per
//! line, 69 characters total.

use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::Vector3;

use orbit_mechanics::OrbitGeometry;

use crate::{PropagationError, Result};

/// Total line length including the checksum digit.
pub const TLE_LINE_LEN: usize = 69;

const TLE_DATA_LEN: usize = 68;

/// A synthesized mean-element record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTle {
    pub line1: String,
    pub line2: String,
}

/// Mod-10 checksum over a data line: each digit counts its value, each '-'
/// counts 1, everything else counts 0.
pub fn tle_line_checksum(line: &str) -> u32 {
    line.chars()
        .map(|c| match c {
            '0'..='9' => c.to_digit(10).unwrap_or(0),
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Pads or truncates to 68 data characters and appends the checksum digit.
fn finalize_line(mut line: String) -> String {
    if line.len() < TLE_DATA_LEN {
        let pad = TLE_DATA_LEN - line.len();
        line.extend(std::iter::repeat(' ').take(pad));
    } else if line.len() > TLE_DATA_LEN {
        line.truncate(TLE_DATA_LEN);
    }
    let checksum = tle_line_checksum(&line);
    line.push(char::from_digit(checksum, 10).unwrap_or('0'));
    line
}

/// Epoch field `YYDDD.DDDDDDDD`: two-digit year, three-digit day of year,
/// fractional day rounded to 1e-8. Rounding can carry the fraction to a full
/// day; the day of year is then incremented and the fraction reset.
fn epoch_field(epoch: DateTime<Utc>) -> Option<String> {
    let year2 = epoch.year().rem_euclid(100);
    let mut day_of_year = epoch.ordinal();

    let sec_of_day =
        f64::from(epoch.num_seconds_from_midnight()) + f64::from(epoch.nanosecond()) / 1.0e9;
    let day_frac = sec_of_day / 86400.0;
    if !(day_frac.is_finite() && (0.0..1.0).contains(&day_frac)) {
        return None;
    }

    let mut frac_scaled = (day_frac * 1.0e8).round() as i64;
    if frac_scaled >= 100_000_000 {
        frac_scaled -= 100_000_000;
        day_of_year += 1;
    }

    Some(format!("{:02}{:03}.{:08}", year2, day_of_year, frac_scaled))
}

/// Eccentricity as a 7-digit field with an implied leading decimal point.
fn eccentricity_field(eccentricity: f64) -> String {
    let scaled = (eccentricity * 1.0e7).round() as i64;
    format!("{:07}", scaled.clamp(0, 9_999_999))
}

/// Encodes a state vector (km, km/s) at `epoch` as a two-line record.
///
/// Satellite number, designator, derivative and drag fields are benign
/// placeholders. Fails when the state is not an ellipse the SGP4 stack will
/// accept or the epoch cannot be represented.
pub fn synthesize_tle(
    epoch: DateTime<Utc>,
    position_km: &Vector3<f64>,
    velocity_km_s: &Vector3<f64>,
) -> Result<SyntheticTle> {
    let geometry = OrbitGeometry::from_state_vector(position_km, velocity_km_s)?;

    let mean_motion = geometry.mean_motion_rev_per_day();
    if !(mean_motion.is_finite() && mean_motion > 0.0) {
        return Err(PropagationError::InvalidMeanMotion(mean_motion));
    }

    let epoch_str = epoch_field(epoch).ok_or(PropagationError::InvalidEpoch(epoch))?;
    let elements = geometry.to_elements();

    let line1 = format!(
        "1 00001U 00000A   {}  .00000000  00000-0  00000-0 0  999",
        epoch_str
    );
    let line2 = format!(
        "2 00001 {:8.4} {:8.4} {} {:8.4} {:8.4} {:11.8}{:5}",
        elements.inclination_deg,
        elements.raan_deg,
        eccentricity_field(geometry.eccentricity),
        elements.arg_periapsis_deg,
        elements.mean_anomaly_deg,
        mean_motion,
        1
    );

    Ok(SyntheticTle {
        line1: finalize_line(line1),
        line2: finalize_line(line2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use orbit_mechanics::EARTH_MU_KM3_S2;
    use proptest::prelude::*;

    #[test]
    fn checksum_of_known_good_line() {
        // Reference ISS record; the trailing 7 is its published checksum.
        let line = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
        assert_eq!(line.len(), TLE_LINE_LEN);
        assert_eq!(tle_line_checksum(&line[..68]), 7);
    }

    #[test]
    fn eccentricity_field_encoding() {
        assert_eq!(eccentricity_field(0.0003317), "0003317");
        assert_eq!(eccentricity_field(0.0), "0000000");
        assert_eq!(eccentricity_field(0.9999999), "9999999");
        // Out-of-range input clamps instead of widening the field.
        assert_eq!(eccentricity_field(1.5), "9999999");
        assert_eq!(eccentricity_field(-0.1), "0000000");
    }

    #[test]
    fn epoch_field_encoding() {
        let epoch = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        assert_eq!(epoch_field(epoch).as_deref(), Some("26218.50000000"));

        let midnight = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(epoch_field(midnight).as_deref(), Some("99001.00000000"));
    }

    #[test]
    fn epoch_field_rounding_rolls_into_next_day() {
        let epoch = Utc
            .with_ymd_and_hms(2026, 1, 1, 23, 59, 59)
            .unwrap()
            .with_nanosecond(999_999_999)
            .unwrap();
        assert_eq!(epoch_field(epoch).as_deref(), Some("26002.00000000"));
    }

    #[test]
    fn synthesized_record_is_well_formed() {
        let epoch = Utc.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap();
        let speed = (EARTH_MU_KM3_S2 / 7000.0).sqrt();
        let incl = 51.6f64.to_radians();
        let tle = synthesize_tle(
            epoch,
            &Vector3::new(7000.0, 0.0, 0.0),
            &Vector3::new(0.0, speed * incl.cos(), speed * incl.sin()),
        )
        .expect("synthesis failed");

        for line in [&tle.line1, &tle.line2] {
            assert_eq!(line.len(), TLE_LINE_LEN);
            let digit = line.chars().last().and_then(|c| c.to_digit(10)).unwrap();
            assert_eq!(tle_line_checksum(&line[..68]), digit);
        }
        assert!(tle.line1.starts_with("1 00001U"));
        assert!(tle.line2.starts_with("2 00001"));
        assert!(tle.line1.contains("26060.27083333"));
    }

    #[test]
    fn synthesis_rejects_degenerate_states() {
        let epoch = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        // No angular momentum.
        assert!(synthesize_tle(epoch, &Vector3::new(7000.0, 0.0, 0.0), &Vector3::zeros()).is_err());
        // Hyperbolic.
        assert!(synthesize_tle(
            epoch,
            &Vector3::new(7000.0, 0.0, 0.0),
            &Vector3::new(0.0, 15.0, 0.0)
        )
        .is_err());
        // Non-finite.
        assert!(synthesize_tle(
            epoch,
            &Vector3::new(f64::NAN, 0.0, 0.0),
            &Vector3::new(0.0, 7.5, 0.0)
        )
        .is_err());
    }

    proptest! {
        #[test]
        fn finalized_lines_always_carry_a_valid_checksum(content in "[0-9A-Z .+-]{0,80}") {
            let line = finalize_line(content);
            prop_assert_eq!(line.len(), TLE_LINE_LEN);
            let digit = line.chars().last().and_then(|c| c.to_digit(10)).unwrap();
            prop_assert_eq!(tle_line_checksum(&line[..68]), digit);
        }
    }
}
