//! End-to-end checks that synthesized mean-element records survive the trip
//! through the real SGP4 stack.

use chrono::{DateTime, TimeZone, Utc};
use nalgebra::Vector3;

use orbit_mechanics::{elements_from_state_vector, EARTH_MU_KM3_S2};
use orbit_propagation::{
    synthesize_tle, tle_line_checksum, CartesianState, EphemerisPropagator, EphemerisSample,
    Propagator, Sgp4Propagator,
};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

fn leo_state() -> (Vector3<f64>, Vector3<f64>) {
    let speed = (EARTH_MU_KM3_S2 / 7000.0).sqrt();
    let incl = 51.6f64.to_radians();
    (
        Vector3::new(7000.0, 0.0, 0.0),
        Vector3::new(0.0, speed * incl.cos(), speed * incl.sin()),
    )
}

#[test]
fn synthetic_record_is_accepted_by_the_integrator() {
    let (r, v) = leo_state();
    let tle = synthesize_tle(epoch(), &r, &v).expect("synthesis failed");

    let elements = sgp4::Elements::from_tle(None, tle.line1.as_bytes(), tle.line2.as_bytes())
        .expect("integrator rejected the synthesized record");
    sgp4::Constants::from_elements(&elements).expect("integrator rejected the parsed elements");

    assert!((elements.inclination - 51.6).abs() < 1e-3);
    assert!(elements.eccentricity < 1e-3);
    assert!(elements.mean_motion > 14.0 && elements.mean_motion < 16.0);
}

#[test]
fn emitted_lines_satisfy_the_checksum_rule() {
    let (r, v) = leo_state();
    let tle = synthesize_tle(epoch(), &r, &v).expect("synthesis failed");
    for line in [&tle.line1, &tle.line2] {
        assert_eq!(line.len(), 69);
        let digit = line
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .expect("checksum position is not a digit");
        assert_eq!(tle_line_checksum(&line[..68]), digit);
    }
}

#[test]
fn parsed_mean_elements_agree_with_extraction() {
    let (r, v) = leo_state();
    let extracted = elements_from_state_vector(&r, &v).expect("extraction failed");

    let tle = synthesize_tle(epoch(), &r, &v).expect("synthesis failed");
    let prop = Sgp4Propagator::new(&tle.line1, &tle.line2);
    let mean = prop.try_get_mean_elements().expect("no mean elements");

    // The record quantizes angles to 1e-4 degrees and the mean motion to
    // 1e-8 rev/day; agreement is bounded by that encoding.
    assert!((mean.inclination_deg - extracted.inclination_deg).abs() < 1e-3);
    assert!((mean.raan_deg - extracted.raan_deg).abs() < 1e-3);
    assert!((mean.eccentricity - extracted.eccentricity).abs() < 1e-6);
    assert!((mean.semi_major_axis - extracted.semi_major_axis).abs() / extracted.semi_major_axis < 1e-3);
}

#[test]
fn single_sample_ephemeris_propagates_near_the_source_state() {
    let (r, v) = leo_state();
    let prop = EphemerisPropagator::new(vec![EphemerisSample::new(epoch(), r, v)]);
    assert!(prop.has_mean_element_model());

    let expected = CartesianState::from_eci_km(&r, &v);
    let state = prop.propagate(epoch());
    // Osculating elements replayed as mean elements: the integrator's
    // short-period terms bound how closely the source state is reproduced.
    assert!(
        (state.position - expected.position).norm() < 0.03,
        "propagated position {:?} too far from source {:?}",
        state.position,
        expected.position
    );

    let period = prop
        .try_get_orbital_period_seconds()
        .expect("no period available");
    let expected_period = std::f64::consts::TAU * (7000.0f64.powi(3) / EARTH_MU_KM3_S2).sqrt();
    assert!(
        (period - expected_period).abs() / expected_period < 0.02,
        "period {} s too far from {}",
        period,
        expected_period
    );
}
