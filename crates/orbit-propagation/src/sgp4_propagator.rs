//! Mean-element propagator wrapping the external SGP4 integrator.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use orbit_mechanics::{wrap_deg, OrbitalElements, EARTH_MU_KM3_S2, EARTH_RADIUS_KM};

use crate::{CartesianState, PropagationError, Propagator, Result};

/// Propagator fed by a two-line mean-element record.
///
/// Construction never fails: a record that does not parse leaves an instance
/// whose `propagate` returns the zero state and whose best-effort queries
/// return `None`, keeping the caller's render loop alive.
pub struct Sgp4Propagator {
    elements: Option<sgp4::Elements>,
}

impl Sgp4Propagator {
    pub fn new(line1: &str, line2: &str) -> Self {
        match Self::parse(line1, line2) {
            Ok(elements) => Self {
                elements: Some(elements),
            },
            Err(err) => {
                tracing::warn!(error = %err, "mean-element record rejected, propagator degrades to zero state");
                Self { elements: None }
            }
        }
    }

    fn parse(line1: &str, line2: &str) -> Result<sgp4::Elements> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PropagationError::InvalidTle(format!("{:?}", e)))?;
        // Validate the record against the integrator once up front;
        // propagate() rebuilds the constants per call.
        sgp4::Constants::from_elements(&elements)
            .map_err(|e| PropagationError::PropagationFailed(format!("{:?}", e)))?;
        Ok(elements)
    }

    /// True when the record parsed and the integrator accepted it.
    pub fn has_model(&self) -> bool {
        self.elements.is_some()
    }

    /// Epoch of the parsed record.
    pub fn epoch(&self) -> Option<DateTime<Utc>> {
        self.elements
            .as_ref()
            .map(|el| DateTime::from_naive_utc_and_offset(el.datetime, Utc))
    }

    /// The record's stored mean elements in the rendering convention, with
    /// the semi-major axis derived from the mean motion.
    pub fn try_get_mean_elements(&self) -> Option<OrbitalElements> {
        let el = self.elements.as_ref()?;
        if el.mean_motion <= 0.0 {
            return None;
        }
        let n_rad_s = el.mean_motion * std::f64::consts::TAU / 86400.0;
        let sma_km = (EARTH_MU_KM3_S2 / (n_rad_s * n_rad_s)).cbrt();
        Some(OrbitalElements {
            semi_major_axis: sma_km / EARTH_RADIUS_KM,
            eccentricity: el.eccentricity,
            inclination_deg: wrap_deg(el.inclination),
            raan_deg: wrap_deg(el.right_ascension),
            arg_periapsis_deg: wrap_deg(el.argument_of_perigee),
            mean_anomaly_deg: wrap_deg(el.mean_anomaly),
        })
    }

    /// Orbital period from the record's mean-motion field.
    pub fn try_get_orbital_period_seconds(&self) -> Option<f64> {
        let el = self.elements.as_ref()?;
        if el.mean_motion > 0.0 {
            Some(86400.0 / el.mean_motion)
        } else {
            None
        }
    }
}

impl Propagator for Sgp4Propagator {
    fn propagate(&self, t: DateTime<Utc>) -> CartesianState {
        let Some(elements) = self.elements.as_ref() else {
            return CartesianState::zero();
        };
        let constants = match sgp4::Constants::from_elements(elements) {
            Ok(constants) => constants,
            Err(err) => {
                tracing::debug!(error = ?err, "SGP4 initialization failed");
                return CartesianState::zero();
            }
        };

        let epoch = DateTime::from_naive_utc_and_offset(elements.datetime, Utc);
        let minutes_since_epoch = (t - epoch).num_milliseconds() as f64 / 60_000.0;

        match constants.propagate(minutes_since_epoch) {
            Ok(prediction) => CartesianState::from_eci_km(
                &Vector3::new(
                    prediction.position[0],
                    prediction.position[1],
                    prediction.position[2],
                ),
                &Vector3::new(
                    prediction.velocity[0],
                    prediction.velocity[1],
                    prediction.velocity[2],
                ),
            ),
            Err(err) => {
                tracing::debug!(error = ?err, "SGP4 propagation failed");
                CartesianState::zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn invalid_record_degrades_to_zero_state() {
        let prop = Sgp4Propagator::new("", "");
        assert!(!prop.has_model());
        assert_eq!(prop.propagate(Utc::now()), CartesianState::zero());
        assert!(prop.try_get_mean_elements().is_none());
        assert!(prop.try_get_orbital_period_seconds().is_none());
        assert!(prop.epoch().is_none());

        let prop = Sgp4Propagator::new("1 garbage", "2 garbage");
        assert!(!prop.has_model());
        assert_eq!(prop.propagate(Utc::now()), CartesianState::zero());
    }

    #[test]
    fn mean_elements_match_the_record() {
        let prop = Sgp4Propagator::new(ISS_LINE1, ISS_LINE2);
        assert!(prop.has_model());
        let el = prop.try_get_mean_elements().expect("no mean elements");
        assert!((el.inclination_deg - 51.6416).abs() < 1e-6);
        assert!((el.raan_deg - 247.4627).abs() < 1e-6);
        assert!((el.eccentricity - 0.0006703).abs() < 1e-9);
        assert!((el.arg_periapsis_deg - 130.5360).abs() < 1e-6);
        assert!((el.mean_anomaly_deg - 325.0288).abs() < 1e-6);
        // ISS semi-major axis is a shade above one Earth radius.
        assert!(el.semi_major_axis > 1.0 && el.semi_major_axis < 1.1);
    }

    #[test]
    fn period_comes_from_mean_motion() {
        let prop = Sgp4Propagator::new(ISS_LINE1, ISS_LINE2);
        let period = prop.try_get_orbital_period_seconds().expect("no period");
        assert!((period - 86400.0 / 15.72125391).abs() < 1e-6);
    }

    #[test]
    fn propagates_a_low_earth_orbit() {
        let prop = Sgp4Propagator::new(ISS_LINE1, ISS_LINE2);
        let epoch = prop.epoch().expect("no epoch");

        let state = prop.propagate(epoch);
        let radius = state.position.norm();
        assert!(
            radius > 1.02 && radius < 1.12,
            "ISS radius {} Earth radii out of range",
            radius
        );
        let speed = state.velocity.norm();
        assert!(
            speed > 0.0010 && speed < 0.0014,
            "ISS speed {} Earth radii/s out of range",
            speed
        );

        // A quarter orbit later the position moved substantially.
        let later = prop.propagate(epoch + Duration::minutes(23));
        assert!((later.position - state.position).norm() > 0.5);
    }
}
