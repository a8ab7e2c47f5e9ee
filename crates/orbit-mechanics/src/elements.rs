//! Classical (Keplerian) orbital elements.

use serde::{Deserialize, Serialize};

use crate::{EARTH_MU_KM3_S2, EARTH_RADIUS_KM};

/// Classical orbital elements.
///
/// Units are visualization friendly: the semi-major axis is measured in Earth
/// radii and every angle is in degrees, conventionally wrapped to [0, 360).
/// Values are immutable once constructed; edits produce a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis in Earth radii.
    pub semi_major_axis: f64,
    /// Eccentricity (dimensionless, elliptical range [0, 1)).
    pub eccentricity: f64,
    /// Inclination in degrees.
    pub inclination_deg: f64,
    /// Right ascension of the ascending node in degrees.
    pub raan_deg: f64,
    /// Argument of periapsis in degrees.
    pub arg_periapsis_deg: f64,
    /// Mean anomaly at epoch in degrees.
    pub mean_anomaly_deg: f64,
}

impl Default for OrbitalElements {
    fn default() -> Self {
        Self {
            semi_major_axis: 1.0,
            eccentricity: 0.0,
            inclination_deg: 0.0,
            raan_deg: 0.0,
            arg_periapsis_deg: 0.0,
            mean_anomaly_deg: 0.0,
        }
    }
}

impl OrbitalElements {
    /// Returns a copy with every angle wrapped to [0, 360).
    pub fn normalized(self) -> Self {
        Self {
            inclination_deg: wrap_deg(self.inclination_deg),
            raan_deg: wrap_deg(self.raan_deg),
            arg_periapsis_deg: wrap_deg(self.arg_periapsis_deg),
            mean_anomaly_deg: wrap_deg(self.mean_anomaly_deg),
            ..self
        }
    }

    /// Mean motion in rev/day from the semi-major axis.
    /// n = sqrt(mu/a^3) in rad/s, converted to rev/day.
    pub fn mean_motion_rev_per_day(&self) -> f64 {
        let sma_km = self.semi_major_axis * EARTH_RADIUS_KM;
        let n_rad_s = (EARTH_MU_KM3_S2 / sma_km.powi(3)).sqrt();
        n_rad_s * 86400.0 / std::f64::consts::TAU
    }

    /// Orbital period in seconds, T = 2*pi*sqrt(a^3/mu).
    pub fn period_seconds(&self) -> f64 {
        let sma_km = self.semi_major_axis * EARTH_RADIUS_KM;
        std::f64::consts::TAU * (sma_km.powi(3) / EARTH_MU_KM3_S2).sqrt()
    }
}

/// Wraps an angle in degrees to [0, 360).
pub fn wrap_deg(deg: f64) -> f64 {
    let x = deg % 360.0;
    if x < 0.0 {
        x + 360.0
    } else {
        x
    }
}
