//! Orbit Mechanics Library
//!
//! Keplerian orbital elements, perifocal/equatorial geometry, orbit polyline
//! sampling, and extraction of classical elements from an ECI state vector.
//!
//! All positions produced here are in render units: lengths are Earth radii
//! and the ECI frame is relabeled so the polar axis maps to render +Y.

use thiserror::Error;

pub mod elements;
pub mod geometry;
pub mod kepler;
pub mod sampler;

pub use elements::{wrap_deg, OrbitalElements};
pub use geometry::{elements_from_state_vector, OrbitGeometry};
pub use kepler::{
    eccentric_anomaly_from_mean, eci_to_render, mean_anomaly_from_true, position_from_elements,
    true_anomaly_from_eccentric,
};
pub use sampler::{sample_orbit_polyline, OrbitPolyline, MIN_ORBIT_SEGMENTS};

/// Earth equatorial radius in kilometers (WGS-72, matches the SGP4 stack).
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Earth gravitational parameter in km^3/s^2.
pub const EARTH_MU_KM3_S2: f64 = 398600.4418;

/// Geocentric radii beyond this are treated as unphysical for this system.
pub const MAX_GEOCENTRIC_RADIUS_KM: f64 = 1.0e6;

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("State vector has non-finite components")]
    NonFiniteState,
    #[error("Geocentric radius {0} km outside the usable range")]
    RadiusOutOfRange(f64),
    #[error("Degenerate angular momentum, orbit plane undefined")]
    DegenerateAngularMomentum,
    #[error("Eccentricity {0} outside the elliptical range")]
    EccentricityOutOfRange(f64),
    #[error("Semi-major axis {0} km outside the usable range")]
    SemiMajorAxisOutOfRange(f64),
}

pub type Result<T> = std::result::Result<T, OrbitError>;
