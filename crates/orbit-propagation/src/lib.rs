//! Orbit Propagation Library
//!
//! Propagator implementations over absolute time: a wrapper around the SGP4
//! integrator fed by two-line mean-element records, synthetic record
//! encoding from raw state vectors, and an ephemeris propagator that
//! interpolates timestamped samples.
//!
//! Failure policy: propagation never panics and never returns an error to
//! the render loop. A propagator that cannot produce a state yields the zero
//! state; best-effort queries yield `None`.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orbit_mechanics::{eci_to_render, EARTH_RADIUS_KM};

pub mod ephemeris;
pub mod sgp4_propagator;
pub mod tle;

pub use ephemeris::{EphemerisPropagator, EphemerisSample};
pub use orbit_mechanics::OrbitalElements;
pub use sgp4_propagator::Sgp4Propagator;
pub use tle::{synthesize_tle, tle_line_checksum, SyntheticTle};

#[derive(Error, Debug)]
pub enum PropagationError {
    #[error("Invalid TLE format: {0}")]
    InvalidTle(String),
    #[error("Propagation failed: {0}")]
    PropagationFailed(String),
    #[error("State vector rejected: {0}")]
    InvalidState(#[from] orbit_mechanics::OrbitError),
    #[error("Mean motion {0} rev/day cannot be encoded")]
    InvalidMeanMotion(f64),
    #[error("Epoch {0} cannot be encoded in a mean-element record")]
    InvalidEpoch(DateTime<Utc>),
}

pub type Result<T> = std::result::Result<T, PropagationError>;

/// Cartesian state in the render frame: lengths in Earth radii, rates in
/// Earth radii per second, polar axis on render +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl CartesianState {
    /// The degraded "no state available" result.
    pub fn zero() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }

    /// Converts an ECI state in km and km/s into the render frame.
    pub fn from_eci_km(position_km: &Vector3<f64>, velocity_km_s: &Vector3<f64>) -> Self {
        Self {
            position: eci_to_render(*position_km / EARTH_RADIUS_KM),
            velocity: eci_to_render(*velocity_km_s / EARTH_RADIUS_KM),
        }
    }
}

impl Default for CartesianState {
    fn default() -> Self {
        Self::zero()
    }
}

/// A source of Cartesian states over absolute time.
///
/// Implementations are immutable once constructed; `propagate` is a pure
/// read and instances are safe to share across threads.
pub trait Propagator {
    fn propagate(&self, t: DateTime<Utc>) -> CartesianState;
}
