//! Osculating orbital geometry from an ECI state vector.
//!
//! One canonical derivation feeds both consumers: element extraction (below)
//! and synthetic mean-element encoding in the propagation layer. Keeping a
//! single function guarantees the two paths never disagree about the vector
//! algebra.

use nalgebra::Vector3;

use crate::kepler::mean_anomaly_from_true;
use crate::{
    wrap_deg, OrbitError, OrbitalElements, Result, EARTH_MU_KM3_S2, EARTH_RADIUS_KM,
    MAX_GEOCENTRIC_RADIUS_KM,
};

/// Orbits with |node vector| below this are treated as equatorial.
const NODE_EPSILON: f64 = 1e-12;

/// Eccentricities below this are treated as circular.
const ECC_EPSILON: f64 = 1e-10;

/// The SGP4 stack rejects eccentricities at or above this.
const MAX_ECCENTRICITY: f64 = 0.999;

/// Instantaneous (osculating) orbital geometry of one ECI state.
///
/// Lengths in kilometers, angles in radians. Produced by
/// [`OrbitGeometry::from_state_vector`]; consumers apply their own range
/// policies on top of the physical guards enforced here.
#[derive(Debug, Clone, Copy)]
pub struct OrbitGeometry {
    pub radius_km: f64,
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub raan_rad: f64,
    pub arg_periapsis_rad: f64,
    pub true_anomaly_rad: f64,
    pub mean_anomaly_rad: f64,
}

impl OrbitGeometry {
    /// Derives the osculating geometry from position (km) and velocity
    /// (km/s) in an inertial frame.
    ///
    /// Rejects non-finite input, zero angular momentum, eccentricities at or
    /// above the SGP4 limit, and non-elliptical semi-major axes. Near-circular
    /// or near-equatorial states fall back to a true-longitude angle with the
    /// argument of periapsis pinned to zero; that is a degenerate-case policy,
    /// not an error.
    pub fn from_state_vector(
        position_km: &Vector3<f64>,
        velocity_km_s: &Vector3<f64>,
    ) -> Result<Self> {
        let tau = std::f64::consts::TAU;

        if !(position_km.iter().all(|c| c.is_finite())
            && velocity_km_s.iter().all(|c| c.is_finite()))
        {
            return Err(OrbitError::NonFiniteState);
        }

        let radius = position_km.norm();
        let speed_sq = velocity_km_s.norm_squared();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(OrbitError::RadiusOutOfRange(radius));
        }

        // h = r x v
        let h_vec = position_km.cross(velocity_km_s);
        let h = h_vec.norm();
        if !(h.is_finite() && h > 0.0) {
            return Err(OrbitError::DegenerateAngularMomentum);
        }

        let inclination = (h_vec.z / h).clamp(-1.0, 1.0).acos();

        // Node vector n = z_hat x h; vanishes for equatorial orbits.
        let node = Vector3::new(-h_vec.y, h_vec.x, 0.0);
        let node_len = node.norm();
        let raan = if node_len > NODE_EPSILON {
            node.y.atan2(node.x).rem_euclid(tau)
        } else {
            0.0
        };

        // e_vec = (v x h)/mu - r/|r|
        let e_vec = velocity_km_s.cross(&h_vec) / EARTH_MU_KM3_S2 - position_km / radius;
        let eccentricity = e_vec.norm();
        if !eccentricity.is_finite() || eccentricity >= MAX_ECCENTRICITY {
            return Err(OrbitError::EccentricityOutOfRange(eccentricity));
        }

        let (arg_periapsis, true_anomaly) = if eccentricity > ECC_EPSILON && node_len > NODE_EPSILON
        {
            let mut argp = (node.dot(&e_vec) / (node_len * eccentricity))
                .clamp(-1.0, 1.0)
                .acos();
            if e_vec.z < 0.0 {
                argp = tau - argp;
            }
            let mut nu = (e_vec.dot(position_km) / (eccentricity * radius))
                .clamp(-1.0, 1.0)
                .acos();
            // r . v separates the outbound and inbound halves of the orbit.
            if position_km.dot(velocity_km_s) < 0.0 {
                nu = tau - nu;
            }
            (argp, nu)
        } else {
            // Near-circular or equatorial: true longitude from the reference
            // axis, argument of periapsis defined as zero.
            let nu = (position_km.y / radius)
                .atan2(position_km.x / radius)
                .rem_euclid(tau);
            (0.0, nu)
        };

        // Vis-viva
        let semi_major_axis = 1.0 / (2.0 / radius - speed_sq / EARTH_MU_KM3_S2);
        if !(semi_major_axis.is_finite() && semi_major_axis > 0.0) {
            return Err(OrbitError::SemiMajorAxisOutOfRange(semi_major_axis));
        }

        let mean_anomaly = mean_anomaly_from_true(true_anomaly, eccentricity);

        Ok(Self {
            radius_km: radius,
            semi_major_axis_km: semi_major_axis,
            eccentricity,
            inclination_rad: inclination,
            raan_rad: raan,
            arg_periapsis_rad: arg_periapsis,
            true_anomaly_rad: true_anomaly,
            mean_anomaly_rad: mean_anomaly,
        })
    }

    /// Mean motion in rev/day, n = sqrt(mu/a^3) converted from rad/s.
    pub fn mean_motion_rev_per_day(&self) -> f64 {
        let n_rad_s = (EARTH_MU_KM3_S2 / self.semi_major_axis_km.powi(3)).sqrt();
        n_rad_s * 86400.0 / std::f64::consts::TAU
    }

    /// The geometry as display elements (Earth radii, wrapped degrees).
    pub fn to_elements(&self) -> OrbitalElements {
        OrbitalElements {
            semi_major_axis: self.semi_major_axis_km / EARTH_RADIUS_KM,
            eccentricity: self.eccentricity,
            inclination_deg: wrap_deg(self.inclination_rad.to_degrees()),
            raan_deg: wrap_deg(self.raan_rad.to_degrees()),
            arg_periapsis_deg: wrap_deg(self.arg_periapsis_rad.to_degrees()),
            mean_anomaly_deg: wrap_deg(self.mean_anomaly_rad.to_degrees()),
        }
    }
}

/// Extracts classical elements from an ECI state vector (km, km/s).
///
/// On top of the physical guards in [`OrbitGeometry::from_state_vector`],
/// the state must sit between the Earth's surface and the outer radius
/// guard, and the derived semi-major axis must do the same.
pub fn elements_from_state_vector(
    position_km: &Vector3<f64>,
    velocity_km_s: &Vector3<f64>,
) -> Result<OrbitalElements> {
    if !(position_km.iter().all(|c| c.is_finite()) && velocity_km_s.iter().all(|c| c.is_finite()))
    {
        return Err(OrbitError::NonFiniteState);
    }
    let radius = position_km.norm();
    if !(radius > EARTH_RADIUS_KM && radius < MAX_GEOCENTRIC_RADIUS_KM) {
        return Err(OrbitError::RadiusOutOfRange(radius));
    }

    let geometry = OrbitGeometry::from_state_vector(position_km, velocity_km_s)?;
    let a = geometry.semi_major_axis_km;
    if !(a > EARTH_RADIUS_KM && a < MAX_GEOCENTRIC_RADIUS_KM) {
        return Err(OrbitError::SemiMajorAxisOutOfRange(a));
    }

    Ok(geometry.to_elements())
}
