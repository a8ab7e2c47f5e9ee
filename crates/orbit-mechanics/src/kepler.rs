//! Kepler geometry: perifocal positions rotated into the render frame,
//! plus the mean/eccentric/true anomaly conversions.

use nalgebra::Vector3;

use crate::OrbitalElements;

/// Fixed iteration count for the Kepler fixed-point solve. The count, not a
/// tolerance, is the contract: the solve always costs the same.
const KEPLER_ITERATIONS: u32 = 8;

/// Relabels an ECI vector (Z toward the pole) into the render frame (Y up):
/// (x, y, z) -> (x, z, -y). Preserves right-handedness.
pub fn eci_to_render(v: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.z, -v.y)
}

/// Position on the orbit at a given true anomaly (radians), in the render
/// frame, same length unit as the semi-major axis (Earth radii).
///
/// Perifocal coordinates rotated by Z(raan) * X(incl) * Z(argp), then the
/// render-axis relabeling so an equatorial orbit lies in the horizontal
/// plane. Total over finite inputs except `semi_major_axis == 0`.
pub fn position_from_elements(elements: &OrbitalElements, true_anomaly_rad: f64) -> Vector3<f64> {
    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let nu = true_anomaly_rad;

    let incl = elements.inclination_deg.to_radians();
    let raan = elements.raan_deg.to_radians();
    let argp = elements.arg_periapsis_deg.to_radians();

    // Perifocal (PQW)
    let p = a * (1.0 - e * e);
    let r = p / (1.0 + e * nu.cos());

    let x_p = r * nu.cos();
    let y_p = r * nu.sin();

    // Rotation PQW -> IJK
    let (sin_raan, cos_raan) = raan.sin_cos();
    let (sin_incl, cos_incl) = incl.sin_cos();
    let (sin_argp, cos_argp) = argp.sin_cos();

    let r11 = cos_raan * cos_argp - sin_raan * sin_argp * cos_incl;
    let r12 = -cos_raan * sin_argp - sin_raan * cos_argp * cos_incl;
    let r21 = sin_raan * cos_argp + cos_raan * sin_argp * cos_incl;
    let r22 = -sin_raan * sin_argp + cos_raan * cos_argp * cos_incl;
    let r31 = sin_argp * sin_incl;
    let r32 = cos_argp * sin_incl;

    let eci = Vector3::new(
        r11 * x_p + r12 * y_p,
        r21 * x_p + r22 * y_p,
        r31 * x_p + r32 * y_p,
    );

    eci_to_render(eci)
}

/// Solves Kepler's equation M = E - e*sin(E) for the eccentric anomaly by
/// fixed-point iteration E <- M + e*sin(E).
pub fn eccentric_anomaly_from_mean(mean_anomaly_rad: f64, eccentricity: f64) -> f64 {
    let mut e_anom = mean_anomaly_rad;
    for _ in 0..KEPLER_ITERATIONS {
        e_anom = mean_anomaly_rad + eccentricity * e_anom.sin();
    }
    e_anom
}

/// True anomaly from the eccentric anomaly via the half-angle identity.
pub fn true_anomaly_from_eccentric(eccentric_anomaly_rad: f64, eccentricity: f64) -> f64 {
    2.0 * f64::atan2(
        (1.0 + eccentricity).sqrt() * (eccentric_anomaly_rad / 2.0).sin(),
        (1.0 - eccentricity).sqrt() * (eccentric_anomaly_rad / 2.0).cos(),
    )
}

/// Mean anomaly from the true anomaly (inverse of the half-angle identity,
/// then M = E - e*sin(E)), wrapped to [0, 2*pi).
pub fn mean_anomaly_from_true(true_anomaly_rad: f64, eccentricity: f64) -> f64 {
    let e = eccentricity;
    let denom = 1.0 + e * true_anomaly_rad.cos();
    let cos_e = (e + true_anomaly_rad.cos()) / denom;
    let sin_e = ((1.0 - e * e).sqrt() * true_anomaly_rad.sin()) / denom;
    let e_anom = f64::atan2(sin_e, cos_e);
    (e_anom - e * e_anom.sin()).rem_euclid(std::f64::consts::TAU)
}
