//! Orbit polyline sampling: one full revolution as a lazy point sequence.

use nalgebra::Vector3;

use crate::kepler::{
    eccentric_anomaly_from_mean, position_from_elements, true_anomaly_from_eccentric,
};
use crate::OrbitalElements;

/// Segment counts below this are clamped up; coarser polylines degenerate
/// visually.
pub const MIN_ORBIT_SEGMENTS: u32 = 8;

/// Lazy, restartable sequence of `segments + 1` render-frame points spanning
/// one full revolution from the epoch mean anomaly. The first and last point
/// coincide (the mean anomaly wraps through a full turn).
///
/// Cloning the iterator preserves its cursor; [`OrbitPolyline::restart`]
/// rewinds it. Sampling never fails: eccentricities close to 1 lose accuracy
/// but still yield finite points.
#[derive(Debug, Clone)]
pub struct OrbitPolyline {
    elements: OrbitalElements,
    segments: u32,
    cursor: u32,
}

impl OrbitPolyline {
    pub fn new(elements: OrbitalElements, segments: u32) -> Self {
        Self {
            elements,
            segments: segments.max(MIN_ORBIT_SEGMENTS),
            cursor: 0,
        }
    }

    /// Effective segment count after clamping.
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Rewinds the sequence to the first point.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }
}

impl Iterator for OrbitPolyline {
    type Item = Vector3<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor > self.segments {
            return None;
        }
        let step = self.cursor;
        self.cursor += 1;

        let tau = std::f64::consts::TAU;
        let mean_anomaly0 = self.elements.mean_anomaly_deg.to_radians();
        let fraction = f64::from(step) / f64::from(self.segments);
        let mean_anomaly = (mean_anomaly0 + fraction * tau).rem_euclid(tau);

        let ecc_anomaly = eccentric_anomaly_from_mean(mean_anomaly, self.elements.eccentricity);
        let nu = true_anomaly_from_eccentric(ecc_anomaly, self.elements.eccentricity);
        Some(position_from_elements(&self.elements, nu))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.cursor > self.segments {
            0
        } else {
            (self.segments - self.cursor) as usize + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for OrbitPolyline {}

/// One revolution of the orbit described by `elements` as a point sequence.
pub fn sample_orbit_polyline(elements: OrbitalElements, segments: u32) -> OrbitPolyline {
    OrbitPolyline::new(elements, segments)
}
