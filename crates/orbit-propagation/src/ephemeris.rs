//! Ephemeris-driven propagation over timestamped state samples.
//!
//! Strategy is picked once at construction: a single sample synthesizes an
//! internal mean-element model so a full orbit can still be drawn; a
//! multi-sample set whose samples carry covariance (epoch state estimates)
//! gets a per-sample model arena; everything else is served by clamped
//! linear interpolation.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use orbit_mechanics::{elements_from_state_vector, OrbitalElements};

use crate::sgp4_propagator::Sgp4Propagator;
use crate::tle::synthesize_tle;
use crate::{CartesianState, Propagator};

/// One state sample in an ECI-like frame, kilometers and km/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSample {
    /// Absolute timestamp. The Unix epoch is the "unset" sentinel; such
    /// samples are dropped at construction.
    pub t: DateTime<Utc>,
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
    /// Optional covariance (upper triangle, row-major: (0,0) (0,1) .. (0,5)
    /// (1,1) .. (5,5), 21 values) in the same frame as position/velocity.
    /// Presence marks the sample as an epoch state estimate rather than a
    /// plain trajectory point.
    #[serde(default)]
    pub covariance_upper: Option<[f64; 21]>,
}

impl EphemerisSample {
    pub fn new(t: DateTime<Utc>, position_km: Vector3<f64>, velocity_km_s: Vector3<f64>) -> Self {
        Self {
            t,
            position_km,
            velocity_km_s,
            covariance_upper: None,
        }
    }

    pub fn has_covariance(&self) -> bool {
        self.covariance_upper.is_some()
    }

    fn to_render_state(&self) -> CartesianState {
        CartesianState::from_eci_km(&self.position_km, &self.velocity_km_s)
    }
}

/// Propagator over a sorted list of ephemeris samples.
///
/// Immutable after construction; all queries are pure reads.
pub struct EphemerisPropagator {
    samples: Vec<EphemerisSample>,

    // Extracted from the first sample when possible; fallback display
    // elements for Kepler-based rendering when no model synthesized.
    keplerian: Option<OrbitalElements>,

    // Internal model synthesized from a lone sample.
    single_model: Option<Sgp4Propagator>,

    // Per-sample models, indexed in parallel with `samples`. A slot stays
    // empty when that sample's synthesis failed; lookups fall through to
    // interpolation. Empty vec when no sample carries covariance or every
    // synthesis failed.
    models_by_sample: Vec<Option<Sgp4Propagator>>,
}

impl EphemerisPropagator {
    pub fn new(mut samples: Vec<EphemerisSample>) -> Self {
        samples.retain(|s| s.t != DateTime::<Utc>::UNIX_EPOCH);
        samples.sort_by_key(|s| s.t);

        let keplerian = samples
            .first()
            .and_then(|s| elements_from_state_vector(&s.position_km, &s.velocity_km_s).ok());

        let mut single_model = None;
        let mut models_by_sample: Vec<Option<Sgp4Propagator>> = Vec::new();

        if samples.len() == 1 {
            let s = &samples[0];
            match synthesize_tle(s.t, &s.position_km, &s.velocity_km_s) {
                Ok(tle) => {
                    let model = Sgp4Propagator::new(&tle.line1, &tle.line2);
                    if model.has_model() {
                        single_model = Some(model);
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "single-sample mean-element synthesis failed");
                }
            }
        } else if samples.iter().any(EphemerisSample::has_covariance) {
            models_by_sample = samples
                .iter()
                .map(|s| {
                    if !s.has_covariance() {
                        return None;
                    }
                    let tle = synthesize_tle(s.t, &s.position_km, &s.velocity_km_s).ok()?;
                    let model = Sgp4Propagator::new(&tle.line1, &tle.line2);
                    model.has_model().then_some(model)
                })
                .collect();
            if models_by_sample.iter().all(Option::is_none) {
                models_by_sample.clear();
            }
        }

        Self {
            samples,
            keplerian,
            single_model,
            models_by_sample,
        }
    }

    /// The filtered, time-sorted samples.
    pub fn samples(&self) -> &[EphemerisSample] {
        &self.samples
    }

    /// True if at least one internal mean-element model was synthesized.
    pub fn has_mean_element_model(&self) -> bool {
        self.single_model.is_some() || !self.models_by_sample.is_empty()
    }

    /// True when the input looks like a set of epoch state estimates: some
    /// synthesis succeeded or some sample carries covariance.
    pub fn is_epoch_state_set(&self) -> bool {
        if self.samples.is_empty() {
            return false;
        }
        if self.has_mean_element_model() {
            return true;
        }
        self.samples.iter().any(EphemerisSample::has_covariance)
    }

    /// Orbital period from the single-sample model, else the first
    /// per-sample model that can answer.
    pub fn try_get_orbital_period_seconds(&self) -> Option<f64> {
        if let Some(model) = &self.single_model {
            return model.try_get_orbital_period_seconds();
        }
        self.models_by_sample
            .iter()
            .flatten()
            .find_map(Sgp4Propagator::try_get_orbital_period_seconds)
    }

    /// Elements extracted from the first sample, if that extraction
    /// succeeded. Used for Kepler-based rendering when synthesis fails.
    pub fn try_get_keplerian_elements(&self) -> Option<OrbitalElements> {
        self.keplerian
    }

    /// Index of the sample whose timestamp is nearest `t`; exact
    /// equidistance selects the earlier sample.
    fn nearest_sample_index(&self, t: DateTime<Utc>) -> usize {
        let insertion = self.samples.partition_point(|s| s.t < t);
        if insertion == 0 {
            0
        } else if insertion == self.samples.len() {
            self.samples.len() - 1
        } else {
            let before = insertion - 1;
            let delta_before = t - self.samples[before].t;
            let delta_after = self.samples[insertion].t - t;
            if delta_before <= delta_after {
                before
            } else {
                insertion
            }
        }
    }

    fn lerp(a: &EphemerisSample, b: &EphemerisSample, alpha: f64) -> CartesianState {
        let alpha = alpha.clamp(0.0, 1.0);
        let position_km = a.position_km + (b.position_km - a.position_km) * alpha;
        let velocity_km_s = a.velocity_km_s + (b.velocity_km_s - a.velocity_km_s) * alpha;
        CartesianState::from_eci_km(&position_km, &velocity_km_s)
    }

    fn interpolate(&self, t: DateTime<Utc>) -> CartesianState {
        let first = &self.samples[0];
        let last = &self.samples[self.samples.len() - 1];
        if t <= first.t {
            return first.to_render_state();
        }
        if t >= last.t {
            return last.to_render_state();
        }

        let insertion = self.samples.partition_point(|s| s.t < t);
        let b = &self.samples[insertion];
        let a = &self.samples[insertion - 1];

        let span_ms = (b.t - a.t).num_milliseconds();
        if span_ms <= 0 {
            return a.to_render_state();
        }
        let alpha = (t - a.t).num_milliseconds() as f64 / span_ms as f64;
        Self::lerp(a, b, alpha)
    }
}

impl Propagator for EphemerisPropagator {
    fn propagate(&self, t: DateTime<Utc>) -> CartesianState {
        if self.samples.is_empty() {
            return CartesianState::zero();
        }

        if let Some(model) = &self.single_model {
            return model.propagate(t);
        }

        if !self.models_by_sample.is_empty() && self.models_by_sample.len() == self.samples.len() {
            let idx = self.nearest_sample_index(t);
            if let Some(model) = &self.models_by_sample[idx] {
                return model.propagate(t);
            }
            // That sample's synthesis failed; fall through to interpolation.
        }

        if self.samples.len() == 1 {
            return self.samples[0].to_render_state();
        }

        self.interpolate(t)
    }
}
