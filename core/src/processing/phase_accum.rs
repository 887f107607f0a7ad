use std::f64::consts::PI;

use crate::math::phase::{arg_deg, phase_diff_deg, phasor};
use crate::math::stats::StatsHelper;

/// Builds the accumulated phase trajectory along a ray.
///
/// Each gate's phase is turned into a unit phasor and the wrapped
/// gate-to-gate change is summed, giving degrees of phase change from the
/// start of the ray. Missing gates, and gates whose phase is not finite,
/// add no change.
pub struct PhaseAccumulator;

impl PhaseAccumulator {
    /// Largest absolute valid velocity, or `None` if there is no non-zero
    /// valid velocity.
    pub fn estimate_nyquist(vel: &[f64], missing: f64) -> Option<f64> {
        let max_abs = vel
            .iter()
            .filter(|&&v| StatsHelper::is_valid(v, missing))
            .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        (max_abs > 0.0).then_some(max_abs)
    }

    /// Fill `accum` from velocity. Returns the Nyquist velocity used.
    ///
    /// A supplied Nyquist that is not positive is ignored in favour of the
    /// estimate. Without a usable Nyquist every phase is zero.
    pub fn from_velocity(
        vel: &[f64],
        missing: f64,
        nyquist: Option<f64>,
        accum: &mut [f64],
    ) -> Option<f64> {
        let nyquist = nyquist
            .filter(|&n| n > 0.0 && n.is_finite())
            .or_else(|| Self::estimate_nyquist(vel, missing));
        match nyquist {
            Some(nyq) => Self::accumulate(
                vel.iter().map(|&v| {
                    StatsHelper::is_valid(v, missing).then(|| (v / nyq) * PI)
                }),
                accum,
            ),
            None => Self::accumulate(
                vel.iter()
                    .map(|&v| StatsHelper::is_valid(v, missing).then_some(0.0)),
                accum,
            ),
        }
        nyquist
    }

    /// Fill `accum` from phase supplied directly, in degrees.
    pub fn from_phase(phase_deg: &[f64], missing: f64, accum: &mut [f64]) {
        Self::accumulate(
            phase_deg
                .iter()
                .map(|&p| StatsHelper::is_valid(p, missing).then(|| p.to_radians())),
            accum,
        );
    }

    fn accumulate(phases_rad: impl Iterator<Item = Option<f64>>, accum: &mut [f64]) {
        let mut prev = phasor(0.0);
        let mut sum = 0.0;
        for (gate, (phase, out)) in phases_rad.zip(accum.iter_mut()).enumerate() {
            if let Some(phase) = phase.filter(|p| p.is_finite()) {
                let this = phasor(phase);
                sum = if gate == 0 {
                    arg_deg(this)
                } else {
                    sum + phase_diff_deg(this, prev)
                };
                prev = this;
            }
            *out = sum;
        }
    }
}
