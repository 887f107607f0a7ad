use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Geometry and timing of one ray, fixed until the next ray arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayProps {
    pub time_secs: i64,
    pub nano_secs: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub n_gates: usize,
    pub start_range_km: f64,
    pub gate_spacing_km: f64,
    pub wavelength_m: f64,
    /// Estimated from the ray's velocities when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyquist_mps: Option<f64>,
}

impl Default for RayProps {
    fn default() -> Self {
        Self {
            time_secs: 0,
            nano_secs: 0.0,
            elevation_deg: 0.0,
            azimuth_deg: 0.0,
            n_gates: 0,
            start_range_km: 0.0,
            gate_spacing_km: 0.25,
            wavelength_m: 0.1,
            nyquist_mps: None,
        }
    }
}

impl RayProps {
    pub fn new(n_gates: usize, nyquist_mps: Option<f64>) -> Self {
        Self {
            n_gates,
            nyquist_mps,
            ..Default::default()
        }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        let nanos = self.nano_secs.clamp(0.0, 999_999_999.0) as u32;
        Utc.timestamp_opt(self.time_secs, nanos).single()
    }

    pub fn range_km(&self, gate: usize) -> f64 {
        self.start_range_km + gate as f64 * self.gate_spacing_km
    }
}
