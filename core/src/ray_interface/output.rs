use serde::Serialize;

use crate::prelude::{RlanError, RlanResult};

/// Snapshot of the per-gate diagnostics for one located ray.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RlanOutput {
    pub time_secs: i64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub nyquist_mps: Option<f64>,
    pub ray_snr_median: f64,
    pub phase: Vec<f64>,
    pub phase_change_error: Vec<f64>,
    pub snr_sdev: Vec<f64>,
    pub zdr_sdev: Vec<f64>,
    pub ncp_mean: Vec<f64>,
    pub snr_mode: Vec<f64>,
    pub snr_dmode: Vec<f64>,
    pub zdr_mode: Vec<f64>,
    pub zdr_dmode: Vec<f64>,
    pub interest: Vec<f64>,
    pub rlan_flag: Vec<bool>,
}

impl RlanOutput {
    pub fn n_flagged(&self) -> usize {
        self.rlan_flag.iter().filter(|&&flag| flag).count()
    }

    pub fn to_json(&self) -> RlanResult<String> {
        serde_json::to_string(self).map_err(|err| RlanError::Internal(err.to_string()))
    }
}
