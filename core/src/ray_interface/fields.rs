use serde::{Deserialize, Serialize};

use crate::prelude::MISSING_VAL;
use crate::ray_interface::RayProps;

/// Per-gate moments for one ray. Any moment may be absent for the ray;
/// individual gates use `missing` for no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentFields {
    #[serde(default)]
    pub snr: Option<Vec<f64>>,
    #[serde(default)]
    pub vel: Option<Vec<f64>>,
    #[serde(default)]
    pub width: Option<Vec<f64>>,
    #[serde(default)]
    pub ncp: Option<Vec<f64>>,
    #[serde(default)]
    pub zdr: Option<Vec<f64>>,
    /// Phase in degrees; used in place of velocity when present.
    #[serde(default)]
    pub phase: Option<Vec<f64>>,
    pub missing: f64,
}

impl Default for MomentFields {
    fn default() -> Self {
        Self::new(MISSING_VAL)
    }
}

impl MomentFields {
    pub fn new(missing: f64) -> Self {
        Self {
            snr: None,
            vel: None,
            width: None,
            ncp: None,
            zdr: None,
            phase: None,
            missing,
        }
    }

    pub fn with_snr(mut self, vals: Vec<f64>) -> Self {
        self.snr = Some(vals);
        self
    }

    pub fn with_vel(mut self, vals: Vec<f64>) -> Self {
        self.vel = Some(vals);
        self
    }

    pub fn with_width(mut self, vals: Vec<f64>) -> Self {
        self.width = Some(vals);
        self
    }

    pub fn with_ncp(mut self, vals: Vec<f64>) -> Self {
        self.ncp = Some(vals);
        self
    }

    pub fn with_zdr(mut self, vals: Vec<f64>) -> Self {
        self.zdr = Some(vals);
        self
    }

    pub fn with_phase(mut self, vals: Vec<f64>) -> Self {
        self.phase = Some(vals);
        self
    }

    /// Name and length of each present moment.
    pub fn present_lengths(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        [
            ("snr", &self.snr),
            ("vel", &self.vel),
            ("width", &self.width),
            ("ncp", &self.ncp),
            ("zdr", &self.zdr),
            ("phase", &self.phase),
        ]
        .into_iter()
        .filter_map(|(name, vals)| vals.as_ref().map(|v| (name, v.len())))
    }
}

/// A ray as handed to a processing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayInput {
    pub props: RayProps,
    pub fields: MomentFields,
}

impl RayInput {
    pub fn new(props: RayProps, fields: MomentFields) -> Self {
        Self { props, fields }
    }
}
