use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::math::interest_map::{ImPoint, InterestMap};
use crate::ray_interface::RayInput;

/// Marker for per-gate values that are undefined or could not be computed.
pub const MISSING_VAL: f64 = -9999.0;

/// Shared, immutable configuration for an RLAN locator.
///
/// Built once at startup and handed to each locator behind an `Arc`, so
/// several per-channel locators can read the same maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub interest_map_phase_change_error: InterestMap,
    pub interest_map_snr_sdev: InterestMap,
    pub interest_map_ncp_mean: InterestMap,
    pub interest_threshold: f64,
    pub n_gates_kernel: usize,
    pub min_n_gates_ray_median: usize,
    /// Histogram bin width, dB, for the SNR mode.
    pub snr_mode_bin_width: f64,
    /// Histogram bin width, dB, for the ZDR mode.
    pub zdr_mode_bin_width: f64,
    /// Drop criteria with missing metrics from the weighted average.
    pub renormalize_missing_criteria: bool,
    pub debug: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            interest_map_phase_change_error: InterestMap::from_parts(
                "PhaseChangeError",
                vec![ImPoint::new(40.0, 0.001), ImPoint::new(50.0, 1.0)],
                1.0,
            ),
            interest_map_snr_sdev: InterestMap::from_parts(
                "SnrSdev",
                vec![ImPoint::new(0.65, 1.0), ImPoint::new(0.75, 0.001)],
                1.0,
            ),
            interest_map_ncp_mean: InterestMap::from_parts(
                "NcpMean",
                vec![ImPoint::new(0.10, 1.0), ImPoint::new(0.20, 0.001)],
                1.0,
            ),
            interest_threshold: 0.51,
            n_gates_kernel: 9,
            min_n_gates_ray_median: 30,
            snr_mode_bin_width: 1.0,
            zdr_mode_bin_width: 0.2,
            renormalize_missing_criteria: false,
            debug: false,
        }
    }
}

impl LocatorConfig {
    /// Kernel width actually used, forced odd.
    pub fn kernel_size(&self) -> usize {
        (self.n_gates_kernel / 2) * 2 + 1
    }

    pub fn sum_weights(&self) -> f64 {
        self.interest_map_phase_change_error.weight()
            + self.interest_map_snr_sdev.weight()
            + self.interest_map_ncp_mean.weight()
    }

    pub fn validate(&self) -> RlanResult<()> {
        self.interest_map_phase_change_error.validate()?;
        self.interest_map_snr_sdev.validate()?;
        self.interest_map_ncp_mean.validate()?;
        if self.sum_weights() <= 0.0 {
            return Err(RlanError::InvalidConfig(
                "sum of interest map weights must be positive".into(),
            ));
        }
        if !self.interest_threshold.is_finite() {
            return Err(RlanError::InvalidConfig(format!(
                "interest threshold {} is not finite",
                self.interest_threshold
            )));
        }
        if self.kernel_size() < 3 {
            return Err(RlanError::InvalidConfig(format!(
                "n_gates_kernel {} too small, need at least 3",
                self.n_gates_kernel
            )));
        }
        for (label, width) in [
            ("snr_mode_bin_width", self.snr_mode_bin_width),
            ("zdr_mode_bin_width", self.zdr_mode_bin_width),
        ] {
            if width.is_nan() || width <= 0.0 {
                return Err(RlanError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    label, width
                )));
            }
        }
        Ok(())
    }

    /// Human-readable parameter dump.
    pub fn print_params<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for LocatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performing RLAN interference detection:")?;
        writeln!(f, "  nGatesKernel: {}", self.n_gates_kernel)?;
        writeln!(f, "  minNGatesRayMedian: {}", self.min_n_gates_ray_median)?;
        writeln!(f, "  interestThreshold: {}", self.interest_threshold)?;
        writeln!(
            f,
            "  renormalizeMissingCriteria: {}",
            self.renormalize_missing_criteria
        )?;
        write!(f, "{}", self.interest_map_phase_change_error)?;
        write!(f, "{}", self.interest_map_snr_sdev)?;
        write!(f, "{}", self.interest_map_ncp_mean)
    }
}

/// Summary of one ray passed through a stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageSummary {
    pub n_gates: usize,
    pub n_flagged: usize,
    pub kernel_applied: bool,
    pub nyquist: Option<f64>,
    pub notes: Vec<String>,
}

/// Common error type for locator configuration and input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RlanError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type RlanResult<T> = Result<T, RlanError>;

/// Ray-by-ray processing stage.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &LocatorConfig) -> RlanResult<()>;
    fn execute(&mut self, input: &RayInput) -> RlanResult<StageSummary>;
    fn cleanup(&mut self);
}
