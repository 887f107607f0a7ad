use anyhow::{ensure, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rlancore::{MomentFields, RayInput, RayProps, MISSING_VAL};
use serde::{Deserialize, Serialize};

/// Configuration for synthesizing radar rays: a weather echo along the
/// whole ray with one stretch of interference laid over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub n_gates: usize,
    pub start_range_km: f64,
    pub gate_spacing_km: f64,
    pub wavelength_m: f64,
    pub elevation_deg: f64,
    pub azimuth_step_deg: f64,
    pub nyquist_mps: f64,
    /// Leave the Nyquist out of the ray props so the locator estimates it.
    pub estimate_nyquist: bool,
    pub weather_snr_db: f64,
    pub weather_snr_jitter_db: f64,
    pub weather_vel_start_mps: f64,
    pub weather_vel_end_mps: f64,
    pub weather_vel_jitter_mps: f64,
    pub weather_ncp: f64,
    pub weather_zdr_db: f64,
    pub interference_start_gate: usize,
    pub interference_end_gate: usize,
    pub interference_snr_db: f64,
    pub interference_snr_jitter_db: f64,
    pub interference_ncp: f64,
    /// Fraction of gates dropped to the missing value.
    pub missing_fraction: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_gates: 500,
            start_range_km: 0.5,
            gate_spacing_km: 0.15,
            wavelength_m: 0.107,
            elevation_deg: 0.5,
            azimuth_step_deg: 1.0,
            nyquist_mps: 25.0,
            estimate_nyquist: false,
            weather_snr_db: 20.0,
            weather_snr_jitter_db: 3.0,
            weather_vel_start_mps: -5.0,
            weather_vel_end_mps: 12.0,
            weather_vel_jitter_mps: 0.5,
            weather_ncp: 0.9,
            weather_zdr_db: 0.8,
            interference_start_gate: 200,
            interference_end_gate: 300,
            interference_snr_db: 5.0,
            interference_snr_jitter_db: 0.2,
            interference_ncp: 0.05,
            missing_fraction: 0.0,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn in_interference(&self, gate: usize) -> bool {
        (self.interference_start_gate..self.interference_end_gate).contains(&gate)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.n_gates > 0, "generator needs at least one gate");
        ensure!(self.nyquist_mps > 0.0, "nyquist must be positive");
        ensure!(
            (0.0..1.0).contains(&self.missing_fraction),
            "missing fraction {} outside [0, 1)",
            self.missing_fraction
        );
        for (label, jitter) in [
            ("weather_snr_jitter_db", self.weather_snr_jitter_db),
            ("weather_vel_jitter_mps", self.weather_vel_jitter_mps),
            ("interference_snr_jitter_db", self.interference_snr_jitter_db),
        ] {
            ensure!(jitter >= 0.0, "{} must not be negative", label);
        }
        Ok(())
    }
}

/// Uniform sample in +/- `half_width`; zero width gives zero.
fn jitter(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}

fn build_ray(config: &GeneratorConfig, ray_index: usize, rng: &mut StdRng) -> RayInput {
    let n_gates = config.n_gates;
    let mut snr = Vec::with_capacity(n_gates);
    let mut vel = Vec::with_capacity(n_gates);
    let mut width = Vec::with_capacity(n_gates);
    let mut ncp = Vec::with_capacity(n_gates);
    let mut zdr = Vec::with_capacity(n_gates);

    let vel_span = config.weather_vel_end_mps - config.weather_vel_start_mps;
    for gate in 0..n_gates {
        if rng.gen_bool(config.missing_fraction) {
            for field in [&mut snr, &mut vel, &mut width, &mut ncp, &mut zdr] {
                field.push(MISSING_VAL);
            }
            continue;
        }
        if config.in_interference(gate) {
            snr.push(config.interference_snr_db + jitter(rng, config.interference_snr_jitter_db));
            vel.push(jitter(rng, config.nyquist_mps));
            width.push(config.nyquist_mps / 2.0 + jitter(rng, 1.0));
            ncp.push(config.interference_ncp);
            zdr.push(jitter(rng, 4.0));
        } else {
            let frac = gate as f64 / n_gates as f64;
            snr.push(config.weather_snr_db + jitter(rng, config.weather_snr_jitter_db));
            vel.push(
                config.weather_vel_start_mps
                    + frac * vel_span
                    + jitter(rng, config.weather_vel_jitter_mps),
            );
            width.push(1.5 + jitter(rng, 0.5));
            ncp.push(config.weather_ncp);
            zdr.push(config.weather_zdr_db + jitter(rng, 0.3));
        }
    }

    let props = RayProps {
        time_secs: 1_700_000_000 + ray_index as i64,
        nano_secs: 0.0,
        elevation_deg: config.elevation_deg,
        azimuth_deg: (ray_index as f64 * config.azimuth_step_deg) % 360.0,
        n_gates,
        start_range_km: config.start_range_km,
        gate_spacing_km: config.gate_spacing_km,
        wavelength_m: config.wavelength_m,
        nyquist_mps: (!config.estimate_nyquist).then_some(config.nyquist_mps),
    };
    let fields = MomentFields::new(MISSING_VAL)
        .with_snr(snr)
        .with_vel(vel)
        .with_width(width)
        .with_ncp(ncp)
        .with_zdr(zdr);
    RayInput::new(props, fields)
}

pub fn build_rays(config: &GeneratorConfig, n_rays: usize) -> anyhow::Result<Vec<RayInput>> {
    config.validate().context("validating generator config")?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok((0..n_rays)
        .map(|ray_index| build_ray(config, ray_index, &mut rng))
        .collect())
}
