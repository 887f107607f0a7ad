use std::io;
use std::sync::Arc;

use crate::math::interest_map::{ImPoint, InterestMap};
use crate::math::kernel::{compute_kernel_windows, KernelWindow};
use crate::math::stats::StatsHelper;
use crate::prelude::{
    LocatorConfig, ProcessingStage, RlanError, RlanResult, StageSummary, MISSING_VAL,
};
use crate::processing::fusion::FusionClassifier;
use crate::processing::gate_buffer::GateBuffer;
use crate::processing::kernel_stats::KernelStatsEngine;
use crate::processing::phase_accum::PhaseAccumulator;
use crate::processing::smoother::smooth_flags;
use crate::ray_interface::{MomentFields, RayInput, RayProps, RlanOutput};
use crate::telemetry::{LogManager, MetricsRecorder};

/// One moment copied from the current ray, with its availability.
#[derive(Debug, Default)]
struct MomentBuffer {
    vals: GateBuffer<f64>,
    available: bool,
}

impl MomentBuffer {
    fn load(&mut self, src: Option<&Vec<f64>>) {
        match src {
            Some(vals) => {
                self.vals.load(vals);
                self.available = true;
            }
            None => self.available = false,
        }
    }

    fn get(&self) -> Option<&[f64]> {
        self.available.then(|| self.vals.as_slice())
    }
}

/// Locates gates contaminated by RLAN / RFI along a radar ray.
///
/// Usage per ray: [`set_ray_props`](Self::set_ray_props), then
/// [`set_fields`](Self::set_fields), then [`locate`](Self::locate).
/// The per-gate results stay readable until the next `locate`.
///
/// All ray buffers are owned by the locator and reused between rays.
/// A locator is not shareable between threads; give each worker its own
/// and share the configuration through an `Arc`.
pub struct RlanLocator {
    config: Arc<LocatorConfig>,
    logger: LogManager,
    metrics: Option<Arc<MetricsRecorder>>,

    props: RayProps,
    missing: f64,
    fields_loaded: bool,

    snr: MomentBuffer,
    vel: MomentBuffer,
    width: MomentBuffer,
    ncp: MomentBuffer,
    zdr: MomentBuffer,
    phase_in: MomentBuffer,

    windows: GateBuffer<KernelWindow>,
    accum_phase: GateBuffer<f64>,
    phase_change_error: GateBuffer<f64>,
    snr_sdev: GateBuffer<f64>,
    zdr_sdev: GateBuffer<f64>,
    ncp_mean: GateBuffer<f64>,
    snr_mode: GateBuffer<f64>,
    snr_dmode: GateBuffer<f64>,
    zdr_mode: GateBuffer<f64>,
    zdr_dmode: GateBuffer<f64>,
    interest: GateBuffer<f64>,
    rlan_flag: GateBuffer<bool>,

    nyquist_used: Option<f64>,
    ray_snr_median: f64,
    kernel_applied: bool,
    median_scratch: Vec<f64>,
}

impl Default for RlanLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RlanLocator {
    /// Locator with the default interest maps, weights and threshold.
    pub fn new() -> Self {
        Self::from_validated(Arc::new(LocatorConfig::default()))
    }

    /// Locator sharing an existing configuration.
    pub fn with_config(config: Arc<LocatorConfig>) -> RlanResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: Arc<LocatorConfig>) -> Self {
        let mut logger = LogManager::new();
        logger.set_debug(config.debug);
        Self {
            config,
            logger,
            metrics: None,
            props: RayProps::default(),
            missing: MISSING_VAL,
            fields_loaded: false,
            snr: MomentBuffer::default(),
            vel: MomentBuffer::default(),
            width: MomentBuffer::default(),
            ncp: MomentBuffer::default(),
            zdr: MomentBuffer::default(),
            phase_in: MomentBuffer::default(),
            windows: GateBuffer::new(),
            accum_phase: GateBuffer::new(),
            phase_change_error: GateBuffer::new(),
            snr_sdev: GateBuffer::new(),
            zdr_sdev: GateBuffer::new(),
            ncp_mean: GateBuffer::new(),
            snr_mode: GateBuffer::new(),
            snr_dmode: GateBuffer::new(),
            zdr_mode: GateBuffer::new(),
            zdr_dmode: GateBuffer::new(),
            interest: GateBuffer::new(),
            rlan_flag: GateBuffer::new(),
            nyquist_used: None,
            ray_snr_median: MISSING_VAL,
            kernel_applied: false,
            median_scratch: Vec::new(),
        }
    }

    pub fn config(&self) -> &Arc<LocatorConfig> {
        &self.config
    }

    pub fn set_config(&mut self, config: Arc<LocatorConfig>) -> RlanResult<()> {
        config.validate()?;
        self.logger.set_debug(config.debug);
        self.config = config;
        Ok(())
    }

    /// Apply `edit` to a private copy of the config, keeping the old one
    /// if the result does not validate.
    fn update_config(&mut self, edit: impl FnOnce(&mut LocatorConfig)) -> RlanResult<()> {
        let mut config = (*self.config).clone();
        edit(&mut config);
        self.set_config(Arc::new(config))
    }

    pub fn set_debug(&mut self, debug: bool) {
        Arc::make_mut(&mut self.config).debug = debug;
        self.logger.set_debug(debug);
    }

    pub fn set_n_gates_kernel(&mut self, n_gates: usize) -> RlanResult<()> {
        self.update_config(|config| config.n_gates_kernel = n_gates)
    }

    pub fn set_min_n_gates_ray_median(&mut self, n_gates: usize) -> RlanResult<()> {
        self.update_config(|config| config.min_n_gates_ray_median = n_gates)
    }

    pub fn set_interest_threshold(&mut self, threshold: f64) -> RlanResult<()> {
        self.update_config(|config| config.interest_threshold = threshold)
    }

    pub fn set_renormalize_missing_criteria(&mut self, renormalize: bool) -> RlanResult<()> {
        self.update_config(|config| config.renormalize_missing_criteria = renormalize)
    }

    pub fn set_interest_map_phase_change_error(
        &mut self,
        points: Vec<ImPoint>,
        weight: f64,
    ) -> RlanResult<()> {
        let map = InterestMap::new("PhaseChangeError", points, weight)?;
        self.update_config(|config| config.interest_map_phase_change_error = map)
    }

    pub fn set_interest_map_snr_sdev(&mut self, points: Vec<ImPoint>, weight: f64) -> RlanResult<()> {
        let map = InterestMap::new("SnrSdev", points, weight)?;
        self.update_config(|config| config.interest_map_snr_sdev = map)
    }

    pub fn set_interest_map_ncp_mean(&mut self, points: Vec<ImPoint>, weight: f64) -> RlanResult<()> {
        let map = InterestMap::new("NcpMean", points, weight)?;
        self.update_config(|config| config.interest_map_ncp_mean = map)
    }

    pub fn set_metrics(&mut self, metrics: Arc<MetricsRecorder>) {
        self.metrics = Some(metrics);
    }

    pub fn print_params<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.config.print_params(out)
    }

    /// Start a new ray. Fields from the previous ray are discarded.
    pub fn set_ray_props(&mut self, props: RayProps) {
        self.props = props;
        self.fields_loaded = false;
    }

    /// Copy the ray's moments. Every present moment must have one value
    /// per gate; on error nothing is loaded.
    pub fn set_fields(&mut self, fields: &MomentFields) -> RlanResult<()> {
        self.fields_loaded = false;
        let n_gates = self.props.n_gates;
        if let Some((name, len)) = fields.present_lengths().find(|&(_, len)| len != n_gates) {
            return Err(RlanError::InvalidInput(format!(
                "{} has {} gates, ray has {}",
                name, len, n_gates
            )));
        }
        self.missing = fields.missing;
        self.snr.load(fields.snr.as_ref());
        self.vel.load(fields.vel.as_ref());
        self.width.load(fields.width.as_ref());
        self.ncp.load(fields.ncp.as_ref());
        self.zdr.load(fields.zdr.as_ref());
        self.phase_in.load(fields.phase.as_ref());
        self.fields_loaded = true;
        Ok(())
    }

    /// Classify every gate of the current ray.
    ///
    /// Never fails: a ray shorter than the kernel, or one without fields,
    /// leaves every flag false and every metric missing.
    pub fn locate(&mut self) {
        let n_gates = self.props.n_gates;
        self.reset_outputs(n_gates);

        if !self.fields_loaded {
            self.logger
                .warn("RlanLocator::locate called without fields for this ray");
            self.record_skipped();
            return;
        }

        if self.logger.is_debug() {
            let time = self
                .props
                .time()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
                .unwrap_or_else(|| "unknown".into());
            self.logger.detail(&format!(
                "RLAN locate: time {}, el {:.2}, az {:.2}, nGates {}",
                time, self.props.elevation_deg, self.props.azimuth_deg, n_gates
            ));
        }

        // short rays keep every output at its default
        let kernel_size = self.config.kernel_size();
        if !compute_kernel_windows(self.windows.as_mut_slice(), kernel_size) {
            self.logger.detail(&format!(
                "RLAN ray too short: nGates {} < kernel {}",
                n_gates, kernel_size
            ));
            self.record_skipped();
            return;
        }
        self.kernel_applied = true;

        self.compute_ray_snr_median();
        self.compute_phase();
        self.compute_kernel_stats();

        let fusion = FusionClassifier::new(&self.config);
        fusion.classify(
            self.phase_change_error.as_slice(),
            self.snr_sdev.as_slice(),
            self.ncp_mean.as_slice(),
            self.interest.as_mut_slice(),
            self.rlan_flag.as_mut_slice(),
        );

        smooth_flags(self.rlan_flag.as_mut_slice());

        let n_flagged = self.n_flagged();
        self.logger
            .detail(&format!("RLAN flagged {} of {} gates", n_flagged, n_gates));
        if let Some(metrics) = &self.metrics {
            metrics.record_processed(n_flagged);
        }
    }

    fn reset_outputs(&mut self, n_gates: usize) {
        self.windows.prepare(n_gates, KernelWindow::default());
        for buf in [
            &mut self.accum_phase,
            &mut self.phase_change_error,
            &mut self.snr_sdev,
            &mut self.zdr_sdev,
            &mut self.ncp_mean,
            &mut self.snr_mode,
            &mut self.snr_dmode,
            &mut self.zdr_mode,
            &mut self.zdr_dmode,
            &mut self.interest,
        ] {
            buf.prepare(n_gates, MISSING_VAL);
        }
        self.rlan_flag.prepare(n_gates, false);
        self.nyquist_used = None;
        self.ray_snr_median = MISSING_VAL;
        self.kernel_applied = false;
    }

    fn record_skipped(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_skipped();
        }
    }

    fn compute_ray_snr_median(&mut self) {
        let Some(snr) = self.snr.get() else {
            return;
        };
        let n_valid = snr
            .iter()
            .filter(|&&v| StatsHelper::is_valid(v, self.missing))
            .count();
        if n_valid < self.config.min_n_gates_ray_median {
            return;
        }
        if let Some(median) = StatsHelper::median(snr, self.missing, &mut self.median_scratch) {
            self.ray_snr_median = median;
        }
    }

    fn compute_phase(&mut self) {
        let accum = self.accum_phase.as_mut_slice();
        if let Some(phase) = self.phase_in.get() {
            PhaseAccumulator::from_phase(phase, self.missing, accum);
        } else if let Some(vel) = self.vel.get() {
            self.nyquist_used =
                PhaseAccumulator::from_velocity(vel, self.missing, self.props.nyquist_mps, accum);
            if self.props.nyquist_mps.is_none() {
                self.logger.detail(&format!(
                    "RLAN nyquist estimated from velocity: {:?}",
                    self.nyquist_used
                ));
            }
        }
    }

    fn compute_kernel_stats(&mut self) {
        let windows = self.windows.as_slice();
        let missing = self.missing;
        let phase_available = self.phase_in.available || self.vel.available;

        // without a trajectory the error is only meaningful as a missing
        // metric when fusion drops missing criteria
        if phase_available || !self.config.renormalize_missing_criteria {
            KernelStatsEngine::compute_phase_change_error(
                self.accum_phase.as_slice(),
                windows,
                self.phase_change_error.as_mut_slice(),
            );
        }

        if let Some(snr) = self.snr.get() {
            KernelStatsEngine::compute_sdev(snr, missing, windows, self.snr_sdev.as_mut_slice());
            KernelStatsEngine::compute_mode(
                snr,
                missing,
                self.config.snr_mode_bin_width,
                windows,
                self.snr_mode.as_mut_slice(),
                self.snr_dmode.as_mut_slice(),
            );
        }

        if let Some(zdr) = self.zdr.get() {
            KernelStatsEngine::compute_sdev(zdr, missing, windows, self.zdr_sdev.as_mut_slice());
            KernelStatsEngine::compute_mode(
                zdr,
                missing,
                self.config.zdr_mode_bin_width,
                windows,
                self.zdr_mode.as_mut_slice(),
                self.zdr_dmode.as_mut_slice(),
            );
        }

        if let Some(ncp) = self.ncp.get() {
            KernelStatsEngine::compute_mean(ncp, missing, windows, self.ncp_mean.as_mut_slice());
        }
    }

    pub fn n_gates(&self) -> usize {
        self.rlan_flag.len()
    }

    pub fn n_flagged(&self) -> usize {
        self.rlan_flag.as_slice().iter().filter(|&&flag| flag).count()
    }

    pub fn kernel_applied(&self) -> bool {
        self.kernel_applied
    }

    pub fn nyquist_used(&self) -> Option<f64> {
        self.nyquist_used
    }

    pub fn ray_snr_median(&self) -> f64 {
        self.ray_snr_median
    }

    pub fn rlan_flag(&self) -> &[bool] {
        self.rlan_flag.as_slice()
    }

    /// Accumulated phase change along the ray, degrees.
    pub fn phase(&self) -> &[f64] {
        self.accum_phase.as_slice()
    }

    pub fn phase_change_error(&self) -> &[f64] {
        self.phase_change_error.as_slice()
    }

    pub fn snr_sdev(&self) -> &[f64] {
        self.snr_sdev.as_slice()
    }

    pub fn zdr_sdev(&self) -> &[f64] {
        self.zdr_sdev.as_slice()
    }

    pub fn ncp_mean(&self) -> &[f64] {
        self.ncp_mean.as_slice()
    }

    pub fn snr_mode(&self) -> &[f64] {
        self.snr_mode.as_slice()
    }

    pub fn snr_dmode(&self) -> &[f64] {
        self.snr_dmode.as_slice()
    }

    pub fn zdr_mode(&self) -> &[f64] {
        self.zdr_mode.as_slice()
    }

    pub fn zdr_dmode(&self) -> &[f64] {
        self.zdr_dmode.as_slice()
    }

    pub fn interest(&self) -> &[f64] {
        self.interest.as_slice()
    }

    pub fn kernel_windows(&self) -> &[KernelWindow] {
        self.windows.as_slice()
    }

    /// SNR as loaded for this ray, if present.
    pub fn snr(&self) -> Option<&[f64]> {
        self.snr.get().filter(|_| self.fields_loaded)
    }

    /// ZDR as loaded for this ray, if present.
    pub fn zdr(&self) -> Option<&[f64]> {
        self.zdr.get().filter(|_| self.fields_loaded)
    }

    pub fn summary(&self) -> StageSummary {
        let mut notes = Vec::new();
        if !self.kernel_applied {
            notes.push(format!(
                "kernel not applied, nGates {} kernel {}",
                self.n_gates(),
                self.config.kernel_size()
            ));
        }
        if !(self.vel.available || self.phase_in.available) {
            notes.push("no velocity or phase, phase change error unavailable".into());
        }
        StageSummary {
            n_gates: self.n_gates(),
            n_flagged: self.n_flagged(),
            kernel_applied: self.kernel_applied,
            nyquist: self.nyquist_used,
            notes,
        }
    }

    pub fn output(&self) -> RlanOutput {
        RlanOutput {
            time_secs: self.props.time_secs,
            elevation_deg: self.props.elevation_deg,
            azimuth_deg: self.props.azimuth_deg,
            nyquist_mps: self.nyquist_used,
            ray_snr_median: self.ray_snr_median,
            phase: self.phase().to_vec(),
            phase_change_error: self.phase_change_error().to_vec(),
            snr_sdev: self.snr_sdev().to_vec(),
            zdr_sdev: self.zdr_sdev().to_vec(),
            ncp_mean: self.ncp_mean().to_vec(),
            snr_mode: self.snr_mode().to_vec(),
            snr_dmode: self.snr_dmode().to_vec(),
            zdr_mode: self.zdr_mode().to_vec(),
            zdr_dmode: self.zdr_dmode().to_vec(),
            interest: self.interest().to_vec(),
            rlan_flag: self.rlan_flag().to_vec(),
        }
    }

    /// Drop all ray buffers; configuration is kept.
    pub fn release_buffers(&mut self) {
        for moment in [
            &mut self.snr,
            &mut self.vel,
            &mut self.width,
            &mut self.ncp,
            &mut self.zdr,
            &mut self.phase_in,
        ] {
            moment.vals.release();
            moment.available = false;
        }
        self.windows.release();
        for buf in [
            &mut self.accum_phase,
            &mut self.phase_change_error,
            &mut self.snr_sdev,
            &mut self.zdr_sdev,
            &mut self.ncp_mean,
            &mut self.snr_mode,
            &mut self.snr_dmode,
            &mut self.zdr_mode,
            &mut self.zdr_dmode,
            &mut self.interest,
        ] {
            buf.release();
        }
        self.rlan_flag.release();
        self.median_scratch = Vec::new();
        self.fields_loaded = false;
        self.kernel_applied = false;
    }

    pub fn buffer_capacity(&self) -> usize {
        self.rlan_flag.capacity()
    }
}

impl ProcessingStage for RlanLocator {
    fn initialize(&mut self, config: &LocatorConfig) -> RlanResult<()> {
        self.set_config(Arc::new(config.clone()))
    }

    fn execute(&mut self, input: &RayInput) -> RlanResult<StageSummary> {
        self.set_ray_props(input.props.clone());
        self.set_fields(&input.fields)?;
        self.locate();
        Ok(self.summary())
    }

    fn cleanup(&mut self) {
        self.release_buffers();
    }
}
