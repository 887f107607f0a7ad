use crate::math::kernel::KernelWindow;
use crate::math::stats::StatsHelper;
use crate::prelude::MISSING_VAL;

/// Per-gate statistics over each gate's kernel window.
///
/// Output slices must be the same length as `windows`; gates without
/// enough data keep whatever the caller initialised them to.
pub struct KernelStatsEngine;

impl KernelStatsEngine {
    /// Mean absolute deviation of the interior of the window from the
    /// straight line joining its end points.
    pub fn phase_change_error(accum: &[f64], window: KernelWindow) -> f64 {
        let KernelWindow {
            start_gate,
            end_gate,
        } = window;
        if end_gate < start_gate + 2 {
            return MISSING_VAL;
        }
        let phase_start = accum[start_gate];
        let slope = (accum[end_gate] - phase_start) / (end_gate - start_gate) as f64;

        let mut linear_phase = phase_start + slope;
        let mut sum_abs_error = 0.0;
        let mut count = 0usize;
        for &phase in &accum[start_gate + 1..end_gate] {
            sum_abs_error += (phase - linear_phase).abs();
            count += 1;
            linear_phase += slope;
        }
        sum_abs_error / count as f64
    }

    pub fn compute_phase_change_error(accum: &[f64], windows: &[KernelWindow], out: &mut [f64]) {
        for (window, out) in windows.iter().zip(out.iter_mut()) {
            *out = Self::phase_change_error(accum, *window);
        }
    }

    pub fn compute_sdev(vals: &[f64], missing: f64, windows: &[KernelWindow], out: &mut [f64]) {
        for (window, out) in windows.iter().zip(out.iter_mut()) {
            if let Some(sdev) = StatsHelper::sdev(&vals[window.gates()], missing) {
                *out = sdev;
            }
        }
    }

    pub fn compute_mean(vals: &[f64], missing: f64, windows: &[KernelWindow], out: &mut [f64]) {
        for (window, out) in windows.iter().zip(out.iter_mut()) {
            if let Some(mean) = StatsHelper::mean(&vals[window.gates()], missing) {
                *out = mean;
            }
        }
    }

    /// Kernel mode of each gate, and the gate's own departure from it.
    pub fn compute_mode(
        vals: &[f64],
        missing: f64,
        bin_width: f64,
        windows: &[KernelWindow],
        mode_out: &mut [f64],
        dmode_out: &mut [f64],
    ) {
        for (gate, window) in windows.iter().enumerate() {
            let Some(mode) = StatsHelper::mode(&vals[window.gates()], missing, bin_width) else {
                continue;
            };
            mode_out[gate] = mode;
            if StatsHelper::is_valid(vals[gate], missing) {
                dmode_out[gate] = vals[gate] - mode;
            }
        }
    }
}
