use serde::Serialize;

/// Inclusive gate range of a kernel centred (as far as possible) on a gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KernelWindow {
    pub start_gate: usize,
    pub end_gate: usize,
}

impl KernelWindow {
    pub fn width(&self) -> usize {
        self.end_gate - self.start_gate + 1
    }

    pub fn gates(&self) -> std::ops::RangeInclusive<usize> {
        self.start_gate..=self.end_gate
    }
}

/// Window of width `kernel_size` around `gate`, shifted (not truncated)
/// to stay inside `[0, n_gates - 1]`.
///
/// Returns `None` when the ray is shorter than the kernel or the gate is
/// out of range. `kernel_size` must already be odd.
pub fn kernel_window(gate: usize, n_gates: usize, kernel_size: usize) -> Option<KernelWindow> {
    if kernel_size == 0 || n_gates < kernel_size || gate >= n_gates {
        return None;
    }
    let half = kernel_size / 2;
    let start_gate = gate.saturating_sub(half).min(n_gates - kernel_size);
    Some(KernelWindow {
        start_gate,
        end_gate: start_gate + kernel_size - 1,
    })
}

/// Fill `windows` with the kernel window of every gate.
///
/// Leaves `windows` untouched and returns false if the ray is too short.
pub fn compute_kernel_windows(windows: &mut [KernelWindow], kernel_size: usize) -> bool {
    let n_gates = windows.len();
    if kernel_size == 0 || n_gates < kernel_size {
        return false;
    }
    for (gate, window) in windows.iter_mut().enumerate() {
        if let Some(computed) = kernel_window(gate, n_gates, kernel_size) {
            *window = computed;
        }
    }
    true
}
