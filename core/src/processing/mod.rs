pub mod fusion;
pub mod gate_buffer;
pub mod kernel_stats;
pub mod locator;
pub mod phase_accum;
pub mod smoother;

pub use fusion::FusionClassifier;
pub use gate_buffer::GateBuffer;
pub use kernel_stats::KernelStatsEngine;
pub use locator::RlanLocator;
pub use phase_accum::PhaseAccumulator;
pub use smoother::{clear_pass, fill_pass, smooth_flags};
