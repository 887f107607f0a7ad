pub mod interest_map;
pub mod kernel;
pub mod phase;
pub mod stats;

pub use interest_map::{ImPoint, InterestMap};
pub use kernel::{compute_kernel_windows, kernel_window, KernelWindow};
pub use stats::StatsHelper;
