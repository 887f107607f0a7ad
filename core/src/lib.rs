//! Per-gate RLAN / radio-frequency interference locator for Doppler radar.
//!
//! Each ray's velocity is turned into an accumulated phase trajectory;
//! kernel statistics of that trajectory, of SNR and of NCP are mapped
//! through fuzzy interest maps and fused into a per-gate flag, which is
//! then speckle-smoothed. See [`processing::RlanLocator`].

pub mod math;
pub mod prelude;
pub mod processing;
pub mod ray_interface;
pub mod telemetry;

pub use prelude::{LocatorConfig, ProcessingStage, RlanError, RlanResult, StageSummary, MISSING_VAL};
pub use processing::RlanLocator;
pub use ray_interface::{MomentFields, RayInput, RayProps, RlanOutput};
