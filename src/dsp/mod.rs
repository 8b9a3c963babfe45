pub mod angle;
pub mod dc_tracker;
pub mod decision;
pub mod fft;
pub mod math;
pub mod spectrum;

pub use angle::{toroidal_neighborhood, AngleStage};
pub use dc_tracker::DcTracker;
pub use decision::{CellPeakTable, DecisionStage, RefreshDecision};
pub use fft::{magnitude_squared, Fft};
pub use math::{phase_from_fixed, phase_to_fixed, unwrap_step, variance};
pub use spectrum::{CellPeaks, SpectrumStage};
