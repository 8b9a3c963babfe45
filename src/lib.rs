pub mod config;
pub mod constants;
pub mod cube;
pub mod dsp;
pub mod error;
pub mod geometry;
pub mod output;
pub mod pipeline;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::VitalSignsConfig;
pub use cube::{CubeSample, RadarCubeSlice};
pub use error::{Result, VitalError};
pub use output::VitalSignsResult;
pub use pipeline::{range_bin_from_position, PipelineState, VitalSignsPipeline};
