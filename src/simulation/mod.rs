mod noise;
mod signal;

pub use noise::{NoiseConfig, NoiseSource};
pub use signal::{
    bin_frequency_hz, generate_constant_frame, VitalsScenario, EFFECTIVE_FRAME_RATE_HZ,
};
