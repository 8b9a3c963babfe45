//! Noise injection for synthetic cube frames.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::cube::CubeSample;

/// Additive I/Q noise configuration, deserializable from scenario files.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NoiseConfig {
    /// RNG seed; fixed so noisy runs stay reproducible.
    pub seed: u64,
    /// Standard deviation of the additive noise, in Q15 counts.
    pub sigma: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { seed: 1, sigma: 0.0 }
    }
}

pub struct NoiseSource {
    rng: ChaCha8Rng,
    normal: Option<Normal<f32>>,
}

impl NoiseSource {
    pub fn new(config: &NoiseConfig) -> Self {
        let normal = if config.sigma > 0.0 {
            Normal::new(0.0, config.sigma).ok()
        } else {
            None
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            normal,
        }
    }

    /// Add white noise to every sample of the frame, saturating at the Q15
    /// range.
    pub fn apply(&mut self, frame: &mut [CubeSample]) {
        let Some(normal) = self.normal else {
            return;
        };
        for sample in frame.iter_mut() {
            let re = sample.real as f32 + normal.sample(&mut self.rng);
            let im = sample.imag as f32 + normal.sample(&mut self.rng);
            sample.real = re.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            sample.imag = im.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        }
    }
}
