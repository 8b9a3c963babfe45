//! Synthetic radar-cube generation for tests and the demo monitor.
//!
//! Models a single chest target: a complex tone at one range bin whose
//! phase follows breathing and heartbeat displacement sinusoids, optionally
//! steered across the antenna columns so the angle peak lands off-center.

use std::f32::consts::PI;

use crate::constants::{ANGLE_FFT_SIZE, BPM_PER_BIN, NUM_VIRTUAL_ANTENNAS, PHASE_FFT_SIZE};
use crate::cube::CubeSample;
use crate::geometry::AntennaGeometry;

/// Frame rate at which spectrum bin k corresponds to k * BPM_PER_BIN.
pub const EFFECTIVE_FRAME_RATE_HZ: f32 = PHASE_FFT_SIZE as f32 * BPM_PER_BIN / 60.0;

/// Frequency in Hz that lands on the given spectrum bin at the effective
/// frame rate.
pub fn bin_frequency_hz(bin: usize) -> f32 {
    bin as f32 * BPM_PER_BIN / 60.0
}

/// A single-target vital-signs scene.
#[derive(Debug, Clone)]
pub struct VitalsScenario {
    pub num_range_bins: usize,
    /// Range bin carrying the target return.
    pub target_bin: u16,
    pub breath_hz: f32,
    /// Breathing phase swing in radians (displacement * 4 pi / lambda).
    pub breath_swing_rad: f32,
    pub heart_hz: f32,
    pub heart_swing_rad: f32,
    /// Return amplitude in Q15 counts.
    pub amplitude: f32,
    /// Azimuth angle-FFT bin to steer the target toward.
    pub azimuth_steer_bin: usize,
    pub frame_rate_hz: f32,
}

impl Default for VitalsScenario {
    fn default() -> Self {
        Self {
            num_range_bins: 64,
            target_bin: 24,
            breath_hz: bin_frequency_hz(17),
            breath_swing_rad: 2.5,
            heart_hz: bin_frequency_hz(82),
            heart_swing_rad: 0.6,
            amplitude: 4000.0,
            azimuth_steer_bin: 0,
            frame_rate_hz: EFFECTIVE_FRAME_RATE_HZ,
        }
    }
}

impl VitalsScenario {
    /// A scene breathing at the given rate, heart still.
    pub fn breathing_only(bpm_bin: usize) -> Self {
        Self {
            heart_swing_rad: 0.0,
            breath_hz: bin_frequency_hz(bpm_bin),
            ..Self::default()
        }
    }

    /// A scene with a heartbeat at the given rate, breath still.
    pub fn heart_only(bpm_bin: usize) -> Self {
        Self {
            breath_swing_rad: 0.0,
            heart_hz: bin_frequency_hz(bpm_bin),
            ..Self::default()
        }
    }

    /// Chest phase at frame `frame_index`.
    pub fn phase_at(&self, frame_index: usize) -> f32 {
        let t = frame_index as f32 / self.frame_rate_hz;
        self.breath_swing_rad * (2.0 * PI * self.breath_hz * t).sin()
            + self.heart_swing_rad * (2.0 * PI * self.heart_hz * t).sin()
    }

    /// Generate the cube samples for one frame: the target return at
    /// `target_bin` across all virtual antennas, zero elsewhere.
    pub fn generate_frame(&self, frame_index: usize) -> Vec<CubeSample> {
        let geometry = AntennaGeometry::default();
        let mut cube =
            vec![CubeSample::default(); self.num_range_bins * NUM_VIRTUAL_ANTENNAS];

        let phase = self.phase_at(frame_index);
        for antenna in 0..NUM_VIRTUAL_ANTENNAS {
            let (_, col) = geometry.position(antenna);
            let steer =
                2.0 * PI * (self.azimuth_steer_bin * col) as f32 / ANGLE_FFT_SIZE as f32;
            let total = phase + steer;
            cube[self.target_bin as usize + antenna * self.num_range_bins] = CubeSample::new(
                (self.amplitude * total.sin()).round() as i16,
                (self.amplitude * total.cos()).round() as i16,
            );
        }
        cube
    }
}

/// A frame of identical constant samples at every bin of the window around
/// `target_bin` (used to exercise the DC tracker).
pub fn generate_constant_frame(
    num_range_bins: usize,
    target_bin: u16,
    sample: CubeSample,
) -> Vec<CubeSample> {
    let mut cube = vec![CubeSample::default(); num_range_bins * NUM_VIRTUAL_ANTENNAS];
    for antenna in 0..NUM_VIRTUAL_ANTENNAS {
        cube[target_bin as usize + antenna * num_range_bins] = sample;
    }
    cube
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_frame_rate() {
        assert!((EFFECTIVE_FRAME_RATE_HZ - 7.5264).abs() < 1e-3);
        assert!((bin_frequency_hz(17) - 0.25).abs() < 0.001);
        assert!((bin_frequency_hz(82) - 1.2054).abs() < 0.001);
    }

    #[test]
    fn test_frame_layout() {
        let scenario = VitalsScenario::default();
        let frame = scenario.generate_frame(0);
        assert_eq!(frame.len(), 64 * NUM_VIRTUAL_ANTENNAS);

        // Signal only at the target bin
        for antenna in 0..NUM_VIRTUAL_ANTENNAS {
            for bin in 0..scenario.num_range_bins {
                let sample = frame[bin + antenna * scenario.num_range_bins];
                if bin == scenario.target_bin as usize {
                    assert_ne!(sample, CubeSample::default());
                } else {
                    assert_eq!(sample, CubeSample::default());
                }
            }
        }
    }

    #[test]
    fn test_steering_sets_column_phase() {
        let mut scenario = VitalsScenario::default();
        scenario.breath_swing_rad = 0.0;
        scenario.heart_swing_rad = 0.0;
        scenario.azimuth_steer_bin = 4;

        let frame = scenario.generate_frame(0);
        let geometry = AntennaGeometry::default();
        // Steer bin 4 of 16 puts adjacent columns a quarter turn apart
        let a0 = frame[scenario.target_bin as usize];
        assert_eq!(geometry.position(1).1, 1);
        let a1 = frame[scenario.target_bin as usize + scenario.num_range_bins];
        assert!((a0.real as f32 - scenario.amplitude).abs() <= 1.0);
        assert!(a0.imag.abs() <= 1);
        assert!(a1.real.abs() <= 1);
        assert!((a1.imag as f32 - scenario.amplitude).abs() <= 1.0);
    }
}
