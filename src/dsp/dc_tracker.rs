//! Long-horizon DC estimator for the per-frame extract.
//!
//! Two equal halves ping-pong roles: one accumulates the running sum of the
//! current cycle while the other holds the frozen mean of the previous
//! cycle. The frame's own samples therefore never contribute to the mean
//! that is subtracted from it.

use num_complex::Complex32;

use crate::constants::{FRAMES_PER_CYCLE, NUM_VIRTUAL_ANTENNAS, RANGE_WINDOW_BINS};

const HALF_LEN: usize = RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS;

pub struct DcTracker {
    accumulating: Vec<Complex32>,
    frozen: Vec<Complex32>,
}

impl DcTracker {
    pub fn new() -> Self {
        Self {
            accumulating: vec![Complex32::new(0.0, 0.0); HALF_LEN],
            frozen: vec![Complex32::new(0.0, 0.0); HALF_LEN],
        }
    }

    /// Add the raw (pre-subtraction) frame into the accumulating half.
    pub fn accumulate(&mut self, frame: &[Complex32]) {
        debug_assert_eq!(frame.len(), HALF_LEN);
        for (acc, &x) in self.accumulating.iter_mut().zip(frame.iter()) {
            *acc += x;
        }
    }

    /// Subtract the frozen mean from the working frame in place.
    pub fn subtract(&self, frame: &mut [Complex32]) {
        debug_assert_eq!(frame.len(), HALF_LEN);
        for (x, &mean) in frame.iter_mut().zip(self.frozen.iter()) {
            *x -= mean;
        }
    }

    /// Freeze the accumulated sum as the new mean and start a fresh
    /// accumulation. Call exactly once per cycle, at the last frame.
    pub fn finalize_cycle(&mut self) {
        let scale = 1.0 / FRAMES_PER_CYCLE as f32;
        for acc in self.accumulating.iter_mut() {
            *acc *= scale;
        }
        self.frozen.fill(Complex32::new(0.0, 0.0));
        std::mem::swap(&mut self.accumulating, &mut self.frozen);
    }

    pub fn reset(&mut self) {
        self.accumulating.fill(Complex32::new(0.0, 0.0));
        self.frozen.fill(Complex32::new(0.0, 0.0));
    }

    /// Length of each half (diagnostics and tests).
    pub fn half_len(&self) -> usize {
        debug_assert_eq!(self.accumulating.len(), self.frozen.len());
        self.accumulating.len()
    }
}

impl Default for DcTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_sized() {
        let tracker = DcTracker::new();
        assert_eq!(tracker.half_len(), RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS);
    }

    #[test]
    fn test_constant_input_freezes_exactly() {
        let mut tracker = DcTracker::new();
        let value = Complex32::new(420.0, -96.0);
        let frame = vec![value; HALF_LEN];

        for _ in 0..FRAMES_PER_CYCLE {
            tracker.accumulate(&frame);
        }
        tracker.finalize_cycle();

        // The frozen mean equals the constant input bit-exactly, so the
        // next frame subtracts to the zero vector.
        let mut working = frame.clone();
        tracker.subtract(&mut working);
        for x in &working {
            assert_eq!(x.re, 0.0);
            assert_eq!(x.im, 0.0);
        }
    }

    #[test]
    fn test_first_cycle_subtracts_nothing() {
        let mut tracker = DcTracker::new();
        let frame = vec![Complex32::new(7.0, 3.0); HALF_LEN];
        tracker.accumulate(&frame);

        let mut working = frame.clone();
        tracker.subtract(&mut working);
        assert_eq!(working[0], Complex32::new(7.0, 3.0));
    }

    #[test]
    fn test_mean_is_one_cycle_old() {
        let mut tracker = DcTracker::new();
        let first = vec![Complex32::new(4.0, 0.0); HALF_LEN];
        let second = vec![Complex32::new(8.0, 0.0); HALF_LEN];

        for _ in 0..FRAMES_PER_CYCLE {
            tracker.accumulate(&first);
        }
        tracker.finalize_cycle();
        for _ in 0..FRAMES_PER_CYCLE {
            tracker.accumulate(&second);
        }

        // Still subtracting the first cycle's mean until finalize
        let mut working = second.clone();
        tracker.subtract(&mut working);
        assert_eq!(working[0].re, 4.0);

        tracker.finalize_cycle();
        let mut working = second.clone();
        tracker.subtract(&mut working);
        assert_eq!(working[0].re, 0.0);
    }
}
