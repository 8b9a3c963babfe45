//! Refresh-time decision logic: histogram voting across the cell grid,
//! correlation against recent history, and the jump limiter that keeps the
//! published heart rate from slewing faster than physiology allows.

use crate::constants::{
    ANGLE_CELLS, BREATH_BAND_END, BREATH_BAND_START, HEART_BAND_END, HEART_BAND_START,
    HEART_DECISION_THRESHOLD, HEART_JUMP_LIMIT, PHASE_FFT_SIZE, RANGE_WINDOW_BINS, WARMUP_CYCLES,
};
use crate::dsp::spectrum::{windowed_peak, CellPeaks};

/// Number of (angle, range) cells voting each refresh.
pub const CELL_COUNT: usize = ANGLE_CELLS * RANGE_WINDOW_BINS;

/// Per-cell peak indices gathered over one refresh,
/// indexed `range + angle * RANGE_WINDOW_BINS`.
#[derive(Debug, Clone)]
pub struct CellPeakTable {
    pub breath: [u16; CELL_COUNT],
    pub heart_primary: [u16; CELL_COUNT],
    pub heart_second: [u16; CELL_COUNT],
    pub heart_third: [u16; CELL_COUNT],
}

impl CellPeakTable {
    pub fn new() -> Self {
        Self {
            breath: [0; CELL_COUNT],
            heart_primary: [0; CELL_COUNT],
            heart_second: [0; CELL_COUNT],
            heart_third: [0; CELL_COUNT],
        }
    }

    pub fn set(&mut self, angle: usize, range: usize, peaks: CellPeaks) {
        let cell = range + angle * RANGE_WINDOW_BINS;
        self.breath[cell] = peaks.breath;
        self.heart_primary[cell] = peaks.heart[0];
        self.heart_second[cell] = peaks.heart[1];
        self.heart_third[cell] = peaks.heart[2];
    }
}

impl Default for CellPeakTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices chosen for one refresh.
#[derive(Debug, Clone, Copy)]
pub struct RefreshDecision {
    pub breath_index: u16,
    pub heart_index: u16,
}

pub struct DecisionStage {
    /// Heart peaks of the last four refreshes, newest first.
    previous_heart_peaks: [u16; 4],
    hist: Vec<f32>,
    storage_scratch: Vec<f32>,
}

impl DecisionStage {
    pub fn new() -> Self {
        Self {
            previous_heart_peaks: [0; 4],
            hist: vec![0.0; PHASE_FFT_SIZE / 2],
            storage_scratch: vec![0.0; PHASE_FFT_SIZE / 2],
        }
    }

    pub fn reset(&mut self) {
        self.previous_heart_peaks = [0; 4];
    }

    pub fn previous_heart_peaks(&self) -> [u16; 4] {
        self.previous_heart_peaks
    }

    /// Fold one refresh's cell votes into breathing and heart indices.
    ///
    /// `heart_storage` is the refresh-accumulated HPS from the spectrum
    /// stage; `loop_count` the number of refreshes completed before this
    /// one. Edge range cells of the heart vote are discarded in place.
    pub fn decide(
        &mut self,
        table: &mut CellPeakTable,
        heart_storage: &[f32],
        loop_count: u32,
    ) -> RefreshDecision {
        // Breathing: histogram of per-cell peaks, 3-tap vote
        self.hist.fill(0.0);
        for &b in table.breath.iter() {
            self.hist[b as usize] += 1.0;
        }
        let breath_index =
            windowed_peak(&self.hist, BREATH_BAND_START, BREATH_BAND_END, 1) as u16;

        // Heart: only the center range cells vote
        for angle in 0..ANGLE_CELLS {
            let first = angle * RANGE_WINDOW_BINS;
            let last = first + RANGE_WINDOW_BINS - 1;
            for arr in [
                &mut table.heart_primary,
                &mut table.heart_second,
                &mut table.heart_third,
            ] {
                arr[first] = 0;
                arr[last] = 0;
            }
        }

        self.hist.fill(0.0);
        for &h in table.heart_primary.iter() {
            self.hist[h as usize] += 1.0;
        }
        for &h in table.heart_second.iter() {
            self.hist[h as usize] += 1.0;
        }
        let heart_hist_index =
            windowed_peak(&self.hist, HEART_BAND_START, HEART_BAND_END, 2) as u16;

        // Correlation: the five strongest accumulated HPS peaks, matched
        // against the oldest history slot
        self.storage_scratch.copy_from_slice(heart_storage);
        let mut present = [0u16; 5];
        for slot in present.iter_mut() {
            let peak = windowed_peak(&self.storage_scratch, HEART_BAND_START, HEART_BAND_END, 1);
            *slot = peak as u16;
            if peak > 0 {
                self.storage_scratch[peak - 1] = 0.0;
                self.storage_scratch[peak] = 0.0;
                self.storage_scratch[peak + 1] = 0.0;
            }
        }

        let oldest = self.previous_heart_peaks[3];
        let mut best_diff = 100u16;
        let mut best_slot = 0usize;
        for (i, &p) in present.iter().enumerate() {
            let diff = p.abs_diff(oldest);
            if diff < best_diff {
                best_diff = diff;
                best_slot = i;
            }
        }

        let mut heart_index = if best_diff < HEART_DECISION_THRESHOLD {
            present[best_slot]
        } else {
            heart_hist_index
        };

        // Jump limiter
        let newest = self.previous_heart_peaks[0];
        if loop_count > WARMUP_CYCLES && heart_index.abs_diff(newest) > HEART_JUMP_LIMIT {
            heart_index = if heart_index > newest {
                newest + HEART_JUMP_LIMIT
            } else {
                newest - HEART_JUMP_LIMIT
            };
        }

        if loop_count > 4 {
            self.previous_heart_peaks[3] = self.previous_heart_peaks[2];
            self.previous_heart_peaks[2] = self.previous_heart_peaks[1];
            self.previous_heart_peaks[1] = self.previous_heart_peaks[0];
            self.previous_heart_peaks[0] = heart_index;
        } else if loop_count == 0 {
            self.previous_heart_peaks = [0; 4];
        }

        RefreshDecision {
            breath_index,
            heart_index,
        }
    }
}

impl Default for DecisionStage {
    fn default() -> Self {
        Self::new()
    }
}
