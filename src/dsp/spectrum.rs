//! Phase-to-spectrum stage: per (angle, range) cell, rebuild the cycle's
//! time-ordered phase series from the cycle ring, unwrap it, and transform
//! its first differences into a 512-point spectrum. Breathing is the peak in
//! the low band; heart rate comes from a harmonic-product spectrum
//! `HPS[k] = S[2k] * S[k]` scanned in the high band.

use num_complex::Complex32;

use crate::constants::{
    BREATH_BAND_END, BREATH_BAND_START, CELLS_PER_FRAME, FRAMES_PER_CYCLE, HEART_BAND_END,
    HEART_BAND_START, PHASE_FFT_SIZE, REFERENCE_SERIES_LEN,
};
use crate::dsp::fft::{magnitude_squared, Fft};
use crate::dsp::math::unwrap_step;
use crate::error::Result;

/// First index with the maximum windowed sum over `[band_start, band_end)`,
/// summing `half_width` taps on each side. Returns 0 (outside every
/// detection band) when the band holds no positive window.
pub(crate) fn windowed_peak(
    values: &[f32],
    band_start: usize,
    band_end: usize,
    half_width: usize,
) -> usize {
    let mut best_value = 0.0f32;
    let mut best_index = 0usize;
    for k in band_start..band_end {
        let mut sum = 0.0f32;
        for &v in &values[k - half_width..=k + half_width] {
            sum += v;
        }
        if sum > best_value {
            best_value = sum;
            best_index = k;
        }
    }
    best_index
}

/// Spectrum peak indices detected for one (angle, range) cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellPeaks {
    pub breath: u16,
    /// Strongest three HPS peaks, strongest first.
    pub heart: [u16; 3],
}

pub struct SpectrumStage {
    fft: Fft,
    series: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    power: Vec<f32>,
    hps: Vec<f32>,
    breath_storage: Vec<f32>,
    heart_storage: Vec<f32>,
    reference: [f32; REFERENCE_SERIES_LEN],
}

impl SpectrumStage {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fft: Fft::new(PHASE_FFT_SIZE)?,
            series: vec![Complex32::new(0.0, 0.0); PHASE_FFT_SIZE],
            spectrum: vec![Complex32::new(0.0, 0.0); PHASE_FFT_SIZE],
            power: vec![0.0; PHASE_FFT_SIZE],
            hps: vec![0.0; PHASE_FFT_SIZE / 2],
            breath_storage: vec![0.0; PHASE_FFT_SIZE / 2],
            heart_storage: vec![0.0; PHASE_FFT_SIZE / 2],
            reference: [0.0; REFERENCE_SERIES_LEN],
        })
    }

    /// Clear the per-refresh band accumulators. Call before the first
    /// `process_cell` of a refresh.
    pub fn begin_refresh(&mut self) {
        self.breath_storage.fill(0.0);
        self.heart_storage.fill(0.0);
    }

    pub fn reset(&mut self) {
        self.begin_refresh();
        self.reference.fill(0.0);
    }

    /// HPS accumulated over the cells of the current refresh.
    pub fn heart_storage(&self) -> &[f32] {
        &self.heart_storage
    }

    /// Phase-difference series of the reference cell, captured during the
    /// latest refresh that asked for it.
    pub fn reference_series(&self) -> &[f32; REFERENCE_SERIES_LEN] {
        &self.reference
    }

    /// Process one cell of the cycle ring.
    ///
    /// `cell_offset` addresses the cell within a frame's block
    /// (`angle + range * ANGLE_CELLS`); `frame_cursor` is the pipeline's
    /// frame counter, which marks the oldest slot of the ring so the series
    /// comes out time-ordered no matter where the cycle currently wraps.
    pub fn process_cell(
        &mut self,
        cycle_ring: &[Complex32],
        cell_offset: usize,
        frame_cursor: usize,
        capture_reference: bool,
    ) -> CellPeaks {
        let stride = CELLS_PER_FRAME;
        let total = stride * FRAMES_PER_CYCLE;
        debug_assert_eq!(cycle_ring.len(), total);

        // Time-ordered walk of the ring, oldest frame first
        let mut addr = (cell_offset + frame_cursor * stride) % total;
        let first = cycle_ring[addr];
        let mut prev_phase = first.im.atan2(first.re);
        let mut prev_unwrapped = prev_phase;
        let mut correction = 0.0f32;

        self.series.fill(Complex32::new(0.0, 0.0));
        for t in 0..FRAMES_PER_CYCLE - 1 {
            addr = (addr + stride) % total;
            let sample = cycle_ring[addr];
            let phase = sample.im.atan2(sample.re);
            let unwrapped = unwrap_step(phase, prev_phase, &mut correction);
            prev_phase = phase;
            self.series[t] = Complex32::new(unwrapped - prev_unwrapped, 0.0);
            prev_unwrapped = unwrapped;
        }

        if capture_reference {
            for (r, s) in self.reference.iter_mut().zip(self.series.iter()) {
                *r = s.re;
            }
        }

        self.spectrum.copy_from_slice(&self.series);
        self.fft.process(&mut self.spectrum);
        magnitude_squared(&self.spectrum, &mut self.power);

        let breath = windowed_peak(&self.power, BREATH_BAND_START, BREATH_BAND_END, 1) as u16;

        for k in 0..PHASE_FFT_SIZE / 4 {
            self.hps[k] = self.power[2 * k] * self.power[k];
        }
        self.hps[PHASE_FFT_SIZE / 4..].fill(0.0);

        for k in BREATH_BAND_START..BREATH_BAND_END {
            self.breath_storage[k] += self.power[k];
        }
        for k in HEART_BAND_START..HEART_BAND_END {
            self.heart_storage[k] += self.hps[k];
        }

        let mut heart = [0u16; 3];
        for slot in heart.iter_mut() {
            let peak = windowed_peak(&self.hps, HEART_BAND_START, HEART_BAND_END, 1);
            *slot = peak as u16;
            if peak > 0 {
                self.hps[peak - 1] = 0.0;
                self.hps[peak] = 0.0;
                self.hps[peak + 1] = 0.0;
            }
        }

        CellPeaks { breath, heart }
    }
}
