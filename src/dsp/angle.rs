//! Two-dimensional angle FFT with peak-bin tracking.
//!
//! Each frame, every selected range bin is spread over the antenna grid and
//! transformed twice: a length-16 FFT across the columns of each antenna
//! row, then a length-16 FFT across the rows of each resulting azimuth bin.
//! Magnitudes accumulate over the cycle; the 3x3 neighborhood around the
//! cycle's peak cell is what the phase stage later consumes.

use num_complex::Complex32;

use crate::constants::{ANGLE_CELLS, ANGLE_FFT_SIZE, NUM_VIRTUAL_ANTENNAS};
use crate::dsp::fft::{magnitude_squared, Fft};
use crate::error::Result;
use crate::geometry::AntennaGeometry;

/// The nine (row, col) pairs of the 3x3 neighborhood around `(row, col)` on
/// an `n` x `n` torus, in row-major order.
pub fn toroidal_neighborhood(row: usize, col: usize, n: usize) -> [(usize, usize); 9] {
    let mut out = [(0usize, 0usize); 9];
    let mut k = 0;
    for dr in [n - 1, 0, 1] {
        for dc in [n - 1, 0, 1] {
            out[k] = ((row + dr) % n, (col + dc) % n);
            k += 1;
        }
    }
    out
}

pub struct AngleStage {
    fft: Fft,
    /// Cycle-accumulated power, `[azimuth * ANGLE_FFT_SIZE + elevation]`.
    magnitude_sum: Vec<f32>,
    /// 2-D spectrum of the range bin being processed, same indexing.
    grid: Vec<Complex32>,
    /// Row spectra transposed column-major: `[azimuth * num_rows + row]`.
    col_major: Vec<Complex32>,
    line: Vec<Complex32>,
    power_line: Vec<f32>,
    peak_azimuth: usize,
    peak_elevation: usize,
}

impl AngleStage {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fft: Fft::new(ANGLE_FFT_SIZE)?,
            magnitude_sum: vec![0.0; ANGLE_FFT_SIZE * ANGLE_FFT_SIZE],
            grid: vec![Complex32::new(0.0, 0.0); ANGLE_FFT_SIZE * ANGLE_FFT_SIZE],
            col_major: vec![Complex32::new(0.0, 0.0); 3 * ANGLE_FFT_SIZE],
            line: vec![Complex32::new(0.0, 0.0); ANGLE_FFT_SIZE],
            power_line: vec![0.0; ANGLE_FFT_SIZE],
            peak_azimuth: 0,
            peak_elevation: 0,
        })
    }

    pub fn reset(&mut self) {
        self.magnitude_sum.fill(0.0);
        self.peak_azimuth = 0;
        self.peak_elevation = 0;
    }

    /// Peak cell tracked over the previous cycle, as (azimuth, elevation).
    pub fn peak(&self) -> (usize, usize) {
        (self.peak_azimuth, self.peak_elevation)
    }

    /// 2-D spectrum cell of the most recently processed range bin.
    pub fn cell(&self, azimuth: usize, elevation: usize) -> Complex32 {
        self.grid[azimuth * ANGLE_FFT_SIZE + elevation]
    }

    /// Transform one range bin's DC-removed antenna samples (length
    /// NUM_VIRTUAL_ANTENNAS), accumulate its power, and write the 3x3
    /// neighborhood around the tracked peak into `cells` (length
    /// ANGLE_CELLS) in row-major order.
    pub fn process_range_bin(
        &mut self,
        samples: &[Complex32],
        geometry: &AntennaGeometry,
        cells: &mut [Complex32],
    ) {
        debug_assert_eq!(samples.len(), NUM_VIRTUAL_ANTENNAS);
        debug_assert_eq!(cells.len(), ANGLE_CELLS);
        let num_rows = geometry.num_rows();
        debug_assert_eq!(self.col_major.len(), num_rows * ANGLE_FFT_SIZE);

        // Azimuth FFT across the columns of each antenna row, transposed
        // column-major for the second pass
        for row in 0..num_rows {
            self.line.fill(Complex32::new(0.0, 0.0));
            for (v, &sample) in samples.iter().enumerate() {
                let (r, c) = geometry.position(v);
                if r == row {
                    self.line[c] = sample;
                }
            }
            self.fft.process(&mut self.line);
            for (bin, &value) in self.line.iter().enumerate() {
                self.col_major[bin * num_rows + row] = value;
            }
        }

        // Elevation FFT across the rows of each azimuth bin
        for azimuth in 0..ANGLE_FFT_SIZE {
            self.line.fill(Complex32::new(0.0, 0.0));
            self.line[..num_rows]
                .copy_from_slice(&self.col_major[azimuth * num_rows..(azimuth + 1) * num_rows]);
            self.fft.process(&mut self.line);

            magnitude_squared(&self.line, &mut self.power_line);
            let offset = azimuth * ANGLE_FFT_SIZE;
            self.grid[offset..offset + ANGLE_FFT_SIZE].copy_from_slice(&self.line);
            for (elevation, &p) in self.power_line.iter().enumerate() {
                self.magnitude_sum[offset + elevation] += p;
            }
        }

        let neighborhood =
            toroidal_neighborhood(self.peak_azimuth, self.peak_elevation, ANGLE_FFT_SIZE);
        for (out, &(azimuth, elevation)) in cells.iter_mut().zip(neighborhood.iter()) {
            *out = self.grid[azimuth * ANGLE_FFT_SIZE + elevation];
        }
    }

    /// Move the tracked peak to the arg-max of the accumulated power and
    /// restart the accumulation. Called at the cycle wrap (and once right
    /// after startup, before the first full cycle completes).
    pub fn update_peak(&mut self) {
        let mut best = 0.0f32;
        for azimuth in 0..ANGLE_FFT_SIZE {
            for elevation in 0..ANGLE_FFT_SIZE {
                let power = self.magnitude_sum[azimuth * ANGLE_FFT_SIZE + elevation];
                if power > best {
                    best = power;
                    self.peak_azimuth = azimuth;
                    self.peak_elevation = elevation;
                }
            }
        }
        self.magnitude_sum.fill(0.0);
    }
}
