//! Borrowed view over the upstream range-FFT radar cube.
//!
//! This module is the single place that knows the upstream sample layout:
//! Q15 complex with the imaginary part stored first. Everything downstream
//! of [`RadarCubeSlice::extract_window`] works on abstract `Complex32`.

use num_complex::Complex32;

use crate::constants::{NUM_VIRTUAL_ANTENNAS, RANGE_WINDOW_BINS};
use crate::error::{Result, VitalError};

/// One Q15 complex sample as the radar front end stores it.
///
/// Field order mirrors the memory layout: imaginary first, real second.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct CubeSample {
    pub imag: i16,
    pub real: i16,
}

impl CubeSample {
    pub fn new(imag: i16, real: i16) -> Self {
        Self { imag, real }
    }

    /// Verbatim Q15-to-float conversion (no scaling).
    pub fn to_complex(self) -> Complex32 {
        Complex32::new(self.real as f32, self.imag as f32)
    }
}

/// One frame of the range-FFT cube, indexed by (range bin, virtual antenna).
///
/// Samples for antenna `a` occupy `[a * num_range_bins, (a + 1) * num_range_bins)`,
/// one per range bin.
pub struct RadarCubeSlice<'a> {
    samples: &'a [CubeSample],
    num_range_bins: usize,
    num_chirps: usize,
    num_virtual_antennas: usize,
}

impl<'a> RadarCubeSlice<'a> {
    pub fn new(
        samples: &'a [CubeSample],
        num_range_bins: usize,
        num_chirps: usize,
        num_virtual_antennas: usize,
    ) -> Result<Self> {
        if num_range_bins <= RANGE_WINDOW_BINS {
            return Err(VitalError::InvalidCube(format!(
                "{} range bins, need more than {}",
                num_range_bins, RANGE_WINDOW_BINS
            )));
        }
        if num_virtual_antennas == 0 {
            return Err(VitalError::InvalidCube("no virtual antennas".into()));
        }
        let needed = num_range_bins * num_virtual_antennas;
        if samples.len() < needed {
            return Err(VitalError::InvalidCube(format!(
                "{} samples, need {} for {} bins x {} antennas",
                samples.len(),
                needed,
                num_range_bins,
                num_virtual_antennas
            )));
        }
        Ok(Self {
            samples,
            num_range_bins,
            num_chirps,
            num_virtual_antennas,
        })
    }

    pub fn num_range_bins(&self) -> usize {
        self.num_range_bins
    }

    pub fn num_chirps(&self) -> usize {
        self.num_chirps
    }

    pub fn num_virtual_antennas(&self) -> usize {
        self.num_virtual_antennas
    }

    pub fn sample(&self, range_bin: usize, antenna: usize) -> CubeSample {
        self.samples[range_bin + antenna * self.num_range_bins]
    }

    /// Start of the RANGE_WINDOW_BINS-wide window centered on `hint_bin`,
    /// clamped so the window always fits inside the cube.
    pub fn window_start(&self, hint_bin: u16) -> usize {
        let half = RANGE_WINDOW_BINS / 2;
        let start = (hint_bin as usize).saturating_sub(half);
        start.min(self.num_range_bins - RANGE_WINDOW_BINS)
    }

    /// Copy the range window around `hint_bin` into `window` as floats.
    ///
    /// `window` is laid out antenna-major within each bin:
    /// `window[bin * NUM_VIRTUAL_ANTENNAS + antenna]`. Antennas beyond what
    /// the cube carries extract as zero so the layout stays dense.
    pub fn extract_window(&self, hint_bin: u16, window: &mut [Complex32]) {
        debug_assert_eq!(window.len(), RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS);

        let start = self.window_start(hint_bin);
        let antennas = self.num_virtual_antennas.min(NUM_VIRTUAL_ANTENNAS);

        for bin in 0..RANGE_WINDOW_BINS {
            let row = &mut window[bin * NUM_VIRTUAL_ANTENNAS..(bin + 1) * NUM_VIRTUAL_ANTENNAS];
            for (antenna, out) in row.iter_mut().enumerate() {
                *out = if antenna < antennas {
                    self.sample(start + bin, antenna).to_complex()
                } else {
                    Complex32::new(0.0, 0.0)
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_data(num_bins: usize, num_antennas: usize) -> Vec<CubeSample> {
        // Encode (bin, antenna) into the sample so extraction is checkable
        let mut data = vec![CubeSample::default(); num_bins * num_antennas];
        for ant in 0..num_antennas {
            for bin in 0..num_bins {
                data[bin + ant * num_bins] = CubeSample::new(ant as i16, bin as i16);
            }
        }
        data
    }

    #[test]
    fn test_too_few_bins_rejected() {
        let data = cube_data(RANGE_WINDOW_BINS, NUM_VIRTUAL_ANTENNAS);
        assert!(RadarCubeSlice::new(&data, RANGE_WINDOW_BINS, 1, NUM_VIRTUAL_ANTENNAS).is_err());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let data = cube_data(16, NUM_VIRTUAL_ANTENNAS);
        assert!(RadarCubeSlice::new(&data[..10], 16, 1, NUM_VIRTUAL_ANTENNAS).is_err());
    }

    #[test]
    fn test_window_clamping() {
        let data = cube_data(32, NUM_VIRTUAL_ANTENNAS);
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();

        assert_eq!(cube.window_start(0), 0);
        assert_eq!(cube.window_start(1), 0);
        assert_eq!(cube.window_start(10), 8);
        assert_eq!(cube.window_start(31), 32 - RANGE_WINDOW_BINS);
        assert_eq!(cube.window_start(500), 32 - RANGE_WINDOW_BINS);
    }

    #[test]
    fn test_extract_window_layout() {
        let data = cube_data(32, NUM_VIRTUAL_ANTENNAS);
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();

        let mut window = vec![Complex32::new(0.0, 0.0); RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS];
        cube.extract_window(10, &mut window);

        for bin in 0..RANGE_WINDOW_BINS {
            for ant in 0..NUM_VIRTUAL_ANTENNAS {
                let sample = window[bin * NUM_VIRTUAL_ANTENNAS + ant];
                assert_eq!(sample.re, (8 + bin) as f32, "real encodes range bin");
                assert_eq!(sample.im, ant as f32, "imag encodes antenna");
            }
        }
    }

    #[test]
    fn test_missing_antennas_extract_zero() {
        let data = cube_data(32, 4);
        let cube = RadarCubeSlice::new(&data, 32, 1, 4).unwrap();

        let mut window = vec![Complex32::new(1.0, 1.0); RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS];
        cube.extract_window(10, &mut window);

        for bin in 0..RANGE_WINDOW_BINS {
            for ant in 4..NUM_VIRTUAL_ANTENNAS {
                assert_eq!(window[bin * NUM_VIRTUAL_ANTENNAS + ant], Complex32::new(0.0, 0.0));
            }
        }
    }
}
