//! Complex FFT kernel and twiddle generation.
//!
//! Forward, unnormalized, single precision. The twiddle table is generated
//! once at construction and shared by every transform of that size; the
//! table layout is exactly what [`Fft::process`] consumes, so the generator
//! and the kernel cannot drift apart.

use num_complex::Complex32;
use std::f32::consts::PI;

use crate::error::{Result, VitalError};

/// Radix-2 decimation-in-time FFT for a fixed power-of-two size.
pub struct Fft {
    size: usize,
    twiddles: Vec<Complex32>,
}

impl Fft {
    /// Plan an FFT of the given size, generating its twiddle table.
    pub fn new(size: usize) -> Result<Self> {
        if size < 4 || !size.is_power_of_two() {
            return Err(VitalError::FftSize(size));
        }
        Ok(Self {
            size,
            twiddles: Self::generate_twiddles(size),
        })
    }

    /// Twiddle table for an N-point transform: `exp(-2*pi*i*k/N)` for
    /// k in [0, N/2).
    fn generate_twiddles(size: usize) -> Vec<Complex32> {
        (0..size / 2)
            .map(|k| {
                let angle = -2.0 * PI * k as f32 / size as f32;
                Complex32::new(angle.cos(), angle.sin())
            })
            .collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward transform of `buf` (length must equal `size`).
    pub fn process(&self, buf: &mut [Complex32]) {
        let n = self.size;
        debug_assert_eq!(buf.len(), n);

        // Bit-reversal permutation
        let mut j = 0usize;
        for i in 1..n {
            let mut bit = n >> 1;
            while j & bit != 0 {
                j ^= bit;
                bit >>= 1;
            }
            j |= bit;
            if i < j {
                buf.swap(i, j);
            }
        }

        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            for block in (0..n).step_by(len) {
                for k in 0..half {
                    let w = self.twiddles[k * stride];
                    let a = buf[block + k];
                    let b = buf[block + k + half] * w;
                    buf[block + k] = a + b;
                    buf[block + k + half] = a - b;
                }
            }
            len <<= 1;
        }
    }
}

/// Elementwise `re^2 + im^2` into `out`.
pub fn magnitude_squared(input: &[Complex32], out: &mut [f32]) {
    for (x, m) in input.iter().zip(out.iter_mut()) {
        *m = x.re * x.re + x.im * x.im;
    }
}
