//! Scalar math helpers for the phase pipeline.

use std::f32::consts::PI;

/// i16 code per radian: -32768..=32767 maps to [-pi, pi).
pub const PHASE_SCALE: f32 = 32768.0 / PI;

/// One step of cumulative phase unwrapping.
///
/// `correction_cum` carries the running 2-pi correction across the series.
/// Returns `phase + correction_cum` after accounting for any wrap between
/// `phase_prev` and `phase`. Corrections smaller than pi are ignored so that
/// ordinary sample-to-sample variation never accumulates.
pub fn unwrap_step(phase: f32, phase_prev: f32, correction_cum: &mut f32) -> f32 {
    let diff = phase - phase_prev;

    let mod_factor = if diff > PI {
        1.0
    } else if diff < -PI {
        -1.0
    } else {
        0.0
    };

    let mut diff_mod = diff - mod_factor * 2.0 * PI;

    // Preserve the variation sign when the wrap lands exactly on -pi
    if diff_mod == -PI && diff > 0.0 {
        diff_mod = PI;
    }

    let mut correction = diff_mod - diff;
    if correction.abs() < PI && correction != 0.0 {
        correction = 0.0;
    }

    *correction_cum += correction;
    phase + *correction_cum
}

/// Variance `E[x^2] - (E[x])^2` of a sample slice; 0 for an empty slice.
pub fn variance(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f32;
    let mut sum = 0.0f32;
    let mut sum_sq = 0.0f32;
    for &x in samples {
        sum += x;
        sum_sq += x * x;
    }
    sum_sq / n - (sum / n) * (sum / n)
}

/// Encode a phase in radians as a 16-bit fixed-point value.
///
/// [-pi, pi) maps onto the full i16 range; +pi saturates to the largest
/// positive code.
pub fn phase_to_fixed(radians: f32) -> i16 {
    let scaled = (radians * PHASE_SCALE).round();
    if scaled >= i16::MAX as f32 {
        i16::MAX
    } else if scaled <= i16::MIN as f32 {
        i16::MIN
    } else {
        scaled as i16
    }
}

/// Decode a 16-bit fixed-point phase back to radians.
pub fn phase_from_fixed(fixed: i16) -> f32 {
    fixed as f32 / PHASE_SCALE
}
