//! Binding constants of the vital-signs algorithm.
//!
//! These values are calibrated together: the spectrum bands, the BPM
//! conversion factor and the cycle/refresh lengths all assume the same
//! effective frame rate. Changing one in isolation shifts the physical
//! meaning of the others.

/// Range bins processed per frame (window around the hint bin).
pub const RANGE_WINDOW_BINS: usize = 5;

/// Virtual antennas in the 3TX x 4RX array.
pub const NUM_VIRTUAL_ANTENNAS: usize = 12;

/// Frames accumulated per processing cycle.
pub const FRAMES_PER_CYCLE: usize = 128;

/// Frames between result refreshes (four refreshes per cycle).
pub const REFRESH_INTERVAL: usize = 32;

/// Size of the azimuth/elevation angle FFT.
pub const ANGLE_FFT_SIZE: usize = 16;

/// Angle cells retained per range bin (3x3 neighborhood around the peak).
pub const ANGLE_CELLS: usize = 9;

/// Size of the phase spectrum FFT.
pub const PHASE_FFT_SIZE: usize = 512;

/// Breathing detection band in spectrum bins: [start, end).
pub const BREATH_BAND_START: usize = 3;
pub const BREATH_BAND_END: usize = 50;

/// Heart-rate detection band in spectrum bins: [start, end).
pub const HEART_BAND_START: usize = 68;
pub const HEART_BAND_END: usize = 128;

/// Maximum bin distance for correlating a present peak with history.
pub const HEART_DECISION_THRESHOLD: u16 = 3;

/// Maximum allowed heart-peak movement per refresh, in bins.
pub const HEART_JUMP_LIMIT: u16 = 12;

/// Refresh cycles suppressed before the output is marked valid.
pub const WARMUP_CYCLES: u32 = 7;

/// Spectrum bin index to BPM conversion factor.
pub const BPM_PER_BIN: f32 = 0.882;

/// Consecutive lost-target frames before the no-target state latches.
pub const TARGET_LOSS_FRAMES: u32 = 50;

/// Complex samples stored per frame in the cycle ring
/// (range window x angle cells).
pub const CELLS_PER_FRAME: usize = RANGE_WINDOW_BINS * ANGLE_CELLS;

/// Angle cell whose phase series feeds the breathing-deviation estimate.
/// The (5, 3) pairing assumes ANGLE_CELLS = 9 and RANGE_WINDOW_BINS = 5.
pub const REFERENCE_ANGLE_CELL: usize = 5;

/// Range cell whose phase series feeds the breathing-deviation estimate.
pub const REFERENCE_RANGE_CELL: usize = 3;

/// Samples of the reference series captured for the deviation estimate.
pub const REFERENCE_SERIES_LEN: usize = 100;

/// Slice of the reference series over which the variance is taken.
pub const DEVIATION_SLICE_START: usize = 59;
pub const DEVIATION_SLICE_LEN: usize = 40;
