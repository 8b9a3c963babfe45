//! The vital-signs pipeline: owns every buffer and stage, runs the
//! per-frame schedule and publishes measurement results.
//!
//! Per frame: extract the range window, track/remove DC, run the 2-D angle
//! FFT and store the peak neighborhood into the cycle ring. Every
//! REFRESH_INTERVAL frames the phase/spectrum/decision stages run inline
//! and the published result updates. At the cycle wrap the DC mean freezes
//! and the angle peak re-locks.
//!
//! Single-threaded by design: `process_frame` runs to completion with no
//! suspension points, and the caller serializes access if it needs
//! concurrency.

use log::{debug, info};
use num_complex::Complex32;

use crate::config::VitalSignsConfig;
use crate::constants::{
    ANGLE_CELLS, BPM_PER_BIN, CELLS_PER_FRAME, DEVIATION_SLICE_LEN, DEVIATION_SLICE_START,
    FRAMES_PER_CYCLE, NUM_VIRTUAL_ANTENNAS, RANGE_WINDOW_BINS, REFERENCE_ANGLE_CELL,
    REFERENCE_RANGE_CELL, REFRESH_INTERVAL, TARGET_LOSS_FRAMES, WARMUP_CYCLES,
};
use crate::cube::RadarCubeSlice;
use crate::dsp::math::variance;
use crate::dsp::{AngleStage, CellPeakTable, DcTracker, DecisionStage, SpectrumStage};
use crate::error::Result;
use crate::geometry::AntennaGeometry;
use crate::output::VitalSignsResult;

/// Range bin for a target at cartesian (x, y) meters; 0 when the range
/// resolution is not positive.
pub fn range_bin_from_position(x: f32, y: f32, range_resolution: f32) -> u16 {
    if range_resolution <= 0.0 {
        return 0;
    }
    ((x * x + y * y).sqrt() / range_resolution) as u16
}

/// Read-only snapshot of the pipeline counters and flags.
#[derive(Debug, Clone, Copy)]
pub struct PipelineState {
    /// Frame index within the current cycle, `[0, FRAMES_PER_CYCLE)`.
    pub frame_count: u32,
    /// Refresh cycles completed since init/reset.
    pub loop_count: u32,
    pub active_range_bin: u16,
    /// Tracked angle peak as (azimuth, elevation).
    pub angle_peak: (usize, usize),
    pub no_target: bool,
    pub target_lost_frames: u32,
}

pub struct VitalSignsPipeline {
    config: VitalSignsConfig,
    geometry: AntennaGeometry,

    dc: DcTracker,
    angle: AngleStage,
    spectrum: SpectrumStage,
    decision: DecisionStage,

    /// Working frame: range window x virtual antennas.
    frame: Vec<Complex32>,
    /// Cycle ring of peak-neighborhood cells, one CELLS_PER_FRAME block per
    /// frame slot.
    cycle_ring: Vec<Complex32>,
    cell_peaks: CellPeakTable,

    frame_count: u32,
    loop_count: u32,
    active_range_bin: u16,
    target_lost_frames: u32,
    no_target: bool,

    result: VitalSignsResult,
}

impl VitalSignsPipeline {
    /// Build a pipeline from a validated configuration. Generates the FFT
    /// twiddle tables and clears every buffer.
    pub fn new(config: VitalSignsConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "vital-signs pipeline init: enabled={} start_bin={} bins={}",
            config.enabled, config.range_bin_start, config.num_range_bins
        );
        Ok(Self {
            config,
            geometry: AntennaGeometry::default(),
            dc: DcTracker::new(),
            angle: AngleStage::new()?,
            spectrum: SpectrumStage::new()?,
            decision: DecisionStage::new(),
            frame: vec![Complex32::new(0.0, 0.0); RANGE_WINDOW_BINS * NUM_VIRTUAL_ANTENNAS],
            cycle_ring: vec![Complex32::new(0.0, 0.0); CELLS_PER_FRAME * FRAMES_PER_CYCLE],
            cell_peaks: CellPeakTable::new(),
            frame_count: 0,
            loop_count: 0,
            active_range_bin: 0,
            target_lost_frames: 0,
            no_target: false,
            result: VitalSignsResult::default(),
        })
    }

    pub fn config(&self) -> &VitalSignsConfig {
        &self.config
    }

    /// Replace the configuration and reset processing state. Twiddle tables
    /// and antenna geometry are kept.
    pub fn update_config(&mut self, config: VitalSignsConfig) -> Result<()> {
        config.validate()?;
        info!(
            "vital-signs config update: enabled={} start_bin={}",
            config.enabled, config.range_bin_start
        );
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Clear counters, peak tracking, history and every accumulation
    /// buffer; keep configuration and twiddles.
    pub fn reset(&mut self) {
        self.dc.reset();
        self.angle.reset();
        self.spectrum.reset();
        self.decision.reset();
        self.frame.fill(Complex32::new(0.0, 0.0));
        self.cycle_ring.fill(Complex32::new(0.0, 0.0));
        self.cell_peaks = CellPeakTable::new();
        self.frame_count = 0;
        self.loop_count = 0;
        self.active_range_bin = 0;
        self.target_lost_frames = 0;
        self.no_target = false;
        self.result = VitalSignsResult::default();
    }

    /// Ingest one radar frame. Silently succeeds when processing is
    /// disabled. `hint_bin` centers the range window (tracker hint or the
    /// configured start bin).
    pub fn process_frame(&mut self, cube: &RadarCubeSlice<'_>, hint_bin: u16) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        self.active_range_bin = hint_bin;
        cube.extract_window(hint_bin, &mut self.frame);

        self.dc.accumulate(&self.frame);
        self.dc.subtract(&mut self.frame);

        let frame_slot = self.frame_count as usize;
        let base = frame_slot * CELLS_PER_FRAME;
        for range in 0..RANGE_WINDOW_BINS {
            let samples =
                &self.frame[range * NUM_VIRTUAL_ANTENNAS..(range + 1) * NUM_VIRTUAL_ANTENNAS];
            let cells =
                &mut self.cycle_ring[base + range * ANGLE_CELLS..base + (range + 1) * ANGLE_CELLS];
            self.angle.process_range_bin(samples, &self.geometry, cells);
        }

        // The peak re-locks at the cycle wrap, plus once right after
        // startup so the first cycle does not track an arbitrary cell
        let cycle_end = frame_slot == FRAMES_PER_CYCLE - 1;
        if cycle_end || (self.loop_count == 0 && frame_slot == 1) {
            let before = self.angle.peak();
            self.angle.update_peak();
            if self.angle.peak() != before {
                debug!("angle peak moved {:?} -> {:?}", before, self.angle.peak());
            }
        }
        if cycle_end {
            self.dc.finalize_cycle();
        }

        self.frame_count += 1;
        if self.frame_count as usize >= FRAMES_PER_CYCLE {
            self.frame_count = 0;
        }

        if self.frame_count as usize % REFRESH_INTERVAL == 0 {
            self.run_refresh();
            self.loop_count += 1;
        }

        Ok(())
    }

    fn run_refresh(&mut self) {
        self.spectrum.begin_refresh();
        let cursor = self.frame_count as usize;

        for angle in 0..ANGLE_CELLS {
            for range in 0..RANGE_WINDOW_BINS {
                let offset = angle + range * ANGLE_CELLS;
                let capture = angle == REFERENCE_ANGLE_CELL && range == REFERENCE_RANGE_CELL;
                let peaks = self
                    .spectrum
                    .process_cell(&self.cycle_ring, offset, cursor, capture);
                self.cell_peaks.set(angle, range, peaks);
            }
        }

        let decision = self.decision.decide(
            &mut self.cell_peaks,
            self.spectrum.heart_storage(),
            self.loop_count,
        );

        let reference = self.spectrum.reference_series();
        let deviation = variance(
            &reference[DEVIATION_SLICE_START..DEVIATION_SLICE_START + DEVIATION_SLICE_LEN],
        );

        let mut result = VitalSignsResult {
            id: 0,
            range_bin: self.active_range_bin,
            heart_rate: decision.heart_index as f32 * BPM_PER_BIN,
            breathing_rate: decision.breath_index as f32 * BPM_PER_BIN,
            breathing_deviation: deviation,
            valid: false,
        };

        if self.no_target {
            result = VitalSignsResult::default();
        } else {
            result.valid = self.loop_count >= WARMUP_CYCLES;
        }
        if self.loop_count < WARMUP_CYCLES {
            result.breathing_rate = 0.0;
            result.heart_rate = 0.0;
        }

        self.result = result;
    }

    /// Copy of the latest published result.
    pub fn output(&self) -> VitalSignsResult {
        self.result
    }

    pub fn is_output_ready(&self) -> bool {
        self.loop_count >= WARMUP_CYCLES && self.result.valid
    }

    /// Feed the upstream target-present flag. Returns whether vital-signs
    /// processing should continue. After TARGET_LOSS_FRAMES consecutive
    /// lost frames the no-target state latches and the published result
    /// zeroes at the next refresh.
    pub fn handle_target_loss(&mut self, lost: bool) -> bool {
        if lost {
            self.target_lost_frames += 1;
            if self.target_lost_frames >= TARGET_LOSS_FRAMES {
                if !self.no_target {
                    info!(
                        "target lost for {} frames, suppressing output",
                        self.target_lost_frames
                    );
                }
                self.no_target = true;
                return false;
            }
            true
        } else {
            if self.no_target {
                info!("target reacquired");
            }
            self.target_lost_frames = 0;
            self.no_target = false;
            true
        }
    }

    pub fn state(&self) -> PipelineState {
        PipelineState {
            frame_count: self.frame_count,
            loop_count: self.loop_count,
            active_range_bin: self.active_range_bin,
            angle_peak: self.angle.peak(),
            no_target: self.no_target,
            target_lost_frames: self.target_lost_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VitalSignsConfig;
    use crate::cube::CubeSample;

    fn constant_cube_data(num_bins: usize, value: CubeSample) -> Vec<CubeSample> {
        vec![value; num_bins * NUM_VIRTUAL_ANTENNAS]
    }

    #[test]
    fn test_range_bin_from_position() {
        assert_eq!(range_bin_from_position(3.0, 4.0, 0.5), 10);
        assert_eq!(range_bin_from_position(3.0, 4.0, 0.0), 0);
        assert_eq!(range_bin_from_position(3.0, 4.0, -1.0), 0);
        assert_eq!(range_bin_from_position(0.0, 0.0, 0.1), 0);
    }

    #[test]
    fn test_disabled_pipeline_is_noop() {
        let mut config = VitalSignsConfig::default();
        config.enabled = false;
        let mut pipeline = VitalSignsPipeline::new(config).unwrap();

        let data = constant_cube_data(32, CubeSample::new(5, 9));
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();

        for _ in 0..300 {
            pipeline.process_frame(&cube, 10).unwrap();
        }
        assert_eq!(pipeline.state().frame_count, 0);
        assert_eq!(pipeline.state().loop_count, 0);
        assert!(!pipeline.is_output_ready());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = VitalSignsConfig::default();
        config.num_range_bins = 0;
        assert!(VitalSignsPipeline::new(config).is_err());
    }

    #[test]
    fn test_frame_counter_discipline() {
        let mut pipeline = VitalSignsPipeline::new(VitalSignsConfig::default()).unwrap();
        let data = constant_cube_data(32, CubeSample::new(100, 200));
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();

        for frame in 0..(FRAMES_PER_CYCLE * 2) {
            pipeline.process_frame(&cube, 10).unwrap();
            let count = pipeline.state().frame_count as usize;
            assert!(count < FRAMES_PER_CYCLE);
            assert_eq!(count, (frame + 1) % FRAMES_PER_CYCLE);
        }
        // Four refreshes per cycle
        assert_eq!(pipeline.state().loop_count, 8);
    }

    #[test]
    fn test_target_loss_persistence() {
        let mut pipeline = VitalSignsPipeline::new(VitalSignsConfig::default()).unwrap();

        for i in 0..TARGET_LOSS_FRAMES - 1 {
            assert!(pipeline.handle_target_loss(true), "frame {}", i);
        }
        assert!(!pipeline.handle_target_loss(true));
        assert!(pipeline.state().no_target);

        assert!(pipeline.handle_target_loss(false));
        assert!(!pipeline.state().no_target);
        assert_eq!(pipeline.state().target_lost_frames, 0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut pipeline = VitalSignsPipeline::new(VitalSignsConfig::default()).unwrap();
        let data = constant_cube_data(32, CubeSample::new(7, 7));
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();

        for _ in 0..40 {
            pipeline.process_frame(&cube, 12).unwrap();
        }
        for _ in 0..TARGET_LOSS_FRAMES {
            pipeline.handle_target_loss(true);
        }
        pipeline.reset();

        let state = pipeline.state();
        assert_eq!(state.frame_count, 0);
        assert_eq!(state.loop_count, 0);
        assert_eq!(state.active_range_bin, 0);
        assert_eq!(state.angle_peak, (0, 0));
        assert!(!state.no_target);
        assert_eq!(pipeline.output(), VitalSignsResult::default());
    }

    #[test]
    fn test_update_config_resets() {
        let mut pipeline = VitalSignsPipeline::new(VitalSignsConfig::default()).unwrap();
        let data = constant_cube_data(32, CubeSample::new(7, 7));
        let cube = RadarCubeSlice::new(&data, 32, 1, NUM_VIRTUAL_ANTENNAS).unwrap();
        for _ in 0..40 {
            pipeline.process_frame(&cube, 12).unwrap();
        }

        let mut config = VitalSignsConfig::default();
        config.range_bin_start = 20;
        pipeline.update_config(config).unwrap();
        assert_eq!(pipeline.state().frame_count, 0);
        assert_eq!(pipeline.config().range_bin_start, 20);

        let mut bad = VitalSignsConfig::default();
        bad.range_resolution = -1.0;
        assert!(pipeline.update_config(bad).is_err());
    }
}
