//! Configuration for the vital-signs pipeline.
//!
//! The configuration is copied into the pipeline at construction or on
//! `update_config`; it never changes between resets.

use crate::constants::RANGE_WINDOW_BINS;
use crate::error::{Result, VitalError};

/// Target id wildcard: track the nearest target instead of a specific id.
pub const TARGET_ID_NEAREST: u8 = 255;

/// Vital-signs processing configuration
///
/// # Example
/// ```
/// use vitalwave::config::VitalSignsConfig;
///
/// let mut config = VitalSignsConfig::default();
/// config.range_bin_start = 24;
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct VitalSignsConfig {
    /// Enable/disable processing. When disabled, `process_frame` is a no-op.
    pub enabled: bool,
    /// Reserved: when true an upstream tracker supplies the hint bin for
    /// `target_id`; when false the hint bin is `range_bin_start`.
    pub tracker_integration: bool,
    /// Target id to monitor: 0-249, or [`TARGET_ID_NEAREST`].
    pub target_id: u8,
    /// Starting range bin when no tracker is integrated.
    pub range_bin_start: u16,
    /// Number of range bins to process (1 to RANGE_WINDOW_BINS).
    pub num_range_bins: u16,
    /// Range resolution in meters per bin.
    pub range_resolution: f32,
}

impl VitalSignsConfig {
    /// Check the configuration against the documented field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.target_id > 249 && self.target_id != TARGET_ID_NEAREST {
            return Err(VitalError::Config(format!(
                "target_id {} outside 0-249 (255 = nearest)",
                self.target_id
            )));
        }
        if self.num_range_bins == 0 || self.num_range_bins as usize > RANGE_WINDOW_BINS {
            return Err(VitalError::Config(format!(
                "num_range_bins {} outside 1-{}",
                self.num_range_bins, RANGE_WINDOW_BINS
            )));
        }
        if self.range_resolution <= 0.0 {
            return Err(VitalError::Config(format!(
                "range_resolution {} must be positive",
                self.range_resolution
            )));
        }
        Ok(())
    }
}

impl Default for VitalSignsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tracker_integration: false,
            target_id: TARGET_ID_NEAREST,
            range_bin_start: 0,
            num_range_bins: RANGE_WINDOW_BINS as u16,
            range_resolution: 0.047,
        }
    }
}
