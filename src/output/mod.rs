mod csv;
mod json;
mod text;

use chrono::Utc;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

/// One published vital-signs measurement.
///
/// Copied out of the pipeline on read; when `valid` is false the numeric
/// fields read zero rather than stale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VitalSignsResult {
    /// Tracked target id (0 when no tracker is integrated).
    pub id: u16,
    /// Range bin the measurement was taken at.
    pub range_bin: u16,
    /// Heart rate in BPM (0 when invalid).
    pub heart_rate: f32,
    /// Breathing rate in BPM (0 when invalid).
    pub breathing_rate: f32,
    /// Breathing-waveform deviation (presence indicator).
    pub breathing_deviation: f32,
    pub valid: bool,
}

impl VitalSignsResult {
    /// Size of the little-endian wire image integrators republish over a
    /// TLV framing.
    pub const WIRE_SIZE: usize = 20;

    /// Encode as `{u16 id, u16 rangeBin, f32 heartRate, f32 breathingRate,
    /// f32 breathingDeviation, u8 valid, u8[3] reserved}`, little-endian.
    pub fn to_wire(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..2].copy_from_slice(&self.id.to_le_bytes());
        out[2..4].copy_from_slice(&self.range_bin.to_le_bytes());
        out[4..8].copy_from_slice(&self.heart_rate.to_le_bytes());
        out[8..12].copy_from_slice(&self.breathing_rate.to_le_bytes());
        out[12..16].copy_from_slice(&self.breathing_deviation.to_le_bytes());
        out[16] = self.valid as u8;
        out
    }

    pub fn from_wire(bytes: &[u8; Self::WIRE_SIZE]) -> Self {
        Self {
            id: u16::from_le_bytes([bytes[0], bytes[1]]),
            range_bin: u16::from_le_bytes([bytes[2], bytes[3]]),
            heart_rate: f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            breathing_rate: f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            breathing_deviation: f32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            valid: bytes[16] != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub trait Formatter: Send {
    fn format(&self, result: &VitalSignsResult) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn timestamp_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        let result = VitalSignsResult {
            id: 3,
            range_bin: 27,
            heart_rate: 72.3,
            breathing_rate: 14.99,
            breathing_deviation: 0.0214,
            valid: true,
        };
        let wire = result.to_wire();
        assert_eq!(wire.len(), VitalSignsResult::WIRE_SIZE);
        assert_eq!(VitalSignsResult::from_wire(&wire), result);
    }

    #[test]
    fn test_wire_layout_little_endian() {
        let result = VitalSignsResult {
            id: 0x0102,
            range_bin: 0x0304,
            heart_rate: 1.0,
            breathing_rate: 0.0,
            breathing_deviation: 0.0,
            valid: true,
        };
        let wire = result.to_wire();
        assert_eq!(&wire[0..2], &[0x02, 0x01]);
        assert_eq!(&wire[2..4], &[0x04, 0x03]);
        assert_eq!(&wire[4..8], &1.0f32.to_le_bytes());
        assert_eq!(wire[16], 1);
        assert_eq!(&wire[17..20], &[0, 0, 0], "reserved tail stays zero");
    }
}
