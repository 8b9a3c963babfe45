use super::{timestamp_millis, Formatter, VitalSignsResult};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, result: &VitalSignsResult) -> String {
        format!(
            "{},{},{},{:.2},{:.2},{:.5},{}",
            timestamp_millis(),
            result.id,
            result.range_bin,
            result.heart_rate,
            result.breathing_rate,
            result.breathing_deviation,
            result.valid as u8
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("timestamp_ms,id,range_bin,heart_bpm,breath_bpm,breath_deviation,valid")
    }
}
