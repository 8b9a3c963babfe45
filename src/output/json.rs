use super::{iso8601_timestamp, Formatter, VitalSignsResult};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, result: &VitalSignsResult) -> String {
        format!(
            r#"{{"ts":"{}","id":{},"range_bin":{},"heart_bpm":{:.1},"breath_bpm":{:.1},"breath_deviation":{:.4},"valid":{}}}"#,
            iso8601_timestamp(),
            result.id,
            result.range_bin,
            result.heart_rate,
            result.breathing_rate,
            result.breathing_deviation,
            result.valid
        )
    }
}
