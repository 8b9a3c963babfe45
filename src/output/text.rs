use super::{Formatter, VitalSignsResult};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, result: &VitalSignsResult) -> String {
        if !result.valid {
            return "waiting for valid measurement...".to_string();
        }
        if self.verbose {
            format!(
                "breath {:5.1} BPM  heart {:5.1} BPM  deviation {:.4}  bin {}  id {}",
                result.breathing_rate,
                result.heart_rate,
                result.breathing_deviation,
                result.range_bin,
                result.id
            )
        } else {
            format!(
                "breath {:5.1} BPM  heart {:5.1} BPM",
                result.breathing_rate, result.heart_rate
            )
        }
    }
}
