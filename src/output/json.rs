//! JSON lines output formatter.

use crate::output::OutputFormatter;
use crate::reading::ScaleReading;

/// Serializes each reading as one compact JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, reading: &ScaleReading) -> String {
        // ScaleReading holds only plain numbers, strings and options; serialization cannot fail.
        serde_json::to_string(reading).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to serialize reading");
            String::from("{}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::BodyCompositionEstimator;
    use crate::frame::RawFrame;
    use crate::test_utils::reference_profile;
    use serde_json::Value;

    #[test]
    fn test_json_reading() {
        let estimator = BodyCompositionEstimator::new(reference_profile());
        let frame = RawFrame::Historic {
            timestamp: 1_704_067_200,
            weight_raw: 70_000,
            impedance_raw: 500,
        };
        let reading = ScaleReading::assemble(&frame, Some(&estimator)).unwrap();

        let line = JsonFormatter.format(&reading);
        assert!(!line.contains('\n'));

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["layout"], "notification");
        assert_eq!(value["unit"], "kg");
        assert_eq!(value["weight_kg"], 70.0);
        assert_eq!(value["impedance"], 500);
        assert_eq!(value["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(value["metrics"]["bmmr"], 1000.0);
    }

    #[test]
    fn test_json_missing_fields_are_null() {
        let frame = RawFrame::RealtimeImpedance { impedance_raw: 480 };
        let reading = ScaleReading::assemble(&frame, None).unwrap();
        let value: Value = serde_json::from_str(&JsonFormatter.format(&reading)).unwrap();
        assert!(value["weight_kg"].is_null());
        assert!(value["metrics"].is_null());
        assert_eq!(value["impedance"], 480);
    }
}
