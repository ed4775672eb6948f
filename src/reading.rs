//! Scale reading data structure.

use crate::error::ScaleError;
use crate::estimator::{BodyCompositionEstimator, DerivedMetrics, EstimateError};
use crate::frame::{self, FrameLayout, RawFrame};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Pounds per kilogram.
pub const LB_PER_KG: f64 = 2.20462;

/// Display unit reported by the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "lb")]
    Pounds,
}

impl WeightUnit {
    /// Interpret an advertisement unit flag: `1` is kilograms, anything else pounds.
    pub fn from_flag(flag: u8) -> Self {
        if flag == 1 {
            WeightUnit::Kilograms
        } else {
            WeightUnit::Pounds
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded frame together with the metrics estimated from it.
///
/// Weight is always available in both units regardless of the display unit;
/// frames that carry no weight (real-time impedance) leave both empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleReading {
    /// Layout the frame was decoded from
    pub layout: FrameLayout,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Weight in pounds
    pub weight_lb: Option<f64>,
    /// Raw bioelectrical impedance
    pub impedance: Option<u16>,
    /// Display unit selected on the scale (kilograms when the frame has no flag)
    pub unit: WeightUnit,
    /// When a stored (historic) reading was taken
    pub timestamp: Option<DateTime<Utc>>,
    /// Derived body composition, when estimated
    pub metrics: Option<DerivedMetrics>,
}

impl ScaleReading {
    /// Build a reading from a decoded frame.
    ///
    /// Metrics are estimated only when an estimator is given and the frame
    /// carries both a weight and a non-zero impedance.
    ///
    /// # Errors
    /// Propagates `EstimateError` when estimation is attempted with an
    /// unusable weight (e.g. an idle scale reporting 0 kg with an impedance).
    pub fn assemble(
        frame: &RawFrame,
        estimator: Option<&BodyCompositionEstimator>,
    ) -> Result<Self, EstimateError> {
        let weight_kg = frame.weight_kg();
        let impedance = frame.impedance_raw();

        let metrics = match (estimator, weight_kg, impedance) {
            (Some(estimator), Some(weight), Some(impedance)) if impedance > 0 => {
                Some(estimator.estimate(weight, impedance)?)
            }
            _ => None,
        };

        Ok(Self {
            layout: frame.layout(),
            weight_kg,
            weight_lb: weight_kg.map(|kg| kg * LB_PER_KG),
            impedance,
            unit: frame.unit_flag().map(WeightUnit::from_flag).unwrap_or_default(),
            timestamp: frame.timestamp(),
            metrics,
        })
    }

    /// Decode `raw` with the given layout and assemble a reading from it.
    ///
    /// # Example
    /// ```
    /// use bodyscale_listener::{FrameLayout, ScaleReading};
    ///
    /// let raw = [0, 0, 0, 0, 0x01, 0xF4, 0, 0, 0, 0x58, 0x1B, 0, 0, 0, 0, 0x01];
    /// let reading = ScaleReading::from_payload(FrameLayout::Advertisement, &raw, None).unwrap();
    /// assert_eq!(reading.weight_kg, Some(70.0));
    /// assert_eq!(reading.impedance, Some(500));
    /// ```
    pub fn from_payload(
        layout: FrameLayout,
        raw: &[u8],
        estimator: Option<&BodyCompositionEstimator>,
    ) -> Result<Self, ScaleError> {
        let frame = frame::decode(layout, raw)?;
        Ok(Self::assemble(&frame, estimator)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{decode_advertisement, decode_notification};
    use crate::test_utils::{advertisement_payload, historic_frame, reference_profile};

    fn estimator() -> BodyCompositionEstimator {
        BodyCompositionEstimator::new(reference_profile())
    }

    #[test]
    fn test_weight_lb_round_trip() {
        for weight_raw in [1u16, 4_500, 7_000, 7_235, 15_000, u16::MAX] {
            let frame = decode_advertisement(&advertisement_payload(weight_raw, 500, 1)).unwrap();
            let reading = ScaleReading::assemble(&frame, Some(&estimator())).unwrap();
            let kg = reading.weight_kg.unwrap();
            let lb = reading.weight_lb.unwrap();
            assert!((lb - kg * 2.20462).abs() < 1e-6);
        }
    }

    #[test]
    fn test_assemble_advertisement_with_metrics() {
        let frame = decode_advertisement(&advertisement_payload(7_000, 500, 1)).unwrap();
        let reading = ScaleReading::assemble(&frame, Some(&estimator())).unwrap();

        assert_eq!(reading.layout, FrameLayout::Advertisement);
        assert_eq!(reading.weight_kg, Some(70.0));
        assert_eq!(reading.impedance, Some(500));
        assert_eq!(reading.unit, WeightUnit::Kilograms);
        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.metrics, Some(estimator().estimate(70.0, 500).unwrap()));
    }

    #[test]
    fn test_assemble_historic_keeps_timestamp() {
        let frame = decode_notification(&historic_frame(1_700_000_000, 70_000, 500)).unwrap();
        let reading = ScaleReading::assemble(&frame, Some(&estimator())).unwrap();
        assert_eq!(reading.layout, FrameLayout::Notification);
        assert_eq!(reading.timestamp.unwrap().timestamp(), 1_700_000_000);
        assert!(reading.metrics.is_some());
    }

    #[test]
    fn test_assemble_without_estimator() {
        let frame = decode_advertisement(&advertisement_payload(7_000, 500, 1)).unwrap();
        let reading = ScaleReading::assemble(&frame, None).unwrap();
        assert_eq!(reading.weight_kg, Some(70.0));
        assert!(reading.metrics.is_none());
    }

    #[test]
    fn test_zero_impedance_skips_metrics() {
        let frame = decode_advertisement(&advertisement_payload(7_000, 0, 1)).unwrap();
        let reading = ScaleReading::assemble(&frame, Some(&estimator())).unwrap();
        assert!(reading.metrics.is_none());
    }

    #[test]
    fn test_zero_weight_with_impedance_is_invalid() {
        let frame = decode_advertisement(&advertisement_payload(0, 500, 1)).unwrap();
        assert!(matches!(
            ScaleReading::assemble(&frame, Some(&estimator())),
            Err(EstimateError::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_impedance_only_frame() {
        let frame = RawFrame::RealtimeImpedance { impedance_raw: 480 };
        let reading = ScaleReading::assemble(&frame, Some(&estimator())).unwrap();
        assert_eq!(reading.weight_kg, None);
        assert_eq!(reading.weight_lb, None);
        assert_eq!(reading.impedance, Some(480));
        assert!(reading.metrics.is_none());
    }

    #[test]
    fn test_from_payload_propagates_decode_errors() {
        let err = ScaleReading::from_payload(FrameLayout::Notification, &[0x1D], None).unwrap_err();
        assert_eq!(
            err,
            ScaleError::Decode(crate::frame::DecodeError::FrameTooShort { len: 1, min: 17 })
        );

        let raw = historic_frame(0, 70_000, 500);
        let mut duplicate = raw.clone();
        duplicate[7] = 0;
        let err = ScaleReading::from_payload(FrameLayout::Notification, &duplicate, None).unwrap_err();
        assert!(err.is_skippable());
    }

    #[test]
    fn test_unit_flag() {
        let frame = decode_advertisement(&advertisement_payload(7_000, 500, 2)).unwrap();
        let reading = ScaleReading::assemble(&frame, None).unwrap();
        assert_eq!(reading.unit, WeightUnit::Pounds);
        assert_eq!(reading.unit.to_string(), "lb");

        assert_eq!(WeightUnit::from_flag(1), WeightUnit::Kilograms);
        assert_eq!(WeightUnit::from_flag(0), WeightUnit::Pounds);
        assert_eq!(WeightUnit::Kilograms.as_str(), "kg");
    }
}
