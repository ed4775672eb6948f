//! Errors for turning one payload into a [`crate::ScaleReading`].

use crate::estimator::EstimateError;
use crate::frame::DecodeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Estimate error: {0}")]
    Estimate(#[from] EstimateError),
    /// Payload text that could not be turned into bytes
    #[error("Input error: {0}")]
    Input(String),
}

impl ScaleError {
    /// `true` when the frame should be dropped without reporting a failure.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ScaleError::Decode(e) if e.is_skippable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_error_display() {
        let err = ScaleError::from(DecodeError::UnknownMessageType(0x42));
        assert_eq!(format!("{}", err), "Decode error: Unknown message type: 0x42");

        let err = ScaleError::from(EstimateError::InvalidProfile("height".into()));
        assert_eq!(format!("{}", err), "Estimate error: Invalid profile: height");
    }

    #[test]
    fn test_is_skippable() {
        assert!(ScaleError::from(DecodeError::SkippedRealtimeDuplicate).is_skippable());
        assert!(!ScaleError::from(DecodeError::EmptyFrame).is_skippable());
        assert!(!ScaleError::Input("zz".into()).is_skippable());
    }
}
