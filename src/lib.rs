//! `bodyscale-listener` library.
//!
//! Decodes body-composition scale frames and estimates body metrics from them.
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit codes.
//! The run loop lives in [`crate::app`] where it can be tested
//! deterministically with an injected payload source + injected output streams.

pub mod app;
pub mod bytes;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod output;
pub mod profile;
pub mod reading;
pub mod source;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use error::ScaleError;
pub use estimator::{BodyCompositionEstimator, DerivedMetrics, EstimateError, bounded};
pub use frame::{DecodeError, FrameLayout, MessageType, RawFrame, decode};
pub use output::OutputFormatter;
pub use output::influxdb::InfluxDbFormatter;
pub use output::json::JsonFormatter;
pub use profile::{ActivityClass, Sex, UserProfile};
pub use reading::{ScaleReading, WeightUnit};
pub use source::{FrameSource, PayloadResult, StdinSource};
