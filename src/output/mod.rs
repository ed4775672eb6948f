//! Output formatters for scale readings.
//!
//! This module provides a trait for formatting readings and implementations
//! for InfluxDB line protocol (Telegraf `execd` friendly) and JSON lines.

pub mod influxdb;
pub mod json;

use crate::reading::ScaleReading;

/// Trait for formatting readings into output strings.
pub trait OutputFormatter: Send + Sync {
    /// Format a reading as a single line (without the trailing newline).
    fn format(&self, reading: &ScaleReading) -> String;
}

/// Selectable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// InfluxDB line protocol
    #[default]
    #[value(name = "influxdb")]
    InfluxDb,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Build the formatter for this format.
    ///
    /// `measurement_name` is only used by the line-protocol formatter.
    pub fn formatter(self, measurement_name: String) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::InfluxDb => Box::new(influxdb::InfluxDbFormatter::new(measurement_name)),
            OutputFormat::Json => Box::new(json::JsonFormatter),
        }
    }
}
