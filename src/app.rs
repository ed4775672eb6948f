//! Core application runner (business logic) for `bodyscale-listener`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit codes
//! so it can be tested deterministically.

use crate::error::ScaleError;
use crate::estimator::{BodyCompositionEstimator, EstimateError};
use crate::frame::FrameLayout;
use crate::output::{OutputFormat, OutputFormatter};
use crate::profile::{ActivityClass, Sex, UserProfile, height_from_imperial};
use crate::reading::ScaleReading;
use crate::source::FrameSource;
use chrono::NaiveDate;
use clap::Parser;
use std::io;
use std::io::Write;
use thiserror::Error;

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Payload layout delivered by the transport: advertisement manufacturer
    /// data or GATT notifications
    #[arg(long, default_value_t, value_enum)]
    pub layout: FrameLayout,

    /// Sex used by the body-composition formulas
    #[arg(long, value_enum)]
    pub sex: Option<Sex>,

    /// Age in years
    #[arg(long, conflicts_with = "birthdate")]
    pub age: Option<u32>,

    /// Birthdate (YYYY-MM-DD); age is computed from today's date
    #[arg(long)]
    pub birthdate: Option<NaiveDate>,

    /// Height in centimetres
    #[arg(long = "height-cm", conflicts_with_all = ["feet", "inches"])]
    pub height_cm: Option<f64>,

    /// Height in feet (combine with --inches)
    #[arg(long)]
    pub feet: Option<f64>,

    /// Additional height in inches
    #[arg(long)]
    pub inches: Option<f64>,

    /// Activity level
    #[arg(long, default_value_t, value_enum)]
    pub activity: ActivityClass,

    /// Only report weight and impedance; skip body-composition estimation
    #[arg(long)]
    pub no_body_metrics: bool,

    /// Output format
    #[arg(long, default_value_t, value_enum)]
    pub format: OutputFormat,

    /// The name of the measurement in InfluxDB line protocol.
    #[arg(long, default_value = "body_scale")]
    pub influxdb_measurement: String,

    /// Verbose output, print errors for frames that could not be decoded
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Options {
    /// Build the user profile from the command line, as of `today`.
    ///
    /// Returns `Ok(None)` when body metrics are disabled.
    pub fn profile(&self, today: NaiveDate) -> Result<Option<UserProfile>, EstimateError> {
        if self.no_body_metrics {
            return Ok(None);
        }

        let sex = self.sex.ok_or_else(|| {
            EstimateError::InvalidProfile("--sex is required for body metrics".into())
        })?;

        let height_cm = match (self.height_cm, self.feet, self.inches) {
            (Some(cm), _, _) => cm,
            (None, None, None) => {
                return Err(EstimateError::InvalidProfile(
                    "--height-cm or --feet/--inches is required for body metrics".into(),
                ));
            }
            (None, feet, inches) => {
                height_from_imperial(feet.unwrap_or_default(), inches.unwrap_or_default())
            }
        };

        let profile = match (self.age, self.birthdate) {
            (Some(age), _) => UserProfile::new(sex, age, height_cm, self.activity)?,
            (None, Some(birthdate)) => {
                UserProfile::from_birthdate(sex, birthdate, today, height_cm, self.activity)?
            }
            (None, None) => {
                return Err(EstimateError::InvalidProfile(
                    "--age or --birthdate is required for body metrics".into(),
                ));
            }
        };
        Ok(Some(profile))
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn write_reading(
    formatter: &dyn OutputFormatter,
    reading: &ScaleReading,
    out: &mut dyn Write,
) -> io::Result<()> {
    let line = formatter.format(reading);
    writeln!(out, "{line}")
}

/// Run the core processing loop, writing formatted output to `out` and verbose errors to `err`.
///
/// - Each payload is decoded with the configured layout, estimated and written as one line to `out`.
/// - Real-time duplicates are dropped silently.
/// - Other frame errors are written to `err` only when `options.verbose` is true.
pub async fn run_with_io(
    options: Options,
    today: NaiveDate,
    source: &dyn FrameSource,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let estimator = options
        .profile(today)
        .map_err(ScaleError::from)?
        .map(BodyCompositionEstimator::new);
    if let Some(estimator) = &estimator {
        tracing::debug!(profile = ?estimator.profile(), "body metrics enabled");
    }

    let formatter = options.format.formatter(options.influxdb_measurement.clone());
    let mut payloads = source.start().await?;

    while let Some(payload) = payloads.recv().await {
        let result = payload.and_then(|raw| {
            ScaleReading::from_payload(options.layout, &raw, estimator.as_ref())
        });

        match result {
            Ok(reading) => write_reading(formatter.as_ref(), &reading, out)?,
            Err(error) if error.is_skippable() => {
                tracing::trace!("skipping real-time duplicate frame");
            }
            Err(error) => {
                tracing::debug!(%error, "rejected frame");
                if options.verbose {
                    writeln!(err, "{error}")?;
                }
            }
        }
    }

    Ok(())
}
