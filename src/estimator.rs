//! Body-composition estimation from weight and bioelectrical impedance.
//!
//! The formulas are empirical fits shipped with the scale's companion app.
//! Every coefficient is reproduced as-is; each derived metric except body fat
//! is clamped to its own range with [`bounded`].
//!
//! Estimation is a pure function of the profile and a single reading, so one
//! estimator can be shared freely between threads.

use crate::profile::{Sex, UserProfile};
use serde::Serialize;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Body-fat values outside this range point at a bad impedance reading.
/// Used for diagnostics only; the reported value is never clamped.
pub const PLAUSIBLE_BODY_FAT: RangeInclusive<f64> = 5.0..=75.0;

const BMI_RANGE: (f64, f64) = (10.0, 90.0);
const BMMR_RANGE: (f64, f64) = (500.0, 1000.0);
const BONE_MASS_RANGE: (f64, f64) = (0.5, 8.0);
const MUSCLE_MASS_RANGE: (f64, f64) = (10.0, 120.0);
const WATER_RANGE: (f64, f64) = (35.0, 75.0);
const VISCERAL_FAT_RANGE: (f64, f64) = (1.0, 50.0);

/// Errors returned by the estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),
}

/// Clamp `value` into `[lo, hi]`.
///
/// # Example
/// ```
/// use bodyscale_listener::estimator::bounded;
///
/// assert_eq!(bounded(120.0, 10.0, 90.0), 90.0);
/// assert_eq!(bounded(5.0, 10.0, 90.0), 10.0);
/// assert_eq!(bounded(42.0, 10.0, 90.0), 42.0);
/// ```
pub fn bounded(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}

fn clamp(value: f64, (lo, hi): (f64, f64)) -> f64 {
    bounded(value, lo, hi)
}

/// All metrics derived from one weight/impedance reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Body-mass index in kg/m²
    pub bmi: f64,
    /// Basal metabolism in kcal/day
    pub bmmr: f64,
    /// Body fat in percent of weight (unclamped)
    pub body_fat_percentage: f64,
    /// Bone mass in kg
    pub bone_mass: f64,
    /// Muscle mass in kg
    pub muscle_mass: f64,
    /// Skeletal muscle in percent of weight
    pub skeletal_muscle_percentage: f64,
    /// Visceral fat rating (unitless)
    pub visceral_fat: f64,
    /// Body water in percent of weight
    pub water_percentage: f64,
    /// Protein in percent of weight
    pub protein_percentage: f64,
}

/// Computes [`DerivedMetrics`] for a fixed [`UserProfile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyCompositionEstimator {
    profile: UserProfile,
}

impl BodyCompositionEstimator {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    fn height_cm(&self) -> f64 {
        self.profile.height_cm()
    }

    fn age(&self) -> f64 {
        f64::from(self.profile.age())
    }

    fn check_height(&self) -> Result<(), EstimateError> {
        let height = self.height_cm();
        if !height.is_finite() || height <= 0.0 {
            return Err(EstimateError::InvalidProfile(format!(
                "height must be positive, got {height} cm"
            )));
        }
        Ok(())
    }

    fn check_weight(weight_kg: f64) -> Result<(), EstimateError> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(EstimateError::InvalidMeasurement(format!(
                "weight must be positive, got {weight_kg} kg"
            )));
        }
        Ok(())
    }

    pub fn bmi(&self, weight_kg: f64) -> Result<f64, EstimateError> {
        self.check_height()?;
        let height_m = self.profile.height_m();
        Ok(clamp(weight_kg / (height_m * height_m), BMI_RANGE))
    }

    /// Lean body mass coefficient; intermediate input to fat and bone mass.
    pub fn lean_body_mass(&self, weight_kg: f64, impedance: u16) -> f64 {
        let height_m = self.profile.height_m();
        height_m * height_m * 9.058 + 12.226 + weight_kg * 0.32
            - f64::from(impedance) * 0.0068
            - self.age() * 0.0542
    }

    /// Basal metabolism in kcal/day.
    pub fn bmmr(&self, weight_kg: f64) -> f64 {
        let (height, age) = (self.height_cm(), self.age());
        let bmmr = match self.profile.sex() {
            Sex::Male => weight_kg * 14.916 + 877.8 - height * 0.726 - age * 8.976,
            Sex::Female => weight_kg * 10.2036 + 864.6 - height * 0.39336 - age * 6.204,
        };
        clamp(bmmr, BMMR_RANGE)
    }

    pub fn body_fat_percentage(&self, weight_kg: f64, impedance: u16) -> Result<f64, EstimateError> {
        self.check_height()?;
        Self::check_weight(weight_kg)?;
        Ok(self.fat_from_lbm(weight_kg, self.lean_body_mass(weight_kg, impedance)))
    }

    pub fn bone_mass(&self, weight_kg: f64, impedance: u16) -> f64 {
        self.bone_from_lbm(self.lean_body_mass(weight_kg, impedance))
    }

    /// Visceral fat rating. The branch depends on how weight compares to height.
    pub fn visceral_fat(&self, weight_kg: f64) -> f64 {
        let (height, age) = (self.height_cm(), self.age());
        let rating = match self.profile.sex() {
            Sex::Male if height < weight_kg * 1.6 + 63.0 => {
                let subcalc = -((height * 0.4) - (height * (height * 0.0826)));
                (weight_kg * 305.0) / (subcalc + 48.0) - 2.9 + age * 0.15
            }
            Sex::Male => {
                let subcalc = 0.765 + height * -0.0015;
                -((height * 0.143) - (weight_kg * subcalc)) + age * 0.15 - 5.0
            }
            Sex::Female if weight_kg > height * 0.5 - 13.0 => {
                let subsubcalc = (height * 1.45) + (height * 0.1158) * height - 120.0;
                let subcalc = weight_kg * 500.0 / subsubcalc;
                (subcalc - 6.0) + age * 0.07
            }
            Sex::Female => {
                let subcalc = 0.691 + (height * -0.0024) + (height * -0.0024);
                -((height * 0.027) - (subcalc * weight_kg)) + age * 0.07 - age
            }
        };
        clamp(rating, VISCERAL_FAT_RANGE)
    }

    /// Compute every derived metric for one reading.
    ///
    /// # Errors
    /// `InvalidProfile` if the profile height is not positive, `InvalidMeasurement`
    /// if `weight_kg` is not a positive finite number.
    pub fn estimate(&self, weight_kg: f64, impedance: u16) -> Result<DerivedMetrics, EstimateError> {
        self.check_height()?;
        Self::check_weight(weight_kg)?;

        let lbm = self.lean_body_mass(weight_kg, impedance);
        let body_fat_percentage = self.fat_from_lbm(weight_kg, lbm);
        if !PLAUSIBLE_BODY_FAT.contains(&body_fat_percentage) {
            tracing::debug!(
                body_fat_percentage,
                weight_kg,
                impedance,
                "body fat outside plausible range"
            );
        }

        let bone_mass = self.bone_from_lbm(lbm);
        let water_percentage = water_from_fat(body_fat_percentage);
        let metrics = DerivedMetrics {
            bmi: self.bmi(weight_kg)?,
            bmmr: self.bmmr(weight_kg),
            body_fat_percentage,
            bone_mass,
            muscle_mass: muscle_mass(weight_kg, body_fat_percentage, bone_mass),
            skeletal_muscle_percentage: skeletal_muscle(weight_kg, water_percentage),
            visceral_fat: self.visceral_fat(weight_kg),
            water_percentage,
            protein_percentage: protein(weight_kg, body_fat_percentage, water_percentage, bone_mass),
        };
        tracing::trace!(?metrics, "estimated body composition");
        Ok(metrics)
    }

    fn fat_from_lbm(&self, weight_kg: f64, lbm: f64) -> f64 {
        let (sex, age, height) = (self.profile.sex(), self.profile.age(), self.height_cm());
        let offset = match sex {
            Sex::Female if age < 50 => 9.25,
            Sex::Female => 7.25,
            Sex::Male => 0.8,
        };
        // Mi Scale form: the tall-female factor is applied only together with a
        // weight correction, never on its own.
        let coefficient = match sex {
            Sex::Male if weight_kg < 61.0 => 0.98,
            Sex::Female if weight_kg > 60.0 => 0.96 * tall_female(height),
            Sex::Female if weight_kg < 50.0 => 1.02 * tall_female(height),
            _ => 1.0,
        };
        100.0 * (1.0 - (lbm - offset) * coefficient / weight_kg)
    }

    fn bone_from_lbm(&self, lbm: f64) -> f64 {
        let base = match self.profile.sex() {
            Sex::Male => 0.18016894,
            Sex::Female => 0.245691014,
        };
        let bone = lbm * 0.05158 - base;
        let bone = if bone <= 2.2 { bone - 0.1 } else { bone + 0.1 };
        clamp(bone, BONE_MASS_RANGE)
    }
}

/// Extra female body-fat factor above 160 cm. Only applied inside the
/// under-50 kg and over-60 kg corrections, as the Mi Scale formula gates it.
fn tall_female(height_cm: f64) -> f64 {
    if height_cm > 160.0 { 1.03 } else { 1.0 }
}

fn water_from_fat(body_fat_percentage: f64) -> f64 {
    let water = (100.0 - body_fat_percentage) * 0.7;
    let water = if water > 50.0 { water * 0.98 } else { water * 1.02 };
    clamp(water, WATER_RANGE)
}

fn muscle_mass(weight_kg: f64, body_fat_percentage: f64, bone_mass: f64) -> f64 {
    let muscle = weight_kg - (body_fat_percentage / 100.0) * weight_kg - bone_mass;
    clamp(muscle, MUSCLE_MASS_RANGE)
}

fn skeletal_muscle(weight_kg: f64, water_percentage: f64) -> f64 {
    ((water_percentage * weight_kg * 0.8422 * 0.01) - 2.9903) / weight_kg * 100.0
}

fn protein(weight_kg: f64, body_fat_percentage: f64, water_percentage: f64, bone_mass: f64) -> f64 {
    (100.0 - body_fat_percentage - water_percentage * 1.08) - (bone_mass / weight_kg) * 100.0
}
