//! User profile feeding the body-composition formulas.

use crate::estimator::EstimateError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => write!(f, "female"),
            Sex::Male => write!(f, "male"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "female" | "f" => Ok(Sex::Female),
            "male" | "m" => Ok(Sex::Male),
            _ => Err(format!("Unknown sex: {}", s)),
        }
    }
}

/// Self-reported activity level.
///
/// Carried for the scale's user record; no formula depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActivityClass {
    Low,
    #[default]
    Medium,
    High,
}

impl ActivityClass {
    /// Numeric flag used by the scale's user record.
    pub fn flag(self) -> u8 {
        match self {
            ActivityClass::Low => 1,
            ActivityClass::Medium => 2,
            ActivityClass::High => 3,
        }
    }
}

impl FromStr for ActivityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ActivityClass::Low),
            "medium" => Ok(ActivityClass::Medium),
            "high" => Ok(ActivityClass::High),
            _ => Err(format!("Unknown activity class: {}", s)),
        }
    }
}

/// Immutable description of the person standing on the scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserProfile {
    sex: Sex,
    age: u32,
    height_cm: f64,
    activity: ActivityClass,
}

impl UserProfile {
    /// Create a profile, rejecting a zero age or a non-positive height.
    ///
    /// # Example
    /// ```
    /// use bodyscale_listener::profile::{ActivityClass, Sex, UserProfile};
    ///
    /// let profile = UserProfile::new(Sex::Male, 38, 171.0, ActivityClass::Medium).unwrap();
    /// assert!((profile.height_m() - 1.71).abs() < 1e-12);
    /// assert!(UserProfile::new(Sex::Male, 38, 0.0, ActivityClass::Medium).is_err());
    /// ```
    pub fn new(
        sex: Sex,
        age: u32,
        height_cm: f64,
        activity: ActivityClass,
    ) -> Result<Self, EstimateError> {
        if age == 0 {
            return Err(EstimateError::InvalidProfile("age must be positive".into()));
        }
        if !height_cm.is_finite() || height_cm <= 0.0 {
            return Err(EstimateError::InvalidProfile(format!(
                "height must be positive, got {height_cm} cm"
            )));
        }
        Ok(Self {
            sex,
            age,
            height_cm,
            activity,
        })
    }

    /// Create a profile with the age derived from a birthdate as of `today`.
    pub fn from_birthdate(
        sex: Sex,
        birthdate: NaiveDate,
        today: NaiveDate,
        height_cm: f64,
        activity: ActivityClass,
    ) -> Result<Self, EstimateError> {
        let age = age_on(birthdate, today).ok_or_else(|| {
            EstimateError::InvalidProfile(format!("birthdate {birthdate} is after {today}"))
        })?;
        Self::new(sex, age, height_cm, activity)
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn height_m(&self) -> f64 {
        self.height_cm / 100.0
    }

    pub fn activity(&self) -> ActivityClass {
        self.activity
    }
}

/// Whole years between `birthdate` and `today`, or `None` if `birthdate` is later.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birthdate > today {
        return None;
    }
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Convert a height given in feet and inches to centimetres.
pub fn height_from_imperial(feet: f64, inches: f64) -> f64 {
    feet * CM_PER_FOOT + inches * CM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_height() {
        for height in [0.0, -170.0, f64::NAN, f64::INFINITY] {
            let result = UserProfile::new(Sex::Female, 30, height, ActivityClass::Low);
            assert!(
                matches!(result, Err(EstimateError::InvalidProfile(_))),
                "height {height} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_rejects_zero_age() {
        assert!(matches!(
            UserProfile::new(Sex::Male, 0, 171.0, ActivityClass::Medium),
            Err(EstimateError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_accessors() {
        let profile = UserProfile::new(Sex::Male, 38, 171.0, ActivityClass::High).unwrap();
        assert_eq!(profile.sex(), Sex::Male);
        assert_eq!(profile.age(), 38);
        assert_eq!(profile.height_cm(), 171.0);
        assert_eq!(profile.activity(), ActivityClass::High);
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        assert_eq!(age_on(date(1986, 10, 15), date(2024, 10, 14)), Some(37));
        assert_eq!(age_on(date(1986, 10, 15), date(2024, 10, 15)), Some(38));
        assert_eq!(age_on(date(1986, 10, 15), date(2024, 12, 1)), Some(38));
        assert_eq!(age_on(date(2024, 10, 16), date(2024, 10, 15)), None);
    }

    #[test]
    fn test_from_birthdate() {
        let profile = UserProfile::from_birthdate(
            Sex::Female,
            date(1990, 2, 28),
            date(2024, 3, 1),
            165.0,
            ActivityClass::Medium,
        )
        .unwrap();
        assert_eq!(profile.age(), 34);

        // Born today: age 0 is not a valid profile
        assert!(
            UserProfile::from_birthdate(
                Sex::Female,
                date(2024, 3, 1),
                date(2024, 3, 1),
                165.0,
                ActivityClass::Medium,
            )
            .is_err()
        );
    }

    #[test]
    fn test_height_from_imperial() {
        assert!((height_from_imperial(5.0, 7.0) - 170.18).abs() < 1e-9);
        assert!((height_from_imperial(6.0, 0.0) - 182.88).abs() < 1e-9);
    }

    #[test]
    fn test_activity_flag() {
        assert_eq!(ActivityClass::Low.flag(), 1);
        assert_eq!(ActivityClass::Medium.flag(), 2);
        assert_eq!(ActivityClass::High.flag(), 3);
        assert_eq!(ActivityClass::default(), ActivityClass::Medium);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Sex::from_str("Male").unwrap(), Sex::Male);
        assert_eq!(Sex::from_str("f").unwrap(), Sex::Female);
        assert!(Sex::from_str("x").is_err());
        assert_eq!(ActivityClass::from_str("HIGH").unwrap(), ActivityClass::High);
        assert!(ActivityClass::from_str("extreme").is_err());
    }
}
