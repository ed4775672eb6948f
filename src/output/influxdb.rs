//! InfluxDB line protocol output formatter.

use crate::output::OutputFormatter;
use crate::reading::ScaleReading;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Field values for InfluxDB line protocol
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Float(f64),
    /// Written with the `i` suffix
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Float(num) => write!(f, "{num}"),
            FieldValue::Integer(num) => write!(f, "{num}i"),
        }
    }
}

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<&'static str, String>,
    pub field_set: BTreeMap<&'static str, FieldValue>,
    pub timestamp: Option<DateTime<Utc>>,
}

fn fmt_tags(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    for (key, value) in data_point.tag_set.iter() {
        write!(fmt, ",{}={}", key, value)?;
    }
    Ok(())
}

fn fmt_fields(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    let mut first = true;
    for (key, value) in data_point.field_set.iter() {
        if first {
            first = false;
        } else {
            write!(fmt, ",")?;
        }
        write!(fmt, "{}={}", key, value)?;
    }
    Ok(())
}

fn fmt_timestamp(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    // Readings before 1677 or after 2262 don't fit in i64 nanoseconds; leave them to the server clock.
    if let Some(nanos) = data_point
        .timestamp
        .and_then(|time| time.timestamp_nanos_opt())
    {
        write!(fmt, " {}", nanos)?;
    }
    Ok(())
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.measurement)?;
        fmt_tags(self, fmt)?;
        write!(fmt, " ")?;
        fmt_fields(self, fmt)?;
        fmt_timestamp(self, fmt)
    }
}

/// InfluxDB line protocol formatter.
///
/// Live readings carry no timestamp so the server assigns arrival time;
/// historic readings are written at the time the scale stored them.
pub struct InfluxDbFormatter {
    /// The measurement name in InfluxDB
    measurement_name: String,
}

impl InfluxDbFormatter {
    pub fn new(measurement_name: String) -> Self {
        Self { measurement_name }
    }

    fn tag_set(&self, reading: &ScaleReading) -> BTreeMap<&'static str, String> {
        let mut tags = BTreeMap::new();
        tags.insert("layout", reading.layout.to_string());
        tags.insert("unit", reading.unit.to_string());
        tags
    }

    /// Only fields that have values are included.
    fn field_set(&self, r: &ScaleReading) -> BTreeMap<&'static str, FieldValue> {
        let mut fields = BTreeMap::new();

        macro_rules! add {
            ($name:literal, $val:expr) => {
                if let Some(v) = $val {
                    fields.insert($name, FieldValue::Float(v));
                }
            };
        }

        add!("weight_kg", r.weight_kg);
        add!("weight_lb", r.weight_lb);
        if let Some(impedance) = r.impedance {
            fields.insert("impedance", FieldValue::Integer(i64::from(impedance)));
        }

        if let Some(m) = &r.metrics {
            add!("bmi", Some(m.bmi));
            add!("bmmr", Some(m.bmmr));
            add!("body_fat_percentage", Some(m.body_fat_percentage));
            add!("bone_mass", Some(m.bone_mass));
            add!("muscle_mass", Some(m.muscle_mass));
            add!(
                "skeletal_muscle_percentage",
                Some(m.skeletal_muscle_percentage)
            );
            add!("visceral_fat", Some(m.visceral_fat));
            add!("water_percentage", Some(m.water_percentage));
            add!("protein_percentage", Some(m.protein_percentage));
        }

        fields
    }

    fn to_data_point(&self, reading: &ScaleReading) -> DataPoint {
        DataPoint {
            measurement: self.measurement_name.clone(),
            tag_set: self.tag_set(reading),
            field_set: self.field_set(reading),
            timestamp: reading.timestamp,
        }
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, reading: &ScaleReading) -> String {
        format!("{}", self.to_data_point(reading))
    }
}
