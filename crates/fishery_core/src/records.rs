//! Input record types.
//!
//! Records arrive already normalized from the ingestion layer. The engine only reads them;
//! validation here checks the numeric contract (finite, non-negative, in-range coordinates).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EffortUnit {
    Hours,
    Trips,
    NetDays,
    Hooks,
    Tows,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub depth: Option<f64>,
}

impl Location {
    /// Returns the coordinate pair when both halves are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// One observation of catch and effort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatchRecord {
    pub date: NaiveDate,
    pub species: String,
    #[serde(rename = "catch")]
    pub catch_amount: f64,
    pub effort: f64,
    pub effort_unit: EffortUnit,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub gear_type: Option<String>,
    #[serde(default)]
    pub vessel_id: Option<String>,
}

impl CatchRecord {
    /// Catch per unit effort of this single record, or `None` when effort is not positive.
    pub fn cpue(&self) -> Option<f64> {
        if self.effort > 0.0 {
            Some(self.catch_amount / self.effort)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaturityStage {
    Immature,
    Maturing,
    Mature,
    Spawning,
    Spent,
}

impl MaturityStage {
    /// Mature, spawning and spent fish all count toward the mature fraction.
    pub fn is_mature(self) -> bool {
        matches!(
            self,
            MaturityStage::Mature | MaturityStage::Spawning | MaturityStage::Spent
        )
    }
}

/// One measured individual.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LengthRecord {
    pub date: NaiveDate,
    pub species: String,
    /// Length in centimetres.
    pub length: f64,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub maturity: Option<MaturityStage>,
    /// Age in years.
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl LengthRecord {
    pub fn is_mature(&self) -> bool {
        self.maturity.map_or(false, MaturityStage::is_mature)
    }
}

/// A dated scalar, used for abundance and environmental series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DateValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Case-insensitive exact species comparison.
pub fn species_matches(stored: &str, wanted: &str) -> bool {
    stored.to_lowercase() == wanted.to_lowercase()
}

pub(crate) fn catch_for_species<'a>(
    records: &'a [CatchRecord],
    species: Option<&str>,
) -> Vec<&'a CatchRecord> {
    records
        .iter()
        .filter(|r| species.map_or(true, |s| species_matches(&r.species, s)))
        .collect()
}

pub(crate) fn lengths_for_species<'a>(
    records: &'a [LengthRecord],
    species: &str,
) -> Vec<&'a LengthRecord> {
    records
        .iter()
        .filter(|r| species_matches(&r.species, species))
        .collect()
}

/// First day of the record's month, used as the monthly series date.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn check_finite(field: &'static str, index: usize, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(InvalidInputError::NonFinite { field, index });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, index: usize, value: f64) -> Result<()> {
    check_finite(field, index, value)?;
    if value < 0.0 {
        return Err(InvalidInputError::Negative { field, index });
    }
    Ok(())
}

fn check_location(index: usize, location: Option<&Location>) -> Result<()> {
    let Some(location) = location else {
        return Ok(());
    };
    if let Some(depth) = location.depth {
        check_finite("location.depth", index, depth)?;
    }
    let latitude = location.latitude.unwrap_or(0.0);
    let longitude = location.longitude.unwrap_or(0.0);
    if !latitude.is_finite()
        || !longitude.is_finite()
        || latitude.abs() > 90.0
        || longitude.abs() > 180.0
    {
        return Err(InvalidInputError::InvalidCoordinate {
            index,
            latitude,
            longitude,
        });
    }
    Ok(())
}

pub fn validate_catch_records(records: &[CatchRecord]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        check_non_negative("catch", index, record.catch_amount)?;
        check_non_negative("effort", index, record.effort)?;
        check_location(index, record.location.as_ref())?;
    }
    Ok(())
}

pub fn validate_length_records(records: &[LengthRecord]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        check_non_negative("length", index, record.length)?;
        if let Some(weight) = record.weight {
            check_non_negative("weight", index, weight)?;
        }
        if let Some(age) = record.age {
            check_non_negative("age", index, age)?;
        }
        check_location(index, record.location.as_ref())?;
    }
    Ok(())
}

pub fn validate_series(series: &[DateValue]) -> Result<()> {
    for (index, point) in series.iter().enumerate() {
        check_finite("value", index, point.value)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    pub fn catch(species: &str, date: NaiveDate, catch_amount: f64, effort: f64) -> CatchRecord {
        CatchRecord {
            date,
            species: species.to_string(),
            catch_amount,
            effort,
            effort_unit: EffortUnit::Hours,
            location: None,
            gear_type: None,
            vessel_id: None,
        }
    }

    pub fn length(species: &str, date: NaiveDate, length: f64) -> LengthRecord {
        LengthRecord {
            date,
            species: species.to_string(),
            length,
            weight: None,
            sex: None,
            maturity: None,
            age: None,
            location: None,
        }
    }
}
