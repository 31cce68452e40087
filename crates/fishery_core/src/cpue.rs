//! Catch-per-unit-effort analysis: point estimates, period series, location ranking and
//! gear standardization.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, Result};
use crate::policy::{TrendDirection, CPUE_TREND_POLICY};
use crate::records::{catch_for_species, validate_catch_records, CatchRecord};
use crate::stats::{self, LinearFit, Z_95};

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const UNKNOWN_GEAR: &str = "unknown";
pub const ALL_SPECIES: &str = "all";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CpuePeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl CpuePeriod {
    /// Calendar key of a date: `YYYY-MM`, `YYYY-Qn` or `YYYY`. Keys sort chronologically.
    pub fn key(self, date: chrono::NaiveDate) -> String {
        match self {
            CpuePeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            CpuePeriod::Quarterly => format!("{:04}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
            CpuePeriod::Yearly => format!("{:04}", date.year()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpueResult {
    pub species: String,
    pub cpue: f64,
    pub total_catch: f64,
    pub total_effort: f64,
    pub sample_size: usize,
    pub standard_error: f64,
    pub confidence95: ConfidenceInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpuePoint {
    pub period: String,
    pub cpue: f64,
    pub total_catch: f64,
    pub total_effort: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CpueTrend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    pub change_percent: f64,
}

impl CpueTrend {
    fn flat() -> Self {
        Self {
            direction: TrendDirection::Stable,
            slope: 0.0,
            r_squared: 0.0,
            change_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpueSeries {
    pub species: String,
    pub period: CpuePeriod,
    pub points: Vec<CpuePoint>,
    pub trend: CpueTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationCpue {
    pub location: String,
    pub cpue: f64,
    pub total_catch: f64,
    pub total_effort: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationComparison {
    pub species: String,
    /// Sorted by CPUE, highest first.
    pub locations: Vec<LocationCpue>,
    pub highest: Option<LocationCpue>,
    pub lowest: Option<LocationCpue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GearFactor {
    pub gear: String,
    pub mean_cpue: f64,
    pub factor: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardizedCatch {
    pub reference_gear: String,
    /// Mean CPUE of the reference gear; `None` when no record used it.
    pub reference_cpue: Option<f64>,
    pub factors: Vec<GearFactor>,
    /// Input records in their original order with catch rescaled to the reference gear.
    pub records: Vec<CatchRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesCpueSummary {
    pub species: String,
    pub cpue: f64,
    pub trend: TrendDirection,
    pub sample_size: usize,
}

/// Overall CPUE of the records matching `species` (all records when `None`).
pub fn calculate_cpue(records: &[CatchRecord], species: Option<&str>) -> Result<CpueResult> {
    validate_catch_records(records)?;
    let subset = catch_for_species(records, species);
    Ok(cpue_of(&subset, species.unwrap_or(ALL_SPECIES)))
}

pub(crate) fn cpue_of(records: &[&CatchRecord], species: &str) -> CpueResult {
    if records.is_empty() {
        log::debug!("no catch records for species `{species}`; returning zero CPUE");
        return CpueResult {
            species: species.to_string(),
            cpue: 0.0,
            total_catch: 0.0,
            total_effort: 0.0,
            sample_size: 0,
            standard_error: 0.0,
            confidence95: ConfidenceInterval {
                lower: 0.0,
                upper: 0.0,
            },
        };
    }

    let (total_catch, total_effort) = totals(records);
    let cpue = ratio(total_catch, total_effort);

    let per_record: Vec<f64> = records.iter().filter_map(|r| r.cpue()).collect();
    let standard_error = if per_record.is_empty() {
        0.0
    } else {
        (stats::sample_variance(&per_record) / per_record.len() as f64).sqrt()
    };

    CpueResult {
        species: species.to_string(),
        cpue,
        total_catch,
        total_effort,
        sample_size: records.len(),
        standard_error,
        confidence95: ConfidenceInterval {
            lower: (cpue - Z_95 * standard_error).max(0.0),
            upper: cpue + Z_95 * standard_error,
        },
    }
}

fn totals(records: &[&CatchRecord]) -> (f64, f64) {
    records.iter().fold((0.0, 0.0), |(c, e), r| {
        (c + r.catch_amount, e + r.effort)
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// CPUE per calendar period with an OLS trend over the period sequence.
pub fn calculate_cpue_time_series(
    records: &[CatchRecord],
    species: &str,
    period: CpuePeriod,
) -> Result<CpueSeries> {
    validate_catch_records(records)?;
    let subset = catch_for_species(records, Some(species));
    Ok(cpue_series_of(&subset, species, period))
}

pub(crate) fn cpue_series_of(
    records: &[&CatchRecord],
    species: &str,
    period: CpuePeriod,
) -> CpueSeries {
    let mut grouped: BTreeMap<String, Vec<&CatchRecord>> = BTreeMap::new();
    for &record in records {
        grouped.entry(period.key(record.date)).or_default().push(record);
    }

    let points: Vec<CpuePoint> = grouped
        .into_iter()
        .map(|(key, group)| {
            let (total_catch, total_effort) = totals(&group);
            CpuePoint {
                period: key,
                cpue: ratio(total_catch, total_effort),
                total_catch,
                total_effort,
                sample_size: group.len(),
            }
        })
        .collect();

    let values: Vec<f64> = points.iter().map(|p| p.cpue).collect();
    let trend = match LinearFit::fit_index(&values) {
        Some(fit) => {
            let change_percent = stats::trend_change_percent(&fit, &values);
            CpueTrend {
                direction: CPUE_TREND_POLICY.classify(change_percent),
                slope: fit.slope,
                r_squared: fit.r_squared,
                change_percent,
            }
        }
        None => CpueTrend::flat(),
    };

    CpueSeries {
        species: species.to_string(),
        period,
        points,
        trend,
    }
}

/// Ranks locations by CPUE, highest first. Records without a location name are pooled
/// under `Unknown`.
pub fn compare_cpue_by_location(
    records: &[CatchRecord],
    species: &str,
) -> Result<LocationComparison> {
    validate_catch_records(records)?;
    let subset = catch_for_species(records, Some(species));

    let mut grouped: BTreeMap<&str, Vec<&CatchRecord>> = BTreeMap::new();
    for record in subset {
        let name = record
            .location
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .unwrap_or(UNKNOWN_LOCATION);
        grouped.entry(name).or_default().push(record);
    }

    let mut locations: Vec<LocationCpue> = grouped
        .into_iter()
        .map(|(name, group)| {
            let (total_catch, total_effort) = totals(&group);
            LocationCpue {
                location: name.to_string(),
                cpue: ratio(total_catch, total_effort),
                total_catch,
                total_effort,
                sample_size: group.len(),
            }
        })
        .collect();
    // Stable sort keeps alphabetical order among equal CPUE.
    locations.sort_by(|a, b| {
        b.cpue
            .partial_cmp(&a.cpue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(LocationComparison {
        species: species.to_string(),
        highest: locations.first().cloned(),
        lowest: locations.last().cloned(),
        locations,
    })
}

/// Rescales each record's catch by `reference mean CPUE / own gear mean CPUE`.
pub fn standardize_cpue(
    records: &[CatchRecord],
    reference_gear: &str,
) -> Result<StandardizedCatch> {
    validate_catch_records(records)?;
    if reference_gear.trim().is_empty() {
        return Err(InvalidInputError::parameter(
            "reference_gear",
            "must not be empty",
        ));
    }

    // Gears group case-insensitively and are reported in their first-seen spelling.
    let mut per_gear: BTreeMap<String, (&str, Vec<f64>, usize)> = BTreeMap::new();
    for record in records {
        let (_, values, count) = per_gear
            .entry(gear_key(record))
            .or_insert_with(|| (gear_of(record), Vec::new(), 0));
        *count += 1;
        if let Some(cpue) = record.cpue() {
            values.push(cpue);
        }
    }
    let gear_means: BTreeMap<&str, f64> = per_gear
        .iter()
        .map(|(key, (_, values, _))| (key.as_str(), stats::mean(values)))
        .collect();

    let reference_cpue = gear_means
        .get(reference_gear.trim().to_lowercase().as_str())
        .copied();
    if reference_cpue.is_none() {
        log::warn!("reference gear `{reference_gear}` not present; catches left unscaled");
    }

    let factor_for = |key: &str| -> f64 {
        match (reference_cpue, gear_means.get(key)) {
            (Some(reference), Some(&own)) if own > 0.0 => reference / own,
            _ => 1.0,
        }
    };

    let factors = per_gear
        .iter()
        .map(|(key, (label, _, count))| GearFactor {
            gear: label.to_string(),
            mean_cpue: gear_means.get(key.as_str()).copied().unwrap_or(0.0),
            factor: factor_for(key),
            sample_size: *count,
        })
        .collect();

    let scaled = records
        .iter()
        .map(|record| {
            let mut copy = record.clone();
            copy.catch_amount *= factor_for(&gear_key(record));
            copy
        })
        .collect();

    Ok(StandardizedCatch {
        reference_gear: reference_gear.to_string(),
        reference_cpue,
        factors,
        records: scaled,
    })
}

fn gear_of(record: &CatchRecord) -> &str {
    record.gear_type.as_deref().unwrap_or(UNKNOWN_GEAR)
}

fn gear_key(record: &CatchRecord) -> String {
    gear_of(record).trim().to_lowercase()
}

/// Distinct species in first-seen spelling, ordered case-insensitively.
pub(crate) fn distinct_species<'a>(species: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for name in species {
        seen.entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }
    seen.into_values().collect()
}

/// Point CPUE, yearly trend and sample size for every species present.
pub fn get_cpue_summary(records: &[CatchRecord]) -> Result<Vec<SpeciesCpueSummary>> {
    validate_catch_records(records)?;
    let summaries = distinct_species(records.iter().map(|r| r.species.as_str()))
        .into_iter()
        .map(|species| {
            let subset = catch_for_species(records, Some(&species));
            let point = cpue_of(&subset, &species);
            let yearly = cpue_series_of(&subset, &species, CpuePeriod::Yearly);
            SpeciesCpueSummary {
                species,
                cpue: point.cpue,
                trend: yearly.trend.direction,
                sample_size: point.sample_size,
            }
        })
        .collect();
    Ok(summaries)
}
