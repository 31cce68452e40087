//! Stock assessment: catch-curve mortality, exploitation status, sustainability scoring and
//! recruitment analysis.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::cpue::{cpue_of, cpue_series_of, distinct_species, ConfidenceInterval, CpuePeriod};
use crate::error::{require_positive, Result};
use crate::length::{cohorts_of, distribution_of, DEFAULT_BIN_SIZE, DEFAULT_COHORTS};
use crate::policy::TrendDirection;
use crate::records::{
    catch_for_species, lengths_for_species, validate_catch_records, validate_length_records,
    CatchRecord, LengthRecord,
};
use crate::stats::{self, LinearFit};

/// Added to M when the catch curve has too few points to estimate Z.
const CATCH_CURVE_FALLBACK_F: f64 = 0.5;
const MIN_CATCH_CURVE_POINTS: usize = 3;
/// Heuristic half-width of the reported Z interval, as a fraction of Z.
const Z_INTERVAL_FRACTION: f64 = 0.2;
const YOUNG_OF_YEAR_FRACTION: f64 = 0.5;
const RECRUITMENT_WINDOW_YEARS: usize = 3;
const RECRUITMENT_TREND_BAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MortalityMethod {
    Pauly,
    Hoenig,
    Then,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MortalityOptions {
    pub method: MortalityMethod,
    pub linf: f64,
    pub k: f64,
    /// Mean water temperature in °C, used by Pauly's formula.
    pub temperature: f64,
    /// Maximum observed age in years, used by Hoenig and Then.
    pub max_age: f64,
}

impl Default for MortalityOptions {
    fn default() -> Self {
        Self {
            method: MortalityMethod::Pauly,
            linf: 100.0,
            k: 0.2,
            temperature: 25.0,
            max_age: 15.0,
        }
    }
}

impl MortalityOptions {
    fn validate(&self) -> Result<()> {
        require_positive("linf", self.linf)?;
        require_positive("k", self.k)?;
        require_positive("max_age", self.max_age)?;
        if self.method == MortalityMethod::Pauly {
            require_positive("temperature", self.temperature)?;
        }
        Ok(())
    }

    /// Natural mortality M from the selected empirical formula.
    pub fn natural_mortality(&self) -> f64 {
        match self.method {
            MortalityMethod::Pauly => 10f64.powf(
                -0.0066 - 0.279 * self.linf.log10()
                    + 0.6543 * self.k.log10()
                    + 0.4634 * self.temperature.log10(),
            ),
            MortalityMethod::Hoenig => 4.22 / self.max_age,
            MortalityMethod::Then => 4.118 * self.max_age.powf(-0.73),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MortalityStatus {
    Underexploited,
    Optimal,
    Overexploited,
}

impl MortalityStatus {
    pub fn from_exploitation_rate(e: f64) -> Self {
        if e < 0.3 {
            MortalityStatus::Underexploited
        } else if e < 0.5 {
            MortalityStatus::Optimal
        } else {
            MortalityStatus::Overexploited
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MortalityEstimate {
    pub species: String,
    pub method: MortalityMethod,
    pub natural_mortality: f64,
    pub fishing_mortality: f64,
    pub total_mortality: f64,
    pub exploitation_rate: f64,
    pub status: MortalityStatus,
    /// Fixed ±20% band around Z; not a statistical interval.
    pub z_confidence: ConfidenceInterval,
    pub catch_curve_points: usize,
    /// `None` when Z fell back to M + 0.5.
    pub catch_curve_r_squared: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExploitationLevel {
    Low,
    Moderate,
    High,
    Overfishing,
}

impl ExploitationLevel {
    pub fn from_exploitation_rate(e: f64) -> Self {
        if e < 0.25 {
            ExploitationLevel::Low
        } else if e < 0.4 {
            ExploitationLevel::Moderate
        } else if e < 0.5 {
            ExploitationLevel::High
        } else {
            ExploitationLevel::Overfishing
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockHealth {
    Healthy,
    Moderate,
    Concern,
    Critical,
}

impl StockHealth {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            StockHealth::Healthy
        } else if score >= 50.0 {
            StockHealth::Moderate
        } else if score >= 30.0 {
            StockHealth::Concern
        } else {
            StockHealth::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockStatus {
    pub species: String,
    pub year: Option<i32>,
    pub current_cpue: f64,
    pub biomass_trend: TrendDirection,
    pub mortality: MortalityEstimate,
    pub exploitation_level: ExploitationLevel,
    pub recruitment_index: f64,
    pub spawning_stock_index: f64,
    /// 0 to 100.
    pub sustainability_score: f64,
    pub health: StockHealth,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecruitmentTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YearlyRecruitment {
    pub year: i32,
    pub recruitment_index: f64,
    pub young_of_year: usize,
    pub cpue: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecruitmentAnalysis {
    pub species: String,
    pub years: Vec<YearlyRecruitment>,
    pub mean_recruitment_index: f64,
    pub trend: RecruitmentTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiSpeciesStockSummary {
    pub stocks: Vec<StockStatus>,
    pub overfishing_count: usize,
    pub mean_sustainability_score: f64,
}

pub fn estimate_mortality(
    records: &[LengthRecord],
    species: &str,
    options: &MortalityOptions,
) -> Result<MortalityEstimate> {
    validate_length_records(records)?;
    options.validate()?;
    let subset = lengths_for_species(records, species);
    mortality_of(&subset, species, options)
}

pub(crate) fn mortality_of(
    records: &[&LengthRecord],
    species: &str,
    options: &MortalityOptions,
) -> Result<MortalityEstimate> {
    let m = options.natural_mortality();
    let points = catch_curve_points(records, species, options)?;

    let fit = if points.len() >= MIN_CATCH_CURVE_POINTS {
        let ages: Vec<f64> = points.iter().map(|(t, _)| *t).collect();
        let log_counts: Vec<f64> = points.iter().map(|(_, c)| *c).collect();
        LinearFit::fit(&ages, &log_counts)
    } else {
        None
    };
    let (z, r_squared) = match fit {
        Some(fit) => (fit.slope.abs(), Some(fit.r_squared)),
        None => {
            log::debug!(
                "catch curve for `{species}` has {} usable points; Z falls back to M + {CATCH_CURVE_FALLBACK_F}",
                points.len()
            );
            (m + CATCH_CURVE_FALLBACK_F, None)
        }
    };

    let f = (z - m).max(0.0);
    let e = if z > 0.0 { (f / z).clamp(0.0, 1.0) } else { 0.0 };

    Ok(MortalityEstimate {
        species: species.to_string(),
        method: options.method,
        natural_mortality: m,
        fishing_mortality: f,
        total_mortality: z,
        exploitation_rate: e,
        status: MortalityStatus::from_exploitation_rate(e),
        z_confidence: ConfidenceInterval {
            lower: z * (1.0 - Z_INTERVAL_FRACTION),
            upper: z * (1.0 + Z_INTERVAL_FRACTION),
        },
        catch_curve_points: points.len(),
        catch_curve_r_squared: r_squared,
    })
}

/// Length-converted catch curve: `(relative age, ln count)` for every non-empty bin on the
/// descending limb, from the modal bin onward, whose midpoint is below Linf.
fn catch_curve_points(
    records: &[&LengthRecord],
    species: &str,
    options: &MortalityOptions,
) -> Result<Vec<(f64, f64)>> {
    let distribution = distribution_of(records, species, DEFAULT_BIN_SIZE)?;
    let Some(modal) = distribution
        .bins
        .iter()
        .enumerate()
        .fold(None::<(usize, usize)>, |best, (i, bin)| match best {
            Some((_, count)) if count >= bin.count => best,
            _ => Some((i, bin.count)),
        })
        .map(|(i, _)| i)
    else {
        return Ok(Vec::new());
    };

    Ok(distribution.bins[modal..]
        .iter()
        .filter(|bin| bin.count > 0 && bin.midpoint < options.linf)
        .map(|bin| {
            let age = -(1.0 / options.k) * (1.0 - bin.midpoint / options.linf).ln();
            (age, (bin.count as f64).ln())
        })
        .collect())
}

/// Additive sustainability score, clamped to 0..=100.
pub fn sustainability_score(
    recruitment_index: f64,
    spawning_stock_index: f64,
    mortality_status: MortalityStatus,
    biomass_trend: TrendDirection,
    exploitation: ExploitationLevel,
) -> f64 {
    let mut score = 50.0;
    if recruitment_index > 0.3 {
        score += 15.0;
    }
    if spawning_stock_index > 0.4 {
        score += 15.0;
    }
    if mortality_status == MortalityStatus::Optimal {
        score += 10.0;
    }
    match biomass_trend {
        TrendDirection::Increasing => score += 10.0,
        TrendDirection::Decreasing => score -= 15.0,
        TrendDirection::Stable => {}
    }
    if exploitation == ExploitationLevel::Overfishing {
        score -= 30.0;
    }
    if recruitment_index < 0.1 {
        score -= 20.0;
    }
    f64::clamp(score, 0.0, 100.0)
}

fn recommendations(
    exploitation: ExploitationLevel,
    recruitment_index: f64,
    spawning_stock_index: f64,
    biomass_trend: TrendDirection,
) -> Vec<String> {
    let mut advice = Vec::new();
    if exploitation == ExploitationLevel::Overfishing {
        advice.push(
            "Reduce fishing effort: exploitation rate exceeds the 0.5 reference point".to_string(),
        );
    }
    if recruitment_index < 0.2 {
        advice.push(
            "Consider a seasonal closure during the spawning period to protect recruitment"
                .to_string(),
        );
    }
    if spawning_stock_index < 0.3 {
        advice.push("Raise the minimum landing size to rebuild the spawning stock".to_string());
    }
    if biomass_trend == TrendDirection::Decreasing {
        advice.push(
            "Abundance index is declining: tighten monitoring of catch and effort".to_string(),
        );
    }
    if exploitation == ExploitationLevel::Low && biomass_trend != TrendDirection::Decreasing {
        advice.push(
            "Stock is lightly exploited: effort could increase cautiously under monitoring"
                .to_string(),
        );
    }
    if advice.is_empty() {
        advice.push("Maintain current management measures and continue monitoring".to_string());
    }
    advice
}

/// Combines the yearly CPUE trend, mortality estimate and cohort structure into a single
/// status. With `year`, catch records after that year and length records from other years
/// are ignored.
pub fn assess_stock_status(
    catch_records: &[CatchRecord],
    length_records: &[LengthRecord],
    species: &str,
    year: Option<i32>,
) -> Result<StockStatus> {
    validate_catch_records(catch_records)?;
    validate_length_records(length_records)?;
    status_of(catch_records, length_records, species, year)
}

fn status_of(
    catch_records: &[CatchRecord],
    length_records: &[LengthRecord],
    species: &str,
    year: Option<i32>,
) -> Result<StockStatus> {
    let catches: Vec<&CatchRecord> = catch_for_species(catch_records, Some(species))
        .into_iter()
        .filter(|r| year.map_or(true, |y| r.date.year() <= y))
        .collect();
    let lengths: Vec<&LengthRecord> = lengths_for_species(length_records, species)
        .into_iter()
        .filter(|r| year.map_or(true, |y| r.date.year() == y))
        .collect();

    let yearly = cpue_series_of(&catches, species, CpuePeriod::Yearly);
    let current_cpue = yearly.points.last().map_or(0.0, |p| p.cpue);
    let biomass_trend = yearly.trend.direction;

    let mortality = mortality_of(&lengths, species, &MortalityOptions::default())?;
    let cohorts = cohorts_of(&lengths, species, DEFAULT_COHORTS)?;
    let exploitation_level = ExploitationLevel::from_exploitation_rate(mortality.exploitation_rate);

    let sustainability_score = sustainability_score(
        cohorts.recruitment_index,
        cohorts.spawning_stock_index,
        mortality.status,
        biomass_trend,
        exploitation_level,
    );

    Ok(StockStatus {
        species: species.to_string(),
        year,
        current_cpue,
        biomass_trend,
        exploitation_level,
        recruitment_index: cohorts.recruitment_index,
        spawning_stock_index: cohorts.spawning_stock_index,
        sustainability_score,
        health: StockHealth::from_score(sustainability_score),
        recommendations: recommendations(
            exploitation_level,
            cohorts.recruitment_index,
            cohorts.spawning_stock_index,
            biomass_trend,
        ),
        mortality,
    })
}

/// Per-year recruitment index, young-of-year count and CPUE, with a trend comparing the
/// mean index of the latest three years against the three before them.
pub fn analyze_recruitment(
    catch_records: &[CatchRecord],
    length_records: &[LengthRecord],
    species: &str,
) -> Result<RecruitmentAnalysis> {
    validate_catch_records(catch_records)?;
    validate_length_records(length_records)?;

    let mut by_year: BTreeMap<i32, Vec<&LengthRecord>> = BTreeMap::new();
    for record in lengths_for_species(length_records, species) {
        by_year.entry(record.date.year()).or_default().push(record);
    }
    let catches = catch_for_species(catch_records, Some(species));

    let years: Vec<YearlyRecruitment> = by_year
        .into_iter()
        .map(|(year, group)| {
            let cohorts = cohorts_of(&group, species, DEFAULT_COHORTS)?;
            let cutoff = cohorts.mean_length * YOUNG_OF_YEAR_FRACTION;
            let year_catches: Vec<&CatchRecord> = catches
                .iter()
                .copied()
                .filter(|r| r.date.year() == year)
                .collect();
            Ok(YearlyRecruitment {
                year,
                recruitment_index: cohorts.recruitment_index,
                young_of_year: group.iter().filter(|r| r.length < cutoff).count(),
                cpue: cpue_of(&year_catches, species).cpue,
                sample_size: group.len(),
            })
        })
        .collect::<Result<_>>()?;

    let indices: Vec<f64> = years.iter().map(|y| y.recruitment_index).collect();
    Ok(RecruitmentAnalysis {
        species: species.to_string(),
        mean_recruitment_index: stats::mean(&indices),
        trend: recruitment_trend(&indices),
        years,
    })
}

fn recruitment_trend(indices: &[f64]) -> RecruitmentTrend {
    let n = indices.len();
    let recent_start = n.saturating_sub(RECRUITMENT_WINDOW_YEARS);
    let previous_start = recent_start.saturating_sub(RECRUITMENT_WINDOW_YEARS);
    let recent = &indices[recent_start..];
    let previous = &indices[previous_start..recent_start];
    if recent.is_empty() || previous.is_empty() {
        return RecruitmentTrend::Stable;
    }

    let recent_mean = stats::mean(recent);
    let previous_mean = stats::mean(previous);
    if previous_mean <= 0.0 {
        return if recent_mean > 0.0 {
            RecruitmentTrend::Improving
        } else {
            RecruitmentTrend::Stable
        };
    }
    let change = (recent_mean - previous_mean) / previous_mean;
    if change > RECRUITMENT_TREND_BAND {
        RecruitmentTrend::Improving
    } else if change < -RECRUITMENT_TREND_BAND {
        RecruitmentTrend::Declining
    } else {
        RecruitmentTrend::Stable
    }
}

/// Stock status of every species present in the catch records.
pub fn get_multi_species_stock_summary(
    catch_records: &[CatchRecord],
    length_records: &[LengthRecord],
) -> Result<MultiSpeciesStockSummary> {
    validate_catch_records(catch_records)?;
    validate_length_records(length_records)?;

    let stocks: Vec<StockStatus> =
        distinct_species(catch_records.iter().map(|r| r.species.as_str()))
            .iter()
            .map(|species| status_of(catch_records, length_records, species, None))
            .collect::<Result<_>>()?;
    let scores: Vec<f64> = stocks.iter().map(|s| s.sustainability_score).collect();

    Ok(MultiSpeciesStockSummary {
        overfishing_count: stocks
            .iter()
            .filter(|s| s.exploitation_level == ExploitationLevel::Overfishing)
            .count(),
        mean_sustainability_score: stats::mean(&scores),
        stocks,
    })
}
