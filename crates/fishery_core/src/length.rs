//! Length-frequency analysis: distributions, maturity ogive, cohorts, von Bertalanffy growth
//! and the length-weight relationship.

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, InvalidInputError, Result};
use crate::records::{lengths_for_species, validate_length_records, LengthRecord};
use crate::stats::{self, LinearFit};

pub const DEFAULT_BIN_SIZE: f64 = 5.0;
pub const COHORT_BIN_SIZE: f64 = 2.0;
pub const DEFAULT_COHORTS: usize = 3;

/// Width of the length classes used for the maturity ogive.
const MATURITY_CLASS_WIDTH: f64 = 5.0;
const MIN_MATURITY_RECORDS: usize = 10;
const MIN_AGED_RECORDS: usize = 10;
const MIN_DISTINCT_AGES: usize = 3;
const MIN_WEIGHED_RECORDS: usize = 10;
/// Fish shorter than this fraction of the mean length count as recruits.
const RECRUIT_LENGTH_FRACTION: f64 = 0.6;
const LINF_OVER_MAX_LENGTH: f64 = 1.05;
/// Upper bound on the number of length classes a single distribution may span.
pub const MAX_LENGTH_BINS: usize = 100_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LengthBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Exclusive upper edge.
    pub upper: f64,
    pub midpoint: f64,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LengthDistribution {
    pub species: String,
    pub sample_size: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Midpoint of the most populated bin.
    pub mode: f64,
    pub std_dev: f64,
    pub bin_size: f64,
    pub bins: Vec<LengthBin>,
    pub percent_mature: f64,
    /// Length at 50% maturity.
    pub l50: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Cohort {
    /// Nominal age index, 1 for the smallest modal length.
    pub age_index: u32,
    pub modal_length: f64,
    pub count: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CohortAnalysis {
    pub species: String,
    pub sample_size: usize,
    pub mean_length: f64,
    pub cohorts: Vec<Cohort>,
    /// Fraction of the sample below 60% of the mean length.
    pub recruitment_index: f64,
    /// Fraction of the sample that is mature.
    pub spawning_stock_index: f64,
}

/// Von Bertalanffy growth parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GrowthParameters {
    pub linf: f64,
    pub k: f64,
    pub t0: f64,
    /// Growth performance index phi' = log10(K) + 2 log10(Linf).
    pub phi_prime: f64,
    pub r_squared: f64,
    pub sample_size: usize,
    pub age_classes: usize,
}

impl GrowthParameters {
    pub fn length_at_age(&self, age: f64) -> f64 {
        self.linf * (1.0 - (-self.k * (age - self.t0)).exp())
    }
}

/// Allometric relationship W = a * L^b.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LengthWeightRelationship {
    pub species: String,
    pub a: f64,
    pub b: f64,
    pub r_squared: f64,
    /// Fulton's condition factor 100 * mean(W) / mean(L)^3.
    pub condition_factor: f64,
    pub sample_size: usize,
}

impl LengthWeightRelationship {
    pub fn predicted_weight(&self, length: f64) -> f64 {
        self.a * length.powf(self.b)
    }
}

pub fn calculate_length_distribution(
    records: &[LengthRecord],
    species: &str,
    bin_size: f64,
) -> Result<LengthDistribution> {
    validate_length_records(records)?;
    require_positive("bin_size", bin_size)?;
    let subset = lengths_for_species(records, species);
    distribution_of(&subset, species, bin_size)
}

pub(crate) fn distribution_of(
    records: &[&LengthRecord],
    species: &str,
    bin_size: f64,
) -> Result<LengthDistribution> {
    let mut lengths: Vec<f64> = records.iter().map(|r| r.length).collect();
    if lengths.is_empty() {
        log::debug!("no length records for species `{species}`");
        return Ok(LengthDistribution {
            species: species.to_string(),
            sample_size: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            mode: 0.0,
            std_dev: 0.0,
            bin_size,
            bins: Vec::new(),
            percent_mature: 0.0,
            l50: None,
        });
    }
    stats::sort_floats(&mut lengths);

    let bins = build_bins(&lengths, bin_size)?;
    let mode = bins
        .iter()
        .fold(None::<&LengthBin>, |best, bin| match best {
            Some(b) if b.count >= bin.count => Some(b),
            _ => Some(bin),
        })
        .map_or(0.0, |bin| bin.midpoint);

    Ok(LengthDistribution {
        species: species.to_string(),
        sample_size: lengths.len(),
        min: lengths[0],
        max: lengths[lengths.len() - 1],
        mean: stats::mean(&lengths),
        median: stats::median_sorted(&lengths),
        mode,
        std_dev: stats::sample_std_dev(&lengths),
        bin_size,
        bins,
        percent_mature: percent_mature(records),
        l50: estimate_l50(records),
    })
}

/// Contiguous bins of `bin_size` from floor(min) through ceil(max). Expects sorted,
/// non-empty input. Spans needing more than [`MAX_LENGTH_BINS`] classes are rejected.
fn build_bins(sorted: &[f64], bin_size: f64) -> Result<Vec<LengthBin>> {
    let start = sorted[0].floor();
    let end = sorted[sorted.len() - 1].ceil();
    let classes = ((end - start) / bin_size + 1e-9).floor() + 1.0;
    if !classes.is_finite() || classes > MAX_LENGTH_BINS as f64 {
        return Err(InvalidInputError::parameter(
            "bin_size",
            format!(
                "lengths {start}..{end} need more than {MAX_LENGTH_BINS} bins of {bin_size} cm"
            ),
        ));
    }
    let count = classes as usize;

    let mut counts = vec![0usize; count];
    for &length in sorted {
        let index = (((length - start) / bin_size).floor() as usize).min(count - 1);
        counts[index] += 1;
    }

    let total = sorted.len() as f64;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = start + i as f64 * bin_size;
            LengthBin {
                lower,
                upper: lower + bin_size,
                midpoint: lower + bin_size / 2.0,
                count,
                frequency: count as f64 / total,
            }
        })
        .collect())
}

fn percent_mature(records: &[&LengthRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let mature = records.iter().filter(|r| r.is_mature()).count();
    mature as f64 / records.len() as f64 * 100.0
}

/// Interpolates the length where the mature proportion first crosses 0.5 between two
/// adjacent 5 cm classes.
fn estimate_l50(records: &[&LengthRecord]) -> Option<f64> {
    let staged: Vec<&LengthRecord> = records
        .iter()
        .copied()
        .filter(|r| r.maturity.is_some())
        .collect();
    if staged.len() < MIN_MATURITY_RECORDS {
        return None;
    }

    let mut classes: std::collections::BTreeMap<i64, (usize, usize)> =
        std::collections::BTreeMap::new();
    for record in staged {
        let class = (record.length / MATURITY_CLASS_WIDTH).floor() as i64;
        let entry = classes.entry(class).or_default();
        entry.1 += 1;
        if record.is_mature() {
            entry.0 += 1;
        }
    }

    let ogive: Vec<(f64, f64)> = classes
        .into_iter()
        .map(|(class, (mature, total))| {
            let midpoint = (class as f64 + 0.5) * MATURITY_CLASS_WIDTH;
            (midpoint, mature as f64 / total as f64)
        })
        .collect();

    ogive.windows(2).find_map(|pair| {
        let (l1, p1) = pair[0];
        let (l2, p2) = pair[1];
        if p1 < 0.5 && p2 >= 0.5 {
            Some(l1 + (0.5 - p1) * (l2 - l1) / (p2 - p1))
        } else {
            None
        }
    })
}

/// Treats local maxima of a 2 cm length-frequency as cohorts. The age index is nominal:
/// peaks are numbered by increasing length rather than inverted from a growth curve.
pub fn identify_cohorts(
    records: &[LengthRecord],
    species: &str,
    num_cohorts: usize,
) -> Result<CohortAnalysis> {
    validate_length_records(records)?;
    if num_cohorts == 0 {
        return Err(InvalidInputError::parameter(
            "num_cohorts",
            "must be at least 1",
        ));
    }
    let subset = lengths_for_species(records, species);
    cohorts_of(&subset, species, num_cohorts)
}

pub(crate) fn cohorts_of(
    records: &[&LengthRecord],
    species: &str,
    num_cohorts: usize,
) -> Result<CohortAnalysis> {
    let distribution = distribution_of(records, species, COHORT_BIN_SIZE)?;
    let n = distribution.sample_size;
    let bins = &distribution.bins;

    // Out-of-range neighbours count as empty, so edge bins can be peaks.
    let count_at = |i: isize| -> usize {
        if i < 0 {
            0
        } else {
            bins.get(i as usize).map_or(0, |b| b.count)
        }
    };
    let mut peaks: Vec<&LengthBin> = bins
        .iter()
        .enumerate()
        .filter(|(i, bin)| {
            let i = *i as isize;
            bin.count > count_at(i - 1) && bin.count > count_at(i + 1)
        })
        .map(|(_, bin)| bin)
        .collect();
    peaks.sort_by(|a, b| b.count.cmp(&a.count));
    peaks.truncate(num_cohorts);
    peaks.sort_by(|a, b| {
        a.midpoint
            .partial_cmp(&b.midpoint)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cohorts = peaks
        .into_iter()
        .enumerate()
        .map(|(i, bin)| Cohort {
            age_index: i as u32 + 1,
            modal_length: bin.midpoint,
            count: bin.count,
            proportion: bin.frequency,
        })
        .collect();

    let recruit_cutoff = distribution.mean * RECRUIT_LENGTH_FRACTION;
    let recruitment_index = if n == 0 {
        0.0
    } else {
        records.iter().filter(|r| r.length < recruit_cutoff).count() as f64 / n as f64
    };

    Ok(CohortAnalysis {
        species: species.to_string(),
        sample_size: n,
        mean_length: distribution.mean,
        cohorts,
        recruitment_index,
        spawning_stock_index: distribution.percent_mature / 100.0,
    })
}

/// Fits Linf, K and t0 from aged individuals. `Linf` is fixed at 1.05 times the largest
/// aged length; K and t0 come from the linearized curve
/// `ln(1 - L/Linf) = K t0 - K age` fitted to mean length per age.
pub fn estimate_growth_parameters(records: &[LengthRecord]) -> Result<Option<GrowthParameters>> {
    validate_length_records(records)?;

    let mut aged: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| r.age.map(|age| (age, r.length)))
        .collect();
    if aged.len() < MIN_AGED_RECORDS {
        log::debug!(
            "growth fit needs {MIN_AGED_RECORDS} aged records, got {}",
            aged.len()
        );
        return Ok(None);
    }
    aged.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut ages = Vec::new();
    let mut mean_lengths = Vec::new();
    for group in aged.chunk_by(|a, b| a.0 == b.0) {
        let lengths: Vec<f64> = group.iter().map(|(_, l)| *l).collect();
        ages.push(group[0].0);
        mean_lengths.push(stats::mean(&lengths));
    }
    if ages.len() < MIN_DISTINCT_AGES {
        log::debug!(
            "growth fit needs {MIN_DISTINCT_AGES} distinct ages, got {}",
            ages.len()
        );
        return Ok(None);
    }

    let max_length = aged.iter().map(|(_, l)| *l).fold(0.0, f64::max);
    let linf = LINF_OVER_MAX_LENGTH * max_length;
    if linf <= 0.0 {
        return Ok(None);
    }
    let transformed: Vec<f64> = mean_lengths
        .iter()
        .map(|l| (1.0 - l / linf).ln())
        .collect();

    let Some(fit) = LinearFit::fit(&ages, &transformed) else {
        return Ok(None);
    };
    let k = -fit.slope;
    if !(k > 0.0) || !k.is_finite() {
        log::debug!("growth fit produced non-positive K ({k})");
        return Ok(None);
    }
    let t0 = fit.intercept / k;

    Ok(Some(GrowthParameters {
        linf,
        k,
        t0,
        phi_prime: k.log10() + 2.0 * linf.log10(),
        r_squared: fit.r_squared,
        sample_size: aged.len(),
        age_classes: ages.len(),
    }))
}

/// Fits `ln W = ln a + b ln L` over records with positive length and weight.
pub fn calculate_length_weight(
    records: &[LengthRecord],
    species: &str,
) -> Result<Option<LengthWeightRelationship>> {
    validate_length_records(records)?;

    let pairs: Vec<(f64, f64)> = lengths_for_species(records, species)
        .into_iter()
        .filter_map(|r| match r.weight {
            Some(w) if w > 0.0 && r.length > 0.0 => Some((r.length, w)),
            _ => None,
        })
        .collect();
    if pairs.len() < MIN_WEIGHED_RECORDS {
        log::debug!(
            "length-weight fit for `{species}` needs {MIN_WEIGHED_RECORDS} weighed records, got {}",
            pairs.len()
        );
        return Ok(None);
    }

    let log_lengths: Vec<f64> = pairs.iter().map(|(l, _)| l.ln()).collect();
    let log_weights: Vec<f64> = pairs.iter().map(|(_, w)| w.ln()).collect();
    let Some(fit) = LinearFit::fit(&log_lengths, &log_weights) else {
        return Ok(None);
    };

    let lengths: Vec<f64> = pairs.iter().map(|(l, _)| *l).collect();
    let weights: Vec<f64> = pairs.iter().map(|(_, w)| *w).collect();
    let mean_length = stats::mean(&lengths);

    Ok(Some(LengthWeightRelationship {
        species: species.to_string(),
        a: fit.intercept.exp(),
        b: fit.slope,
        r_squared: fit.r_squared,
        condition_factor: 100.0 * stats::mean(&weights) / mean_length.powi(3),
        sample_size: pairs.len(),
    }))
}
