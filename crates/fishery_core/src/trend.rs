//! Abundance trend analysis and forecasting over monthly series, plus correlation of
//! abundance with environmental series.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, Result};
use crate::policy::{TrendDirection, ABUNDANCE_TREND_POLICY};
use crate::records::{
    catch_for_species, month_start, validate_catch_records, validate_series, CatchRecord,
    DateValue,
};
use crate::stats::{self, LinearFit};

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const DEFAULT_MAX_LAG: u32 = 6;
/// Longest environmental lag, ten years of monthly steps, a correlation may scan.
pub const MAX_LAG_MONTHS: u32 = 120;

const MIN_TREND_POINTS: usize = 2;
const MIN_SEASONALITY_POINTS: usize = 24;
/// Seasonality is reported when the monthly-mean range exceeds this fraction of the mean.
const SEASONALITY_AMPLITUDE_FRACTION: f64 = 0.3;
const ANOMALY_Z_THRESHOLD: f64 = 2.0;
const MIN_FORECAST_POINTS: usize = 6;
const MIN_CORRELATION_POINTS: usize = 10;
const NO_CORRELATION_BELOW: f64 = 0.2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendParameter {
    Cpue,
    Catch,
    Effort,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub value: f64,
    pub z_score: f64,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlyMean {
    /// Calendar month, 1 to 12.
    pub month: u32,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seasonality {
    pub detected: bool,
    pub peak_month: u32,
    pub trough_month: u32,
    /// Range of the calendar-month means.
    pub amplitude: f64,
    pub monthly_means: Vec<MonthlyMean>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendAnalysis {
    pub species: String,
    pub parameter: TrendParameter,
    pub direction: TrendDirection,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub change_percent: f64,
    pub series: Vec<DateValue>,
    /// `None` below 24 monthly points.
    pub seasonality: Option<Seasonality>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower95: f64,
    pub upper95: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub species: String,
    pub method: ForecastMethod,
    pub horizon_months: u32,
    pub history_points: usize,
    /// Residual standard error of the linear fit to the history.
    pub rmse: f64,
    pub points: Vec<ForecastPoint>,
    /// Set when no forecast could be produced.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    None,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LagCorrelation {
    /// Months by which the environmental series leads abundance.
    pub lag_months: u32,
    pub correlation: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OceanCorrelation {
    pub species: String,
    pub parameter: String,
    /// Pearson r at lag zero.
    pub correlation: f64,
    pub sample_size: usize,
    /// Coarse bucket from |r|, not a significance test.
    pub p_value: f64,
    pub direction: CorrelationDirection,
    pub interpretation: String,
    pub lag_scan: Vec<LagCorrelation>,
    pub best_lag: Option<u32>,
}

/// Monthly series of CPUE, total catch or total effort, dated on the first of each month.
pub fn monthly_series(
    records: &[CatchRecord],
    species: &str,
    parameter: TrendParameter,
) -> Result<Vec<DateValue>> {
    validate_catch_records(records)?;
    Ok(monthly_series_of(
        &catch_for_species(records, Some(species)),
        parameter,
    ))
}

fn monthly_series_of(records: &[&CatchRecord], parameter: TrendParameter) -> Vec<DateValue> {
    let mut months: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = months.entry(month_start(record.date)).or_default();
        entry.0 += record.catch_amount;
        entry.1 += record.effort;
    }
    months
        .into_iter()
        .map(|(date, (catch_total, effort_total))| DateValue {
            date,
            value: match parameter {
                TrendParameter::Cpue if effort_total > 0.0 => catch_total / effort_total,
                TrendParameter::Cpue => 0.0,
                TrendParameter::Catch => catch_total,
                TrendParameter::Effort => effort_total,
            },
        })
        .collect()
}

pub fn analyze_trend(
    records: &[CatchRecord],
    species: &str,
    parameter: TrendParameter,
) -> Result<TrendAnalysis> {
    let series = monthly_series(records, species, parameter)?;
    Ok(analyze_series(species, parameter, series))
}

/// Trend, seasonality and anomalies of an already aggregated monthly series.
pub fn analyze_series(
    species: &str,
    parameter: TrendParameter,
    series: Vec<DateValue>,
) -> TrendAnalysis {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();

    let fit = if values.len() >= MIN_TREND_POINTS {
        LinearFit::fit_index(&values)
    } else {
        None
    };
    let (slope, intercept, r_squared, change_percent) = match &fit {
        Some(fit) => (
            fit.slope,
            fit.intercept,
            fit.r_squared,
            stats::trend_change_percent(fit, &values),
        ),
        None => {
            log::debug!(
                "trend for `{species}` needs {MIN_TREND_POINTS} monthly points, got {}",
                values.len()
            );
            (0.0, stats::mean(&values), 0.0, 0.0)
        }
    };

    TrendAnalysis {
        species: species.to_string(),
        parameter,
        direction: ABUNDANCE_TREND_POLICY.classify(change_percent),
        slope,
        intercept,
        r_squared,
        change_percent,
        seasonality: seasonality_of(&series),
        anomalies: anomalies_of(&series),
        series,
    }
}

fn seasonality_of(series: &[DateValue]) -> Option<Seasonality> {
    if series.len() < MIN_SEASONALITY_POINTS {
        return None;
    }
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for point in series {
        by_month.entry(point.date.month()).or_default().push(point.value);
    }
    let monthly_means: Vec<MonthlyMean> = by_month
        .into_iter()
        .map(|(month, values)| MonthlyMean {
            month,
            mean: stats::mean(&values),
        })
        .collect();

    let mut peak = monthly_means[0];
    let mut trough = monthly_means[0];
    for m in &monthly_means[1..] {
        if m.mean > peak.mean {
            peak = *m;
        }
        if m.mean < trough.mean {
            trough = *m;
        }
    }

    let overall = stats::mean(&series.iter().map(|p| p.value).collect::<Vec<_>>());
    let amplitude = peak.mean - trough.mean;
    Some(Seasonality {
        detected: amplitude > SEASONALITY_AMPLITUDE_FRACTION * overall,
        peak_month: peak.month,
        trough_month: trough.month,
        amplitude,
        monthly_means,
    })
}

fn anomalies_of(series: &[DateValue]) -> Vec<Anomaly> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let mean = stats::mean(&values);
    let std_dev = stats::population_std_dev(&values);
    if std_dev == 0.0 {
        return Vec::new();
    }
    series
        .iter()
        .filter_map(|point| {
            let z_score = (point.value - mean) / std_dev;
            if z_score.abs() <= ANOMALY_Z_THRESHOLD {
                return None;
            }
            Some(Anomaly {
                date: point.date,
                value: point.value,
                z_score,
                kind: if z_score > 0.0 {
                    AnomalyKind::High
                } else {
                    AnomalyKind::Low
                },
            })
        })
        .collect()
}

/// Projects monthly CPUE `horizon_months` ahead. Predictions are floored at zero and the
/// 95% band follows the OLS prediction interval, so it widens with distance.
pub fn forecast_abundance(
    records: &[CatchRecord],
    species: &str,
    horizon_months: u32,
    method: ForecastMethod,
) -> Result<Forecast> {
    if horizon_months == 0 {
        return Err(InvalidInputError::parameter(
            "horizon_months",
            "must be at least 1",
        ));
    }
    let series = monthly_series(records, species, TrendParameter::Cpue)?;
    Ok(forecast_series(species, &series, horizon_months, method))
}

pub fn forecast_series(
    species: &str,
    series: &[DateValue],
    horizon_months: u32,
    method: ForecastMethod,
) -> Forecast {
    let mut forecast = Forecast {
        species: species.to_string(),
        method,
        horizon_months,
        history_points: series.len(),
        rmse: 0.0,
        points: Vec::new(),
        message: None,
    };

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let fit = if values.len() >= MIN_FORECAST_POINTS {
        LinearFit::fit_index(&values)
    } else {
        None
    };
    let (Some(fit), Some(last)) = (fit, series.last()) else {
        log::debug!(
            "forecast for `{species}` needs {MIN_FORECAST_POINTS} monthly points, got {}",
            values.len()
        );
        forecast.message = Some(format!(
            "Insufficient history: {} monthly points, at least {MIN_FORECAST_POINTS} required",
            values.len()
        ));
        return forecast;
    };
    forecast.rmse = fit.rmse;

    let n = values.len();
    let first_value = values[0];
    let last_value = values[n - 1];
    let growth_rate = if first_value > 0.0 && last_value > 0.0 {
        (last_value / first_value).powf(1.0 / (n - 1) as f64) - 1.0
    } else {
        0.0
    };

    for h in 1..=horizon_months {
        let Some(date) = last.date.checked_add_months(Months::new(h)) else {
            break;
        };
        let x = (n - 1) as f64 + h as f64;
        let raw = match method {
            ForecastMethod::Linear => fit.predict(x),
            ForecastMethod::Exponential => last_value * (1.0 + growth_rate).powi(h as i32),
        };
        // Runaway compounding saturates rather than reading as a collapse.
        let predicted = if raw.is_nan() {
            0.0
        } else {
            raw.clamp(0.0, f64::MAX)
        };
        let margin = fit.prediction_margin(x);
        // A band that would dip below zero is shifted up so its width stays 2 * margin.
        let (lower95, upper95) = if predicted - margin < 0.0 {
            (0.0, 2.0 * margin)
        } else {
            (predicted - margin, predicted + margin)
        };
        forecast.points.push(ForecastPoint {
            date,
            predicted,
            lower95,
            upper95: upper95.min(f64::MAX),
        });
    }
    forecast
}

/// Correlates an abundance series with an environmental series joined on exact dates.
/// The lag-zero coefficient is the headline result; `lag_scan` repeats the join with the
/// environmental series shifted later by 0..=max_lag months; `max_lag` may not exceed
/// [`MAX_LAG_MONTHS`].
pub fn correlate_with_ocean_parameters(
    abundance: &[DateValue],
    ocean: &[DateValue],
    species: &str,
    parameter_name: &str,
    max_lag: u32,
) -> Result<OceanCorrelation> {
    validate_series(abundance)?;
    validate_series(ocean)?;
    if max_lag > MAX_LAG_MONTHS {
        return Err(InvalidInputError::parameter(
            "max_lag",
            format!("must be at most {MAX_LAG_MONTHS} months, got {max_lag}"),
        ));
    }

    let mut environment: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in ocean {
        environment.entry(point.date).or_insert(point.value);
    }

    let lag_scan: Vec<LagCorrelation> = (0..=max_lag)
        .map(|lag| {
            let (xs, ys) = joined(abundance, &environment, lag);
            LagCorrelation {
                lag_months: lag,
                correlation: if xs.len() >= MIN_CORRELATION_POINTS {
                    stats::pearson(&xs, &ys)
                } else {
                    0.0
                },
                sample_size: xs.len(),
            }
        })
        .collect();
    let best_lag = lag_scan
        .iter()
        .filter(|l| l.sample_size >= MIN_CORRELATION_POINTS)
        .fold(None::<&LagCorrelation>, |best, l| match best {
            Some(b) if b.correlation.abs() >= l.correlation.abs() => Some(b),
            _ => Some(l),
        })
        .map(|l| l.lag_months);

    let primary = lag_scan[0];
    let mut result = OceanCorrelation {
        species: species.to_string(),
        parameter: parameter_name.to_string(),
        correlation: 0.0,
        sample_size: primary.sample_size,
        p_value: 1.0,
        direction: CorrelationDirection::None,
        interpretation: String::new(),
        lag_scan,
        best_lag,
    };

    if primary.sample_size < MIN_CORRELATION_POINTS {
        log::debug!(
            "correlation of `{species}` with {parameter_name} has {} joined points",
            primary.sample_size
        );
        result.interpretation = format!(
            "Insufficient overlapping data: {} joined points, at least {MIN_CORRELATION_POINTS} required",
            primary.sample_size
        );
        return Ok(result);
    }

    let r = primary.correlation;
    result.correlation = r;
    result.p_value = p_value_bucket(r);
    result.direction = if r.abs() < NO_CORRELATION_BELOW {
        CorrelationDirection::None
    } else if r > 0.0 {
        CorrelationDirection::Positive
    } else {
        CorrelationDirection::Negative
    };
    result.interpretation = interpret(r, result.direction, species, parameter_name);
    Ok(result)
}

fn joined(
    abundance: &[DateValue],
    environment: &BTreeMap<NaiveDate, f64>,
    lag: u32,
) -> (Vec<f64>, Vec<f64>) {
    abundance
        .iter()
        .filter_map(|point| {
            let source = point.date.checked_sub_months(Months::new(lag))?;
            environment.get(&source).map(|env| (point.value, *env))
        })
        .unzip()
}

fn p_value_bucket(r: f64) -> f64 {
    let magnitude = r.abs();
    if magnitude >= 0.7 {
        0.001
    } else if magnitude >= 0.5 {
        0.01
    } else if magnitude >= 0.3 {
        0.05
    } else {
        0.5
    }
}

fn interpret(r: f64, direction: CorrelationDirection, species: &str, parameter: &str) -> String {
    let strength = match r.abs() {
        m if m >= 0.7 => "strong",
        m if m >= 0.4 => "moderate",
        _ => "weak",
    };
    match direction {
        CorrelationDirection::None => format!(
            "No meaningful relationship between {species} abundance and {parameter} (r = {r:.2})"
        ),
        CorrelationDirection::Positive => format!(
            "A {strength} positive correlation (r = {r:.2}): {species} abundance tends to rise with {parameter}"
        ),
        CorrelationDirection::Negative => format!(
            "A {strength} negative correlation (r = {r:.2}): {species} abundance tends to fall as {parameter} rises"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::{catch, date};

    fn monthly(values: &[f64]) -> Vec<DateValue> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| DateValue {
                date: date(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1),
                value,
            })
            .collect()
    }

    #[test]
    fn doubling_series_is_increasing() {
        let records: Vec<CatchRecord> = [10.0, 12.5, 15.0, 17.5, 20.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| catch("Sardine", date(2024, i as u32 + 1, 10), c, 1.0))
            .collect();
        let analysis = analyze_trend(&records, "Sardine", TrendParameter::Cpue).expect("trend");
        assert_eq!(analysis.series.len(), 5);
        assert!(analysis.change_percent > 15.0);
        assert_eq!(analysis.direction, TrendDirection::Increasing);
        assert!((analysis.slope - 2.5).abs() < 1e-9);
        assert!(analysis.seasonality.is_none());
    }

    #[test]
    fn twelve_percent_change_is_stable_for_abundance() {
        // slope * 4 / mean = 12%
        let analysis = analyze_series(
            "a",
            TrendParameter::Catch,
            monthly(&[9.4, 9.7, 10.0, 10.3, 10.6]),
        );
        assert!((analysis.change_percent - 12.0).abs() < 1e-9);
        assert_eq!(analysis.direction, TrendDirection::Stable);
    }

    #[test]
    fn monthly_series_parameters() {
        let records = vec![
            catch("a", date(2024, 1, 3), 10.0, 2.0),
            catch("a", date(2024, 1, 20), 20.0, 4.0),
            catch("a", date(2024, 2, 1), 6.0, 0.0),
        ];
        let cpue = monthly_series(&records, "a", TrendParameter::Cpue).expect("series");
        assert_eq!(cpue.len(), 2);
        assert_eq!(cpue[0].date, date(2024, 1, 1));
        assert!((cpue[0].value - 5.0).abs() < 1e-12);
        assert_eq!(cpue[1].value, 0.0);
        let effort = monthly_series(&records, "a", TrendParameter::Effort).expect("series");
        assert_eq!(effort[0].value, 6.0);
        let catch_total = monthly_series(&records, "a", TrendParameter::Catch).expect("series");
        assert_eq!(catch_total[1].value, 6.0);
    }

    #[test]
    fn seasonality_needs_two_years() {
        let values: Vec<f64> = (0..24)
            .map(|i| if i % 12 == 6 { 30.0 } else { 10.0 })
            .collect();
        let analysis = analyze_series("a", TrendParameter::Cpue, monthly(&values));
        let seasonality = analysis.seasonality.expect("seasonality");
        assert!(seasonality.detected);
        assert_eq!(seasonality.peak_month, 7);
        assert_eq!(seasonality.trough_month, 1);
        assert!((seasonality.amplitude - 20.0).abs() < 1e-12);
        assert_eq!(seasonality.monthly_means.len(), 12);

        let flat = analyze_series("a", TrendParameter::Cpue, monthly(&[10.0; 24]));
        assert!(!flat.seasonality.expect("seasonality").detected);
        assert!(analyze_series("a", TrendParameter::Cpue, monthly(&[10.0; 23]))
            .seasonality
            .is_none());
    }

    #[test]
    fn anomalies_flag_outliers_beyond_two_sigma() {
        let mut values = vec![10.0; 12];
        values[5] = 40.0;
        let analysis = analyze_series("a", TrendParameter::Cpue, monthly(&values));
        assert_eq!(analysis.anomalies.len(), 1);
        assert_eq!(analysis.anomalies[0].kind, AnomalyKind::High);
        assert_eq!(analysis.anomalies[0].date, date(2020, 6, 1));
        assert!(analysis.anomalies[0].z_score > 2.0);
        assert!(analyze_series("a", TrendParameter::Cpue, monthly(&[3.0; 8]))
            .anomalies
            .is_empty());
    }

    #[test]
    fn forecast_requires_six_months() {
        let history = monthly(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let forecast = forecast_series("a", &history, 12, ForecastMethod::Linear);
        assert!(forecast.points.is_empty());
        assert!(forecast.message.is_some());
        assert!(forecast_abundance(&[], "a", 0, ForecastMethod::Linear).is_err());
    }

    #[test]
    fn linear_forecast_extends_trend_with_widening_band() {
        let history = monthly(&[10.0, 12.5, 13.5, 16.5, 17.5, 20.5, 21.0, 24.0]);
        let forecast = forecast_series("a", &history, 6, ForecastMethod::Linear);
        assert_eq!(forecast.points.len(), 6);
        assert_eq!(forecast.points[0].date, date(2020, 9, 1));
        assert!(forecast.points[0].predicted > 24.0);
        let widths: Vec<f64> = forecast
            .points
            .iter()
            .map(|p| p.upper95 - p.lower95)
            .collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0]));
        for point in &forecast.points {
            assert!(point.lower95 <= point.predicted && point.predicted <= point.upper95);
        }
    }

    #[test]
    fn exponential_forecast_compounds_observed_growth() {
        let history = monthly(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]);
        let forecast = forecast_series("a", &history, 2, ForecastMethod::Exponential);
        assert!((forecast.points[0].predicted - 64.0).abs() < 1e-9);
        assert!((forecast.points[1].predicted - 128.0).abs() < 1e-9);
    }

    #[test]
    fn runaway_exponential_forecast_saturates() {
        let history = monthly(&[1.0, 10.0, 100.0, 1e3, 1e4, 1e5]);
        let forecast = forecast_series("a", &history, 400, ForecastMethod::Exponential);
        assert_eq!(forecast.points.len(), 400);
        assert!(forecast.points.iter().all(|p| {
            p.predicted.is_finite() && p.upper95.is_finite() && p.lower95 <= p.predicted
        }));
        assert!(forecast
            .points
            .windows(2)
            .all(|w| w[1].predicted >= w[0].predicted));
        assert!(forecast.points[0].predicted < f64::MAX);
        assert_eq!(forecast.points[399].predicted, f64::MAX);
    }

    #[test]
    fn declining_forecast_is_floored_at_zero() {
        let history = monthly(&[30.0, 25.0, 20.0, 15.0, 10.0, 5.0]);
        let forecast = forecast_series("a", &history, 6, ForecastMethod::Linear);
        assert!(forecast.points.iter().all(|p| p.predicted >= 0.0 && p.lower95 >= 0.0));
        assert_eq!(forecast.points[5].predicted, 0.0);
    }

    #[test]
    fn self_correlation_is_one() {
        let series = monthly(&[3.0, 5.0, 4.0, 8.0, 7.0, 9.0, 12.0, 10.0, 14.0, 13.0, 15.0]);
        let result = correlate_with_ocean_parameters(&series, &series, "a", "sst", 2)
            .expect("correlation");
        assert!((result.correlation - 1.0).abs() < 1e-12);
        assert_eq!(result.direction, CorrelationDirection::Positive);
        assert_eq!(result.p_value, 0.001);
        assert_eq!(result.sample_size, 11);
        assert_eq!(result.lag_scan.len(), 3);
        assert_eq!(result.lag_scan[1].sample_size, 10);
        assert_eq!(result.lag_scan[2].sample_size, 9);
        assert_eq!(result.lag_scan[2].correlation, 0.0);
        assert_eq!(result.best_lag, Some(0));
        assert!(result.interpretation.contains("strong positive"));
    }

    #[test]
    fn lag_scan_finds_leading_environment() {
        let env: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64).collect();
        let ocean = monthly(&env);
        // Abundance echoes the environment two months later.
        let abundance: Vec<DateValue> = ocean
            .iter()
            .map(|p| DateValue {
                date: p.date.checked_add_months(Months::new(2)).expect("date"),
                value: 3.0 * p.value + 1.0,
            })
            .collect();
        let result = correlate_with_ocean_parameters(&abundance, &ocean, "a", "sst", 4)
            .expect("correlation");
        assert_eq!(result.best_lag, Some(2));
        assert!((result.lag_scan[2].correlation - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lag_scan_is_bounded() {
        let series = monthly(&[3.0, 5.0, 4.0, 8.0, 7.0, 9.0, 12.0, 10.0, 14.0, 13.0, 15.0]);
        let err = correlate_with_ocean_parameters(&series, &series, "a", "sst", MAX_LAG_MONTHS + 1)
            .unwrap_err();
        assert!(matches!(
            err,
            InvalidInputError::InvalidParameter { name: "max_lag", .. }
        ));
        assert!(correlate_with_ocean_parameters(&series, &series, "a", "sst", u32::MAX).is_err());
        let widest = correlate_with_ocean_parameters(&series, &series, "a", "sst", MAX_LAG_MONTHS)
            .expect("correlation");
        assert_eq!(widest.lag_scan.len(), MAX_LAG_MONTHS as usize + 1);
    }

    #[test]
    fn sparse_overlap_reports_zero_correlation() {
        let a = monthly(&[1.0, 2.0, 3.0]);
        let result =
            correlate_with_ocean_parameters(&a, &a, "a", "chlorophyll", 6).expect("correlation");
        assert_eq!(result.correlation, 0.0);
        assert_eq!(result.direction, CorrelationDirection::None);
        assert!(result.interpretation.starts_with("Insufficient"));
        assert_eq!(result.best_lag, None);
    }
}
