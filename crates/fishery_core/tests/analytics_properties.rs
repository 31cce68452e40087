//! Property-based tests for the analytics engine
//!
//! These tests check relationships that hold for any valid input:
//! - CPUE equals total catch over total effort and sits inside its own interval
//! - Length bins account for every individual
//! - Location ranking is sorted by CPUE
//! - Mortality rates stay in range
//! - Forecast bands widen with the horizon
//! - Pearson coefficients stay in [-1, 1]

use chrono::{Months, NaiveDate};
use fishery_core::cpue::{calculate_cpue, compare_cpue_by_location};
use fishery_core::length::calculate_length_distribution;
use fishery_core::records::{CatchRecord, DateValue, EffortUnit, LengthRecord, Location};
use fishery_core::stats::pearson;
use fishery_core::stock::{estimate_mortality, MortalityOptions};
use fishery_core::trend::{forecast_series, ForecastMethod};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

fn catch_record(catch_amount: f64, effort: f64, location: &str) -> CatchRecord {
    CatchRecord {
        date: start(),
        species: "Sardine".to_string(),
        catch_amount,
        effort,
        effort_unit: EffortUnit::Hours,
        location: Some(Location {
            name: Some(location.to_string()),
            ..Location::default()
        }),
        gear_type: None,
        vessel_id: None,
    }
}

fn length_record(length: f64) -> LengthRecord {
    LengthRecord {
        date: start(),
        species: "Sardine".to_string(),
        length,
        weight: None,
        sex: None,
        maturity: None,
        age: None,
        location: None,
    }
}

fn monthly(values: &[f64]) -> Vec<DateValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| DateValue {
            date: start() + Months::new(i as u32),
            value,
        })
        .collect()
}

/// (catch, effort) pairs with strictly positive effort
fn catch_effort() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..500.0, 0.5f64..50.0), 1..40)
}

proptest! {
    #[test]
    fn prop_cpue_is_catch_over_effort(pairs in catch_effort()) {
        let records: Vec<CatchRecord> = pairs
            .iter()
            .map(|&(c, e)| catch_record(c, e, "Bay"))
            .collect();
        let result = calculate_cpue(&records, Some("sardine")).unwrap();

        let total_catch: f64 = pairs.iter().map(|(c, _)| c).sum();
        let total_effort: f64 = pairs.iter().map(|(_, e)| e).sum();
        prop_assert_eq!(result.sample_size, pairs.len());
        prop_assert!((result.cpue - total_catch / total_effort).abs() < 1e-9);
        prop_assert!(result.confidence95.lower >= 0.0);
        prop_assert!(result.confidence95.lower <= result.cpue + 1e-12);
        prop_assert!(result.cpue <= result.confidence95.upper + 1e-12);
    }

    #[test]
    fn prop_location_ranking_is_descending(
        rows in prop::collection::vec((0.0f64..500.0, 0.5f64..50.0, 0usize..6), 1..40)
    ) {
        let names = ["North", "South", "East", "West", "Reef", "Shelf"];
        let records: Vec<CatchRecord> = rows
            .iter()
            .map(|&(c, e, loc)| catch_record(c, e, names[loc]))
            .collect();
        let comparison = compare_cpue_by_location(&records, "Sardine").unwrap();

        let total: usize = comparison.locations.iter().map(|l| l.sample_size).sum();
        prop_assert_eq!(total, records.len());
        for pair in comparison.locations.windows(2) {
            prop_assert!(pair[0].cpue >= pair[1].cpue);
        }
        prop_assert_eq!(comparison.highest.as_ref(), comparison.locations.first());
        prop_assert_eq!(comparison.lowest.as_ref(), comparison.locations.last());
    }

    #[test]
    fn prop_length_bins_cover_every_fish(
        lengths in prop::collection::vec(1.0f64..120.0, 1..200),
        bin_size in 0.5f64..15.0
    ) {
        let records: Vec<LengthRecord> = lengths.iter().map(|&l| length_record(l)).collect();
        let distribution = calculate_length_distribution(&records, "Sardine", bin_size).unwrap();

        let counted: usize = distribution.bins.iter().map(|b| b.count).sum();
        let frequency: f64 = distribution.bins.iter().map(|b| b.frequency).sum();
        prop_assert_eq!(counted, lengths.len());
        prop_assert!((frequency - 1.0).abs() < 1e-9);
        prop_assert!(distribution.min <= distribution.mean + 1e-9);
        prop_assert!(distribution.mean <= distribution.max + 1e-9);
    }

    #[test]
    fn prop_mortality_rates_stay_in_range(
        lengths in prop::collection::vec(5.0f64..95.0, 0..300)
    ) {
        let records: Vec<LengthRecord> = lengths.iter().map(|&l| length_record(l)).collect();
        let estimate = estimate_mortality(&records, "Sardine", &MortalityOptions::default()).unwrap();

        prop_assert!(estimate.natural_mortality > 0.0);
        prop_assert!(estimate.fishing_mortality >= 0.0);
        prop_assert!((0.0..=1.0).contains(&estimate.exploitation_rate));
        prop_assert!(estimate.z_confidence.lower <= estimate.total_mortality);
        prop_assert!(estimate.total_mortality <= estimate.z_confidence.upper);
    }

    #[test]
    fn prop_forecast_band_widens_with_horizon(
        values in prop::collection::vec(0.0f64..100.0, 6..36),
        exponential in any::<bool>()
    ) {
        let method = if exponential {
            ForecastMethod::Exponential
        } else {
            ForecastMethod::Linear
        };
        let forecast = forecast_series("Sardine", &monthly(&values), 12, method);

        if let Some(message) = &forecast.message {
            prop_assert!(forecast.points.is_empty(), "{}", message);
        } else {
            prop_assert_eq!(forecast.points.len(), 12);
            for point in &forecast.points {
                prop_assert!(point.lower95 >= 0.0);
                prop_assert!(point.lower95 <= point.predicted + 1e-9);
                prop_assert!(point.predicted <= point.upper95 + 1e-9);
            }
            let widths: Vec<f64> = forecast
                .points
                .iter()
                .map(|p| p.upper95 - p.lower95)
                .collect();
            for pair in widths.windows(2) {
                prop_assert!(pair[1] + 1e-9 >= pair[0]);
            }
        }
    }

    #[test]
    fn prop_pearson_is_bounded(
        pairs in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 0..60)
    ) {
        let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
        let r = pearson(&xs, &ys);
        prop_assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn prop_series_correlates_with_itself(
        values in prop::collection::vec(-1000.0f64..1000.0, 3..60)
    ) {
        let spread = values.iter().cloned().fold(f64::MIN, f64::max)
            - values.iter().cloned().fold(f64::MAX, f64::min);
        prop_assume!(spread > 1e-3);
        prop_assert!((pearson(&values, &values) - 1.0).abs() < 1e-9);
    }
}
