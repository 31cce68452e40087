//! CPUE and spatial bindings over catch records.

use crate::shared::{decode, encode, js_error, parse_date_range, parse_period};
use fishery_core::cpue::{
    calculate_cpue as core_cpue, calculate_cpue_time_series,
    compare_cpue_by_location as core_compare, get_cpue_summary,
    standardize_cpue as core_standardize,
};
use fishery_core::records::CatchRecord;
use fishery_core::spatial::analyze_spatial_distribution;
use wasm_bindgen::prelude::*;

pub(crate) fn catch_records(value: JsValue) -> Result<Vec<CatchRecord>, JsValue> {
    console_error_panic_hook::set_once();
    decode(value, "catch records")
}

/// `species` may be empty to pool every record.
#[wasm_bindgen]
pub fn calculate_cpue(records: JsValue, species: &str) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let species = Some(species.trim()).filter(|s| !s.is_empty());
    let result = core_cpue(&records, species).map_err(js_error)?;
    encode(&result)
}

#[wasm_bindgen]
pub fn cpue_time_series(records: JsValue, species: &str, period: &str) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let period = parse_period(period).map_err(js_error)?;
    let series = calculate_cpue_time_series(&records, species, period).map_err(js_error)?;
    encode(&series)
}

#[wasm_bindgen]
pub fn compare_cpue_by_location(records: JsValue, species: &str) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let comparison = core_compare(&records, species).map_err(js_error)?;
    encode(&comparison)
}

#[wasm_bindgen]
pub fn standardize_cpue(records: JsValue, reference_gear: &str) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let standardized = core_standardize(&records, reference_gear).map_err(js_error)?;
    encode(&standardized)
}

#[wasm_bindgen]
pub fn cpue_summary(records: JsValue) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let summary = get_cpue_summary(&records).map_err(js_error)?;
    encode(&summary)
}

/// `start` and `end` are ISO dates; pass two empty strings for the full record span.
#[wasm_bindgen]
pub fn spatial_distribution(
    records: JsValue,
    species: &str,
    start: &str,
    end: &str,
) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let period = parse_date_range(start, end).map_err(js_error)?;
    let spatial = analyze_spatial_distribution(&records, species, period).map_err(js_error)?;
    encode(&spatial)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::{calculate_cpue, cpue_time_series, spatial_distribution};
    use chrono::NaiveDate;
    use fishery_core::cpue::CpueResult;
    use fishery_core::records::{CatchRecord, EffortUnit};
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn records_value() -> JsValue {
        let records: Vec<CatchRecord> = [(1, 100.0), (2, 50.0)]
            .into_iter()
            .map(|(month, catch_amount)| CatchRecord {
                date: NaiveDate::from_ymd_opt(2024, month, 5).expect("date"),
                species: "Sardine".to_string(),
                catch_amount,
                effort: 10.0,
                effort_unit: EffortUnit::Hours,
                location: None,
                gear_type: None,
                vessel_id: None,
            })
            .collect();
        serde_wasm_bindgen::to_value(&records).expect("value")
    }

    #[wasm_bindgen_test]
    fn calculate_cpue_pools_records() {
        let value = calculate_cpue(records_value(), "sardine").expect("cpue");
        let result: CpueResult = from_value(value).expect("decode");
        assert!((result.cpue - 7.5).abs() < 1e-12);
        assert_eq!(result.sample_size, 2);
    }

    #[wasm_bindgen_test]
    fn cpue_time_series_rejects_unknown_period() {
        assert!(cpue_time_series(records_value(), "Sardine", "weekly").is_err());
    }

    #[wasm_bindgen_test]
    fn spatial_distribution_rejects_half_open_range() {
        assert!(spatial_distribution(records_value(), "Sardine", "2024-01-01", "").is_err());
    }
}
