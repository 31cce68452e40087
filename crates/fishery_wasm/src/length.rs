//! Length-frequency bindings.

use crate::shared::{decode, encode, js_error};
use fishery_core::length::{
    calculate_length_distribution, calculate_length_weight,
    estimate_growth_parameters as core_growth, identify_cohorts as core_cohorts,
    DEFAULT_BIN_SIZE, DEFAULT_COHORTS,
};
use fishery_core::records::LengthRecord;
use wasm_bindgen::prelude::*;

pub(crate) fn length_records(value: JsValue) -> Result<Vec<LengthRecord>, JsValue> {
    console_error_panic_hook::set_once();
    decode(value, "length records")
}

/// A `bin_size` of zero selects the default 5-unit bins.
#[wasm_bindgen]
pub fn length_distribution(
    records: JsValue,
    species: &str,
    bin_size: f64,
) -> Result<JsValue, JsValue> {
    let records = length_records(records)?;
    let bin_size = if bin_size == 0.0 { DEFAULT_BIN_SIZE } else { bin_size };
    let distribution =
        calculate_length_distribution(&records, species, bin_size).map_err(js_error)?;
    encode(&distribution)
}

#[wasm_bindgen]
pub fn identify_cohorts(
    records: JsValue,
    species: &str,
    num_cohorts: u32,
) -> Result<JsValue, JsValue> {
    let records = length_records(records)?;
    let num_cohorts = if num_cohorts == 0 {
        DEFAULT_COHORTS
    } else {
        num_cohorts as usize
    };
    let cohorts = core_cohorts(&records, species, num_cohorts).map_err(js_error)?;
    encode(&cohorts)
}

/// Resolves to `undefined` with fewer than ten aged fish or three distinct ages.
#[wasm_bindgen]
pub fn estimate_growth_parameters(records: JsValue) -> Result<JsValue, JsValue> {
    let records = length_records(records)?;
    let growth = core_growth(&records).map_err(js_error)?;
    encode(&growth)
}

#[wasm_bindgen]
pub fn length_weight(records: JsValue, species: &str) -> Result<JsValue, JsValue> {
    let records = length_records(records)?;
    let relationship = calculate_length_weight(&records, species).map_err(js_error)?;
    encode(&relationship)
}
