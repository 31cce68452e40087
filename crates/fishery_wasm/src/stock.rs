//! Stock-assessment bindings.

use crate::catch::catch_records;
use crate::length::length_records;
use crate::shared::{encode, js_error, mortality_options};
use fishery_core::stock::{
    analyze_recruitment as core_recruitment, assess_stock_status as core_status,
    estimate_mortality as core_mortality, get_multi_species_stock_summary,
};
use wasm_bindgen::prelude::*;

/// `options` may be `undefined` for Pauly's M with Linf 100, K 0.2 and 25 °C.
#[wasm_bindgen]
pub fn estimate_mortality(
    length_records_val: JsValue,
    species: &str,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let records = length_records(length_records_val)?;
    let options = mortality_options(options)?;
    let estimate = core_mortality(&records, species, &options).map_err(js_error)?;
    encode(&estimate)
}

/// With `year` set, catches up to and including that year and lengths from that year only.
#[wasm_bindgen]
pub fn assess_stock_status(
    catch_records_val: JsValue,
    length_records_val: JsValue,
    species: &str,
    year: Option<i32>,
) -> Result<JsValue, JsValue> {
    let catches = catch_records(catch_records_val)?;
    let lengths = length_records(length_records_val)?;
    let status = core_status(&catches, &lengths, species, year).map_err(js_error)?;
    encode(&status)
}

#[wasm_bindgen]
pub fn analyze_recruitment(
    catch_records_val: JsValue,
    length_records_val: JsValue,
    species: &str,
) -> Result<JsValue, JsValue> {
    let catches = catch_records(catch_records_val)?;
    let lengths = length_records(length_records_val)?;
    let recruitment = core_recruitment(&catches, &lengths, species).map_err(js_error)?;
    encode(&recruitment)
}

#[wasm_bindgen]
pub fn multi_species_stock_summary(
    catch_records_val: JsValue,
    length_records_val: JsValue,
) -> Result<JsValue, JsValue> {
    let catches = catch_records(catch_records_val)?;
    let lengths = length_records(length_records_val)?;
    let summary = get_multi_species_stock_summary(&catches, &lengths).map_err(js_error)?;
    encode(&summary)
}
