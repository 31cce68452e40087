//! Trend, forecast and environmental correlation bindings.

use crate::catch::catch_records;
use crate::shared::{decode, encode, js_error, parse_forecast_method, parse_trend_parameter};
use fishery_core::records::DateValue;
use fishery_core::trend::{
    analyze_trend as core_trend, correlate_with_ocean_parameters,
    forecast_abundance as core_forecast, DEFAULT_HORIZON_MONTHS, DEFAULT_MAX_LAG,
};
use wasm_bindgen::prelude::*;

/// `parameter` is `cpue`, `catch` or `effort`.
#[wasm_bindgen]
pub fn analyze_trend(records: JsValue, species: &str, parameter: &str) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let parameter = parse_trend_parameter(parameter).map_err(js_error)?;
    let analysis = core_trend(&records, species, parameter).map_err(js_error)?;
    encode(&analysis)
}

#[wasm_bindgen]
pub fn forecast_abundance(
    records: JsValue,
    species: &str,
    horizon_months: Option<u32>,
    method: &str,
) -> Result<JsValue, JsValue> {
    let records = catch_records(records)?;
    let method = parse_forecast_method(method).map_err(js_error)?;
    let horizon = horizon_months.unwrap_or(DEFAULT_HORIZON_MONTHS);
    let forecast = core_forecast(&records, species, horizon, method).map_err(js_error)?;
    encode(&forecast)
}

/// Both series are `{date, value}` arrays.
#[wasm_bindgen]
pub fn correlate_with_ocean(
    abundance_val: JsValue,
    ocean_val: JsValue,
    species: &str,
    parameter_name: &str,
    max_lag: Option<u32>,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let abundance: Vec<DateValue> = decode(abundance_val, "abundance series")?;
    let ocean: Vec<DateValue> = decode(ocean_val, "ocean series")?;
    let correlation = correlate_with_ocean_parameters(
        &abundance,
        &ocean,
        species,
        parameter_name,
        max_lag.unwrap_or(DEFAULT_MAX_LAG),
    )
    .map_err(js_error)?;
    encode(&correlation)
}
