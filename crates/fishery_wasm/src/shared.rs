//! Argument decoding and result encoding shared by every exported function.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use fishery_core::cpue::CpuePeriod;
use fishery_core::records::DateRange;
use fishery_core::stock::MortalityOptions;
use fishery_core::trend::{ForecastMethod, TrendParameter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Decodes a JS array or object, naming the argument in the error.
pub(crate) fn decode<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {what}: {e}")))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Treats `undefined` and `null` as "not given".
pub(crate) fn optional<T: DeserializeOwned>(
    value: JsValue,
    what: &str,
) -> Result<Option<T>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    decode(value, what).map(Some)
}

pub(crate) fn mortality_options(value: JsValue) -> Result<MortalityOptions, JsValue> {
    Ok(optional(value, "mortality options")?.unwrap_or_default())
}

pub(crate) fn parse_period(name: &str) -> anyhow::Result<CpuePeriod> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "monthly" | "month" => Ok(CpuePeriod::Monthly),
        "quarterly" | "quarter" => Ok(CpuePeriod::Quarterly),
        "yearly" | "year" | "annual" => Ok(CpuePeriod::Yearly),
        other => bail!("Unknown CPUE period '{other}' (expected monthly, quarterly or yearly)"),
    }
}

pub(crate) fn parse_trend_parameter(name: &str) -> anyhow::Result<TrendParameter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "cpue" => Ok(TrendParameter::Cpue),
        "catch" => Ok(TrendParameter::Catch),
        "effort" => Ok(TrendParameter::Effort),
        other => bail!("Unknown trend parameter '{other}'"),
    }
}

pub(crate) fn parse_forecast_method(name: &str) -> anyhow::Result<ForecastMethod> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "linear" => Ok(ForecastMethod::Linear),
        "exponential" => Ok(ForecastMethod::Exponential),
        other => bail!("Unknown forecast method '{other}'"),
    }
}

/// ISO `YYYY-MM-DD`.
pub(crate) fn parse_date(text: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{text}'"))
}

/// Both bounds or neither; empty strings mean "not given".
pub(crate) fn parse_date_range(start: &str, end: &str) -> anyhow::Result<Option<DateRange>> {
    match (start.trim().is_empty(), end.trim().is_empty()) {
        (true, true) => Ok(None),
        (false, false) => {
            let range = DateRange {
                start: parse_date(start)?,
                end: parse_date(end)?,
            };
            if range.end < range.start {
                bail!("Date range ends before it starts");
            }
            Ok(Some(range))
        }
        _ => bail!("Date range needs both a start and an end"),
    }
}
