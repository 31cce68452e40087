//! WASM bindings for `fishery_core`.
//!
//! Every export takes records as plain JS arrays, decodes them with
//! `serde-wasm-bindgen`, runs one core operation and returns the serialized result.
//! Invalid input rejects with a string message.

mod catch;
mod length;
mod shared;
mod stock;
mod trend;

pub use catch::{
    calculate_cpue, compare_cpue_by_location, cpue_summary, cpue_time_series, spatial_distribution,
    standardize_cpue,
};
pub use length::{estimate_growth_parameters, identify_cohorts, length_distribution, length_weight};
pub use stock::{
    analyze_recruitment, assess_stock_status, estimate_mortality, multi_species_stock_summary,
};
pub use trend::{analyze_trend, correlate_with_ocean, forecast_abundance};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexports_are_wired() {
        use std::any::type_name_of_val;

        assert!(type_name_of_val(&calculate_cpue).ends_with("catch::calculate_cpue"));
        assert!(type_name_of_val(&spatial_distribution).ends_with("catch::spatial_distribution"));
        assert!(type_name_of_val(&length_distribution).ends_with("length::length_distribution"));
        assert!(type_name_of_val(&assess_stock_status).ends_with("stock::assess_stock_status"));
        assert!(type_name_of_val(&forecast_abundance).ends_with("trend::forecast_abundance"));
        assert!(type_name_of_val(&correlate_with_ocean).ends_with("trend::correlate_with_ocean"));
    }
}
