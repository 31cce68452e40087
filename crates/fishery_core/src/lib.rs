pub mod cpue;
pub mod error;
pub mod length;
pub mod policy;
pub mod records;
pub mod spatial;
pub mod stats;
/// The `fishery_core` crate provides the analytics engine behind stock-assessment dashboards.
/// Every operation is a pure function over in-memory record slices; nothing is persisted and
/// no state survives between calls.
///
/// Key components:
/// - **Records**: `CatchRecord` (catch/effort) and `LengthRecord` (measured individuals).
/// - **CPUE**: point estimates, period series, gear standardization, location ranking.
/// - **Length**: length-frequency distributions, L50, cohorts, von Bertalanffy growth, length-weight.
/// - **Stock**: catch-curve mortality, exploitation status, sustainability scoring, recruitment.
/// - **Trend**: trend/seasonality/anomaly detection, forecasting, environmental correlation.
/// - **Spatial**: catch hotspots, centroid, and spread radius.
pub mod stock;
pub mod trend;

pub use error::{InvalidInputError, Result};
