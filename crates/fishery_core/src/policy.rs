//! Trend classification policies.
//!
//! The CPUE analyzer and the abundance trend engine classify change with different
//! thresholds. Each threshold is kept as its own named policy so neither silently adopts
//! the other's behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendPolicy {
    /// Magnitude of percent change beyond which a series counts as moving.
    pub threshold_percent: f64,
}

/// Used by the CPUE analyzer for period series and per-species summaries.
pub const CPUE_TREND_POLICY: TrendPolicy = TrendPolicy {
    threshold_percent: 10.0,
};

/// Used by the abundance trend engine.
pub const ABUNDANCE_TREND_POLICY: TrendPolicy = TrendPolicy {
    threshold_percent: 15.0,
};

impl TrendPolicy {
    pub fn classify(&self, change_percent: f64) -> TrendDirection {
        if change_percent > self.threshold_percent {
            TrendDirection::Increasing
        } else if change_percent < -self.threshold_percent {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}
