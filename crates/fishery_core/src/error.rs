//! Contract-violation errors.
//!
//! Insufficient data is never an error in this crate: operations degrade to zero-valued
//! aggregates or `None`. Only malformed input reaches the caller as an `InvalidInputError`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("Record {index}: field `{field}` is not a finite number")]
    NonFinite { field: &'static str, index: usize },

    #[error("Record {index}: field `{field}` must not be negative")]
    Negative { field: &'static str, index: usize },

    #[error("Record {index}: coordinate ({latitude}, {longitude}) is out of range")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl InvalidInputError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InvalidInputError>;

/// Rejects a parameter that is not a finite, strictly positive number.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(InvalidInputError::parameter(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err = InvalidInputError::NonFinite {
            field: "effort",
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "Record 3: field `effort` is not a finite number"
        );

        let err = InvalidInputError::parameter("bin_size", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter `bin_size`: must be positive"
        );
    }

    #[test]
    fn require_positive_rejects_zero_nan_and_negative() {
        assert!(require_positive("k", 0.2).is_ok());
        assert!(require_positive("k", 0.0).is_err());
        assert!(require_positive("k", -1.0).is_err());
        assert!(require_positive("k", f64::NAN).is_err());
        assert!(require_positive("k", f64::INFINITY).is_err());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InvalidInputError>();
    }
}
