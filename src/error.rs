//! Error types for session configuration

use thiserror::Error;

/// Rejection reasons for a session configuration.
///
/// Terminal game outcomes are never errors; they come back through
/// [`crate::session::TickOutcome`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be at least one")]
    Empty { field: &'static str },

    #[error("Invalid maze map: {0}")]
    InvalidMaze(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration handling
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Reject NaN and infinities.
pub(crate) fn finite(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Reject non-finite values and anything `<= 0`.
pub(crate) fn positive(field: &'static str, value: f32) -> Result<f32> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Reject non-finite values and negatives. Zero is allowed.
pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<f32> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Require `min < max` for a half-open sampling range.
pub(crate) fn ordered(field: &'static str, min: f32, max: f32) -> Result<()> {
    finite(field, min)?;
    finite(field, max)?;
    if min < max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_zero_and_nan() {
        assert!(positive("radius", 1.0).is_ok());
        assert!(matches!(
            positive("radius", 0.0),
            Err(ConfigError::NonPositive { field: "radius", .. })
        ));
        assert!(matches!(
            positive("radius", f32::NAN),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_ordered_requires_strict_range() {
        assert!(ordered("band", 70.0, 230.0).is_ok());
        assert!(ordered("band", 5.0, 5.0).is_err());
        let err = ordered("band", 9.0, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "band range is inverted: 9 > 1");
    }
}
