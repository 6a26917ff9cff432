//! Error types for plot assembly.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling a plot.
///
/// Configuration problems (a malformed specification) surface as errors.
/// Sparse or partially missing data never does: stats return empty frames
/// and geoms skip the affected rows.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (writing SVG output, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Plot specification document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Color string in none of the accepted formats.
    #[error("Error parsing color value: '{0}'")]
    InvalidColor(String),

    /// Correlation method declared but not implemented.
    #[error("Unsupported correlation method: {0} (only Pearson is currently available)")]
    UnsupportedCorrelationMethod(String),

    /// A legend or axis needs breaks the scale could not provide.
    #[error("No breaks were defined for scale {0}")]
    MissingBreaks(String),

    /// A discrete-only mapper provider was asked for a continuous mapper.
    #[error("[{provider}] Can't create mapper for continuous domain {domain}")]
    ContinuousDomainUnsupported {
        /// Name of the provider.
        provider: String,
        /// The requested domain, formatted.
        domain: String,
    },

    /// Scale domain error (e.g., empty level list, inverted limits).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Plot specification is structurally invalid.
    #[error("Invalid plot specification: {0}")]
    InvalidSpec(String),

    /// Layers stitched into one panel disagree on aesthetic bindings.
    #[error("Inconsistent layer bindings: {0}")]
    InconsistentLayers(String),

    /// Series of different length added to one data frame.
    #[error("Data length mismatch: '{variable}' has {actual} rows, expected {expected}")]
    DataLengthMismatch {
        /// Offending variable name.
        variable: String,
        /// Row count of the frame.
        expected: usize,
        /// Row count of the offending series.
        actual: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("rgb(1,2)".to_string());
        assert_eq!(err.to_string(), "Error parsing color value: 'rgb(1,2)'");
    }

    #[test]
    fn test_data_length_mismatch() {
        let err = Error::DataLengthMismatch {
            variable: "y".to_string(),
            expected: 10,
            actual: 20,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("20"));
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn test_continuous_domain_message() {
        let err = Error::ContinuousDomainUnsupported {
            provider: "Shape".to_string(),
            domain: "[0.0, 1.0]".to_string(),
        };
        assert_eq!(err.to_string(), "[Shape] Can't create mapper for continuous domain [0.0, 1.0]");
    }

    #[test]
    fn test_correlation_message() {
        let err = Error::UnsupportedCorrelationMethod("spearman".to_string());
        assert!(err.to_string().starts_with("Unsupported correlation method: spearman"));
    }

    #[test]
    fn test_json_from() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parsed.expect_err("invalid json").into();
        assert!(matches!(err, Error::Json(_)));
    }
}
