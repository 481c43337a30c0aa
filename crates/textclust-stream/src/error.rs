//! Error types for the streaming pipeline.

use thiserror::Error;

/// Errors raised while learning from or predicting on a text observation.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A numeric operation was applied outside its domain.
    ///
    /// Raised when an incrementally maintained statistic drifts into a
    /// degenerate state (e.g. a slightly negative variance) and a square root
    /// is taken of it. The message keeps the `math domain error` prefix so
    /// callers that only see the rendered message can still classify it.
    #[error("math domain error: {operation} of {value:e} while computing {context}")]
    MathDomain {
        /// The operation that failed (e.g. `sqrt`).
        operation: &'static str,
        /// The offending input value.
        value: f64,
        /// What was being computed.
        context: &'static str,
    },

    /// Invalid configuration value.
    #[error("Invalid parameter '{name}': {value}. {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Parameter value as string
        value: String,
        /// Reason for invalidity
        reason: &'static str,
    },
}

/// Result alias for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Square root that reports negative inputs instead of returning NaN.
pub fn checked_sqrt(value: f64, context: &'static str) -> StreamResult<f64> {
    if value < 0.0 || value.is_nan() {
        return Err(StreamError::MathDomain {
            operation: "sqrt",
            value,
            context,
        });
    }
    Ok(value.sqrt())
}
