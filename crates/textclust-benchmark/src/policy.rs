//! Error isolation policy.
//!
//! Streaming models with incrementally maintained statistics can reach
//! numerically degenerate states (a variance that drifts just below zero).
//! Such a failure costs one observation, not the run. Every other failure is
//! fatal and handed back unchanged.

use std::error::Error;

use textclust_stream::StreamError;
use tracing::warn;

use crate::pipeline::{PipelineError, Variant};

/// Message fragment identifying a numeric domain failure.
pub const MATH_DOMAIN_SIGNATURE: &str = "math domain error";

/// Default number of recoverable failures logged individually per run.
pub const DEFAULT_FAILURE_LOG_CAP: usize = 5;

/// How a pipeline failure is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Skip the observation for every buffer and continue.
    Recoverable,
    /// Abort the current run.
    Fatal,
}

/// Classify an error by its category, falling back to its message.
///
/// Recoverable when any error in the source chain is a
/// [`StreamError::MathDomain`] or renders with [`MATH_DOMAIN_SIGNATURE`].
pub fn classify(error: &(dyn Error + 'static)) -> FailureClass {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(err) = current {
        if matches!(
            err.downcast_ref::<StreamError>(),
            Some(StreamError::MathDomain { .. })
        ) || err.to_string().contains(MATH_DOMAIN_SIGNATURE)
        {
            return FailureClass::Recoverable;
        }
        current = err.source();
    }
    FailureClass::Fatal
}

/// Per-run policy state: the recoverable failure count and its log cap.
#[derive(Debug, Clone)]
pub struct ErrorIsolationPolicy {
    recoverable_failures: usize,
    log_cap: usize,
}

impl ErrorIsolationPolicy {
    /// Create a policy that logs at most `log_cap` recoverable failures.
    pub fn new(log_cap: usize) -> Self {
        Self {
            recoverable_failures: 0,
            log_cap,
        }
    }

    /// Absorb a recoverable failure, or hand a fatal one back unchanged.
    pub fn admit(
        &mut self,
        variant: Variant,
        observation_count: u64,
        error: PipelineError,
    ) -> Result<(), PipelineError> {
        match classify(&*error) {
            FailureClass::Recoverable => {
                self.recoverable_failures += 1;
                if self.recoverable_failures <= self.log_cap {
                    warn!(
                        %variant,
                        observation = observation_count,
                        error = %error,
                        "Math error at observation {}. Skipping observation.",
                        observation_count
                    );
                    if self.recoverable_failures == self.log_cap {
                        warn!("Further numeric failures in this run are counted but not logged");
                    }
                }
                Ok(())
            }
            FailureClass::Fatal => Err(error),
        }
    }

    /// Recoverable failures absorbed so far.
    pub fn recoverable_failures(&self) -> usize {
        self.recoverable_failures
    }

    /// Start a new run: zero the count, keep the log cap.
    pub fn reset(&mut self) {
        self.recoverable_failures = 0;
    }
}

impl Default for ErrorIsolationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_LOG_CAP)
    }
}
