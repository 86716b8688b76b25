//! Error types for locator system

use crate::types::{RetryAttempt, StrategyAttempt};
use action_primitives::DriverError;
use thiserror::Error;

/// Locator error enumeration
///
/// Every variant carries the failing selector's human description (or its
/// string form) so the message alone identifies the locator.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Frame routing target is absent
    #[error("Frame not found: {criterion} (selector: {selector})")]
    FrameNotFound { criterion: String, selector: String },

    /// No strategy produced a candidate handle
    #[error("Unable to resolve locator for selector: {selector} (context: {context}, {} strategies tried)", .attempts.len())]
    ResolutionFailed {
        selector: String,
        context: String,
        attempts: Vec<StrategyAttempt>,
    },

    /// Handle never reached the requested state after all retries
    #[error("Waiting for selector timed out after {retries} attempts: {selector}")]
    WaitTimeout {
        selector: String,
        retries: u32,
        timeout_ms: u64,
        attempts: Vec<RetryAttempt>,
    },

    /// Driver failure that is not a state-wait timeout
    #[error("Driver error for selector {selector}: {source}")]
    Driver {
        selector: String,
        #[source]
        source: DriverError,
    },

    /// Invalid engine configuration
    #[error("Invalid locator configuration: {0}")]
    Config(String),
}

impl LocatorError {
    /// Short machine name, used for diagnostics attachment names
    pub fn kind(&self) -> &'static str {
        match self {
            LocatorError::FrameNotFound { .. } => "frame_error",
            LocatorError::ResolutionFailed { .. } => "resolution_error",
            LocatorError::WaitTimeout { .. } => "wait_timeout",
            LocatorError::Driver { .. } => "driver_error",
            LocatorError::Config(_) => "config_error",
        }
    }

    /// Retry attempt log carried by a wait timeout
    pub fn retry_attempts(&self) -> &[RetryAttempt] {
        match self {
            LocatorError::WaitTimeout { attempts, .. } => attempts,
            _ => &[],
        }
    }

    /// Strategy attempt log carried by a resolution failure
    pub fn strategy_attempts(&self) -> &[StrategyAttempt] {
        match self {
            LocatorError::ResolutionFailed { attempts, .. } => attempts,
            _ => &[],
        }
    }
}
