//! Error types for search-context drivers

use thiserror::Error;

/// Failures reported by a search-context driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A bounded wait elapsed before the element reached the requested state
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The context rejected the selector string (syntax or unknown scheme)
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The context has no native support for the requested addressing mode
    #[error("Unsupported addressing: {0}")]
    Unsupported(String),

    /// The element or frame detached while an operation was in flight
    #[error("Detached: {0}")]
    Detached(String),

    /// Transport or protocol failure talking to the browser
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Whether this error is a state-wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_count_as_timeouts() {
        assert!(DriverError::Timeout("5000ms".into()).is_timeout());
        assert!(!DriverError::Detached("gone".into()).is_timeout());
        assert!(!DriverError::Protocol("closed".into()).is_timeout());
    }
}
