//! Error types for the scanstream library.
//!
//! Only mechanism and transport failures are errors. Attribute negotiation
//! outcomes (unsupported attribute, buffer too small) are expected protocol
//! results and are reported as [`ProviderStatus`](crate::core::ProviderStatus)
//! values instead. The library never panics; all errors are returned as
//! `Result` values.

use crate::core::types::CallStatus;

use std::time::Duration;
use thiserror::Error;

/// The error type for scan operations.
///
/// Any `ScanError` means no verdict was obtained. Callers must never fall
/// back to a default verdict, since the numeric zero verdict means "clean".
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scanning engine is unavailable or not responding.
    #[error("engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable {
        /// Name of the engine that is unavailable.
        engine: String,
        /// Human-readable reason for unavailability.
        reason: String,
    },

    /// The engine gave up before rendering a verdict.
    #[error("scan timed out after {elapsed:?} on engine '{engine}'")]
    Timeout {
        /// Name of the engine that timed out.
        engine: String,
        /// How long the operation ran before timing out.
        elapsed: Duration,
    },

    /// The content source failed while the engine was reading it.
    #[error("content source failed at offset {position}: {source}")]
    SourceRead {
        /// Absolute offset of the failed read.
        position: u64,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred outside of a positional read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The content exceeds the maximum size accepted by the session.
    #[error("content size {size} bytes exceeds maximum {max} bytes")]
    ContentTooLarge {
        /// Actual content size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },

    /// An internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ScanError {
    /// Returns `true` if this error is recoverable (can be retried).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::EngineUnavailable { .. })
    }

    /// Returns the engine name if this error is associated with one.
    pub fn engine(&self) -> Option<&str> {
        match self {
            Self::EngineUnavailable { engine, .. } | Self::Timeout { engine, .. } => Some(engine),
            _ => None,
        }
    }

    /// Returns the non-success call status reported for this error.
    pub fn call_status(&self) -> CallStatus {
        match self {
            Self::EngineUnavailable { .. } => CallStatus::NOT_READY,
            Self::Timeout { .. } => CallStatus::TIMEOUT,
            Self::SourceRead { .. } | Self::Io(_) => CallStatus::READ_FAULT,
            Self::ContentTooLarge { .. } | Self::Configuration { .. } => CallStatus::INVALID_ARG,
            Self::Internal { .. } => CallStatus::FAIL,
        }
    }

    /// Returns the message an embedding layer should show to a user.
    pub fn user_message(&self) -> String {
        format!("scan could not be completed: {}", self)
    }

    /// Creates an `EngineUnavailable` error.
    pub fn engine_unavailable(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(engine: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            engine: engine.into(),
            elapsed,
        }
    }

    /// Creates a `SourceRead` error.
    pub fn source_read(position: u64, source: std::io::Error) -> Self {
        Self::SourceRead { position, source }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_is_recoverable() {
        let timeout = ScanError::timeout("test", Duration::from_secs(30));
        assert!(timeout.is_recoverable());

        let too_large = ScanError::ContentTooLarge { size: 10, max: 5 };
        assert!(!too_large.is_recoverable());
    }

    #[test]
    fn test_scan_error_engine() {
        let err = ScanError::engine_unavailable("mock", "service not running");
        assert_eq!(err.engine(), Some("mock"));

        let io_err = ScanError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io_err.engine(), None);
    }

    #[test]
    fn test_call_status_is_never_success() {
        let errors = vec![
            ScanError::engine_unavailable("e", "down"),
            ScanError::timeout("e", Duration::from_secs(1)),
            ScanError::source_read(42, std::io::Error::new(std::io::ErrorKind::Other, "x")),
            ScanError::ContentTooLarge { size: 2, max: 1 },
            ScanError::internal("bug"),
            ScanError::configuration("bad"),
        ];
        for err in errors {
            assert!(!err.call_status().is_success(), "{err}");
        }
    }

    #[test]
    fn test_user_message() {
        let err = ScanError::engine_unavailable("mock", "stopped");
        let msg = err.user_message();
        assert!(msg.starts_with("scan could not be completed"));
        assert!(msg.contains("stopped"));
    }

    #[test]
    fn test_source_read_display() {
        let err = ScanError::source_read(
            4096,
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "disk gone"),
        );
        assert!(err.to_string().contains("4096"));
        assert!(err.to_string().contains("disk gone"));
    }
}
