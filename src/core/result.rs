//! Reply and report structures.
//!
//! [`AttributeReply`] and [`ReadReply`] are the two-channel replies of the
//! provider operations: a status plus a length that is always populated.
//! [`ScanReport`] describes a completed scan session.

use crate::core::error::ScanError;
use crate::core::types::{CallStatus, ProviderStatus, ScanContext, Verdict, VerdictClass};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reply to an attribute query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeReply {
    /// Outcome of the query.
    pub status: ProviderStatus,
    /// Encoded length of the value. Populated on `InsufficientBuffer` so
    /// the caller can retry; zero on `NotImplemented`.
    pub required_len: usize,
}

impl AttributeReply {
    /// The value was copied into the caller's buffer.
    pub fn success(required_len: usize) -> Self {
        Self {
            status: ProviderStatus::Success,
            required_len,
        }
    }

    /// The caller's buffer was too small.
    pub fn insufficient_buffer(required_len: usize) -> Self {
        Self {
            status: ProviderStatus::InsufficientBuffer,
            required_len,
        }
    }

    /// The attribute is not exposed.
    pub fn not_implemented() -> Self {
        Self {
            status: ProviderStatus::NotImplemented,
            required_len: 0,
        }
    }

    /// Returns `true` if the value was copied.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Reply to a positional read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReply {
    /// Outcome of the read.
    pub status: ProviderStatus,
    /// Number of bytes written to the front of the caller's buffer.
    pub bytes_read: usize,
}

impl ReadReply {
    /// A successful read of `bytes_read` bytes.
    pub fn success(bytes_read: usize) -> Self {
        Self {
            status: ProviderStatus::Success,
            bytes_read,
        }
    }

    /// The source failed; nothing was read.
    pub fn io_failure() -> Self {
        Self {
            status: ProviderStatus::IoFailure,
            bytes_read: 0,
        }
    }

    /// Returns `true` if the read succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` if fewer bytes than `requested` came back.
    pub fn is_short(&self, requested: usize) -> bool {
        self.is_success() && self.bytes_read < requested
    }
}

/// The result of a completed scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier for this report.
    pub id: String,

    /// The verdict rendered by the engine.
    pub verdict: Verdict,

    /// Decoded verdict class.
    pub class: VerdictClass,

    /// Name of the engine that rendered the verdict.
    pub engine: String,

    /// Name of the scanned content.
    pub content_name: String,

    /// Size of the scanned content, if known.
    pub content_size: Option<u64>,

    /// When the scan started.
    pub started_at: DateTime<Utc>,

    /// When the scan completed.
    pub completed_at: DateTime<Utc>,

    /// How long the scan took.
    #[serde(with = "duration_serde")]
    pub duration: Duration,

    /// The context in which the scan was requested.
    pub context: ScanContext,
}

impl ScanReport {
    /// Creates a report for a verdict.
    pub fn new(
        verdict: Verdict,
        engine: impl Into<String>,
        content_name: impl Into<String>,
        content_size: Option<u64>,
        duration: Duration,
        context: ScanContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            verdict,
            class: verdict.class(),
            engine: engine.into(),
            content_name: content_name.into(),
            content_size,
            started_at: now - chrono::Duration::from_std(duration).unwrap_or_default(),
            completed_at: now,
            duration,
            context,
        }
    }

    /// Returns `true` if the engine reported clean or not detected.
    pub fn is_clean(&self) -> bool {
        !self.verdict.should_block()
    }

    /// Returns `true` if the engine reported a detection.
    pub fn is_malware(&self) -> bool {
        self.verdict.is_malware()
    }

    /// Returns `true` if the content should not be allowed through.
    pub fn should_block(&self) -> bool {
        self.verdict.should_block()
    }
}

/// Splits a scan result into the two raw channels of the protocol.
///
/// The verdict is `None` whenever the call status is not success.
pub fn into_raw_parts(result: &Result<ScanReport, ScanError>) -> (CallStatus, Option<Verdict>) {
    match result {
        Ok(report) => (CallStatus::OK, Some(report.verdict)),
        Err(e) => (e.call_status(), None),
    }
}

/// Serde helper for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
