//! Audit event types and emission functions.

use crate::core::{CallStatus, ContentHandle, ScanContext, ScanError, ScanReport};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Unique report ID.
    pub report_id: String,

    /// Name of the scanned content.
    pub content_name: String,

    /// Size of the scanned content, if known.
    pub content_size: Option<u64>,

    /// Raw verdict value.
    pub verdict: u32,

    /// Decoded verdict class.
    pub verdict_class: String,

    /// Engine that rendered the verdict.
    pub engine: String,

    /// Scan duration in milliseconds.
    pub duration_ms: u64,

    /// Request ID, if available.
    pub request_id: Option<String>,

    /// User ID, if available.
    pub user_id: Option<String>,
}

impl From<&ScanReport> for ScanAuditEvent {
    fn from(report: &ScanReport) -> Self {
        Self {
            timestamp: report.completed_at,
            report_id: report.id.clone(),
            content_name: report.content_name.clone(),
            content_size: report.content_size,
            verdict: report.verdict.as_raw(),
            verdict_class: report.class.to_string(),
            engine: report.engine.clone(),
            duration_ms: report.duration.as_millis() as u64,
            request_id: report.context.request_id.clone(),
            user_id: report.context.user_id.clone(),
        }
    }
}

impl AuditEvent for ScanAuditEvent {
    fn event_type(&self) -> &'static str {
        "scan_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for a scan that produced no verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFailureAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Name of the content.
    pub content_name: String,

    /// Engine that was invoked.
    pub engine: String,

    /// Raw call status of the failed call.
    pub call_status: u32,

    /// Error description.
    pub error: String,

    /// Whether retrying might succeed.
    pub recoverable: bool,

    /// Request ID, if available.
    pub request_id: Option<String>,
}

impl ScanFailureAuditEvent {
    /// Builds a failure event.
    pub fn new(
        handle: &ContentHandle,
        engine: &str,
        error: &ScanError,
        context: &ScanContext,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            content_name: handle.name().to_string(),
            engine: engine.to_string(),
            call_status: error.call_status().0,
            error: error.to_string(),
            recoverable: error.is_recoverable(),
            request_id: context.request_id.clone(),
        }
    }
}

impl AuditEvent for ScanFailureAuditEvent {
    fn event_type(&self) -> &'static str {
        "scan_failed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for a scan starting.
pub fn emit_scan_started(handle: &ContentHandle, engine: &str, context: &ScanContext) {
    tracing::info!(
        target: "scanstream::audit",
        event_type = "scan_started",
        content_name = %handle.name(),
        content_size = ?handle.size(),
        app_name = %handle.app_name(),
        engine = %engine,
        request_id = ?context.request_id,
        user_id = ?context.user_id,
        source = ?context.source,
        "Scan started"
    );
}

/// Emits an audit event for a completed scan.
pub fn emit_scan_completed(report: &ScanReport) {
    let event = ScanAuditEvent::from(report);

    tracing::info!(
        target: "scanstream::audit",
        event_type = event.event_type(),
        report_id = %event.report_id,
        content_name = %event.content_name,
        content_size = ?event.content_size,
        verdict = event.verdict,
        verdict_class = %event.verdict_class,
        engine = %event.engine,
        duration_ms = event.duration_ms,
        request_id = ?event.request_id,
        user_id = ?event.user_id,
        "Scan completed"
    );
}

/// Emits an audit event for a scan whose mechanism failed.
///
/// No verdict is logged: none was obtained.
pub fn emit_scan_failed(
    handle: &ContentHandle,
    engine: &str,
    error: &ScanError,
    context: &ScanContext,
) {
    let event = ScanFailureAuditEvent::new(handle, engine, error, context);

    tracing::warn!(
        target: "scanstream::audit",
        event_type = event.event_type(),
        content_name = %event.content_name,
        engine = %event.engine,
        call_status = %CallStatus(event.call_status),
        error = %event.error,
        recoverable = event.recoverable,
        request_id = ?event.request_id,
        "Scan could not be completed"
    );
}
