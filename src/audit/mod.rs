//! Structured audit logging.
//!
//! This module provides functions for emitting structured audit events
//! using the `tracing` crate under the `scanstream::audit` target. Events
//! can be captured by any tracing subscriber.

mod events;

pub use events::{
    emit_scan_completed, emit_scan_failed, emit_scan_started, AuditEvent, ScanAuditEvent,
    ScanFailureAuditEvent,
};
