//! Core types and traits for the scanstream library.
//!
//! This module provides the fundamental building blocks used throughout
//! the library:
//!
//! - [`types`] - Protocol enumerations: `AttributeKind`, `Verdict`, status codes
//! - [`traits`] - The `ScanStream` and `ScanEngine` traits
//! - [`error`] - Structured error types
//! - [`content`] - Positional content sources
//! - [`handle`] - Per-scan content metadata
//! - [`result`] - Replies and scan reports

pub mod content;
pub mod error;
pub mod handle;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types at the core level
pub use content::{AsyncSource, BytesSource, ContentSource, FileSource, SeekableSource};
pub use error::ScanError;
pub use handle::{ContentHandle, DEFAULT_APP_NAME, SESSION_TOKEN_LEN};
pub use result::{into_raw_parts, AttributeReply, ReadReply, ScanReport};
pub use traits::{ArcEngine, ScanEngine, ScanStream};
pub use types::{AttributeKind, CallStatus, ProviderStatus, ScanContext, Verdict, VerdictClass};
