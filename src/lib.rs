//! # Scanstream
//!
//! The provider side of a streaming content-scan protocol.
//!
//! ## Overview
//!
//! A content provider exposes named attributes and random-access byte
//! chunks to an external scanning engine. The engine negotiates attributes
//! to size its buffers, pages through the content with positional reads,
//! and returns one verdict: clean, not detected, blocked by admin policy,
//! or detected.
//!
//! Scanstream gives you:
//!
//! - A provider that answers attribute queries with exact required lengths
//!   and serves positional reads from any seekable source
//! - Verdict and status types whose raw values match the wire protocol
//! - A `Result`-based engine boundary that keeps "the scan failed" apart
//!   from "the scan says the content is clean"
//! - Structured audit logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust
//! use scanstream::backends::MockEngine;
//! use scanstream::{BytesSource, ScanContext, ScanManager};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ScanManager::builder()
//!     .with_engine(MockEngine::new())
//!     .build()?;
//!
//! let source = BytesSource::new(b"file content".to_vec());
//! let report = manager.scan("notes.txt", source, ScanContext::new())?;
//!
//! if report.is_clean() {
//!     println!("notes.txt is clean");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes tokio runtime support
//! - `tokio-runtime` - Run scans on tokio's blocking pool from async code
//!
//! ## Architecture
//!
//! - **Core**: Protocol types, traits, content sources and errors
//! - **Provider**: Attribute negotiation and positional reads
//! - **Backends**: Engine implementations (a mock engine for tests)
//! - **Manager**: One scan session end to end, with audit events
//! - **Audit**: Structured logging of scan outcomes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod core;
pub mod manager;
pub mod provider;

// Re-export commonly used types at the crate root
pub use crate::core::{
    AttributeKind, AttributeReply, BytesSource, CallStatus, ContentHandle, ContentSource,
    FileSource, ProviderStatus, ReadReply, ScanContext, ScanEngine, ScanError, ScanReport,
    ScanStream, SeekableSource, Verdict, VerdictClass,
};

pub use crate::manager::{ScanManager, ScanManagerConfig};
pub use crate::provider::ContentProvider;

/// Prelude module for convenient imports.
///
/// ```rust
/// use scanstream::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        AttributeKind, AttributeReply, BytesSource, CallStatus, ContentHandle, ContentSource,
        FileSource, ProviderStatus, ReadReply, ScanContext, ScanEngine, ScanError, ScanReport,
        ScanStream, SeekableSource, Verdict, VerdictClass,
    };
    pub use crate::manager::{ScanManager, ScanManagerConfig};
    pub use crate::provider::ContentProvider;
}
