//! Scan engine implementations.
//!
//! This module contains implementations of the `ScanEngine` trait.
//!
//! ## Available Backends
//!
//! - [`mock`] - A mock engine for testing
//!
//! ## Implementing a Custom Backend
//!
//! An engine negotiates attributes, reads as much content as it needs and
//! returns one verdict, or an error if the scan itself could not run:
//!
//! ```rust
//! use scanstream::core::{AttributeKind, ScanEngine, ScanError, ScanStream, Verdict};
//! use scanstream::provider::{decode_u64le, fetch_attribute};
//!
//! #[derive(Debug)]
//! struct SizeLimitEngine {
//!     max: u64,
//! }
//!
//! impl ScanEngine for SizeLimitEngine {
//!     fn name(&self) -> &str {
//!         "size-limit"
//!     }
//!
//!     fn scan(&self, stream: &dyn ScanStream) -> Result<Verdict, ScanError> {
//!         let size = fetch_attribute(stream, AttributeKind::ContentSize)
//!             .and_then(|bytes| decode_u64le(&bytes))
//!             .ok_or_else(|| ScanError::internal("content size unavailable"))?;
//!         if size > self.max {
//!             Ok(Verdict::blocked_by_admin(0))
//!         } else {
//!             Ok(Verdict::NOT_DETECTED)
//!         }
//!     }
//! }
//! ```

pub mod mock;

// Re-exports
pub use mock::{MockEngine, MockEngineConfig};
