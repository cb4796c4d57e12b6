//! Core traits for the scanstream library.
//!
//! [`ScanStream`] is the contract a content provider satisfies.
//! [`ScanEngine`] is the boundary to the external engine that drives a
//! stream and renders a verdict.

use crate::core::error::ScanError;
use crate::core::result::{AttributeReply, ReadReply};
use crate::core::types::{AttributeKind, Verdict};

use std::fmt::Debug;

/// The provider side of the scan protocol.
///
/// Both operations are stateless with respect to position: the engine may
/// call them any number of times, in any order, from whichever thread it
/// runs on. Buffers are allocated by the caller and filled by the provider.
pub trait ScanStream: Send + Sync {
    /// Answers an attribute query for the raw attribute ordinal `kind`.
    ///
    /// `buf.len()` is the caller's capacity. The reply always carries the
    /// required length, so a caller may probe with an empty buffer and
    /// retry with one of exactly that size.
    fn get_attribute(&self, kind: u32, buf: &mut [u8]) -> AttributeReply;

    /// Reads up to `buf.len()` bytes at absolute offset `position`.
    ///
    /// End of content is signalled by a short or zero `bytes_read` with a
    /// success status.
    fn read(&self, position: u64, buf: &mut [u8]) -> ReadReply;

    /// Typed convenience over [`ScanStream::get_attribute`].
    fn attribute(&self, kind: AttributeKind, buf: &mut [u8]) -> AttributeReply {
        self.get_attribute(kind.as_raw(), buf)
    }
}

/// The boundary to an external scanning engine.
///
/// # Implementation Notes
///
/// - `scan` returns `Err` for any failure of the scan mechanism itself.
///   A verdict exists only on `Ok`, so a failed call can never be read as
///   "clean".
/// - Implementations should never panic; all errors should be returned as
///   `ScanError`.
///
/// # Example Implementation
///
/// ```rust
/// use scanstream::core::{ScanEngine, ScanError, ScanStream, Verdict};
///
/// #[derive(Debug)]
/// struct AllowAll;
///
/// impl ScanEngine for AllowAll {
///     fn name(&self) -> &str {
///         "allow-all"
///     }
///
///     fn scan(&self, _stream: &dyn ScanStream) -> Result<Verdict, ScanError> {
///         Ok(Verdict::NOT_DETECTED)
///     }
/// }
/// ```
pub trait ScanEngine: Send + Sync + Debug {
    /// Returns the name of the engine that renders verdicts.
    fn name(&self) -> &str;

    /// Drives `stream` and returns a verdict for the whole session.
    ///
    /// # Errors
    ///
    /// - `EngineUnavailable` - The scan subsystem is not available.
    /// - `Timeout` - The engine gave up before rendering a verdict.
    /// - `SourceRead` - The provider reported an I/O failure.
    fn scan(&self, stream: &dyn ScanStream) -> Result<Verdict, ScanError>;

    /// Releases any engine state associated with a session token.
    fn close_session(&self, _session: &[u8]) {}
}

/// An arc-wrapped engine for shared ownership.
pub type ArcEngine = std::sync::Arc<dyn ScanEngine>;
