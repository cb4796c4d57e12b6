//! Content provider implementation.
//!
//! [`ContentProvider`] implements [`ScanStream`](crate::core::ScanStream)
//! over any [`ContentSource`](crate::core::ContentSource). The
//! [`attribute`] module holds the attribute encoder table along with the
//! helpers an engine uses to fetch and decode attribute values.

pub mod attribute;
pub(crate) mod stream;

pub use attribute::{decode_u64le, decode_utf16z, fetch_attribute, AttributeEncoding};
pub use stream::ContentProvider;
