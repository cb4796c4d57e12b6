//! The content provider.

use crate::core::{
    AttributeReply, ContentHandle, ContentSource, ReadReply, ScanError, ScanStream,
};
use crate::provider::attribute::negotiate;

/// Serves one scan session's attributes and content to an engine.
///
/// The provider owns the [`ContentHandle`] and the source for the duration
/// of the session. It holds no read cursor: every read is addressed by
/// absolute position, so repeated, overlapping and out-of-order reads all
/// return the same bytes.
///
/// # Examples
///
/// ```rust
/// use scanstream::core::{AttributeKind, BytesSource, ProviderStatus, ScanStream};
/// use scanstream::provider::ContentProvider;
///
/// let provider = ContentProvider::new("greeting.txt", BytesSource::new(b"hello".to_vec()));
///
/// let probe = provider.attribute(AttributeKind::ContentSize, &mut []);
/// assert_eq!(probe.status, ProviderStatus::InsufficientBuffer);
/// assert_eq!(probe.required_len, 8);
///
/// let mut buf = [0u8; 16];
/// let reply = provider.read(2, &mut buf);
/// assert_eq!(reply.bytes_read, 3);
/// assert_eq!(&buf[..3], b"llo");
/// ```
#[derive(Debug)]
pub struct ContentProvider<S> {
    handle: ContentHandle,
    source: S,
}

impl<S: ContentSource> ContentProvider<S> {
    /// Creates a provider, taking the content size from the source.
    pub fn new(name: impl Into<String>, source: S) -> Self {
        let handle = ContentHandle::new(name).with_size_hint(source.length());
        Self { handle, source }
    }

    /// Creates a provider from an explicit handle.
    ///
    /// If the handle carries no size, the source's length is used.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the handle declares a size that differs
    /// from a length the source reports.
    pub fn with_handle(handle: ContentHandle, source: S) -> Result<Self, ScanError> {
        check_declared_size(&handle, &source)?;
        let handle = match handle.size() {
            Some(_) => handle,
            None => {
                let size = source.length();
                handle.with_size_hint(size)
            }
        };
        Ok(Self { handle, source })
    }

    /// Returns the session's content handle.
    pub fn handle(&self) -> &ContentHandle {
        &self.handle
    }

    /// Returns the underlying content source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

/// Rejects a handle whose declared size contradicts the source's length.
///
/// `CONTENT_SIZE` and the bytes served by `read` must describe the same
/// content. A declared size is only trusted when the source cannot report
/// one.
pub(crate) fn check_declared_size<S: ContentSource + ?Sized>(
    handle: &ContentHandle,
    source: &S,
) -> Result<(), ScanError> {
    if let (Some(declared), Some(actual)) = (handle.size(), source.length()) {
        if declared != actual {
            return Err(ScanError::configuration(format!(
                "content '{}' declares {} bytes but its source holds {}",
                handle.name(),
                declared,
                actual
            )));
        }
    }
    Ok(())
}

impl<S: ContentSource> ScanStream for ContentProvider<S> {
    fn get_attribute(&self, kind: u32, buf: &mut [u8]) -> AttributeReply {
        let reply = negotiate(kind, &self.handle, buf);
        tracing::trace!(
            content = %self.handle.name(),
            attribute = kind,
            capacity = buf.len(),
            status = %reply.status,
            required_len = reply.required_len,
            "Attribute query"
        );
        reply
    }

    fn read(&self, position: u64, buf: &mut [u8]) -> ReadReply {
        match self.source.read_at(position, buf) {
            Ok(bytes_read) => {
                tracing::trace!(
                    content = %self.handle.name(),
                    position,
                    requested = buf.len(),
                    bytes_read,
                    "Content read"
                );
                ReadReply::success(bytes_read)
            }
            Err(e) => {
                tracing::warn!(
                    content = %self.handle.name(),
                    position,
                    requested = buf.len(),
                    error = %e,
                    "Content source read failed"
                );
                ReadReply::io_failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeKind, BytesSource, ProviderStatus, SeekableSource};
    use crate::provider::attribute::{decode_u64le, decode_utf16z, fetch_attribute};
    use std::io::{self, Cursor};

    #[derive(Debug)]
    struct BrokenSource;

    impl ContentSource for BrokenSource {
        fn read_at(&self, _position: u64, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }

        fn length(&self) -> Option<u64> {
            Some(100)
        }
    }

    fn provider(len: usize) -> ContentProvider<BytesSource> {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        ContentProvider::new("data.bin", BytesSource::new(data))
    }

    #[test]
    fn test_size_taken_from_source() {
        let provider = provider(1234);
        assert_eq!(provider.handle().size(), Some(1234));
        let size = fetch_attribute(&provider, AttributeKind::ContentSize).unwrap();
        assert_eq!(decode_u64le(&size), Some(1234));
    }

    #[test]
    fn test_handle_size_must_match_source() {
        let handle = ContentHandle::new("x").with_size(3);
        let result = ContentProvider::with_handle(handle, BytesSource::new(vec![0u8; 10]));
        assert!(matches!(result, Err(ScanError::Configuration { .. })));

        let handle = ContentHandle::new("x").with_size(10);
        let source = BytesSource::new(vec![0u8; 10]);
        let provider = ContentProvider::with_handle(handle, source).unwrap();
        let size = fetch_attribute(&provider, AttributeKind::ContentSize).unwrap();
        assert_eq!(decode_u64le(&size), Some(10));

        let mut buf = [0u8; 32];
        assert_eq!(provider.read(0, &mut buf).bytes_read, 10);
    }

    #[test]
    fn test_declared_size_used_for_unknown_length() {
        let source = SeekableSource::with_unknown_length(Cursor::new(vec![1u8; 40]));
        let handle = ContentHandle::new("pipe").with_size(40);
        let provider = ContentProvider::with_handle(handle, source).unwrap();
        assert_eq!(provider.handle().size(), Some(40));
    }

    #[test]
    fn test_content_name_attribute() {
        let provider = provider(10);
        let name = fetch_attribute(&provider, AttributeKind::ContentName).unwrap();
        assert_eq!(decode_utf16z(&name).as_deref(), Some("data.bin"));
    }

    #[test]
    fn test_read_past_end_is_empty_success() {
        let provider = provider(10);
        let mut buf = [0u8; 4];
        assert_eq!(provider.read(10, &mut buf), ReadReply::success(0));
        assert_eq!(provider.read(1 << 40, &mut buf), ReadReply::success(0));
    }

    #[test]
    fn test_short_read_at_tail() {
        let provider = provider(10);
        let mut buf = [0u8; 8];
        let reply = provider.read(6, &mut buf);
        assert_eq!(reply, ReadReply::success(4));
        assert!(reply.is_short(8));
    }

    #[test]
    fn test_reads_are_positional() {
        let provider = provider(100);
        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        let mut other = [0u8; 16];

        provider.read(40, &mut first);
        provider.read(0, &mut other);
        provider.read(40, &mut second);
        assert_eq!(first, second);
        assert_eq!(first[0], 40);
    }

    #[test]
    fn test_io_failure_is_distinct() {
        let provider = ContentProvider::new("broken", BrokenSource);
        let mut buf = [0u8; 4];
        let reply = provider.read(0, &mut buf);
        assert_eq!(reply.status, ProviderStatus::IoFailure);
        assert_eq!(reply.bytes_read, 0);

        // Attribute queries never touch the source.
        assert!(fetch_attribute(&provider, AttributeKind::ContentName).is_some());
    }
}
