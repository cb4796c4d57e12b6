//! Attribute encodings and the probe-then-fetch negotiation.
//!
//! Each [`AttributeKind`] maps to one [`AttributeEncoding`] strategy. Adding
//! a kind is one arm in [`AttributeEncoding::for_kind`].

use crate::core::{AttributeKind, AttributeReply, ContentHandle, ProviderStatus, ScanStream};

/// How an attribute value is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeEncoding<'a> {
    /// UTF-16LE text followed by a `0x0000` terminator.
    Utf16Z(&'a str),
    /// Unsigned 64-bit integer, little-endian.
    U64Le(u64),
    /// Raw bytes, copied as-is. May be empty.
    Raw(&'a [u8]),
    /// Not exposed by this provider.
    Unsupported,
}

impl<'a> AttributeEncoding<'a> {
    /// Selects the encoding of `kind` for the given handle.
    ///
    /// Address-valued kinds are never exposed: raw memory addresses have no
    /// meaning across this boundary. A size that is not known in advance is
    /// likewise unsupported.
    pub fn for_kind(kind: AttributeKind, handle: &'a ContentHandle) -> Self {
        match kind {
            AttributeKind::AppName => Self::Utf16Z(handle.app_name()),
            AttributeKind::ContentName => Self::Utf16Z(handle.name()),
            AttributeKind::ContentSize => handle.size().map_or(Self::Unsupported, Self::U64Le),
            AttributeKind::Session => Self::Raw(handle.session()),
            AttributeKind::ContentAddress
            | AttributeKind::RedirectChainSize
            | AttributeKind::RedirectChainAddress
            | AttributeKind::AllSize
            | AttributeKind::AllAddress
            | AttributeKind::Quiet => Self::Unsupported,
        }
    }

    /// Returns the exact encoded length, or `None` if unsupported.
    pub fn encoded_len(&self) -> Option<usize> {
        match self {
            Self::Utf16Z(text) => Some((text.encode_utf16().count() + 1) * 2),
            Self::U64Le(_) => Some(8),
            Self::Raw(bytes) => Some(bytes.len()),
            Self::Unsupported => None,
        }
    }

    /// Writes the encoded value to the front of `buf`.
    ///
    /// `buf` must be at least [`encoded_len`](Self::encoded_len) bytes long.
    /// Returns the number of bytes written.
    fn encode_into(&self, buf: &mut [u8]) -> usize {
        match self {
            Self::Utf16Z(text) => {
                let mut written = 0;
                for unit in text.encode_utf16().chain(std::iter::once(0)) {
                    buf[written..written + 2].copy_from_slice(&unit.to_le_bytes());
                    written += 2;
                }
                written
            }
            Self::U64Le(value) => {
                buf[..8].copy_from_slice(&value.to_le_bytes());
                8
            }
            Self::Raw(bytes) => {
                buf[..bytes.len()].copy_from_slice(bytes);
                bytes.len()
            }
            Self::Unsupported => 0,
        }
    }
}

/// Answers an attribute query for a raw ordinal against `handle`.
///
/// Nothing is copied unless the whole value fits.
pub fn negotiate(kind: u32, handle: &ContentHandle, buf: &mut [u8]) -> AttributeReply {
    let encoding = match AttributeKind::from_raw(kind) {
        Some(kind) => AttributeEncoding::for_kind(kind, handle),
        None => AttributeEncoding::Unsupported,
    };

    let Some(required_len) = encoding.encoded_len() else {
        return AttributeReply::not_implemented();
    };

    if buf.len() < required_len {
        return AttributeReply::insufficient_buffer(required_len);
    }

    let written = encoding.encode_into(buf);
    debug_assert_eq!(written, required_len);
    AttributeReply::success(required_len)
}

/// Fetches an attribute the way an engine does: probe with an empty
/// buffer, then retry with a buffer of exactly the reported length.
///
/// Returns `None` when the stream does not expose the attribute.
pub fn fetch_attribute(stream: &dyn ScanStream, kind: AttributeKind) -> Option<Vec<u8>> {
    let probe = stream.attribute(kind, &mut []);
    match probe.status {
        ProviderStatus::Success => return Some(Vec::new()),
        ProviderStatus::InsufficientBuffer => {}
        ProviderStatus::NotImplemented | ProviderStatus::IoFailure => return None,
    }

    let mut buf = vec![0u8; probe.required_len];
    let reply = stream.attribute(kind, &mut buf);
    if !reply.is_success() {
        return None;
    }
    buf.truncate(reply.required_len);
    Some(buf)
}

/// Decodes a UTF-16LE, null-terminated attribute value.
pub fn decode_utf16z(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let (last, text) = units.split_last()?;
    if *last != 0 {
        return None;
    }
    String::from_utf16(text).ok()
}

/// Decodes a little-endian `u64` attribute value.
pub fn decode_u64le(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ContentHandle {
        ContentHandle::new("test.file.txt")
            .with_app_name("TestApp")
            .with_size(21 * 1024 * 1024)
    }

    #[test]
    fn test_encoding_table() {
        let handle = handle();
        assert_eq!(
            AttributeEncoding::for_kind(AttributeKind::ContentName, &handle),
            AttributeEncoding::Utf16Z("test.file.txt")
        );
        assert_eq!(
            AttributeEncoding::for_kind(AttributeKind::ContentSize, &handle),
            AttributeEncoding::U64Le(21 * 1024 * 1024)
        );
        assert_eq!(
            AttributeEncoding::for_kind(AttributeKind::ContentAddress, &handle),
            AttributeEncoding::Unsupported
        );
    }

    #[test]
    fn test_utf16_length_counts_terminator() {
        assert_eq!(AttributeEncoding::Utf16Z("").encoded_len(), Some(2));
        assert_eq!(AttributeEncoding::Utf16Z("ab").encoded_len(), Some(6));
        // U+1F600 needs a surrogate pair.
        assert_eq!(AttributeEncoding::Utf16Z("\u{1F600}").encoded_len(), Some(6));
    }

    #[test]
    fn test_negotiate_probe_then_fetch() {
        let handle = handle();
        let probe = negotiate(AttributeKind::AppName.as_raw(), &handle, &mut []);
        assert_eq!(probe.status, ProviderStatus::InsufficientBuffer);
        assert_eq!(probe.required_len, 16);

        let mut buf = vec![0u8; probe.required_len];
        let reply = negotiate(AttributeKind::AppName.as_raw(), &handle, &mut buf);
        assert!(reply.is_success());
        assert_eq!(decode_utf16z(&buf).as_deref(), Some("TestApp"));
    }

    #[test]
    fn test_negotiate_too_small_copies_nothing() {
        let handle = handle();
        let mut buf = [0xAAu8; 7];
        let reply = negotiate(AttributeKind::ContentSize.as_raw(), &handle, &mut buf);
        assert_eq!(reply, AttributeReply::insufficient_buffer(8));
        assert_eq!(buf, [0xAA; 7]);
    }

    #[test]
    fn test_negotiate_larger_buffer_leaves_tail() {
        let handle = handle();
        let mut buf = [0xFFu8; 12];
        let reply = negotiate(AttributeKind::ContentSize.as_raw(), &handle, &mut buf);
        assert_eq!(reply, AttributeReply::success(8));
        assert_eq!(decode_u64le(&buf[..8]), Some(21 * 1024 * 1024));
        assert_eq!(&buf[8..], &[0xFF; 4]);
    }

    #[test]
    fn test_negotiate_unknown_ordinal() {
        let handle = handle();
        let mut buf = [0u8; 64];
        assert_eq!(negotiate(42, &handle, &mut buf), AttributeReply::not_implemented());
    }

    #[test]
    fn test_negotiate_unknown_size() {
        let handle = ContentHandle::new("stream");
        let reply = negotiate(AttributeKind::ContentSize.as_raw(), &handle, &mut [0u8; 8]);
        assert_eq!(reply, AttributeReply::not_implemented());
    }

    #[test]
    fn test_negotiate_empty_session_is_success() {
        let handle = ContentHandle::new("a").with_session(Vec::new());
        let reply = negotiate(AttributeKind::Session.as_raw(), &handle, &mut []);
        assert_eq!(reply.status, ProviderStatus::Success);
        assert_eq!(reply.required_len, 0);
    }

    #[test]
    fn test_decoders_reject_malformed() {
        assert_eq!(decode_utf16z(&[0x61]), None);
        assert_eq!(decode_utf16z(&[0x61, 0x00]), None);
        assert_eq!(decode_utf16z(&[]), None);
        assert_eq!(decode_u64le(&[1, 2, 3]), None);
    }
}
