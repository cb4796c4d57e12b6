//! Content source abstraction for positional reads.
//!
//! A [`ContentSource`] is the byte source a provider exposes to the scan
//! engine. Every read is addressed by absolute position, so sources keep no
//! cursor that callers could observe. Implementations are provided for
//! in-memory bytes, any `Read + Seek` value (files included), and
//! `futures` async readers which are driven to completion on each call.

use crate::core::error::ScanError;

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use futures::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// A readable, seekable byte source.
///
/// # Implementation Notes
///
/// - `read_at` must not depend on earlier calls: the same `(position, len)`
///   must yield the same bytes every time.
/// - Reading at or past the end returns `Ok(0)`, not an error.
/// - A short count means end of content, so implementations fill `buf` as
///   far as the data allows.
pub trait ContentSource: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `position`.
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns the total length in bytes, if known in advance.
    fn length(&self) -> Option<u64>;
}

impl<S: ContentSource + ?Sized> ContentSource for Box<S> {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(position, buf)
    }

    fn length(&self) -> Option<u64> {
        (**self).length()
    }
}

impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(position, buf)
    }

    fn length(&self) -> Option<u64> {
        (**self).length()
    }
}

/// In-memory content.
///
/// # Examples
///
/// ```rust
/// use scanstream::core::{BytesSource, ContentSource};
///
/// let source = BytesSource::new(b"hello world".to_vec());
/// let mut buf = [0u8; 5];
/// assert_eq!(source.read_at(6, &mut buf).unwrap(), 5);
/// assert_eq!(&buf, b"world");
/// assert_eq!(source.read_at(100, &mut buf).unwrap(), 0);
/// ```
#[derive(Clone)]
pub struct BytesSource {
    data: Arc<[u8]>,
}

impl BytesSource {
    /// Creates a source over the given bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::from(data.into()),
        }
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for BytesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BytesSource")
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl From<Vec<u8>> for BytesSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for BytesSource {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl ContentSource for BytesSource {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(position) {
            Ok(start) if start < self.data.len() => start,
            _ => return Ok(0),
        };
        let remaining = &self.data[start..];
        let to_copy = std::cmp::min(buf.len(), remaining.len());
        buf[..to_copy].copy_from_slice(&remaining[..to_copy]);
        Ok(to_copy)
    }

    fn length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// Adapts any `Read + Seek` value into a [`ContentSource`].
///
/// The reader is guarded by a mutex owned by this source alone, so a
/// seek and the reads that follow it are never interleaved with another
/// call on the same source.
pub struct SeekableSource<R> {
    inner: Mutex<R>,
    length: Option<u64>,
}

impl<R: Read + Seek + Send> SeekableSource<R> {
    /// Wraps a reader, measuring its length by seeking to the end.
    pub fn new(mut reader: R) -> io::Result<Self> {
        let length = Seek::seek(&mut reader, SeekFrom::End(0))?;
        Seek::seek(&mut reader, SeekFrom::Start(0))?;
        Ok(Self {
            inner: Mutex::new(reader),
            length: Some(length),
        })
    }

    /// Wraps a reader whose length is not known in advance.
    pub fn with_unknown_length(reader: R) -> Self {
        Self {
            inner: Mutex::new(reader),
            length: None,
        }
    }

    /// Consumes the source, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SeekableSource<File> {
    /// Opens a file on disk as a content source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file)?)
    }
}

/// A file on disk.
pub type FileSource = SeekableSource<File>;

impl<R> std::fmt::Debug for SeekableSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekableSource")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek + Send> ContentSource for SeekableSource<R> {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Seek::seek(&mut *reader, SeekFrom::Start(position))?;
        fill_from(&mut *reader, buf)
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}

/// Reads until `buf` is full or the reader reports end of data.
fn fill_from<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Adapts an async reader into a blocking [`ContentSource`].
///
/// The protocol has no "data not ready" signal, so each call blocks the
/// calling thread until the async seek and reads complete. Do not use this
/// from inside an async executor's worker thread.
pub struct AsyncSource<R> {
    inner: Mutex<R>,
    length: Option<u64>,
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> AsyncSource<R> {
    /// Wraps an async reader whose length is not known.
    pub fn new(reader: R) -> Self {
        Self {
            inner: Mutex::new(reader),
            length: None,
        }
    }

    /// Sets the known content length.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

impl<R> std::fmt::Debug for AsyncSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSource")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> ContentSource for AsyncSource<R> {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        futures::executor::block_on(async {
            AsyncSeekExt::seek(&mut *reader, SeekFrom::Start(position)).await?;
            let mut filled = 0;
            while filled < buf.len() {
                match AsyncReadExt::read(&mut *reader, &mut buf[filled..]).await {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
            Ok(filled)
        })
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}
