//! Mock engine for testing.
//!
//! This module provides a configurable engine that drives a
//! [`ScanStream`] the way a real engine does: it negotiates the standard
//! attributes with probe-then-fetch, then pages through the content in
//! fixed-size chunks. Verdicts come from byte signatures, per-name admin
//! blocks and BLAKE3 hash lookups rather than real detection logic.

use crate::core::{AttributeKind, ProviderStatus, ScanError, ScanEngine, ScanStream, Verdict};
use crate::provider::{decode_u64le, decode_utf16z, fetch_attribute};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Paging behaviour of the mock engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockEngineConfig {
    /// Size of each read request in bytes.
    pub chunk_size: usize,
    /// Maximum number of bytes to read per scan. `None` reads everything.
    pub scan_budget: Option<u64>,
}

impl Default for MockEngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            scan_budget: None,
        }
    }
}

impl MockEngineConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read chunk size. Zero is raised to one byte.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sets the per-scan read budget.
    pub fn with_scan_budget(mut self, budget: u64) -> Self {
        self.scan_budget = Some(budget);
        self
    }
}

/// A mock engine for testing purposes.
///
/// # Examples
///
/// ```rust
/// use scanstream::backends::MockEngine;
/// use scanstream::core::{BytesSource, ScanEngine, Verdict};
/// use scanstream::provider::ContentProvider;
///
/// let engine = MockEngine::new().with_signature(b"EVIL");
///
/// let clean = ContentProvider::new("a.txt", BytesSource::new(b"harmless".to_vec()));
/// assert_eq!(engine.scan(&clean).unwrap(), Verdict::CLEAN);
///
/// let bad = ContentProvider::new("b.txt", BytesSource::new(b"xxEVILxx".to_vec()));
/// assert_eq!(engine.scan(&bad).unwrap(), Verdict::DETECTED);
/// ```
#[derive(Debug)]
pub struct MockEngine {
    /// Name of this engine instance.
    name: String,
    /// Paging configuration.
    config: MockEngineConfig,
    /// Byte patterns that produce a detection.
    signatures: Vec<Vec<u8>>,
    /// Admin block tiers keyed by content name.
    admin_blocks: HashMap<String, u16>,
    /// Verdicts keyed by BLAKE3 hash of the bytes read.
    responses: RwLock<HashMap<String, Verdict>>,
    /// Verdict when nothing else matches.
    default_verdict: Verdict,
    /// Counter for scan operations.
    scan_count: AtomicU64,
    /// Total bytes read across all scans.
    bytes_read: AtomicU64,
    /// Number of sessions closed.
    sessions_closed: AtomicU64,
    /// Whether scans fail as a mechanism failure.
    unavailable: RwLock<bool>,
}

/// What the engine learned from attribute negotiation.
#[derive(Debug, Default)]
struct SessionInfo {
    app_name: Option<String>,
    content_name: Option<String>,
    content_size: Option<u64>,
    session_len: Option<usize>,
}

impl MockEngine {
    /// Creates a new mock engine with default settings.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            config: MockEngineConfig::default(),
            signatures: Vec::new(),
            admin_blocks: HashMap::new(),
            responses: RwLock::new(HashMap::new()),
            default_verdict: Verdict::CLEAN,
            scan_count: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            sessions_closed: AtomicU64::new(0),
            unavailable: RwLock::new(false),
        }
    }

    /// Creates a mock engine that fails every scan as unavailable.
    pub fn new_unavailable() -> Self {
        let engine = Self::new();
        engine.make_unavailable();
        engine
    }

    /// Sets the name of this engine.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the paging configuration.
    pub fn with_config(mut self, config: MockEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a byte signature that produces a detection.
    pub fn with_signature(mut self, signature: impl AsRef<[u8]>) -> Self {
        let signature = signature.as_ref();
        if !signature.is_empty() {
            self.signatures.push(signature.to_vec());
        }
        self
    }

    /// Blocks content with the given name at an admin policy tier.
    pub fn with_admin_block(mut self, content_name: impl Into<String>, tier: u16) -> Self {
        self.admin_blocks.insert(content_name.into(), tier);
        self
    }

    /// Sets the verdict for content whose BLAKE3 hash matches.
    pub fn with_response(self, hash: impl Into<String>, verdict: Verdict) -> Self {
        self.add_response(hash, verdict);
        self
    }

    /// Sets the verdict returned when nothing matches.
    pub fn with_default_verdict(mut self, verdict: Verdict) -> Self {
        self.default_verdict = verdict;
        self
    }

    /// Adds a hash response (shared-reference version).
    pub fn add_response(&self, hash: impl Into<String>, verdict: Verdict) {
        self.responses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(hash.into(), verdict);
    }

    /// Returns the number of scans attempted.
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::Relaxed)
    }

    /// Returns the total number of bytes read across all scans.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of sessions closed.
    pub fn sessions_closed(&self) -> u64 {
        self.sessions_closed.load(Ordering::Relaxed)
    }

    /// Sets whether the engine is available.
    pub fn set_available(&self, available: bool) {
        *self
            .unavailable
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = !available;
    }

    /// Makes every subsequent scan fail as a mechanism failure.
    pub fn make_unavailable(&self) {
        self.set_available(false);
    }

    /// Makes the engine available again.
    pub fn make_available(&self) {
        self.set_available(true);
    }

    fn is_unavailable(&self) -> bool {
        *self
            .unavailable
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn negotiate(&self, stream: &dyn ScanStream) -> SessionInfo {
        let text = |kind| fetch_attribute(stream, kind).and_then(|bytes| decode_utf16z(&bytes));
        SessionInfo {
            app_name: text(AttributeKind::AppName),
            content_name: text(AttributeKind::ContentName),
            content_size: fetch_attribute(stream, AttributeKind::ContentSize)
                .and_then(|bytes| decode_u64le(&bytes)),
            session_len: fetch_attribute(stream, AttributeKind::Session).map(|bytes| bytes.len()),
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanEngine for MockEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn scan(&self, stream: &dyn ScanStream) -> Result<Verdict, ScanError> {
        self.scan_count.fetch_add(1, Ordering::Relaxed);

        if self.is_unavailable() {
            return Err(ScanError::engine_unavailable(&self.name, "engine is not running"));
        }

        let info = self.negotiate(stream);
        tracing::debug!(
            engine = %self.name,
            app_name = ?info.app_name,
            content_name = ?info.content_name,
            content_size = ?info.content_size,
            session_len = ?info.session_len,
            "Attributes negotiated"
        );

        let mut matcher = SignatureMatcher::new(&self.signatures);
        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; self.config.chunk_size.max(1)];
        let mut position = 0u64;

        loop {
            let request = match self.config.scan_budget {
                Some(budget) => {
                    let left = budget.saturating_sub(position);
                    if left == 0 {
                        tracing::debug!(engine = %self.name, position, "Scan budget reached");
                        break;
                    }
                    buf.len().min(usize::try_from(left).unwrap_or(usize::MAX))
                }
                None => buf.len(),
            };

            let reply = stream.read(position, &mut buf[..request]);
            match reply.status {
                ProviderStatus::Success => {}
                status => {
                    return Err(ScanError::source_read(
                        position,
                        std::io::Error::new(
                            std::io::ErrorKind::Other,
                            format!("provider reported {}", status),
                        ),
                    ));
                }
            }

            let chunk = &buf[..reply.bytes_read.min(request)];
            if chunk.is_empty() {
                break;
            }
            hasher.update(chunk);
            matcher.feed(chunk);
            position += chunk.len() as u64;
            self.bytes_read.fetch_add(chunk.len() as u64, Ordering::Relaxed);

            if chunk.len() < request || matcher.matched() {
                break;
            }
        }

        let verdict = if matcher.matched() {
            Verdict::DETECTED
        } else if let Some(tier) = info
            .content_name
            .as_deref()
            .and_then(|name| self.admin_blocks.get(name))
        {
            Verdict::blocked_by_admin(*tier)
        } else {
            let hash = hasher.finalize().to_hex().to_string();
            self.responses
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .get(&hash)
                .copied()
                .unwrap_or(self.default_verdict)
        };

        tracing::debug!(
            engine = %self.name,
            bytes_scanned = position,
            verdict = %verdict,
            "Scan finished"
        );

        Ok(verdict)
    }

    fn close_session(&self, _session: &[u8]) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Finds byte signatures in a stream of chunks, including matches that
/// straddle a chunk boundary.
struct SignatureMatcher<'a> {
    signatures: &'a [Vec<u8>],
    carry: Vec<u8>,
    keep: usize,
    matched: bool,
}

impl<'a> SignatureMatcher<'a> {
    fn new(signatures: &'a [Vec<u8>]) -> Self {
        let keep = signatures
            .iter()
            .map(|s| s.len().saturating_sub(1))
            .max()
            .unwrap_or(0);
        Self {
            signatures,
            carry: Vec::with_capacity(keep),
            keep,
            matched: false,
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        if self.matched || self.signatures.is_empty() {
            return;
        }

        let mut window = std::mem::take(&mut self.carry);
        window.extend_from_slice(chunk);

        self.matched = self
            .signatures
            .iter()
            .any(|sig| window.windows(sig.len()).any(|w| w == sig.as_slice()));

        let tail = window.len().saturating_sub(self.keep);
        self.carry = window.split_off(tail);
    }

    fn matched(&self) -> bool {
        self.matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BytesSource, ContentHandle, ReadReply};
    use crate::provider::ContentProvider;
    use std::sync::Mutex;

    /// Records every read request the engine makes.
    struct RecordingStream {
        inner: ContentProvider<BytesSource>,
        reads: Mutex<Vec<(u64, usize)>>,
    }

    impl ScanStream for RecordingStream {
        fn get_attribute(&self, kind: u32, buf: &mut [u8]) -> crate::core::AttributeReply {
            self.inner.get_attribute(kind, buf)
        }

        fn read(&self, position: u64, buf: &mut [u8]) -> ReadReply {
            self.reads.lock().unwrap().push((position, buf.len()));
            self.inner.read(position, buf)
        }
    }

    fn provider(data: &[u8]) -> ContentProvider<BytesSource> {
        ContentProvider::new("sample.bin", BytesSource::new(data.to_vec()))
    }

    #[test]
    fn test_mock_engine_clean() {
        let engine = MockEngine::new();
        let verdict = engine.scan(&provider(b"test data")).unwrap();
        assert_eq!(verdict, Verdict::CLEAN);
        assert_eq!(engine.scan_count(), 1);
        assert_eq!(engine.bytes_read(), 9);
    }

    #[test]
    fn test_mock_engine_unavailable() {
        let engine = MockEngine::new_unavailable();
        let result = engine.scan(&provider(b"data"));
        assert!(matches!(result, Err(ScanError::EngineUnavailable { .. })));
        assert_eq!(engine.bytes_read(), 0);

        engine.make_available();
        assert!(engine.scan(&provider(b"data")).is_ok());
    }

    #[test]
    fn test_signature_across_chunk_boundary() {
        let engine = MockEngine::new()
            .with_config(MockEngineConfig::new().with_chunk_size(4))
            .with_signature(b"MALWARE");

        let verdict = engine.scan(&provider(b"xxxxxxMALWARExxxx")).unwrap();
        assert_eq!(verdict, Verdict::DETECTED);
    }

    #[test]
    fn test_admin_block_by_name() {
        let engine = MockEngine::new().with_admin_block("sample.bin", 7);
        let verdict = engine.scan(&provider(b"anything")).unwrap();
        assert_eq!(verdict, Verdict::blocked_by_admin(7));
        assert!(verdict.is_blocked_by_admin());
    }

    #[test]
    fn test_hash_response() {
        let data = b"known content";
        let hash = blake3::hash(data).to_hex().to_string();
        let engine = MockEngine::new().with_response(hash, Verdict::NOT_DETECTED);
        assert_eq!(engine.scan(&provider(data)).unwrap(), Verdict::NOT_DETECTED);
    }

    #[test]
    fn test_chunked_reads_are_sequential() {
        let engine = MockEngine::new().with_config(MockEngineConfig::new().with_chunk_size(4));
        let stream = RecordingStream {
            inner: provider(&[1u8; 10]),
            reads: Mutex::new(Vec::new()),
        };

        engine.scan(&stream).unwrap();
        let reads = stream.reads.lock().unwrap().clone();
        assert_eq!(reads, vec![(0, 4), (4, 4), (8, 4)]);
    }

    #[test]
    fn test_scan_budget_limits_reads() {
        let engine = MockEngine::new()
            .with_config(MockEngineConfig::new().with_chunk_size(4).with_scan_budget(6))
            .with_signature(b"TAIL");

        let verdict = engine.scan(&provider(b"0123456789TAIL")).unwrap();
        assert_eq!(verdict, Verdict::CLEAN);
        assert_eq!(engine.bytes_read(), 6);
    }

    #[test]
    fn test_negotiation_reads_handle() {
        let handle = ContentHandle::new("doc.txt").with_app_name("unit-test");
        let source = BytesSource::new(b"abc".to_vec());
        let provider = ContentProvider::with_handle(handle, source).unwrap();
        let info = MockEngine::new().negotiate(&provider);

        assert_eq!(info.app_name.as_deref(), Some("unit-test"));
        assert_eq!(info.content_name.as_deref(), Some("doc.txt"));
        assert_eq!(info.content_size, Some(3));
        assert_eq!(info.session_len, Some(8));
    }

    #[test]
    fn test_config_from_json() {
        let config: MockEngineConfig = serde_json::from_str(r#"{"scan_budget": 4096}"#).unwrap();
        assert_eq!(config.chunk_size, 64 * 1024);
        assert_eq!(config.scan_budget, Some(4096));

        let config: MockEngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MockEngineConfig::default());

        assert!(serde_json::from_str::<MockEngineConfig>(r#"{"chunk_size": "big"}"#).is_err());
    }

    #[test]
    fn test_empty_signature_ignored() {
        let engine = MockEngine::new().with_signature(b"");
        assert_eq!(engine.scan(&provider(b"abc")).unwrap(), Verdict::CLEAN);
    }
}
