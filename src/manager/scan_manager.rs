//! The scan manager implementation.

use crate::core::{
    into_raw_parts, ArcEngine, CallStatus, ContentHandle, ContentSource, ScanContext, ScanEngine,
    ScanError, ScanReport, Verdict, DEFAULT_APP_NAME,
};
use crate::provider::stream::check_declared_size;
use crate::provider::ContentProvider;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Configuration for the scan manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanManagerConfig {
    /// Application name reported through the `APP_NAME` attribute.
    pub app_name: String,

    /// Maximum content size to accept, if any. Content of unknown size is
    /// always accepted.
    pub max_content_size: Option<u64>,

    /// Whether to ask the engine to close the session after each scan.
    pub close_sessions: bool,
}

impl Default for ScanManagerConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            max_content_size: None,
            close_sessions: true,
        }
    }
}

impl ScanManagerConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        serde_json::from_str(json)
            .map_err(|e| ScanError::configuration(format!("invalid manager config: {}", e)))
    }

    /// Sets the application name.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the maximum content size.
    pub fn with_max_content_size(mut self, size: u64) -> Self {
        self.max_content_size = Some(size);
        self
    }

    /// Enables or disables closing engine sessions after each scan.
    pub fn with_close_sessions(mut self, enabled: bool) -> Self {
        self.close_sessions = enabled;
        self
    }
}

/// Builder for creating a `ScanManager`.
#[derive(Default)]
pub struct ScanManagerBuilder {
    engine: Option<ArcEngine>,
    config: ScanManagerConfig,
}

impl ScanManagerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine.
    pub fn with_engine<E: ScanEngine + 'static>(mut self, engine: E) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Sets an engine wrapped in an Arc.
    pub fn with_arc_engine(mut self, engine: ArcEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: ScanManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the scan manager.
    pub fn build(self) -> Result<ScanManager, ScanError> {
        let engine = self
            .engine
            .ok_or_else(|| ScanError::configuration("a scan engine is required"))?;

        if self.config.app_name.is_empty() {
            return Err(ScanError::configuration("app_name must not be empty"));
        }

        Ok(ScanManager {
            engine,
            config: self.config,
        })
    }
}

/// Runs scan sessions against one engine.
///
/// Each call creates a fresh [`ContentHandle`] and [`ContentProvider`] that
/// live only for that call, so concurrent scans share nothing but the
/// engine.
pub struct ScanManager {
    /// The engine that renders verdicts.
    engine: ArcEngine,
    /// Configuration.
    config: ScanManagerConfig,
}

impl ScanManager {
    /// Creates a new builder.
    pub fn builder() -> ScanManagerBuilder {
        ScanManagerBuilder::new()
    }

    /// Scans content from `source` under the given name.
    pub fn scan<S: ContentSource>(
        &self,
        name: impl Into<String>,
        source: S,
        context: ScanContext,
    ) -> Result<ScanReport, ScanError> {
        let handle = ContentHandle::new(name).with_app_name(self.config.app_name.clone());
        self.scan_with_handle(handle, source, context)
    }

    /// Scans content described by an explicit handle.
    ///
    /// Returns `Err` whenever the scan mechanism failed; a verdict is only
    /// reported on `Ok`. A handle whose declared size contradicts the
    /// source's length is rejected before the engine is invoked.
    pub fn scan_with_handle<S: ContentSource>(
        &self,
        handle: ContentHandle,
        source: S,
        context: ScanContext,
    ) -> Result<ScanReport, ScanError> {
        if let Err(err) = check_declared_size(&handle, &source) {
            crate::audit::emit_scan_failed(&handle, self.engine.name(), &err, &context);
            return Err(err);
        }

        let provider = ContentProvider::with_handle(handle, source)?;
        let handle = provider.handle();

        if let (Some(size), Some(max)) = (handle.size(), self.config.max_content_size) {
            if size > max {
                let err = ScanError::ContentTooLarge { size, max };
                crate::audit::emit_scan_failed(handle, self.engine.name(), &err, &context);
                return Err(err);
            }
        }

        crate::audit::emit_scan_started(handle, self.engine.name(), &context);

        let start = Instant::now();
        let result = self.engine.scan(&provider);
        let duration = start.elapsed();

        if self.config.close_sessions {
            self.engine.close_session(handle.session());
        }

        match result {
            Ok(verdict) => {
                let report = ScanReport::new(
                    verdict,
                    self.engine.name(),
                    handle.name(),
                    handle.size(),
                    duration,
                    context,
                );
                crate::audit::emit_scan_completed(&report);
                Ok(report)
            }
            Err(e) => {
                crate::audit::emit_scan_failed(handle, self.engine.name(), &e, &context);
                Err(e)
            }
        }
    }

    /// Scans and returns the two raw protocol channels.
    ///
    /// The verdict is `None` unless the call status is success.
    pub fn scan_raw<S: ContentSource>(
        &self,
        name: impl Into<String>,
        source: S,
    ) -> (CallStatus, Option<Verdict>) {
        into_raw_parts(&self.scan(name, source, ScanContext::new()))
    }

    /// Runs a scan on tokio's blocking thread pool.
    ///
    /// The protocol is synchronous; this lets async callers scan without
    /// stalling their executor.
    #[cfg(feature = "tokio-runtime")]
    pub async fn scan_blocking_task<S: ContentSource + 'static>(
        self: &Arc<Self>,
        name: impl Into<String>,
        source: S,
        context: ScanContext,
    ) -> Result<ScanReport, ScanError> {
        let manager = Arc::clone(self);
        let name = name.into();
        tokio::task::spawn_blocking(move || manager.scan(name, source, context))
            .await
            .map_err(|e| ScanError::internal(format!("scan task failed: {}", e)))?
    }

    /// Returns the engine.
    pub fn engine(&self) -> &ArcEngine {
        &self.engine
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ScanManagerConfig {
        &self.config
    }
}

impl std::fmt::Debug for ScanManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanManager")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockEngine;
    use crate::core::{BytesSource, SeekableSource, VerdictClass};
    use std::io::Cursor;

    fn manager(engine: MockEngine) -> ScanManager {
        ScanManager::builder().with_engine(engine).build().unwrap()
    }

    #[test]
    fn test_scan_manager_basic() {
        let manager = manager(MockEngine::new());
        let report = manager
            .scan("a.txt", BytesSource::new(b"test data".to_vec()), ScanContext::new())
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.class, VerdictClass::Clean);
        assert_eq!(report.engine, "mock");
        assert_eq!(report.content_name, "a.txt");
        assert_eq!(report.content_size, Some(9));
    }

    #[test]
    fn test_scan_manager_uses_config_app_name() {
        let engine = Arc::new(MockEngine::new());
        let manager = ScanManager::builder()
            .with_arc_engine(engine.clone())
            .with_config(ScanManagerConfig::new().with_app_name("gateway"))
            .build()
            .unwrap();

        manager
            .scan("a.txt", BytesSource::new(b"x".to_vec()), ScanContext::new())
            .unwrap();
        assert_eq!(engine.sessions_closed(), 1);
        assert_eq!(manager.config().app_name, "gateway");
    }

    #[test]
    fn test_scan_manager_content_too_large() {
        let engine = Arc::new(MockEngine::new());
        let manager = ScanManager::builder()
            .with_arc_engine(engine.clone())
            .with_config(ScanManagerConfig::new().with_max_content_size(10))
            .build()
            .unwrap();

        let result = manager.scan("big", BytesSource::new(vec![0u8; 100]), ScanContext::new());
        assert!(matches!(result, Err(ScanError::ContentTooLarge { size: 100, max: 10 })));
        assert_eq!(engine.scan_count(), 0);
    }

    #[test]
    fn test_scan_manager_rejects_understated_size() {
        let engine = Arc::new(MockEngine::new());
        let manager = ScanManager::builder()
            .with_arc_engine(engine.clone())
            .with_config(ScanManagerConfig::new().with_max_content_size(10))
            .build()
            .unwrap();

        let handle = ContentHandle::new("big").with_size(1);
        let source = BytesSource::new(vec![0u8; 100]);
        let result = manager.scan_with_handle(handle, source, ScanContext::new());

        assert!(matches!(result, Err(ScanError::Configuration { .. })));
        assert_eq!(engine.scan_count(), 0);
        assert_eq!(engine.sessions_closed(), 0);
    }

    #[test]
    fn test_scan_manager_size_limit_applies_to_declared_stream_size() {
        let engine = Arc::new(MockEngine::new());
        let manager = ScanManager::builder()
            .with_arc_engine(engine.clone())
            .with_config(ScanManagerConfig::new().with_max_content_size(10))
            .build()
            .unwrap();

        let handle = ContentHandle::new("pipe").with_size(50);
        let source = SeekableSource::with_unknown_length(Cursor::new(vec![0u8; 50]));
        let result = manager.scan_with_handle(handle, source, ScanContext::new());

        assert!(matches!(result, Err(ScanError::ContentTooLarge { size: 50, max: 10 })));
        assert_eq!(engine.scan_count(), 0);
    }

    #[test]
    fn test_scan_manager_mechanism_failure() {
        let engine = Arc::new(MockEngine::new_unavailable());
        let manager = ScanManager::builder()
            .with_arc_engine(engine.clone())
            .build()
            .unwrap();

        let (status, verdict) = manager.scan_raw("a", BytesSource::new(b"x".to_vec()));
        assert_eq!(status, CallStatus::NOT_READY);
        assert!(verdict.is_none());
        // Sessions are closed on failure too.
        assert_eq!(engine.sessions_closed(), 1);
    }

    #[test]
    fn test_builder_requires_engine() {
        let result = ScanManager::builder().build();
        assert!(matches!(result, Err(ScanError::Configuration { .. })));
    }

    #[test]
    fn test_builder_rejects_empty_app_name() {
        let result = ScanManager::builder()
            .with_engine(MockEngine::new())
            .with_config(ScanManagerConfig::new().with_app_name(""))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{"app_name": "mail", "max_content_size": 1024}"#;
        let config = ScanManagerConfig::from_json(json).unwrap();
        assert_eq!(config.app_name, "mail");
        assert_eq!(config.max_content_size, Some(1024));
        assert!(config.close_sessions);

        assert!(ScanManagerConfig::from_json("not json").is_err());
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_scan_blocking_task() {
        let manager = Arc::new(manager(MockEngine::new().with_signature(b"EVIL")));
        let source = BytesSource::new(b"..EVIL..".to_vec());
        let report = manager
            .scan_blocking_task("b.bin", source, ScanContext::new())
            .await
            .unwrap();
        assert!(report.is_malware());
    }
}
