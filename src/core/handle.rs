//! Per-scan content metadata.

use serde::{Deserialize, Serialize};

/// Width in bytes of the default session token.
///
/// The null session handle is encoded as a pointer-width zero value. The
/// width is pinned to 8 so the encoded length does not vary by host.
pub const SESSION_TOKEN_LEN: usize = 8;

/// Default application name reported to engines.
pub const DEFAULT_APP_NAME: &str = "scanstream";

/// Metadata describing the content of one scan session.
///
/// A handle is built once per scan invocation and is immutable after that:
/// there are only consuming builders, no setters.
///
/// # Examples
///
/// ```rust
/// use scanstream::core::ContentHandle;
///
/// let handle = ContentHandle::new("report.pdf")
///     .with_app_name("mail-gateway")
///     .with_size(4096);
///
/// assert_eq!(handle.name(), "report.pdf");
/// assert_eq!(handle.size(), Some(4096));
/// assert_eq!(handle.session(), &[0u8; 8]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHandle {
    name: String,
    app_name: String,
    size: Option<u64>,
    session: Vec<u8>,
}

impl ContentHandle {
    /// Creates a handle for content with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_name: DEFAULT_APP_NAME.to_string(),
            size: None,
            session: vec![0u8; SESSION_TOKEN_LEN],
        }
    }

    /// Sets the calling application's name.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the content length.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the content length, or marks it unknown with `None`.
    pub fn with_size_hint(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Sets the raw session token. An empty token is allowed.
    pub fn with_session(mut self, session: impl Into<Vec<u8>>) -> Self {
        self.session = session.into();
        self
    }

    /// Returns the content name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the calling application's name.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the content length, if known.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns the raw session token.
    pub fn session(&self) -> &[u8] {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_defaults() {
        let handle = ContentHandle::new("a.txt");
        assert_eq!(handle.app_name(), DEFAULT_APP_NAME);
        assert_eq!(handle.size(), None);
        assert_eq!(handle.session().len(), SESSION_TOKEN_LEN);
        assert!(handle.session().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_handle_empty_session() {
        let handle = ContentHandle::new("a.txt").with_session(Vec::new());
        assert!(handle.session().is_empty());
    }

    #[test]
    fn test_handle_size_hint() {
        let handle = ContentHandle::new("a.txt").with_size(5).with_size_hint(None);
        assert_eq!(handle.size(), None);
    }
}
