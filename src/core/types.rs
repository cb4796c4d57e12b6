//! Core protocol types used throughout the scanstream library.
//!
//! This module defines the fixed enumerations shared by the provider and
//! the scan engine: attribute kinds, provider status codes, call status
//! codes and verdicts. Ordinals and raw codes are interop-significant and
//! must not be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of attribute an engine may query from a content provider.
///
/// Discriminants match the wire ordinals exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum AttributeKind {
    /// Name of the calling application.
    AppName = 0,
    /// Name of the content, e.g. a filename.
    ContentName = 1,
    /// Length of the content in bytes.
    ContentSize = 2,
    /// Raw memory address of the content.
    ContentAddress = 3,
    /// Session handle correlating several scans.
    Session = 4,
    /// Size of the redirect chain.
    RedirectChainSize = 5,
    /// Address of the redirect chain.
    RedirectChainAddress = 6,
    /// Size of the concatenated content.
    AllSize = 7,
    /// Address of the concatenated content.
    AllAddress = 8,
    /// Quiet-mode flag.
    Quiet = 9,
}

impl AttributeKind {
    /// Every attribute kind, in ordinal order.
    pub const ALL: [AttributeKind; 10] = [
        Self::AppName,
        Self::ContentName,
        Self::ContentSize,
        Self::ContentAddress,
        Self::Session,
        Self::RedirectChainSize,
        Self::RedirectChainAddress,
        Self::AllSize,
        Self::AllAddress,
        Self::Quiet,
    ];

    /// Looks up an attribute kind by its wire ordinal.
    ///
    /// Returns `None` for ordinals outside the enumeration.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Returns the wire ordinal.
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AppName => "app_name",
            Self::ContentName => "content_name",
            Self::ContentSize => "content_size",
            Self::ContentAddress => "content_address",
            Self::Session => "session",
            Self::RedirectChainSize => "redirect_chain_size",
            Self::RedirectChainAddress => "redirect_chain_address",
            Self::AllSize => "all_size",
            Self::AllAddress => "all_address",
            Self::Quiet => "quiet",
        };
        f.write_str(name)
    }
}

/// Status returned by the provider for attribute and read requests.
///
/// These are expected protocol outcomes, not errors: the engine branches
/// on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// The request was served.
    Success,
    /// The attribute is unknown or not exposed by this provider.
    NotImplemented,
    /// The caller's buffer is smaller than the reported required length.
    InsufficientBuffer,
    /// The underlying content source failed to read.
    IoFailure,
}

impl ProviderStatus {
    /// `S_OK`
    pub const S_OK: u32 = 0x0000_0000;
    /// `E_NOTIMPL`
    pub const E_NOTIMPL: u32 = 0x8000_4001;
    /// `HRESULT_FROM_WIN32(ERROR_INSUFFICIENT_BUFFER)`
    pub const E_NOT_SUFFICIENT_BUFFER: u32 = 0x8007_007A;
    /// `HRESULT_FROM_WIN32(ERROR_READ_FAULT)`
    pub const E_READ_FAULT: u32 = 0x8007_001E;

    /// Returns `true` for [`ProviderStatus::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the raw HRESULT-style code for this status.
    pub fn as_hresult(self) -> u32 {
        match self {
            Self::Success => Self::S_OK,
            Self::NotImplemented => Self::E_NOTIMPL,
            Self::InsufficientBuffer => Self::E_NOT_SUFFICIENT_BUFFER,
            Self::IoFailure => Self::E_READ_FAULT,
        }
    }

    /// Maps a raw code back to a status, if it is one of the known codes.
    pub fn from_hresult(code: u32) -> Option<Self> {
        match code {
            Self::S_OK => Some(Self::Success),
            Self::E_NOTIMPL => Some(Self::NotImplemented),
            Self::E_NOT_SUFFICIENT_BUFFER => Some(Self::InsufficientBuffer),
            Self::E_READ_FAULT => Some(Self::IoFailure),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NotImplemented => write!(f, "not implemented"),
            Self::InsufficientBuffer => write!(f, "insufficient buffer"),
            Self::IoFailure => write!(f, "I/O failure"),
        }
    }
}

/// Status of the top-level scan call, independent of the verdict.
///
/// Only [`CallStatus::OK`] means a verdict was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallStatus(pub u32);

impl CallStatus {
    /// The call completed and produced a verdict.
    pub const OK: CallStatus = CallStatus(0x0000_0000);
    /// Unspecified failure (`E_FAIL`).
    pub const FAIL: CallStatus = CallStatus(0x8000_4005);
    /// The engine is not ready (`ERROR_NOT_READY`).
    pub const NOT_READY: CallStatus = CallStatus(0x8007_0015);
    /// The engine timed out (`ERROR_TIMEOUT`).
    pub const TIMEOUT: CallStatus = CallStatus(0x8007_05B4);
    /// The content source could not be read (`ERROR_READ_FAULT`).
    pub const READ_FAULT: CallStatus = CallStatus(0x8007_001E);
    /// The request was rejected before scanning (`E_INVALIDARG`).
    pub const INVALID_ARG: CallStatus = CallStatus(0x8007_0057);

    /// Returns `true` if this status means the call succeeded.
    pub fn is_success(self) -> bool {
        self == Self::OK
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// The engine's classification of scanned content.
///
/// Raw values are ordered by how strongly the engine believes the content
/// is unsafe, and that ordering is preserved by `Ord`.
///
/// # Examples
///
/// ```rust
/// use scanstream::core::{Verdict, VerdictClass};
///
/// assert_eq!(Verdict::CLEAN.class(), VerdictClass::Clean);
/// assert_eq!(Verdict::blocked_by_admin(3).class(), VerdictClass::BlockedByAdmin { tier: 3 });
/// assert!(Verdict::DETECTED.is_malware());
/// assert!(Verdict::NOT_DETECTED < Verdict::DETECTED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict(u32);

impl Verdict {
    /// Known good. No detection found, and the result is likely not going
    /// to change after a future definition update.
    pub const CLEAN: Verdict = Verdict(0);
    /// No detection found, but the result might change after an update.
    pub const NOT_DETECTED: Verdict = Verdict(1);
    /// First value of the administrator policy block range.
    pub const BLOCKED_BY_ADMIN_START: Verdict = Verdict(2);
    /// Last value of the administrator policy block range.
    pub const BLOCKED_BY_ADMIN_END: Verdict = Verdict(32767);
    /// Detection found. Any value at or above this is a detection.
    pub const DETECTED: Verdict = Verdict(32768);

    /// Wraps a raw verdict value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw verdict value.
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Builds an admin-policy block verdict for the given tier.
    ///
    /// Tier 0 is `BLOCKED_BY_ADMIN_START`; tiers past the end of the range
    /// saturate at `BLOCKED_BY_ADMIN_END`.
    pub fn blocked_by_admin(tier: u16) -> Self {
        let raw = Self::BLOCKED_BY_ADMIN_START.0.saturating_add(u32::from(tier));
        Self(raw.min(Self::BLOCKED_BY_ADMIN_END.0))
    }

    /// Classifies this verdict.
    pub fn class(self) -> VerdictClass {
        match self.0 {
            0 => VerdictClass::Clean,
            1 => VerdictClass::NotDetected,
            raw if raw <= Self::BLOCKED_BY_ADMIN_END.0 => VerdictClass::BlockedByAdmin {
                tier: (raw - Self::BLOCKED_BY_ADMIN_START.0) as u16,
            },
            _ => VerdictClass::Detected,
        }
    }

    /// Returns `true` if the engine reported a positive detection.
    pub fn is_malware(self) -> bool {
        self >= Self::DETECTED
    }

    /// Returns `true` if the content was blocked by administrator policy.
    pub fn is_blocked_by_admin(self) -> bool {
        matches!(self.class(), VerdictClass::BlockedByAdmin { .. })
    }

    /// Returns `true` if the content should not be allowed through.
    pub fn should_block(self) -> bool {
        self >= Self::BLOCKED_BY_ADMIN_START
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.class(), self.0)
    }
}

/// A decoded view of a [`Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerdictClass {
    /// Known good.
    Clean,
    /// Nothing found, may change with newer definitions.
    NotDetected,
    /// Blocked by an administrator policy tier.
    BlockedByAdmin {
        /// Offset into the admin block range, 0-based.
        tier: u16,
    },
    /// Positive detection.
    Detected,
}

impl fmt::Display for VerdictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::NotDetected => write!(f, "not_detected"),
            Self::BlockedByAdmin { tier } => write!(f, "blocked_by_admin[{}]", tier),
            Self::Detected => write!(f, "detected"),
        }
    }
}

/// Context information for a scan request.
///
/// This carries metadata about who requested the scan and why,
/// useful for audit logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanContext {
    /// Request or correlation ID for tracing.
    pub request_id: Option<String>,

    /// User identifier who initiated the scan.
    pub user_id: Option<String>,

    /// Source of the content (e.g., "upload", "script", "download").
    pub source: Option<String>,

    /// Additional custom metadata as key-value pairs.
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

impl ScanContext {
    /// Creates a new empty scan context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the user ID.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a custom metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
