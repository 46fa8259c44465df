//! Error types for tab succession.
//!
//! Lifecycle handlers never surface these: a chain operation that cannot
//! complete degrades to "no chain change this time". Errors are returned only
//! from explicit entry points such as [`SuccessionManager::discard`] or event
//! parsing, and from the [`Platform`] trait.
//!
//! [`SuccessionManager::discard`]: crate::SuccessionManager::discard
//! [`Platform`]: crate::platform::Platform
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Lookup | [`Error::TabNotFound`], [`Error::WindowNotFound`], [`Error::InvalidTabId`] |
//! | Platform | [`Error::Platform`], [`Error::DispatcherClosed`] |
//! | Protocol | [`Error::InvalidEvent`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{TabId, WindowId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when manager options are invalid or incomplete.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// Tab not found.
    ///
    /// Returned when a tab id does not resolve in the mirror.
    #[error("Tab not found: {tab_id}")]
    TabNotFound {
        /// The missing tab ID.
        tab_id: TabId,
    },

    /// Window not found.
    #[error("Window not found: {window_id}")]
    WindowNotFound {
        /// The missing window ID.
        window_id: WindowId,
    },

    /// A raw value that Firefox never assigns as a tab id.
    #[error("Invalid tab id: {raw}")]
    InvalidTabId {
        /// The rejected value.
        raw: u32,
    },

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// The platform rejected a call.
    ///
    /// Relocation rejections are logged and dropped; the mirror stays
    /// authoritative for later decisions.
    #[error("Platform error: {message}")]
    Platform {
        /// Description from the platform.
        message: String,
    },

    /// The command dispatcher has shut down.
    #[error("Dispatcher closed")]
    DispatcherClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A lifecycle notification could not be decoded.
    #[error("Invalid event {method}: {message}")]
    InvalidEvent {
        /// Event method.
        method: String,
        /// What was wrong with it.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a tab not found error.
    #[inline]
    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self::TabNotFound { tab_id }
    }

    /// Creates a window not found error.
    #[inline]
    pub fn window_not_found(window_id: WindowId) -> Self {
        Self::WindowNotFound { window_id }
    }

    /// Creates a platform error.
    #[inline]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// Creates an invalid event error.
    #[inline]
    pub fn invalid_event(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            method: method.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if a referenced tab or window no longer resolves.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TabNotFound { .. } | Self::WindowNotFound { .. })
    }

    /// Returns `true` if the error came from the platform side.
    #[inline]
    #[must_use]
    pub fn is_platform_error(&self) -> bool {
        matches!(self, Self::Platform { .. } | Self::DispatcherClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================
