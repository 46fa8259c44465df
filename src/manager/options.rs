//! Manager configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tab_succession::ManagerOptions;
//!
//! let options = ManagerOptions::new()
//!     .with_audit(true)
//!     .with_audit_debounce(Duration::from_millis(250))
//!     .with_reset_on_start();
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Quiet period before a scheduled audit runs.
pub const DEFAULT_AUDIT_DEBOUNCE: Duration = Duration::from_secs(1);

// ============================================================================
// ManagerOptions
// ============================================================================

/// Behavior switches for a [`SuccessionManager`].
///
/// [`SuccessionManager`]: super::SuccessionManager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Run the chain audit after mutations settle.
    ///
    /// On by default in debug builds only.
    pub audit_enabled: bool,

    /// How long the mirror must stay quiet before the audit runs.
    pub audit_debounce: Duration,

    /// Ignore existing successors when building the initial chains.
    pub reset_on_start: bool,

    /// Discard the whole highlighted selection when the initiating tab is
    /// part of it.
    pub discard_highlighted: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl ManagerOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            audit_enabled: cfg!(debug_assertions),
            audit_debounce: DEFAULT_AUDIT_DEBOUNCE,
            reset_on_start: false,
            discard_highlighted: true,
        }
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ManagerOptions {
    /// Turns the debounced audit on or off.
    #[inline]
    #[must_use]
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Sets the audit quiet period.
    #[inline]
    #[must_use]
    pub fn with_audit_debounce(mut self, debounce: Duration) -> Self {
        self.audit_debounce = debounce;
        self
    }

    /// Rebuilds chains from scratch on start.
    #[inline]
    #[must_use]
    pub fn with_reset_on_start(mut self) -> Self {
        self.reset_on_start = true;
        self
    }

    /// Sets whether discards cover the highlighted selection.
    #[inline]
    #[must_use]
    pub fn with_discard_highlighted(mut self, enabled: bool) -> Self {
        self.discard_highlighted = enabled;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ManagerOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.audit_enabled && self.audit_debounce.is_zero() {
            return Err("Audit debounce must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
