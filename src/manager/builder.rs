//! Builder pattern for manager configuration.
//!
//! # Example
//!
//! ```
//! use tab_succession::{MemoryPlatform, SuccessionManager};
//!
//! # async fn example() -> tab_succession::Result<()> {
//! let manager = SuccessionManager::builder()
//!     .platform(MemoryPlatform::default())
//!     .audit(false)
//!     .build()?;
//!
//! manager.start().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::platform::Platform;

use super::core::SuccessionManager;
use super::options::ManagerOptions;

// ============================================================================
// ManagerBuilder
// ============================================================================

/// Builder for configuring a [`SuccessionManager`].
///
/// Use [`SuccessionManager::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ManagerBuilder {
    /// Browser primitives.
    platform: Option<Arc<dyn Platform>>,
    /// Behavior switches.
    options: ManagerOptions,
}

impl fmt::Debug for ManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerBuilder")
            .field("platform", &self.platform.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// ManagerBuilder Implementation
// ============================================================================

impl ManagerBuilder {
    /// Creates a builder with default options and no platform.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the platform.
    #[inline]
    #[must_use]
    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Arc::new(platform));
        self
    }

    /// Sets a platform that is shared with other owners.
    #[inline]
    #[must_use]
    pub fn shared_platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Replaces all options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Turns the debounced audit on or off.
    #[inline]
    #[must_use]
    pub fn audit(mut self, enabled: bool) -> Self {
        self.options.audit_enabled = enabled;
        self
    }

    /// Sets the audit quiet period.
    #[inline]
    #[must_use]
    pub fn audit_debounce(mut self, debounce: Duration) -> Self {
        self.options.audit_debounce = debounce;
        self
    }

    /// Builds the manager and spawns its dispatcher.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no platform was set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<SuccessionManager> {
        let platform = self.platform.ok_or_else(|| {
            Error::config(
                "Platform is required. Use .platform() to set it.\n\
                 Example: SuccessionManager::builder().platform(MemoryPlatform::default())",
            )
        })?;
        self.options.validate().map_err(Error::config)?;

        Ok(SuccessionManager::new(platform, self.options))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryPlatform;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ManagerBuilder::new();
        assert!(builder.platform.is_none());
        assert_eq!(builder.options, ManagerOptions::default());
    }

    #[test]
    fn test_build_without_platform() {
        let err = ManagerBuilder::new().build().expect_err("no platform");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_rejects_invalid_options() {
        let err = ManagerBuilder::new()
            .platform(MemoryPlatform::default())
            .audit(true)
            .audit_debounce(Duration::ZERO)
            .build()
            .expect_err("zero debounce");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_setters_update_options() {
        let builder = ManagerBuilder::new()
            .options(ManagerOptions::new().with_reset_on_start())
            .audit(true)
            .audit_debounce(Duration::from_millis(10));

        assert!(builder.options.reset_on_start);
        assert!(builder.options.audit_enabled);
        assert_eq!(builder.options.audit_debounce, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_build_with_platform() {
        let manager = ManagerBuilder::new()
            .platform(MemoryPlatform::default())
            .audit(false)
            .build()
            .expect("manager");
        assert!(manager.snapshot().tabs().is_empty());
    }
}
