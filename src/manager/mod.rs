//! Succession manager.
//!
//! This module provides the main entry point: a handle that receives tab
//! lifecycle notifications and keeps the browser's successor chains in step.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SuccessionManager`] | Mirror owner and event entry point |
//! | [`ManagerBuilder`] | Fluent configuration builder |
//! | [`ManagerOptions`] | Audit, reset and discard switches |
//! | [`SuccessorDrift`] | One mirror/platform disagreement |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for manager configuration.
pub mod builder;

/// Core manager implementation.
pub mod core;

/// Manager options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ManagerBuilder;
pub use core::{SuccessionManager, SuccessorDrift};
pub use options::{DEFAULT_AUDIT_DEBOUNCE, ManagerOptions};
