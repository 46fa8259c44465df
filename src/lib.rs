//! Tab Succession - explicit successor chains for browser tabs.
//!
//! When the active tab closes, the browser activates that tab's successor.
//! This library keeps every tab of every window threaded into a chain so the
//! successor is always the tab the user most plausibly wants next: the one
//! they came from, or the opener of a freshly visited background tab.
//!
//! # Architecture
//!
//! The browser owns the authoritative successor pointers. This side keeps a
//! local mirror and is its only writer:
//!
//! - **Mirror first**: every mutation is applied locally, then replayed on
//!   the browser through an ordered command queue
//! - **Fire and log**: rejected platform calls are logged, never retried
//! - **Sync handlers**: each lifecycle notification is handled and its
//!   commands queued under one lock, so handlers never interleave
//! - **Debounced audit**: bursts of events produce one consistency check
//!
//! # Quick Start
//!
//! ```no_run
//! use tab_succession::{Event, MemoryPlatform, Result, SuccessionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let manager = SuccessionManager::builder()
//!         .platform(MemoryPlatform::default())
//!         .build()?;
//!
//!     // Thread the open tabs into chains.
//!     manager.start().await?;
//!
//!     // Feed notifications as they arrive.
//!     let event: Event = serde_json::from_str(
//!         r#"{"method":"tabs.onActivated","params":{"tabId":2,"previousTabId":1,"windowId":1}}"#,
//!     )?;
//!     manager.handle_event(&event)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chain`] | Mirror, relocation, lifecycle handling, discard, audit |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`manager`] | [`SuccessionManager`] and its configuration |
//! | [`platform`] | [`Platform`] trait and command dispatch |
//! | [`protocol`] | Lifecycle events and platform commands |

// ============================================================================
// Modules
// ============================================================================

/// Succession chain bookkeeping.
///
/// Synchronous and side-effect free apart from the mirror it owns.
pub mod chain;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for tabs and windows.
pub mod identifiers;

/// Succession manager.
///
/// Use [`SuccessionManager::builder()`] to create a configured manager.
pub mod manager;

/// Browser-side primitives.
pub mod platform;

/// Wire message types.
pub mod protocol;

// ============================================================================
// Re-exports
// ============================================================================

// Chain types
pub use chain::{AuditReport, ChainState, Node, RelocateMode, TabTable, WindowAudit};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{TabId, WindowId};

// Manager types
pub use manager::{ManagerBuilder, ManagerOptions, SuccessionManager, SuccessorDrift};

// Platform types
pub use platform::{Dispatcher, MemoryPlatform, Platform};

// Protocol types
pub use protocol::{Event, LifecycleEvent, PlatformCommand};
