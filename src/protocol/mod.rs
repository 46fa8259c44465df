//! Wire message types.
//!
//! This module defines the messages exchanged with the browser side:
//! lifecycle notifications coming in and platform commands going out.
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Event` | Browser → Rust | Tab lifecycle notification |
//! | `PlatformCommand` | Rust → Browser | Succession, activation, discard |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Outgoing platform commands |
//! | `event` | Lifecycle notifications and typed payloads |

// ============================================================================
// Submodules
// ============================================================================

/// Outgoing platform commands.
pub mod command;

/// Lifecycle notifications.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::PlatformCommand;
pub use event::{
    ActivatedEvent, AttachedEvent, CreatedEvent, DetachedEvent, Event, LifecycleEvent,
    RemovedEvent,
};
