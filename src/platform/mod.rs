//! Browser-side primitives.
//!
//! The chain manager never owns the authoritative succession topology: the
//! browser does. [`Platform`] is the seam to it. Calls that mutate succession
//! are fire-and-log: they go through the [`Dispatcher`] in issue order, and a
//! rejection is logged but not retried, since the local mirror has already
//! moved on.
//!
//! ```text
//! ┌──────────────────┐   PlatformCommand   ┌────────────┐   async   ┌──────────┐
//! │ SuccessionManager│────────────────────►│ Dispatcher │──────────►│ Platform │
//! │  (mirror first)  │    mpsc, ordered    │  (worker)  │           │ (browser)│
//! └──────────────────┘                     └────────────┘           └──────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Ordered fire-and-log command worker |
//! | `memory` | In-memory authoritative platform |

// ============================================================================
// Submodules
// ============================================================================

/// Ordered command worker.
pub mod dispatcher;

/// In-memory platform.
pub mod memory;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::chain::{Node, RelocateMode};
use crate::error::Result;
use crate::identifiers::{TabId, WindowId};
use crate::protocol::PlatformCommand;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::Dispatcher;
pub use memory::MemoryPlatform;

// ============================================================================
// Platform
// ============================================================================

/// The browser's tab primitives.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Relocates `tab_ids` relative to `anchor` in the authoritative
    /// succession.
    async fn move_in_succession(
        &self,
        tab_ids: &[TabId],
        anchor: TabId,
        options: RelocateMode,
    ) -> Result<()>;

    /// Sets one tab's successor.
    async fn set_successor(&self, tab_id: TabId, successor: Option<TabId>) -> Result<()>;

    /// Activates a tab.
    async fn activate(&self, tab_id: TabId) -> Result<()>;

    /// Discards tabs.
    async fn discard(&self, tab_ids: &[TabId]) -> Result<()>;

    /// Lists every open tab.
    async fn query_tabs(&self) -> Result<Vec<Node>>;

    /// Lists the highlighted tabs of a window.
    async fn highlighted_tabs(&self, window_id: WindowId) -> Result<Vec<TabId>>;

    /// Runs one command.
    async fn execute(&self, command: &PlatformCommand) -> Result<()> {
        match command {
            PlatformCommand::MoveInSuccession {
                tab_ids,
                anchor,
                options,
            } => self.move_in_succession(tab_ids, *anchor, *options).await,
            PlatformCommand::SetSuccessor { tab_id, successor } => {
                self.set_successor(*tab_id, *successor).await
            }
            PlatformCommand::Activate { tab_id } => self.activate(*tab_id).await,
            PlatformCommand::Discard { tab_ids } => self.discard(tab_ids).await,
        }
    }
}
