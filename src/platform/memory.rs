//! In-memory platform.
//!
//! Holds its own authoritative [`TabTable`] and applies commands to it the
//! way the browser would. Useful for simulations and for checking that the
//! mirror a [`SuccessionManager`] keeps matches what the platform ends up
//! with.
//!
//! [`SuccessionManager`]: crate::manager::SuccessionManager

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::chain::{Node, RelocateMode, TabTable, chain_from, relocate};
use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};
use crate::protocol::PlatformCommand;

use super::Platform;

// ============================================================================
// MemoryPlatform
// ============================================================================

/// A platform whose browser is a table in memory.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tabs: TabTable,
    highlighted: FxHashMap<WindowId, Vec<TabId>>,
    log: Vec<PlatformCommand>,
    failing: bool,
}

impl MemoryPlatform {
    /// Creates a platform with the given tabs open.
    #[must_use]
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                tabs: TabTable::from_nodes(nodes),
                ..MemoryState::default()
            }),
        }
    }

    /// Makes every later call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    /// Sets the highlighted selection of a window.
    pub fn set_highlighted(&self, window_id: WindowId, tab_ids: Vec<TabId>) {
        self.inner.lock().highlighted.insert(window_id, tab_ids);
    }

    /// Opens a tab.
    pub fn open(&self, node: Node) {
        self.inner.lock().tabs.insert(node);
    }

    /// Closes a tab, splicing its predecessors onto its successor.
    pub fn close(&self, tab_id: TabId) -> Option<Node> {
        let mut state = self.inner.lock();
        let next = state.tabs.successor(tab_id);
        for pred in state.tabs.predecessors(tab_id) {
            state.tabs.set_successor(pred, next.filter(|next| *next != pred));
        }
        state.tabs.remove(tab_id)
    }

    /// Current successor of a tab.
    #[must_use]
    pub fn successor(&self, tab_id: TabId) -> Option<TabId> {
        self.inner.lock().tabs.successor(tab_id)
    }

    /// The chain starting at `tab_id`.
    #[must_use]
    pub fn chain_from(&self, tab_id: TabId) -> Vec<TabId> {
        chain_from(&self.inner.lock().tabs, tab_id)
    }

    /// Snapshot of one tab.
    #[must_use]
    pub fn node(&self, tab_id: TabId) -> Option<Node> {
        self.inner.lock().tabs.get(tab_id).cloned()
    }

    /// Snapshot of the whole table.
    #[must_use]
    pub fn table(&self) -> TabTable {
        self.inner.lock().tabs.clone()
    }

    /// Every command applied so far, rejected ones included.
    #[must_use]
    pub fn commands(&self) -> Vec<PlatformCommand> {
        self.inner.lock().log.clone()
    }

    /// Records a call and checks the failure switch.
    fn record(state: &mut MemoryState, command: PlatformCommand) -> Result<()> {
        trace!(method = command.method(), "Memory platform call");
        state.log.push(command);
        if state.failing {
            return Err(Error::platform("rejected"));
        }
        Ok(())
    }

    fn require(state: &MemoryState, tab_id: TabId) -> Result<()> {
        if state.tabs.contains(tab_id) {
            Ok(())
        } else {
            Err(Error::tab_not_found(tab_id))
        }
    }
}

// ============================================================================
// Platform Implementation
// ============================================================================

#[async_trait]
impl Platform for MemoryPlatform {
    async fn move_in_succession(
        &self,
        tab_ids: &[TabId],
        anchor: TabId,
        options: RelocateMode,
    ) -> Result<()> {
        let mut state = self.inner.lock();
        Self::record(
            &mut state,
            PlatformCommand::MoveInSuccession {
                tab_ids: tab_ids.to_vec(),
                anchor,
                options,
            },
        )?;
        Self::require(&state, anchor)?;
        relocate(&mut state.tabs, tab_ids, Some(anchor), options);
        Ok(())
    }

    async fn set_successor(&self, tab_id: TabId, successor: Option<TabId>) -> Result<()> {
        let mut state = self.inner.lock();
        Self::record(&mut state, PlatformCommand::SetSuccessor { tab_id, successor })?;
        Self::require(&state, tab_id)?;
        if let Some(successor) = successor {
            Self::require(&state, successor)?;
        }
        state.tabs.set_successor(tab_id, successor);
        Ok(())
    }

    async fn activate(&self, tab_id: TabId) -> Result<()> {
        let mut state = self.inner.lock();
        Self::record(&mut state, PlatformCommand::Activate { tab_id })?;
        let window = state
            .tabs
            .window_of(tab_id)
            .ok_or_else(|| Error::tab_not_found(tab_id))?;

        if let Some(previous) = state.tabs.active_tab(window)
            && let Some(node) = state.tabs.get_mut(previous)
        {
            node.active = false;
        }
        if let Some(node) = state.tabs.get_mut(tab_id) {
            node.active = true;
            node.discarded = false;
        }
        Ok(())
    }

    async fn discard(&self, tab_ids: &[TabId]) -> Result<()> {
        let mut state = self.inner.lock();
        Self::record(
            &mut state,
            PlatformCommand::Discard {
                tab_ids: tab_ids.to_vec(),
            },
        )?;
        for tab_id in tab_ids {
            if let Some(node) = state.tabs.get_mut(*tab_id)
                && !node.active
            {
                node.discarded = true;
            }
        }
        Ok(())
    }

    async fn query_tabs(&self) -> Result<Vec<Node>> {
        let state = self.inner.lock();
        if state.failing {
            return Err(Error::platform("rejected"));
        }
        let mut nodes: Vec<Node> = state.tabs.iter().cloned().collect();
        nodes.sort_unstable_by_key(|node| node.id);
        Ok(nodes)
    }

    async fn highlighted_tabs(&self, window_id: WindowId) -> Result<Vec<TabId>> {
        let state = self.inner.lock();
        if state.failing {
            return Err(Error::platform("rejected"));
        }
        if !state.tabs.windows().contains(&window_id) {
            return Err(Error::window_not_found(window_id));
        }
        Ok(state.highlighted.get(&window_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
