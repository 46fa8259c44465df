//! Lifecycle event handling.
//!
//! [`ChainState`] owns the successor mirror and the pending opener groups,
//! and turns each lifecycle notification into the platform commands that
//! keep the browser's chains in step. Handlers run to completion
//! synchronously: by the time a handler returns, the mirror already shows
//! the post-mutation topology, whatever happens to the commands later.

// ============================================================================
// Imports
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::identifiers::TabId;
use crate::protocol::{
    ActivatedEvent, AttachedEvent, CreatedEvent, DetachedEvent, LifecycleEvent, PlatformCommand,
    RemovedEvent,
};

use super::builder::build_initial_chains;
use super::mutator::{RelocateMode, relocate};
use super::node::{Node, TabTable};
use super::opener::{OpenerGroups, activation_order};
use super::resolver::find_successor;

// ============================================================================
// ChainState
// ============================================================================

/// Successor mirror plus pending opener groups.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    /// Mirror of every known tab.
    pub(super) tabs: TabTable,
    /// Background tabs waiting for first activation.
    pub(super) groups: OpenerGroups,
    /// Tabs between detach and attach.
    detached: FxHashMap<TabId, Node>,
}

impl ChainState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state from registry snapshots.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            tabs: TabTable::from_nodes(nodes),
            ..Self::default()
        }
    }

    /// The successor mirror.
    #[inline]
    #[must_use]
    pub fn tabs(&self) -> &TabTable {
        &self.tabs
    }

    /// The pending opener groups.
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &OpenerGroups {
        &self.groups
    }

    /// Replaces the mirror with a fresh registry listing.
    ///
    /// Pending groups and detached tabs are forgotten.
    pub fn load(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.tabs = TabTable::from_nodes(nodes);
        self.groups.clear();
        self.detached.clear();
    }

    /// Threads each window into one chain headed by its active tab.
    pub fn build_initial_chains(&mut self, full_reset: bool) -> Vec<PlatformCommand> {
        build_initial_chains(&mut self.tabs, full_reset)
    }

    /// Relocates `nodes` relative to `anchor` in the mirror.
    pub fn relocate(
        &mut self,
        nodes: &[TabId],
        anchor: Option<TabId>,
        mode: RelocateMode,
    ) -> Option<PlatformCommand> {
        relocate(&mut self.tabs, nodes, anchor, mode)
    }

    /// Applies one lifecycle notification.
    ///
    /// Returns the commands to send to the platform, in order.
    pub fn apply(&mut self, event: &LifecycleEvent) -> Vec<PlatformCommand> {
        trace!(kind = event.kind(), tab_id = ?event.tab_id(), "Lifecycle event");

        match event {
            LifecycleEvent::Created(e) => self.on_created(e),
            LifecycleEvent::Activated(e) => self.on_activated(e),
            LifecycleEvent::Removed(e) => self.on_removed(e),
            LifecycleEvent::Detached(e) => self.on_detached(e),
            LifecycleEvent::Attached(e) => self.on_attached(e),
            LifecycleEvent::Unknown { .. } => Vec::new(),
        }
    }
}

// ============================================================================
// ChainState - Handlers
// ============================================================================

impl ChainState {
    /// Background tabs with a live opener join that opener's pending group.
    fn on_created(&mut self, event: &CreatedEvent) -> Vec<PlatformCommand> {
        let node = event.tab.clone();
        let (id, window, active, opener) = (node.id, node.window_id, node.active, node.opener_id);
        self.tabs.insert(node);

        let Some(opener) = opener.filter(|opener| self.tabs.window_of(*opener) == Some(window))
        else {
            return Vec::new();
        };
        if active {
            return Vec::new();
        }

        let command = match self.groups.push(opener, id) {
            None => self.relocate(&[id], Some(opener), RelocateMode::BEFORE),
            Some(previous) => self.relocate(&[id], Some(previous), RelocateMode::SPLICE_AFTER),
        };

        debug!(tab_id = %id, opener = %opener, "Background tab queued behind opener");
        command.into_iter().collect()
    }

    fn on_activated(&mut self, event: &ActivatedEvent) -> Vec<PlatformCommand> {
        let id = event.tab_id;

        if let Some(previous) = &event.previous_node {
            self.refresh(previous);
        }
        if let Some(previous) = event.previous_tab_id
            && let Some(node) = self.tabs.get_mut(previous)
        {
            node.active = false;
        }

        if let Some(node) = &event.node {
            self.refresh(node);
        }
        let Some(node) = self.tabs.get_mut(id) else {
            debug!(tab_id = %id, "Activated tab not indexed yet");
            return Vec::new();
        };
        node.active = true;
        node.discarded = false;
        if event.node.is_none() {
            node.last_accessed = node.last_accessed.max(now_millis());
        }

        if let Some(opener) = self.groups.opener_of(id) {
            return self.dissolve_group(opener, id, event.previous_tab_id);
        }

        match event.previous_tab_id {
            Some(previous) if previous != id => self
                .relocate(&[id], Some(previous), RelocateMode::BEFORE)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Chains a pending group once one of its members is activated.
    fn dissolve_group(
        &mut self,
        opener: TabId,
        activated: TabId,
        previous: Option<TabId>,
    ) -> Vec<PlatformCommand> {
        let members = self.groups.take(opener).unwrap_or_default();
        let in_group: FxHashSet<TabId> = members.iter().copied().collect();

        let ordered: Vec<TabId> = activation_order(&members, activated)
            .into_iter()
            .filter(|id| *id == activated || !self.tabs.is_discarded(*id))
            .collect();

        let outside = |id: &TabId| !in_group.contains(id);
        let successor = Some(opener)
            .filter(|opener| !self.tabs.is_discarded(*opener))
            .or_else(|| {
                previous
                    .and_then(|previous| find_successor(&self.tabs, previous, false))
                    .filter(outside)
            })
            .or_else(|| {
                members
                    .last()
                    .and_then(|last| self.tabs.successor(*last))
                    .filter(outside)
            });

        debug!(
            opener = %opener,
            tab_id = %activated,
            order = ?ordered,
            successor = ?successor,
            "Pending opener group dissolved"
        );

        self.relocate(&ordered, successor, RelocateMode::BEFORE)
            .into_iter()
            .collect()
    }

    fn on_removed(&mut self, event: &RemovedEvent) -> Vec<PlatformCommand> {
        self.forget(event.tab_id);
        Vec::new()
    }

    fn on_detached(&mut self, event: &DetachedEvent) -> Vec<PlatformCommand> {
        let snapshot = event.node.clone();
        if let Some(node) = self.forget(event.tab_id).or(snapshot) {
            self.detached.insert(event.tab_id, node);
        }
        Vec::new()
    }

    /// Re-homes a tab; the activation that follows places it in a chain.
    fn on_attached(&mut self, event: &AttachedEvent) -> Vec<PlatformCommand> {
        let stashed = self.detached.remove(&event.tab_id);
        let Some(mut node) = event.node.clone().or(stashed) else {
            debug!(tab_id = %event.tab_id, "Attached tab not indexed yet");
            return Vec::new();
        };

        node.window_id = event.new_window_id;
        node.successor_id = None;
        self.tabs.insert(node);
        Vec::new()
    }
}

// ============================================================================
// ChainState - Internal
// ============================================================================

impl ChainState {
    /// Drops a tab, closing the gap it leaves in its chain.
    ///
    /// The platform has already healed its own topology, so this is a plain
    /// mirror update with no command.
    fn forget(&mut self, id: TabId) -> Option<Node> {
        let next = self.tabs.successor(id);
        for pred in self.tabs.predecessors(id) {
            self.tabs.set_successor(pred, next.filter(|next| *next != pred));
        }

        self.groups.remove_member(id);
        self.tabs.remove(id)
    }

    /// Copies registry-owned fields from a snapshot, keeping the mirrored
    /// successor. Unknown tabs are inserted as-is.
    fn refresh(&mut self, snapshot: &Node) {
        match self.tabs.get(snapshot.id) {
            Some(current) if current.window_id != snapshot.window_id => {
                let mut node = snapshot.clone();
                node.successor_id = None;
                self.forget(snapshot.id);
                self.tabs.insert(node);
            }
            Some(_) => {
                if let Some(node) = self.tabs.get_mut(snapshot.id) {
                    node.active = snapshot.active;
                    node.last_accessed = snapshot.last_accessed;
                    node.discarded = snapshot.discarded;
                    node.opener_id = snapshot.opener_id;
                    node.title.clone_from(&snapshot.title);
                }
            }
            None => self.tabs.insert(snapshot.clone()),
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::resolver::chain_from;
    use crate::identifiers::WindowId;

    const WINDOW: WindowId = WindowId::new(1);

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    fn tabs(ids: &[u32]) -> Vec<TabId> {
        ids.iter().map(|id| tab(*id)).collect()
    }

    /// Opener 1 is active; 1 → 2 → 3.
    fn state() -> ChainState {
        ChainState::from_nodes([
            Node::new(tab(1), WINDOW).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), WINDOW).with_successor(tab(3)),
            Node::new(tab(3), WINDOW),
        ])
    }

    fn created(id: u32, opener: Option<u32>, active: bool) -> LifecycleEvent {
        let mut node = Node::new(tab(id), WINDOW).with_active(active);
        node.opener_id = opener.map(tab);
        LifecycleEvent::Created(CreatedEvent { tab: node })
    }

    fn activated(id: u32, previous: Option<u32>) -> LifecycleEvent {
        LifecycleEvent::Activated(ActivatedEvent {
            tab_id: tab(id),
            previous_tab_id: previous.map(tab),
            window_id: WINDOW,
            node: None,
            previous_node: None,
        })
    }

    fn removed(id: u32) -> LifecycleEvent {
        LifecycleEvent::Removed(RemovedEvent {
            tab_id: tab(id),
            window_id: Some(WINDOW),
            is_window_closing: false,
            node: None,
        })
    }

    #[test]
    fn test_created_active_or_openerless_is_passive() {
        let mut state = state();
        assert!(state.apply(&created(10, None, false)).is_empty());
        assert!(state.apply(&created(11, Some(1), true)).is_empty());
        assert!(state.groups().is_empty());
        assert!(state.tabs().contains(tab(10)));
    }

    #[test]
    fn test_background_tabs_queue_before_opener() {
        let mut state = state();

        let commands = state.apply(&created(10, Some(1), false));
        assert_eq!(
            commands,
            vec![PlatformCommand::MoveInSuccession {
                tab_ids: tabs(&[10]),
                anchor: tab(1),
                options: RelocateMode::BEFORE,
            }]
        );

        state.apply(&created(11, Some(1), false));
        state.apply(&created(12, Some(1), false));

        assert_eq!(chain_from(state.tabs(), tab(10)), tabs(&[10, 11, 12, 1, 2, 3]));
        assert_eq!(state.groups().members(tab(1)), tabs(&[10, 11, 12]).as_slice());
    }

    #[test]
    fn test_activating_group_member_reorders_group() {
        let mut state = state();
        state.apply(&created(10, Some(1), false));
        state.apply(&created(11, Some(1), false));
        state.apply(&created(12, Some(1), false));

        let commands = state.apply(&activated(11, Some(1)));

        assert_eq!(commands.len(), 1);
        assert_eq!(chain_from(state.tabs(), tab(11)), tabs(&[11, 10, 12, 1, 2, 3]));
        assert!(state.groups().is_empty());
        assert!(state.tabs().get(tab(11)).expect("node").active);
        assert!(!state.tabs().get(tab(1)).expect("node").active);
    }

    #[test]
    fn test_group_skips_discarded_members_and_opener() {
        let mut state = state();
        state.apply(&created(10, Some(1), false));
        state.apply(&created(11, Some(1), false));
        state.apply(&created(12, Some(1), false));
        state.tabs.get_mut(tab(10)).expect("node").discarded = true;
        state.tabs.get_mut(tab(1)).expect("node").discarded = true;
        state.tabs.get_mut(tab(12)).expect("node").discarded = true;

        // Opener is discarded, so the previous tab's first usable successor wins.
        state.apply(&activated(12, Some(1)));

        assert!(!state.tabs().is_discarded(tab(12)));
        assert_eq!(chain_from(state.tabs(), tab(12)), tabs(&[12, 11, 2, 3]));
    }

    #[test]
    fn test_group_falls_back_to_last_member_successor() {
        let mut state = state();
        state.apply(&created(10, Some(1), false));
        state.apply(&created(11, Some(1), false));
        state.tabs.get_mut(tab(1)).expect("node").discarded = true;
        // 10 → 1 → 2 → 11 → 3
        state.relocate(&[tab(11)], Some(tab(3)), RelocateMode::BEFORE);

        // The previous tab resolves to a group member, so neither the opener
        // nor the previous tab can supply the successor.
        let commands = state.apply(&activated(11, Some(10)));

        assert_eq!(commands.len(), 1);
        assert_eq!(chain_from(state.tabs(), tab(11)), tabs(&[11, 10, 3]));
        assert!(state.groups().is_empty());
    }

    #[test]
    fn test_activation_points_at_previous_tab() {
        let mut state = state();
        let commands = state.apply(&activated(3, Some(1)));

        assert_eq!(commands.len(), 1);
        assert_eq!(chain_from(state.tabs(), tab(3)), tabs(&[3, 1, 2]));
    }

    #[test]
    fn test_activation_without_previous_is_passive() {
        let mut state = state();
        assert!(state.apply(&activated(3, None)).is_empty());
        assert!(state.apply(&activated(3, Some(3))).is_empty());
        assert!(state.apply(&activated(42, Some(1))).is_empty());
    }

    #[test]
    fn test_removed_heals_chain_and_group() {
        let mut state = state();
        state.apply(&created(10, Some(1), false));
        state.apply(&created(11, Some(1), false));

        assert!(state.apply(&removed(2)).is_empty());
        assert_eq!(chain_from(state.tabs(), tab(10)), tabs(&[10, 11, 1, 3]));

        state.apply(&removed(10));
        assert_eq!(state.groups().members(tab(1)), tabs(&[11]).as_slice());
        state.apply(&removed(11));
        assert!(state.groups().is_empty());
        assert_eq!(chain_from(state.tabs(), tab(1)), tabs(&[1, 3]));
    }

    #[test]
    fn test_detach_attach_rehomes_tab() {
        let mut state = state();
        let other = WindowId::new(2);

        state.apply(&LifecycleEvent::Detached(DetachedEvent {
            tab_id: tab(2),
            old_window_id: Some(WINDOW),
            node: None,
        }));
        assert!(!state.tabs().contains(tab(2)));
        assert_eq!(chain_from(state.tabs(), tab(1)), tabs(&[1, 3]));

        let commands = state.apply(&LifecycleEvent::Attached(AttachedEvent {
            tab_id: tab(2),
            new_window_id: other,
            node: None,
        }));
        assert!(commands.is_empty());
        assert_eq!(state.tabs().window_of(tab(2)), Some(other));
        assert!(state.tabs().successor(tab(2)).is_none());
    }

    #[test]
    fn test_activation_snapshot_refreshes_registry_fields() {
        let mut state = state();
        let snapshot = Node::new(tab(3), WINDOW)
            .with_active(true)
            .with_last_accessed(500)
            .with_title("Fresh");

        state.apply(&LifecycleEvent::Activated(ActivatedEvent {
            tab_id: tab(3),
            previous_tab_id: Some(tab(1)),
            window_id: WINDOW,
            node: Some(snapshot),
            previous_node: None,
        }));

        let node = state.tabs().get(tab(3)).expect("node");
        assert_eq!(node.last_accessed, 500);
        assert_eq!(node.title, "Fresh");
        assert_eq!(node.successor_id, Some(tab(1)));
    }
}
