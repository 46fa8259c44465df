//! Tab nodes and the local successor mirror.
//!
//! [`TabTable`] holds one [`Node`] per open tab plus an explicit reverse-edge
//! index, so "who points at this tab" is a map lookup rather than a scan.
//! The successor pointer of a node must only be changed through
//! [`TabTable::set_successor`], which keeps both directions in step.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::identifiers::{TabId, WindowId, deserialize_optional_tab_id};

// ============================================================================
// Node
// ============================================================================

/// Snapshot of one browser tab, as far as succession cares.
///
/// Deserializes from the extension's `tabs.Tab` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Tab ID.
    pub id: TabId,

    /// Window the tab lives in.
    pub window_id: WindowId,

    /// Whether the tab is the active tab of its window.
    #[serde(default)]
    pub active: bool,

    /// Last time the tab was accessed, in milliseconds since the epoch.
    #[serde(default)]
    pub last_accessed: u64,

    /// Whether the tab content is unloaded.
    #[serde(default)]
    pub discarded: bool,

    /// Tab that opened this one.
    #[serde(
        default,
        rename = "openerTabId",
        deserialize_with = "deserialize_optional_tab_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub opener_id: Option<TabId>,

    /// Mirrored successor pointer.
    #[serde(
        default,
        rename = "successorTabId",
        deserialize_with = "deserialize_optional_tab_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub successor_id: Option<TabId>,

    /// Tab title (only used for audit output).
    #[serde(default)]
    pub title: String,
}

impl Node {
    /// Creates a bare node with no opener or successor.
    #[must_use]
    pub fn new(id: TabId, window_id: WindowId) -> Self {
        Self {
            id,
            window_id,
            active: false,
            last_accessed: 0,
            discarded: false,
            opener_id: None,
            successor_id: None,
            title: String::new(),
        }
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the last-accessed timestamp.
    #[must_use]
    pub fn with_last_accessed(mut self, last_accessed: u64) -> Self {
        self.last_accessed = last_accessed;
        self
    }

    /// Sets the discarded flag.
    #[must_use]
    pub fn with_discarded(mut self, discarded: bool) -> Self {
        self.discarded = discarded;
        self
    }

    /// Sets the opener.
    #[must_use]
    pub fn with_opener(mut self, opener_id: TabId) -> Self {
        self.opener_id = Some(opener_id);
        self
    }

    /// Sets the successor.
    #[must_use]
    pub fn with_successor(mut self, successor_id: TabId) -> Self {
        self.successor_id = Some(successor_id);
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Ordering key: active first, then most recently accessed, then id.
    #[inline]
    pub(crate) fn recency_key(&self) -> (bool, u64, std::cmp::Reverse<TabId>) {
        (self.active, self.last_accessed, std::cmp::Reverse(self.id))
    }
}

// ============================================================================
// TabTable
// ============================================================================

/// Local mirror of every known tab and its successor pointer.
#[derive(Debug, Clone, Default)]
pub struct TabTable {
    /// Nodes by tab ID.
    nodes: FxHashMap<TabId, Node>,
    /// Reverse edges: target → tabs whose successor is target.
    predecessors: FxHashMap<TabId, FxHashSet<TabId>>,
}

impl TabTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a list of snapshots.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut table = Self::new();
        for node in nodes {
            table.insert(node);
        }
        table
    }

    /// Inserts or replaces a node, indexing its successor edge.
    pub fn insert(&mut self, node: Node) {
        let id = node.id;
        let successor = node.successor_id;

        if let Some(old) = self.nodes.remove(&id) {
            self.unlink(id, old.successor_id);
        }

        self.nodes.insert(id, node);
        self.link(id, successor);
    }

    /// Removes a node and its outgoing edge.
    ///
    /// Incoming edges are left pointing at the missing id; callers heal them
    /// first when the chain should close over the gap.
    pub fn remove(&mut self, id: TabId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.unlink(id, node.successor_id);
        Some(node)
    }

    /// Returns the node for `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: TabId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access for registry-owned fields.
    ///
    /// Must not be used to change `successor_id`.
    #[inline]
    pub(crate) fn get_mut(&mut self, id: TabId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns `true` if the tab is known.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of known tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no tabs are known.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns the successor of `id`, if any.
    #[inline]
    #[must_use]
    pub fn successor(&self, id: TabId) -> Option<TabId> {
        self.nodes.get(&id).and_then(|node| node.successor_id)
    }

    /// Returns every tab whose successor is `id`, sorted by id.
    #[must_use]
    pub fn predecessors(&self, id: TabId) -> Vec<TabId> {
        let mut preds: Vec<TabId> = self
            .predecessors
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        preds.sort_unstable();
        preds
    }

    /// Returns the window of `id`.
    #[inline]
    #[must_use]
    pub fn window_of(&self, id: TabId) -> Option<WindowId> {
        self.nodes.get(&id).map(|node| node.window_id)
    }

    /// Returns `true` if the tab is discarded.
    ///
    /// Unknown tabs count as unusable.
    #[inline]
    #[must_use]
    pub fn is_discarded(&self, id: TabId) -> bool {
        self.nodes.get(&id).is_none_or(|node| node.discarded)
    }

    /// Points `id` at `successor`.
    ///
    /// Returns `false` if `id` is unknown or the pointer is unchanged.
    pub fn set_successor(&mut self, id: TabId, successor: Option<TabId>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.successor_id == successor {
            return false;
        }

        let old = std::mem::replace(&mut node.successor_id, successor);
        self.unlink(id, old);
        self.link(id, successor);
        true
    }

    /// All windows with at least one tab, sorted.
    #[must_use]
    pub fn windows(&self) -> Vec<WindowId> {
        let mut windows: Vec<WindowId> = self
            .nodes
            .values()
            .map(|node| node.window_id)
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        windows.sort_unstable();
        windows
    }

    /// Tabs of one window, active first, then by descending recency.
    #[must_use]
    pub fn window_tabs(&self, window_id: WindowId) -> Vec<&Node> {
        let mut tabs: Vec<&Node> = self
            .nodes
            .values()
            .filter(|node| node.window_id == window_id)
            .collect();
        tabs.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
        tabs
    }

    /// Active tab of a window.
    #[must_use]
    pub fn active_tab(&self, window_id: WindowId) -> Option<TabId> {
        self.nodes
            .values()
            .filter(|node| node.window_id == window_id && node.active)
            .max_by_key(|node| node.recency_key())
            .map(|node| node.id)
    }

    /// Adds the reverse edge for `id → successor`.
    fn link(&mut self, id: TabId, successor: Option<TabId>) {
        if let Some(target) = successor {
            self.predecessors.entry(target).or_default().insert(id);
        }
    }

    /// Drops the reverse edge for `id → successor`.
    fn unlink(&mut self, id: TabId, successor: Option<TabId>) {
        if let Some(target) = successor
            && let Some(set) = self.predecessors.get_mut(&target)
        {
            set.remove(&id);
            if set.is_empty() {
                self.predecessors.remove(&target);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
