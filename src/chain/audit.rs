//! Chain auditing.
//!
//! Rebuilds every window's chain forest from the mirror without trusting it
//! to be well formed, and reports cycles, cross-window edges, and successors
//! pointing at tabs the mirror no longer knows. Purely observational.
//!
//! # Output
//!
//! ```json
//! {
//!   "windows": [{
//!     "windowId": 1,
//!     "active": 4,
//!     "withSuccessor": { "4": { "id": 4, "title": "...", "lastAccessed": 0, "successor": 2 } },
//!     "withoutSuccessor": { "2": { "id": 2, "title": "...", "lastAccessed": 0 } },
//!     "chains": [[{ "id": 4, ... }, { "id": 2, ... }]],
//!     "cycles": [],
//!     "crossWindow": [],
//!     "dangling": []
//!   }]
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::identifiers::{TabId, WindowId};

use super::node::{Node, TabTable};

// ============================================================================
// Report Types
// ============================================================================

/// Audit view of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    /// Tab ID.
    pub id: TabId,
    /// Tab title.
    pub title: String,
    /// Last access time.
    pub last_accessed: u64,
    /// Mirrored successor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successor: Option<TabId>,
}

impl From<&Node> for TabSummary {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            last_accessed: node.last_accessed,
            successor: node.successor_id,
        }
    }
}

/// Audit of one window's chain forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAudit {
    /// Window ID.
    pub window_id: WindowId,
    /// Active tab.
    pub active: Option<TabId>,
    /// Tabs that have a successor.
    pub with_successor: BTreeMap<TabId, TabSummary>,
    /// Tabs without a successor.
    pub without_successor: BTreeMap<TabId, TabSummary>,
    /// Every chain, head to end.
    pub chains: Vec<Vec<TabSummary>>,
    /// Tabs at which a walk looped back on itself.
    pub cycles: Vec<TabId>,
    /// Tabs whose successor lives in another window.
    pub cross_window: Vec<TabId>,
    /// Tabs whose successor the mirror does not know.
    pub dangling: Vec<TabId>,
}

impl WindowAudit {
    /// Returns `true` if no invariant violation was found.
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.cycles.is_empty() && self.cross_window.is_empty() && self.dangling.is_empty()
    }

    /// Chains as plain id lists.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<Vec<TabId>> {
        self.chains
            .iter()
            .map(|chain| chain.iter().map(|tab| tab.id).collect())
            .collect()
    }
}

/// Audit of every window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Per-window audits, ordered by window id.
    pub windows: Vec<WindowAudit>,
}

impl AuditReport {
    /// Returns `true` if every window is consistent.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.windows.iter().all(WindowAudit::is_consistent)
    }

    /// Returns the audit for one window.
    #[must_use]
    pub fn window(&self, window_id: WindowId) -> Option<&WindowAudit> {
        self.windows.iter().find(|w| w.window_id == window_id)
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Audit
// ============================================================================

/// Audits every window in the mirror.
#[must_use]
pub fn audit(table: &TabTable) -> AuditReport {
    AuditReport {
        windows: table
            .windows()
            .into_iter()
            .map(|window| audit_window(table, window))
            .collect(),
    }
}

/// Audits one window.
///
/// Tabs are visited active first, then by descending recency. Each walk
/// stops at an already-visited tab; the fresh segment is then prepended to
/// whatever chain that tab already resolved to.
#[must_use]
pub fn audit_window(table: &TabTable, window_id: WindowId) -> WindowAudit {
    let tabs = table.window_tabs(window_id);
    let mut audit = WindowAudit {
        window_id,
        active: table.active_tab(window_id),
        with_successor: BTreeMap::new(),
        without_successor: BTreeMap::new(),
        chains: Vec::new(),
        cycles: Vec::new(),
        cross_window: Vec::new(),
        dangling: Vec::new(),
    };

    // Chains are stored tail first, so prepending a segment is a push.
    // `resolved` maps each tab to its chain and its index in that chain.
    let mut visited: FxHashSet<TabId> = FxHashSet::default();
    let mut resolved: FxHashMap<TabId, (usize, usize)> = FxHashMap::default();
    let mut reversed: Vec<Vec<TabId>> = Vec::new();

    for node in &tabs {
        let summary = TabSummary::from(*node);
        if node.successor_id.is_some() {
            audit.with_successor.insert(node.id, summary);
        } else {
            audit.without_successor.insert(node.id, summary);
        }

        if visited.contains(&node.id) {
            continue;
        }

        let mut segment = Vec::new();
        let mut current = Some(node.id);
        while let Some(id) = current {
            if visited.contains(&id) {
                break;
            }
            visited.insert(id);
            segment.push(id);

            current = match table.successor(id) {
                Some(next) => match table.window_of(next) {
                    Some(window) if window == window_id => Some(next),
                    Some(_) => {
                        audit.cross_window.push(id);
                        None
                    }
                    None => {
                        audit.dangling.push(id);
                        None
                    }
                },
                None => None,
            };
        }

        let join = current;
        if let Some(join) = join
            && segment.contains(&join)
        {
            audit.cycles.push(join);
        }

        let index = match join.and_then(|join| resolved.get(&join).copied()) {
            Some((index, position)) if position + 1 == reversed[index].len() => index,
            Some((index, position)) => {
                let suffix = reversed[index][..=position].to_vec();
                reversed.push(suffix);
                reversed.len() - 1
            }
            None => {
                reversed.push(Vec::with_capacity(segment.len()));
                reversed.len() - 1
            }
        };
        for &id in segment.iter().rev() {
            resolved.insert(id, (index, reversed[index].len()));
            reversed[index].push(id);
        }
    }

    audit.chains = reversed
        .into_iter()
        .map(|chain| {
            chain
                .into_iter()
                .rev()
                .filter_map(|id| table.get(id).map(TabSummary::from))
                .collect()
        })
        .collect();
    audit
}

/// Audits the mirror and logs the outcome.
pub fn log_audit(table: &TabTable) -> AuditReport {
    let report = audit(table);

    for window in &report.windows {
        debug!(
            window_id = %window.window_id,
            active = ?window.active,
            chains = ?window.chain_ids(),
            "Succession audit"
        );

        if !window.is_consistent() {
            warn!(
                window_id = %window.window_id,
                cycles = ?window.cycles,
                cross_window = ?window.cross_window,
                dangling = ?window.dangling,
                "Succession invariant violated"
            );
        }
    }

    report
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    fn tabs(ids: &[u32]) -> Vec<TabId> {
        ids.iter().map(|id| tab(*id)).collect()
    }

    #[test]
    fn test_linear_chain() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), window).with_successor(tab(3)),
            Node::new(tab(3), window),
        ]);

        let report = audit(&table);
        let audit = report.window(window).expect("window audit");

        assert!(report.is_consistent());
        assert_eq!(audit.active, Some(tab(1)));
        assert_eq!(audit.chain_ids(), vec![tabs(&[1, 2, 3])]);
        assert_eq!(audit.with_successor.len(), 2);
        assert_eq!(audit.without_successor.len(), 1);
    }

    #[test]
    fn test_segment_prepended_to_recorded_chain() {
        let window = WindowId::new(1);
        // Tab 3 is visited first (most recent) and recorded as 3 → 4; the
        // later walk from 1 ends at 3 and is merged in front of it.
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_last_accessed(10).with_successor(tab(2)),
            Node::new(tab(2), window).with_last_accessed(20).with_successor(tab(3)),
            Node::new(tab(3), window).with_last_accessed(90).with_successor(tab(4)),
            Node::new(tab(4), window).with_last_accessed(5),
        ]);

        let audit = audit_window(&table, window);
        assert_eq!(audit.chain_ids(), vec![tabs(&[1, 2, 3, 4])]);
    }

    #[test]
    fn test_long_chain_built_tail_first() {
        let window = WindowId::new(1);
        // Most recent at the tail, so every walk is a single tab prepended
        // to the chain recorded just before it.
        let table = TabTable::from_nodes((1..=2000u32).map(|id| {
            let node = Node::new(tab(id), window).with_last_accessed(u64::from(id));
            if id < 2000 { node.with_successor(tab(id + 1)) } else { node }
        }));

        let audit = audit_window(&table, window);
        let chains = audit.chain_ids();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0], (1..=2000).map(tab).collect::<Vec<_>>());
    }

    #[test]
    fn test_branch_reported_as_separate_chain() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_active(true).with_successor(tab(3)),
            Node::new(tab(2), window).with_last_accessed(5).with_successor(tab(4)),
            Node::new(tab(3), window).with_last_accessed(9).with_successor(tab(4)),
            Node::new(tab(4), window),
        ]);

        let audit = audit_window(&table, window);
        assert!(audit.is_consistent());
        assert_eq!(audit.chain_ids(), vec![tabs(&[1, 3, 4]), tabs(&[2, 4])]);
    }

    #[test]
    fn test_cycle_detected() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), window).with_successor(tab(3)),
            Node::new(tab(3), window).with_successor(tab(1)),
        ]);

        let audit = audit_window(&table, window);
        assert_eq!(audit.cycles, vec![tab(1)]);
        assert_eq!(audit.chain_ids(), vec![tabs(&[1, 2, 3])]);
        assert!(!audit.is_consistent());
    }

    #[test]
    fn test_cross_window_and_dangling() {
        let table = TabTable::from_nodes([
            Node::new(tab(1), WindowId::new(1)).with_successor(tab(2)),
            Node::new(tab(2), WindowId::new(2)),
            Node::new(tab(3), WindowId::new(2)).with_successor(tab(99)),
        ]);

        let report = audit(&table);
        assert_eq!(report.window(WindowId::new(1)).expect("w1").cross_window, vec![tab(1)]);
        assert_eq!(report.window(WindowId::new(2)).expect("w2").dangling, vec![tab(3)]);
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_report_json_shape() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window)
                .with_active(true)
                .with_title("Home")
                .with_successor(tab(2)),
            Node::new(tab(2), window).with_title("Docs"),
        ]);

        let json: serde_json::Value =
            serde_json::from_str(&audit(&table).to_json().expect("json")).expect("parse");
        let window = &json["windows"][0];

        assert_eq!(window["windowId"], 1);
        assert_eq!(window["active"], 1);
        assert_eq!(window["withSuccessor"]["1"]["successor"], 2);
        assert_eq!(window["withoutSuccessor"]["2"]["title"], "Docs");
        assert_eq!(window["chains"][0][1]["id"], 2);
    }
}
