//! Chain walking.
//!
//! Every walk here carries its own visited set, so a corrupted mirror with a
//! cycle in it terminates instead of spinning.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;

use crate::identifiers::TabId;

use super::node::TabTable;

// ============================================================================
// Successor Resolution
// ============================================================================

/// Finds the nearest usable (non-discarded) tab starting at `start`.
///
/// `start` itself is returned when it is usable. Otherwise the chain is
/// followed until a usable tab is found. With `first_only`, at most one hop
/// is taken. Returns `None` when the chain ends, loops, or hits a tab the
/// mirror does not know.
#[must_use]
pub fn find_successor(table: &TabTable, start: TabId, first_only: bool) -> Option<TabId> {
    let mut visited = FxHashSet::default();
    let mut current = start;

    loop {
        let node = table.get(current)?;
        if !node.discarded {
            return Some(current);
        }
        if !visited.insert(current) || (first_only && current != start) {
            return None;
        }
        current = node.successor_id?;
    }
}

/// Walks forward from `from` past every tab for which `skip` holds.
///
/// Returns the first tab that is not skipped, or `None` if the chain ends
/// or cycles back on itself first.
#[must_use]
pub fn next_outside(
    table: &TabTable,
    from: Option<TabId>,
    mut skip: impl FnMut(TabId) -> bool,
) -> Option<TabId> {
    let mut visited = FxHashSet::default();
    let mut current = from?;

    while skip(current) {
        if !visited.insert(current) {
            return None;
        }
        current = table.successor(current)?;
    }
    Some(current)
}

/// Collects the chain starting at `start`, stopping before any repeat.
#[must_use]
pub fn chain_from(table: &TabTable, start: TabId) -> Vec<TabId> {
    ChainIter::new(table, start).collect()
}

// ============================================================================
// ChainIter
// ============================================================================

/// Cycle-safe iterator over a succession chain.
///
/// Yields `start` first, then each successor until the chain ends or a tab
/// repeats.
pub struct ChainIter<'a> {
    table: &'a TabTable,
    next: Option<TabId>,
    visited: FxHashSet<TabId>,
}

impl<'a> ChainIter<'a> {
    /// Creates an iterator rooted at `start`.
    #[must_use]
    pub fn new(table: &'a TabTable, start: TabId) -> Self {
        Self {
            table,
            next: Some(start),
            visited: FxHashSet::default(),
        }
    }
}

impl Iterator for ChainIter<'_> {
    type Item = TabId;

    fn next(&mut self) -> Option<TabId> {
        let current = self.next.take()?;
        if !self.table.contains(current) || !self.visited.insert(current) {
            return None;
        }
        self.next = self.table.successor(current);
        Some(current)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::node::Node;
    use crate::identifiers::WindowId;

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    /// 1 → 2 → 3 → 4, with 2 and 3 discarded.
    fn table() -> TabTable {
        let window = WindowId::new(1);
        TabTable::from_nodes([
            Node::new(tab(1), window).with_successor(tab(2)),
            Node::new(tab(2), window).with_successor(tab(3)).with_discarded(true),
            Node::new(tab(3), window).with_successor(tab(4)).with_discarded(true),
            Node::new(tab(4), window),
        ])
    }

    #[test]
    fn test_find_successor_returns_usable_start() {
        assert_eq!(find_successor(&table(), tab(1), false), Some(tab(1)));
    }

    #[test]
    fn test_find_successor_skips_discarded() {
        assert_eq!(find_successor(&table(), tab(2), false), Some(tab(4)));
    }

    #[test]
    fn test_find_successor_first_only() {
        assert_eq!(find_successor(&table(), tab(2), true), None);
        assert_eq!(find_successor(&table(), tab(3), true), Some(tab(4)));
    }

    #[test]
    fn test_find_successor_unknown_tab() {
        assert_eq!(find_successor(&table(), tab(99), false), None);
    }

    #[test]
    fn test_find_successor_breaks_cycles() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_successor(tab(2)).with_discarded(true),
            Node::new(tab(2), window).with_successor(tab(1)).with_discarded(true),
        ]);
        assert_eq!(find_successor(&table, tab(1), false), None);
    }

    #[test]
    fn test_next_outside() {
        let table = table();
        assert_eq!(next_outside(&table, Some(tab(2)), |t| t == tab(2)), Some(tab(3)));
        assert_eq!(
            next_outside(&table, Some(tab(2)), |t| table.is_discarded(t)),
            Some(tab(4))
        );
        assert_eq!(next_outside(&table, Some(tab(4)), |_| true), None);
        assert_eq!(next_outside(&table, None, |_| false), None);
    }

    #[test]
    fn test_chain_iter_stops_on_cycle() {
        let window = WindowId::new(1);
        let table = TabTable::from_nodes([
            Node::new(tab(1), window).with_successor(tab(2)),
            Node::new(tab(2), window).with_successor(tab(3)),
            Node::new(tab(3), window).with_successor(tab(1)),
        ]);
        assert_eq!(chain_from(&table, tab(2)), vec![tab(2), tab(3), tab(1)]);
    }
}
