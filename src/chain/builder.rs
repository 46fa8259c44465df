//! Initial chain construction.
//!
//! Threads every window's tabs into a single chain headed by the active tab,
//! followed by the rest in order of most recent access.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::identifiers::TabId;
use crate::protocol::PlatformCommand;

use super::mutator::{RelocateMode, relocate};
use super::node::TabTable;

// ============================================================================
// Builder
// ============================================================================

/// Builds one chain per window.
///
/// Tabs that already carry a successor are left alone unless `full_reset` is
/// set, in which case every tab is re-threaded. The tail of an existing
/// chain has no successor, so the new chain continues from it.
pub fn build_initial_chains(table: &mut TabTable, full_reset: bool) -> Vec<PlatformCommand> {
    let mut commands = Vec::new();

    for window in table.windows() {
        let order: Vec<TabId> = table
            .window_tabs(window)
            .into_iter()
            .filter(|node| full_reset || node.successor_id.is_none())
            .map(|node| node.id)
            .collect();

        debug!(window_id = %window, tabs = order.len(), full_reset, "Building initial chain");

        if let Some(command) = relocate(table, &order, None, RelocateMode::BEFORE) {
            commands.push(command);
        }
    }

    commands
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::node::Node;
    use crate::chain::resolver::chain_from;
    use crate::identifiers::WindowId;

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    fn table() -> TabTable {
        let w1 = WindowId::new(1);
        let w2 = WindowId::new(2);
        TabTable::from_nodes([
            Node::new(tab(1), w1).with_last_accessed(100),
            Node::new(tab(2), w1).with_active(true).with_last_accessed(50),
            Node::new(tab(3), w1).with_last_accessed(300),
            Node::new(tab(4), w2).with_active(true).with_last_accessed(10),
            Node::new(tab(5), w2).with_last_accessed(20),
        ])
    }

    #[test]
    fn test_one_chain_per_window_headed_by_active() {
        let mut table = table();
        let commands = build_initial_chains(&mut table, false);

        assert_eq!(commands.len(), 2);
        assert_eq!(chain_from(&table, tab(2)), vec![tab(2), tab(3), tab(1)]);
        assert_eq!(chain_from(&table, tab(4)), vec![tab(4), tab(5)]);
    }

    #[test]
    fn test_existing_links_untouched() {
        let mut table = table();
        table.insert(Node::new(tab(6), WindowId::new(1)).with_last_accessed(5));
        table.set_successor(tab(2), Some(tab(3)));

        build_initial_chains(&mut table, false);

        // 2 keeps its successor; the rest continue from the old tail.
        assert_eq!(table.successor(tab(2)), Some(tab(3)));
        assert_eq!(chain_from(&table, tab(2)), vec![tab(2), tab(3), tab(1), tab(6)]);
    }

    #[test]
    fn test_existing_chain_extended_from_tail() {
        let window = WindowId::new(1);
        let mut table = TabTable::from_nodes([
            Node::new(tab(1), window).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), window).with_last_accessed(30),
            Node::new(tab(3), window).with_last_accessed(20),
            Node::new(tab(4), window).with_last_accessed(10),
        ]);

        build_initial_chains(&mut table, false);

        assert_eq!(chain_from(&table, tab(1)), vec![tab(1), tab(2), tab(3), tab(4)]);
        assert!(table.successor(tab(4)).is_none());
    }

    #[test]
    fn test_full_reset_rethreads_everything() {
        let mut table = table();
        table.set_successor(tab(1), Some(tab(2)));
        table.set_successor(tab(3), Some(tab(1)));

        build_initial_chains(&mut table, true);

        assert_eq!(chain_from(&table, tab(2)), vec![tab(2), tab(3), tab(1)]);
        assert!(table.successor(tab(1)).is_none());
    }

    #[test]
    fn test_single_tab_window_is_noop() {
        let mut table = TabTable::from_nodes([Node::new(tab(1), WindowId::new(1)).with_active(true)]);
        assert!(build_initial_chains(&mut table, false).is_empty());
        assert!(table.successor(tab(1)).is_none());
    }
}
