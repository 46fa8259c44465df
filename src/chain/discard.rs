//! Bulk discard.
//!
//! Before a batch of tabs is unloaded, the active tab (if it is in the batch)
//! hands activation to its first usable successor, and every surviving tab
//! whose successor is in the batch is pointed past it. Both walks treat
//! batch members and already-discarded tabs as transparent.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::identifiers::{TabId, WindowId};
use crate::protocol::PlatformCommand;

use super::lifecycle::ChainState;
use super::mutator::set_successor;
use super::node::TabTable;
use super::resolver::next_outside;

// ============================================================================
// DiscardPlan
// ============================================================================

/// What a discard will do, computed against the current mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardPlan {
    /// Tabs to activate first, one per affected window.
    pub activate: Vec<TabId>,
    /// Surviving tabs and the successor they are rerouted to.
    pub reroutes: Vec<(TabId, Option<TabId>)>,
    /// Tabs that will actually be discarded.
    pub targets: Vec<TabId>,
    /// Active tabs left out because nothing could replace them.
    pub kept: Vec<TabId>,
}

impl DiscardPlan {
    /// Computes the plan for discarding `targets`.
    #[must_use]
    pub fn new(table: &TabTable, targets: &[TabId]) -> Self {
        let mut plan = Self::default();
        let mut batch: FxHashSet<TabId> = targets
            .iter()
            .copied()
            .filter(|id| table.contains(*id))
            .collect();

        let mut windows: Vec<WindowId> = batch.iter().filter_map(|id| table.window_of(*id)).collect();
        windows.sort_unstable();
        windows.dedup();

        for window in windows {
            let Some(active) = table.active_tab(window).filter(|id| batch.contains(id)) else {
                continue;
            };
            let skip = |id: TabId| batch.contains(&id) || table.is_discarded(id);
            match next_outside(table, table.successor(active), skip) {
                Some(next) => plan.activate.push(next),
                None => plan.kept.push(active),
            }
        }
        for kept in &plan.kept {
            batch.remove(kept);
        }

        let mut survivors: Vec<TabId> = table
            .iter()
            .filter(|node| !node.discarded && !batch.contains(&node.id))
            .map(|node| node.id)
            .collect();
        survivors.sort_unstable();

        for id in survivors {
            let current = table.successor(id);
            let mut crossed = false;
            let next = next_outside(table, current, |t| {
                let in_batch = batch.contains(&t);
                crossed |= in_batch;
                in_batch || table.is_discarded(t)
            })
            .filter(|next| *next != id);

            if crossed && next != current {
                plan.reroutes.push((id, next));
            }
        }

        let mut seen = FxHashSet::default();
        plan.targets = targets
            .iter()
            .copied()
            .filter(|id| batch.contains(id) && seen.insert(*id))
            .collect();
        plan
    }
}

/// Chooses which tabs a discard request covers.
///
/// When the initiating tab is part of the highlighted selection (and
/// `whole_selection` is set) the selection is discarded; otherwise just the
/// initiating tab.
#[must_use]
pub fn discard_targets(initiating: TabId, highlighted: &[TabId], whole_selection: bool) -> Vec<TabId> {
    if whole_selection && highlighted.contains(&initiating) {
        highlighted.to_vec()
    } else {
        vec![initiating]
    }
}

// ============================================================================
// ChainState - Discard
// ============================================================================

impl ChainState {
    /// Reroutes chains around `targets` and marks them discarded.
    ///
    /// Returns the activation, successor, and discard commands in the order
    /// they must reach the platform. Pending opener group members stay in
    /// their group, flagged discarded, so a later activation filters them
    /// out of the new chain.
    pub fn discard(&mut self, targets: &[TabId]) -> Vec<PlatformCommand> {
        let plan = DiscardPlan::new(&self.tabs, targets);
        if !plan.kept.is_empty() {
            warn!(tabs = ?plan.kept, "No usable successor, active tab kept loaded");
        }
        if plan.targets.is_empty() {
            return Vec::new();
        }

        let mut commands: Vec<PlatformCommand> = plan
            .activate
            .iter()
            .map(|tab_id| PlatformCommand::Activate { tab_id: *tab_id })
            .collect();

        for (tab_id, successor) in &plan.reroutes {
            commands.extend(set_successor(&mut self.tabs, *tab_id, *successor));
        }

        for tab_id in &plan.targets {
            if let Some(node) = self.tabs.get_mut(*tab_id) {
                node.discarded = true;
            }
        }

        debug!(
            targets = ?plan.targets,
            activate = ?plan.activate,
            reroutes = plan.reroutes.len(),
            "Discarding tabs"
        );

        commands.push(PlatformCommand::Discard {
            tab_ids: plan.targets,
        });
        commands
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::node::Node;
    use crate::chain::resolver::chain_from;
    use crate::protocol::{CreatedEvent, LifecycleEvent};

    const WINDOW: WindowId = WindowId::new(1);

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    fn tabs(ids: &[u32]) -> Vec<TabId> {
        ids.iter().map(|id| tab(*id)).collect()
    }

    /// 1 (active) → 2 → 3 → 4 → 5, with 4 already discarded.
    fn state() -> ChainState {
        ChainState::from_nodes([
            Node::new(tab(1), WINDOW).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), WINDOW).with_successor(tab(3)),
            Node::new(tab(3), WINDOW).with_successor(tab(4)),
            Node::new(tab(4), WINDOW).with_successor(tab(5)).with_discarded(true),
            Node::new(tab(5), WINDOW),
        ])
    }

    #[test]
    fn test_active_tab_hands_over_past_batch() {
        let mut state = state();
        let commands = state.discard(&tabs(&[1, 2]));

        assert_eq!(commands.first(), Some(&PlatformCommand::Activate { tab_id: tab(3) }));
        assert_eq!(
            commands.last(),
            Some(&PlatformCommand::Discard {
                tab_ids: tabs(&[1, 2]),
            })
        );
        assert!(state.tabs().is_discarded(tab(1)));
        assert!(state.tabs().is_discarded(tab(2)));
    }

    #[test]
    fn test_activation_skips_already_discarded() {
        let state = state();
        let plan = DiscardPlan::new(state.tabs(), &tabs(&[1, 2, 3]));

        assert_eq!(plan.activate, tabs(&[5]));
        assert!(plan.reroutes.is_empty());
    }

    #[test]
    fn test_survivors_rerouted_past_batch() {
        let mut state = state();
        let commands = state.discard(&tabs(&[2, 3]));

        assert_eq!(
            commands,
            vec![
                PlatformCommand::SetSuccessor {
                    tab_id: tab(1),
                    successor: Some(tab(5)),
                },
                PlatformCommand::Discard {
                    tab_ids: tabs(&[2, 3]),
                },
            ]
        );
        assert_eq!(chain_from(state.tabs(), tab(1)), tabs(&[1, 5]));
        // The discarded run keeps its own links.
        assert_eq!(state.tabs().successor(tab(2)), Some(tab(3)));
    }

    #[test]
    fn test_survivor_rerouted_through_discarded_tab() {
        // 1 (active) → 2 (discarded) → 3 → 4
        let mut state = ChainState::from_nodes([
            Node::new(tab(1), WINDOW).with_active(true).with_successor(tab(2)),
            Node::new(tab(2), WINDOW).with_successor(tab(3)).with_discarded(true),
            Node::new(tab(3), WINDOW).with_successor(tab(4)),
            Node::new(tab(4), WINDOW),
        ]);

        let commands = state.discard(&tabs(&[3]));

        assert_eq!(
            commands,
            vec![
                PlatformCommand::SetSuccessor {
                    tab_id: tab(1),
                    successor: Some(tab(4)),
                },
                PlatformCommand::Discard {
                    tab_ids: tabs(&[3]),
                },
            ]
        );
        assert_eq!(state.tabs().successor(tab(1)), Some(tab(4)));
    }

    #[test]
    fn test_chain_clear_of_batch_not_rerouted() {
        // 7 → 4 (discarded) → 5 never reaches the batch.
        let mut state = state();
        state.tabs.insert(Node::new(tab(7), WINDOW).with_successor(tab(4)));

        let plan = DiscardPlan::new(state.tabs(), &tabs(&[2]));
        assert_eq!(plan.reroutes, vec![(tab(1), Some(tab(3)))]);
    }

    #[test]
    fn test_lone_active_tab_is_kept() {
        let mut state = ChainState::from_nodes([
            Node::new(tab(1), WINDOW).with_active(true),
            Node::new(tab(2), WINDOW),
        ]);

        assert!(state.discard(&tabs(&[1])).is_empty());
        assert!(!state.tabs().is_discarded(tab(1)));

        let commands = state.discard(&tabs(&[1, 2]));
        assert_eq!(
            commands,
            vec![PlatformCommand::Discard {
                tab_ids: tabs(&[2]),
            }]
        );
    }

    #[test]
    fn test_pending_group_members_flagged_in_place() {
        let mut state = state();
        for id in [10, 11] {
            let node = Node::new(tab(id), WINDOW).with_opener(tab(1));
            state.apply(&LifecycleEvent::Created(CreatedEvent { tab: node }));
        }

        state.discard(&tabs(&[10]));

        assert_eq!(state.groups().members(tab(1)), tabs(&[10, 11]).as_slice());
        assert!(state.tabs().is_discarded(tab(10)));
    }

    #[test]
    fn test_discard_targets_selection() {
        let highlighted = tabs(&[2, 3, 4]);
        assert_eq!(discard_targets(tab(3), &highlighted, true), highlighted);
        assert_eq!(discard_targets(tab(3), &highlighted, false), tabs(&[3]));
        assert_eq!(discard_targets(tab(9), &highlighted, true), tabs(&[9]));
    }
}
