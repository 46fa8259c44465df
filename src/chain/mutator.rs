//! Chain relocation.
//!
//! [`relocate`] applies the platform's move-in-succession semantics to the
//! local mirror and returns the [`PlatformCommand`] that makes the same change
//! on the browser side. The mirror is updated first; the command is issued
//! afterwards and its outcome is never waited on.
//!
//! # Semantics
//!
//! 1. Every relocated tab with a predecessor outside the moved set leaves a
//!    gap; the predecessor is pointed at the first tab after the moved one
//!    that is not itself being moved.
//! 2. The moved tabs are linked in list order.
//! 3. The path is attached to the anchor:
//!
//! | append | insert | Effect |
//! |--------|--------|--------|
//! | false | false | last → anchor |
//! | false | true  | last → anchor, and anchor's predecessors → first |
//! | true  | false | anchor → first, last → none |
//! | true  | true  | anchor → first, last → anchor's old successor |

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::identifiers::TabId;
use crate::protocol::PlatformCommand;

use super::node::TabTable;
use super::resolver::next_outside;

// ============================================================================
// RelocateMode
// ============================================================================

/// How a relocated path attaches to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocateMode {
    /// Place the path after the anchor instead of before it.
    #[serde(default)]
    pub append: bool,

    /// Re-link the anchor's neighbour on that side into the path.
    #[serde(default)]
    pub insert: bool,
}

impl RelocateMode {
    /// Path placed before the anchor, nothing else re-linked.
    pub const BEFORE: Self = Self {
        append: false,
        insert: false,
    };

    /// Path spliced directly after the anchor.
    pub const SPLICE_AFTER: Self = Self {
        append: true,
        insert: true,
    };

    /// Creates a mode.
    #[inline]
    #[must_use]
    pub const fn new(append: bool, insert: bool) -> Self {
        Self { append, insert }
    }
}

// ============================================================================
// Relocation
// ============================================================================

/// Moves `nodes` in the succession relative to `anchor`.
///
/// Without an anchor the first node becomes the anchor and the rest are
/// appended after it, so at least two nodes are needed. With an anchor at
/// least one node is needed. Nodes the mirror does not know, nodes in a
/// different window than the anchor, duplicates, and the anchor itself are
/// dropped before counting. Anything short of that is a no-op returning
/// `None`.
pub fn relocate(
    table: &mut TabTable,
    nodes: &[TabId],
    anchor: Option<TabId>,
    mode: RelocateMode,
) -> Option<PlatformCommand> {
    let mut seen = FxHashSet::default();
    let mut nodes: Vec<TabId> = nodes
        .iter()
        .copied()
        .filter(|id| table.contains(*id) && seen.insert(*id))
        .collect();

    let (anchor, mode) = match anchor {
        Some(anchor) => (anchor, mode),
        None if nodes.len() >= 2 => (nodes.remove(0), RelocateMode { append: true, ..mode }),
        None => return None,
    };

    let window = table.window_of(anchor)?;
    nodes.retain(|id| *id != anchor && table.window_of(*id) == Some(window));

    let (&first, &last) = (nodes.first()?, nodes.last()?);
    let moving: FxHashSet<TabId> = nodes.iter().copied().collect();

    // Heal the gaps against the pre-move topology, then apply.
    let mut heals = Vec::new();
    for &id in &nodes {
        let next = next_outside(table, table.successor(id), |t| moving.contains(&t));
        for pred in table.predecessors(id) {
            if !moving.contains(&pred) {
                heals.push((pred, next.filter(|next| *next != pred)));
            }
        }
    }
    for (pred, next) in heals {
        table.set_successor(pred, next);
    }

    for pair in nodes.windows(2) {
        table.set_successor(pair[0], Some(pair[1]));
    }

    if mode.append {
        let previous = table.successor(anchor);
        table.set_successor(anchor, Some(first));
        table.set_successor(last, if mode.insert { previous } else { None });
    } else {
        table.set_successor(last, Some(anchor));
        if mode.insert {
            for pred in table.predecessors(anchor) {
                if !moving.contains(&pred) {
                    table.set_successor(pred, Some(first));
                }
            }
        }
    }

    trace!(
        tabs = ?nodes,
        anchor = %anchor,
        append = mode.append,
        insert = mode.insert,
        "Relocated in succession"
    );

    Some(PlatformCommand::MoveInSuccession {
        tab_ids: nodes,
        anchor,
        options: mode,
    })
}

/// Points a single tab at `successor` without moving it.
///
/// Returns `None` when the tab is unknown or already points there.
pub fn set_successor(
    table: &mut TabTable,
    tab_id: TabId,
    successor: Option<TabId>,
) -> Option<PlatformCommand> {
    if successor == Some(tab_id) || !table.set_successor(tab_id, successor) {
        return None;
    }
    trace!(tab_id = %tab_id, successor = ?successor, "Successor set");
    Some(PlatformCommand::SetSuccessor { tab_id, successor })
}

// ============================================================================
// Tests
// ============================================================================
