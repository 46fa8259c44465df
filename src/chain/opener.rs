//! Pending opener groups.
//!
//! Tabs opened in the background by the same parent are queued here until
//! one of them is activated. Each tab belongs to at most one group.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::identifiers::TabId;

// ============================================================================
// OpenerGroups
// ============================================================================

/// Background tabs waiting for first activation, keyed by opener.
#[derive(Debug, Clone, Default)]
pub struct OpenerGroups {
    /// Members per opener, in creation order.
    groups: FxHashMap<TabId, Vec<TabId>>,
    /// Member → opener.
    member_of: FxHashMap<TabId, TabId>,
}

impl OpenerGroups {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tab` to the group of `opener`, creating it if needed.
    ///
    /// Returns the previous last member, or `None` when `tab` is the first.
    /// A tab already pending under some opener is moved to the new one.
    pub fn push(&mut self, opener: TabId, tab: TabId) -> Option<TabId> {
        self.remove_member(tab);

        let members = self.groups.entry(opener).or_default();
        let previous = members.last().copied();
        members.push(tab);
        self.member_of.insert(tab, opener);

        trace!(opener = %opener, tab_id = %tab, size = members.len(), "Pending opener group grew");
        previous
    }

    /// Returns the opener whose group holds `tab`.
    #[inline]
    #[must_use]
    pub fn opener_of(&self, tab: TabId) -> Option<TabId> {
        self.member_of.get(&tab).copied()
    }

    /// Returns `true` if `tab` is pending in some group.
    #[inline]
    #[must_use]
    pub fn contains(&self, tab: TabId) -> bool {
        self.member_of.contains_key(&tab)
    }

    /// Members of the group for `opener`, in creation order.
    #[must_use]
    pub fn members(&self, opener: TabId) -> &[TabId] {
        self.groups.get(&opener).map(Vec::as_slice).unwrap_or_default()
    }

    /// Dissolves the group for `opener`, returning its members.
    pub fn take(&mut self, opener: TabId) -> Option<Vec<TabId>> {
        let members = self.groups.remove(&opener)?;
        for member in &members {
            self.member_of.remove(member);
        }
        Some(members)
    }

    /// Drops `tab` from its group; an emptied group is discarded.
    ///
    /// Returns `false` if `tab` was not pending.
    pub fn remove_member(&mut self, tab: TabId) -> bool {
        let Some(opener) = self.member_of.remove(&tab) else {
            return false;
        };

        if let Some(members) = self.groups.get_mut(&opener) {
            members.retain(|member| *member != tab);
            if members.is_empty() {
                self.groups.remove(&opener);
                trace!(opener = %opener, "Pending opener group emptied");
            }
        }
        true
    }

    /// Number of live groups.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no group is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Forgets every group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.member_of.clear();
    }
}

/// Orders a dissolving group around the activated member.
///
/// The activated tab leads, followed by the tabs created before it in
/// reverse creation order, then the tabs created after it in creation order.
#[must_use]
pub fn activation_order(members: &[TabId], activated: TabId) -> Vec<TabId> {
    let Some(index) = members.iter().position(|member| *member == activated) else {
        return members.to_vec();
    };

    let mut ordered = Vec::with_capacity(members.len());
    ordered.push(activated);
    ordered.extend(members[..index].iter().rev());
    ordered.extend(&members[index + 1..]);
    ordered
}

// ============================================================================
// Tests
// ============================================================================
