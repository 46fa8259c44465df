//! Outgoing platform commands.
//!
//! Commands follow the extension's `tabs.methodName` format and serialize as
//! `{ "method": ..., "params": { ... } }`.
//!
//! | Method | Effect |
//! |--------|--------|
//! | `tabs.moveInSuccession` | Relocate a path of tabs relative to an anchor |
//! | `tabs.setSuccessor` | Point one tab at a new successor |
//! | `tabs.activate` | Make a tab active |
//! | `tabs.discard` | Unload a set of tabs |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::chain::RelocateMode;
use crate::identifiers::TabId;

// ============================================================================
// PlatformCommand
// ============================================================================

/// A command for the browser side of the succession chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PlatformCommand {
    /// Relocate tabs in the succession.
    #[serde(rename = "tabs.moveInSuccession")]
    MoveInSuccession {
        /// Tabs to move, in path order.
        #[serde(rename = "tabIds")]
        tab_ids: Vec<TabId>,
        /// Tab the path attaches to.
        #[serde(rename = "tabId")]
        anchor: TabId,
        /// Attachment mode.
        options: RelocateMode,
    },

    /// Set one tab's successor.
    #[serde(rename = "tabs.setSuccessor")]
    SetSuccessor {
        /// Tab to update.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// New successor, `None` to clear.
        #[serde(rename = "successorTabId")]
        successor: Option<TabId>,
    },

    /// Activate a tab.
    #[serde(rename = "tabs.activate")]
    Activate {
        /// Tab to activate.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// Discard tabs.
    #[serde(rename = "tabs.discard")]
    Discard {
        /// Tabs to discard.
        #[serde(rename = "tabIds")]
        tab_ids: Vec<TabId>,
    },
}

impl PlatformCommand {
    /// Returns the wire method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::MoveInSuccession { .. } => "tabs.moveInSuccession",
            Self::SetSuccessor { .. } => "tabs.setSuccessor",
            Self::Activate { .. } => "tabs.activate",
            Self::Discard { .. } => "tabs.discard",
        }
    }

    /// Returns `true` if the command changes succession pointers.
    #[inline]
    #[must_use]
    pub fn is_succession_change(&self) -> bool {
        matches!(
            self,
            Self::MoveInSuccession { .. } | Self::SetSuccessor { .. }
        )
    }
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

    #[test]
    fn test_move_in_succession_serialization() {
        let command = PlatformCommand::MoveInSuccession {
            tab_ids: vec![tab(3), tab(4)],
            anchor: tab(1),
            options: RelocateMode::SPLICE_AFTER,
        };
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "tabs.moveInSuccession");
        assert_eq!(json["params"]["tabIds"], serde_json::json!([3, 4]));
        assert_eq!(json["params"]["tabId"], 1);
        assert_eq!(json["params"]["options"]["append"], true);
        assert_eq!(json["params"]["options"]["insert"], true);
    }

    #[test]
    fn test_set_successor_serialization() {
        let command = PlatformCommand::SetSuccessor {
            tab_id: tab(2),
            successor: None,
        };
        let json = serde_json::to_string(&command).expect("serialize");
        assert!(json.contains("tabs.setSuccessor"));
        assert!(json.contains("\"successorTabId\":null"));
    }

    #[test]
    fn test_method_matches_serialized_tag() {
        let commands = [
            PlatformCommand::Activate { tab_id: tab(1) },
            PlatformCommand::Discard {
                tab_ids: vec![tab(1)],
            },
        ];
        for command in commands {
            let json = serde_json::to_value(&command).expect("serialize");
            assert_eq!(json["method"], command.method());
            assert!(!command.is_succession_change());
        }
    }
}
