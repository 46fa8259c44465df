//! Tab lifecycle notifications.
//!
//! The tab registry pushes one notification per lifecycle change. On the wire
//! they arrive as `{ "method": "tabs.onCreated", "params": { ... } }` and are
//! decoded into a typed [`LifecycleEvent`].
//!
//! # Event Types
//!
//! | Method | Payload |
//! |--------|---------|
//! | `tabs.onCreated` | [`CreatedEvent`] |
//! | `tabs.onActivated` | [`ActivatedEvent`] |
//! | `tabs.onRemoved` | [`RemovedEvent`] |
//! | `tabs.onDetached` | [`DetachedEvent`] |
//! | `tabs.onAttached` | [`AttachedEvent`] |
//!
//! Node snapshots in payloads are optional: the registry may not have indexed
//! the tab yet.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::Node;
use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId, deserialize_optional_tab_id};

// ============================================================================
// Event
// ============================================================================

/// A raw lifecycle notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event name in `tabs.onEventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Creates a raw event.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Decodes the event into its typed form.
    ///
    /// Unknown methods decode to [`LifecycleEvent::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvent`] when a known method carries params
    /// that do not match its payload.
    pub fn parse(&self) -> Result<LifecycleEvent> {
        let event = match self.method.as_str() {
            "tabs.onCreated" => LifecycleEvent::Created(self.payload()?),
            "tabs.onActivated" => LifecycleEvent::Activated(self.payload()?),
            "tabs.onRemoved" => LifecycleEvent::Removed(self.payload()?),
            "tabs.onDetached" => LifecycleEvent::Detached(self.payload()?),
            "tabs.onAttached" => LifecycleEvent::Attached(self.payload()?),
            _ => LifecycleEvent::Unknown {
                method: self.method.clone(),
            },
        };
        Ok(event)
    }

    fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.params)
            .map_err(|e| Error::invalid_event(self.method.as_str(), e.to_string()))
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A tab was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    /// The new tab.
    pub tab: Node,
}

/// A tab became active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedEvent {
    /// Newly active tab.
    pub tab_id: TabId,

    /// Previously active tab, if it still exists.
    #[serde(default, deserialize_with = "deserialize_optional_tab_id")]
    pub previous_tab_id: Option<TabId>,

    /// Window of the activation.
    pub window_id: WindowId,

    /// Registry snapshot of the new tab.
    #[serde(default)]
    pub node: Option<Node>,

    /// Registry snapshot of the previous tab.
    #[serde(default)]
    pub previous_node: Option<Node>,
}

/// A tab was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedEvent {
    /// Closed tab.
    pub tab_id: TabId,

    /// Window the tab was in.
    #[serde(default)]
    pub window_id: Option<WindowId>,

    /// Whether the whole window is closing.
    #[serde(default)]
    pub is_window_closing: bool,

    /// Last registry snapshot of the tab.
    #[serde(default)]
    pub node: Option<Node>,
}

/// A tab left its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedEvent {
    /// Detached tab.
    pub tab_id: TabId,

    /// Window the tab left.
    #[serde(default)]
    pub old_window_id: Option<WindowId>,

    /// Last registry snapshot of the tab.
    #[serde(default)]
    pub node: Option<Node>,
}

/// A tab joined a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedEvent {
    /// Attached tab.
    pub tab_id: TabId,

    /// Window the tab joined.
    pub new_window_id: WindowId,

    /// Registry snapshot of the tab.
    #[serde(default)]
    pub node: Option<Node>,
}

// ============================================================================
// LifecycleEvent
// ============================================================================

/// Typed lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Tab created.
    Created(CreatedEvent),
    /// Tab activated.
    Activated(ActivatedEvent),
    /// Tab removed.
    Removed(RemovedEvent),
    /// Tab detached from its window.
    Detached(DetachedEvent),
    /// Tab attached to a window.
    Attached(AttachedEvent),
    /// Any other notification.
    Unknown {
        /// Event method.
        method: String,
    },
}

impl LifecycleEvent {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Created(_) => "created",
            Self::Activated(_) => "activated",
            Self::Removed(_) => "removed",
            Self::Detached(_) => "detached",
            Self::Attached(_) => "attached",
            Self::Unknown { method } => method,
        }
    }

    /// The tab the notification is about, if any.
    #[must_use]
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            Self::Created(e) => Some(e.tab.id),
            Self::Activated(e) => Some(e.tab_id),
            Self::Removed(e) => Some(e.tab_id),
            Self::Detached(e) => Some(e.tab_id),
            Self::Attached(e) => Some(e.tab_id),
            Self::Unknown { .. } => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
