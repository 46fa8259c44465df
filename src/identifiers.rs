//! Type-safe identifiers for browser entities.
//!
//! Firefox hands out tab and window ids as plain integers. Wrapping them in
//! newtypes keeps a window id from ever being passed where a tab id is
//! expected, which matters here because chains must never cross windows.
//!
//! Both ids serialize as plain numbers, matching the extension API. A tab id
//! of `0` is rejected on the way in.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// ============================================================================
// TabId
// ============================================================================

/// Firefox tab identifier.
///
/// Unique for the lifetime of the browser process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TabId(u32);

impl TabId {
    /// Sentinel used by the extension API for "no tab".
    pub const NONE_RAW: i64 = -1;

    /// Creates a tab ID.
    ///
    /// Returns `None` for `0`, which Firefox never assigns.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Option<Self> {
        if id == 0 { None } else { Some(Self(id)) }
    }

    /// Converts a raw extension value (where `-1` means none).
    #[inline]
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().and_then(Self::new)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for TabId {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(Error::InvalidTabId { raw })
    }
}

impl From<TabId> for u32 {
    #[inline]
    fn from(id: TabId) -> Self {
        id.0
    }
}

/// Deserializes an optional tab id where the extension may send `-1`,
/// `null`, or omit the field to mean "none".
pub(crate) fn deserialize_optional_tab_id<'de, D>(deserializer: D) -> Result<Option<TabId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(TabId::from_raw))
}

// ============================================================================
// WindowId
// ============================================================================

/// Firefox window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u32);

impl WindowId {
    /// Creates a window ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tab_id(id: u32) -> TabId {
        TabId::new(id).expect("tab id")
    }

    #[test]
    fn test_tab_id_rejects_zero() {
        assert!(TabId::new(0).is_none());
        assert_eq!(TabId::new(7).map(|t| t.as_u32()), Some(7));
    }

    #[test]
    fn test_tab_id_from_raw_none_sentinel() {
        assert!(TabId::from_raw(TabId::NONE_RAW).is_none());
        assert_eq!(TabId::from_raw(12), TabId::new(12));
    }

    #[test]
    fn test_ids_serialize_as_numbers() {
        let tab = TabId::new(42).expect("tab id");
        assert_eq!(serde_json::to_string(&tab).expect("serialize"), "42");

        let window: WindowId = serde_json::from_str("3").expect("deserialize");
        assert_eq!(window, WindowId::new(3));
    }

    #[test]
    fn test_tab_id_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<TabId>("0").is_err());
        assert_eq!(serde_json::from_str::<TabId>("7").expect("deserialize"), tab_id(7));

        let err = TabId::try_from(0).expect_err("zero");
        assert!(matches!(err, Error::InvalidTabId { raw: 0 }));
        assert_eq!(u32::from(tab_id(7)), 7);
    }

    #[test]
    fn test_optional_tab_id_sentinel() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "deserialize_optional_tab_id")]
            tab: Option<TabId>,
        }

        let payload: Payload = serde_json::from_str(r#"{"tab": -1}"#).expect("parse");
        assert!(payload.tab.is_none());
        let payload: Payload = serde_json::from_str(r#"{}"#).expect("parse");
        assert!(payload.tab.is_none());
        let payload: Payload = serde_json::from_str(r#"{"tab": 8}"#).expect("parse");
        assert_eq!(payload.tab, TabId::new(8));
    }

    #[test]
    fn test_display() {
        assert_eq!(TabId::new(5).expect("tab id").to_string(), "5");
        assert_eq!(WindowId::new(9).to_string(), "9");
    }
}
