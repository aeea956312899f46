//! Type-safe identifiers.
//!
//! Newtype wrappers keep caller-supplied request keys and pool-assigned
//! worker slots from being mixed up.
//!
//! | Type | Assigned by | Description |
//! |------|-------------|-------------|
//! | [`RequestId`] | Caller | Opaque key a response is returned under |
//! | [`WorkerSlot`] | Worker pool | Index of a reusable transport worker |

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Caller-supplied key identifying one request of a batch.
///
/// Strings and integers both convert into a `RequestId`; integers are
/// stored in their decimal form, so `RequestId::from(1)` equals
/// `RequestId::from("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a request ID from any string-like key.
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a fresh unique request ID (UUID v4).
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the key as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the underlying key.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RequestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for RequestId {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<&String> for RequestId {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

impl From<&RequestId> for RequestId {
    fn from(id: &RequestId) -> Self {
        id.clone()
    }
}

macro_rules! request_id_from_int {
    ($($int:ty),* $(,)?) => {
        $(
            impl From<$int> for RequestId {
                fn from(key: $int) -> Self {
                    Self(key.to_string())
                }
            }
        )*
    };
}

request_id_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

// ============================================================================
// WorkerSlot
// ============================================================================

/// Pool-assigned index of a transport worker.
///
/// Slots are dense: a pool of size `n` uses slots `0..n`. Transports
/// address their native handles by slot, never by handle identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerSlot(usize);

impl WorkerSlot {
    /// Creates a slot from its index.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use rustc_hash::FxHashMap;

    #[test]
    fn test_request_id_from_int_matches_string() {
        assert_eq!(RequestId::from(42u32), RequestId::from("42"));
        assert_eq!(RequestId::from(-1i64), RequestId::from("-1"));
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId::from("users/1").to_string(), "users/1");
    }

    #[test]
    fn test_request_id_generate_is_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_request_id_borrow_lookup() {
        let mut map = FxHashMap::default();
        map.insert(RequestId::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_request_id_serializes_as_string() {
        let json = serde_json::to_string(&RequestId::from(5u8)).expect("serialize");
        assert_eq!(json, "\"5\"");
    }

    #[test]
    fn test_worker_slot_display() {
        let slot = WorkerSlot::new(2);
        assert_eq!(slot.index(), 2);
        assert_eq!(slot.to_string(), "#2");
    }
}
