//! Parsed responses and the per-batch result map.
//!
//! # Filtered views
//!
//! | View | Yields | `ok_only` keeps |
//! |------|--------|-----------------|
//! | [`ResultMap::full`] | whole [`ResponseEntry`] | status exactly `200` |
//! | [`ResultMap::data`] | [`Body`] only | status in `200..300` |
//!
//! The two `ok_only` predicates differ on purpose and must stay that way:
//! callers depend on the full view dropping `201`/`204` responses.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::identifiers::RequestId;

// ============================================================================
// Body
// ============================================================================

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// Body of an `application/json` response that parsed as JSON.
    Json(Value),
    /// Any other body, as raw text.
    Text(String),
}

impl Body {
    /// Returns the JSON value, if the body was decoded as JSON.
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the raw text, if the body was not decoded as JSON.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Converts into a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

// ============================================================================
// ResponseEntry
// ============================================================================

/// One parsed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEntry {
    /// Status code of the final header block; `None` if none was found.
    #[serde(rename = "code")]
    pub status_code: Option<u16>,

    /// Headers of the final header block, lower-case names to lower-case values.
    pub headers: FxHashMap<String, String>,

    /// Decoded body.
    pub body: Body,
}

impl ResponseEntry {
    /// Returns a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` if the status code is exactly `200`.
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code == Some(200)
    }

    /// Returns `true` if the status code is in `200..300`.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code.is_some_and(|code| (200..300).contains(&code))
    }
}

// ============================================================================
// ResultMap
// ============================================================================

/// Responses of a batch keyed by request ID.
///
/// Entries are only ever added; the first entry written for an ID stays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultMap {
    entries: FxHashMap<RequestId, ResponseEntry>,
}

impl ResultMap {
    /// Creates an empty result map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty result map sized for `capacity` responses.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Records the response for `id`.
    ///
    /// Returns `false` and leaves the map unchanged if `id` already has a
    /// response.
    pub(crate) fn record(&mut self, id: RequestId, entry: ResponseEntry) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, entry);
        true
    }

    /// Returns the response for `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResponseEntry> {
        self.entries.get(id)
    }

    /// Returns `true` if `id` has a response.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of responses.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no responses.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates all responses in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &ResponseEntry)> {
        self.entries.iter()
    }

    /// Consumes the map and returns the underlying entries.
    #[must_use]
    pub fn into_inner(self) -> FxHashMap<RequestId, ResponseEntry> {
        self.entries
    }
}

// ============================================================================
// ResultMap - Views
// ============================================================================

impl ResultMap {
    /// Full view: status, headers and body.
    ///
    /// With `ok_only`, keeps responses whose status is exactly `200`.
    pub fn full(&self, ok_only: bool) -> impl Iterator<Item = (&RequestId, &ResponseEntry)> {
        self.entries
            .iter()
            .filter(move |(_, entry)| !ok_only || entry.is_ok())
    }

    /// Data-only view: bodies only.
    ///
    /// With `ok_only`, keeps responses whose status is in `200..300`.
    pub fn data(&self, ok_only: bool) -> impl Iterator<Item = (&RequestId, &Body)> {
        self.entries
            .iter()
            .filter(move |(_, entry)| !ok_only || entry.is_success())
            .map(|(id, entry)| (id, &entry.body))
    }

    /// Owned form of [`full`](Self::full).
    #[must_use]
    pub fn into_full(self, ok_only: bool) -> FxHashMap<RequestId, ResponseEntry> {
        self.entries
            .into_iter()
            .filter(|(_, entry)| !ok_only || entry.is_ok())
            .collect()
    }

    /// Owned form of [`data`](Self::data).
    #[must_use]
    pub fn into_data(self, ok_only: bool) -> FxHashMap<RequestId, Body> {
        self.entries
            .into_iter()
            .filter(|(_, entry)| !ok_only || entry.is_success())
            .map(|(id, entry)| (id, entry.body))
            .collect()
    }
}

impl IntoIterator for ResultMap {
    type Item = (RequestId, ResponseEntry);
    type IntoIter = std::collections::hash_map::IntoIter<RequestId, ResponseEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
