//! Ordered batch of requests.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;

use crate::identifiers::RequestId;

use super::descriptor::RequestDescriptor;

// ============================================================================
// RequestBatch
// ============================================================================

/// Ordered mapping from request ID to descriptor.
///
/// Iteration follows insertion order, which is also the submission order
/// used by the scheduler. Inserting an ID that is already present replaces
/// the earlier descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct RequestBatch {
    /// Descriptors in insertion order.
    requests: Vec<RequestDescriptor>,
    /// Position of each ID in `requests`.
    positions: FxHashMap<RequestId, usize>,
}

impl RequestBatch {
    /// Creates an empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request, replacing any earlier request with the same ID.
    ///
    /// Returns the replaced descriptor, if any.
    pub fn insert(&mut self, request: RequestDescriptor) -> Option<RequestDescriptor> {
        match self.positions.get(&request.id) {
            Some(&position) => Some(std::mem::replace(&mut self.requests[position], request)),
            None => {
                self.positions.insert(request.id.clone(), self.requests.len());
                self.requests.push(request);
                None
            }
        }
    }

    /// Returns the request stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RequestDescriptor> {
        self.positions.get(id).map(|&position| &self.requests[position])
    }

    /// Returns `true` if a request with `id` is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Returns the number of requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if the batch holds no requests.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Iterates requests in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RequestDescriptor> {
        self.requests.iter()
    }

    /// Iterates request IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &RequestId> {
        self.requests.iter().map(|request| &request.id)
    }
}

impl IntoIterator for RequestBatch {
    type Item = RequestDescriptor;
    type IntoIter = std::vec::IntoIter<RequestDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

impl FromIterator<RequestDescriptor> for RequestBatch {
    fn from_iter<I: IntoIterator<Item = RequestDescriptor>>(iter: I) -> Self {
        let mut batch = Self::new();
        for request in iter {
            batch.insert(request);
        }
        batch
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::request::options::RequestOptions;

    fn request(id: &str, url: &str) -> RequestDescriptor {
        RequestDescriptor::new(id.into(), url, Vec::new(), None, RequestOptions::new())
            .expect("valid descriptor")
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let batch: RequestBatch = ["c", "a", "b"]
            .into_iter()
            .map(|id| request(id, "http://localhost/"))
            .collect();

        let ids: Vec<&str> = batch.ids().map(RequestId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let mut batch = RequestBatch::new();
        batch.insert(request("1", "http://localhost/first"));
        batch.insert(request("2", "http://localhost/second"));

        let replaced = batch.insert(request("1", "http://localhost/again"));
        assert_eq!(replaced.map(|r| r.url), Some("http://localhost/first".into()));

        assert_eq!(batch.len(), 2);
        let urls: Vec<&str> = batch.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://localhost/again", "http://localhost/second"]);
    }

    #[test]
    fn test_lookup() {
        let mut batch = RequestBatch::new();
        assert!(batch.is_empty());

        batch.insert(request("x", "http://localhost/x"));
        assert!(batch.contains("x"));
        assert!(!batch.contains("y"));
        assert_eq!(batch.get("x").map(|r| r.url.as_str()), Some("http://localhost/x"));
    }
}
