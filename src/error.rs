//! Error types for multicurl.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```no_run
//! use multicurl::{MultiClient, Result};
//!
//! fn example() -> Result<()> {
//!     let mut client = MultiClient::builder().max_connections(4).build()?;
//!     client.get(1, "https://example.com/a")?;
//!     let results = client.send()?;
//!     assert_eq!(results.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`], [`Error::InvalidHeader`] |
//! | Transport setup | [`Error::TransportInit`], [`Error::WorkerInit`], [`Error::WorkerConfig`] |
//! | Transport runtime | [`Error::Multiplexer`], [`Error::Transfer`] |
//! | External | [`Error::Json`], [`Error::Join`] |
//!
//! Every transport error aborts the whole batch: no partial results are
//! returned. Malformed responses are never errors, they degrade inside
//! the response framer instead.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::task::JoinError;

use crate::identifiers::{RequestId, WorkerSlot};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client or scheduler configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Request URL is not an absolute URL.
    #[error("Invalid URL for request {request_id}: {url} ({reason})")]
    InvalidUrl {
        /// Request the URL belongs to.
        request_id: RequestId,
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Request header cannot be sent.
    #[error("Invalid header {name:?}: {message}")]
    InvalidHeader {
        /// Header name as supplied.
        name: String,
        /// Why the header was rejected.
        message: String,
    },

    // ========================================================================
    // Transport Setup Errors
    // ========================================================================
    /// The multiplexer could not be created.
    #[error("Transport initialization failed: {message}")]
    TransportInit {
        /// Description of the failure.
        message: String,
    },

    /// A pool worker could not be allocated.
    ///
    /// Workers are allocated up front; one failure aborts the run.
    #[error("Failed creating worker {slot}: {message}")]
    WorkerInit {
        /// Slot that failed to allocate.
        slot: WorkerSlot,
        /// Description of the failure.
        message: String,
    },

    /// A worker could not be configured for a request.
    #[error("Failed configuring worker for request {request_id}: {message}")]
    WorkerConfig {
        /// Request being configured.
        request_id: RequestId,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Transport Runtime Errors
    // ========================================================================
    /// The multiplexer failed to advance or wait.
    ///
    /// Signals resource exhaustion or a corrupted multiplexer, never a
    /// single-request problem.
    #[error("Multiplexer error: {message}")]
    Multiplexer {
        /// Description of the failure.
        message: String,
    },

    /// A transfer finished with a non-OK transport result.
    #[error("Transfer failed for request {request_id} ({url}): {message}")]
    Transfer {
        /// Request whose transfer failed.
        request_id: RequestId,
        /// Effective URL, when the transport knows it.
        url: String,
        /// Transport error description.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking task failed to complete.
    #[error("Blocking task failed: {0}")]
    Join(#[from] JoinError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(
        request_id: RequestId,
        url: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidUrl {
            request_id,
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid header error.
    #[inline]
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a transport initialization error.
    #[inline]
    pub fn transport_init(message: impl Into<String>) -> Self {
        Self::TransportInit {
            message: message.into(),
        }
    }

    /// Creates a worker initialization error.
    #[inline]
    pub fn worker_init(slot: WorkerSlot, message: impl Into<String>) -> Self {
        Self::WorkerInit {
            slot,
            message: message.into(),
        }
    }

    /// Creates a worker configuration error.
    #[inline]
    pub fn worker_config(request_id: RequestId, message: impl Into<String>) -> Self {
        Self::WorkerConfig {
            request_id,
            message: message.into(),
        }
    }

    /// Creates a multiplexer error.
    #[inline]
    pub fn multiplexer(message: impl Into<String>) -> Self {
        Self::Multiplexer {
            message: message.into(),
        }
    }

    /// Creates a transfer error.
    #[inline]
    pub fn transfer(
        request_id: RequestId,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transfer {
            request_id,
            url: url.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidUrl { .. } | Self::InvalidHeader { .. }
        )
    }

    /// Returns `true` if this error came from the transport layer.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::TransportInit { .. }
                | Self::WorkerInit { .. }
                | Self::WorkerConfig { .. }
                | Self::Multiplexer { .. }
                | Self::Transfer { .. }
        )
    }

    /// Returns `true` if this error aborted a running batch.
    ///
    /// Transport errors cannot be recovered inside a run; the caller may
    /// submit a fresh batch.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.is_transport_error() || matches!(self, Self::Join(_))
    }

    /// Returns the request this error is attributed to, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::InvalidUrl { request_id, .. }
            | Self::WorkerConfig { request_id, .. }
            | Self::Transfer { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::multiplexer("out of memory");
        assert_eq!(err.to_string(), "Multiplexer error: out of memory");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("max_connections must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: max_connections must be at least 1"
        );
        assert!(err.is_config_error());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_transfer_error_display() {
        let err = Error::transfer(RequestId::from(7u64), "http://127.0.0.1:1/", "Couldn't connect");
        assert_eq!(
            err.to_string(),
            "Transfer failed for request 7 (http://127.0.0.1:1/): Couldn't connect"
        );
    }

    #[test]
    fn test_worker_init_display() {
        let err = Error::worker_init(WorkerSlot::new(3), "handle allocation failed");
        assert_eq!(
            err.to_string(),
            "Failed creating worker #3: handle allocation failed"
        );
    }

    #[test]
    fn test_is_transport_error() {
        let slot = WorkerSlot::new(0);
        let id = RequestId::from("a");

        assert!(Error::transport_init("x").is_transport_error());
        assert!(Error::worker_init(slot, "x").is_transport_error());
        assert!(Error::worker_config(id.clone(), "x").is_transport_error());
        assert!(Error::multiplexer("x").is_transport_error());
        assert!(Error::transfer(id, "u", "x").is_transport_error());
        assert!(!Error::config("x").is_transport_error());
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::multiplexer("x").is_fatal());
        assert!(!Error::invalid_header("X-Bad", "newline").is_fatal());
    }

    #[test]
    fn test_request_id() {
        let err = Error::worker_config(RequestId::from("req-1"), "bad option");
        assert_eq!(err.request_id(), Some(&RequestId::from("req-1")));
        assert_eq!(Error::multiplexer("x").request_id(), None);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let reason = url::Url::parse("not a url").unwrap_err();
        let err = Error::invalid_url("a".into(), "not a url", reason);
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(err.is_config_error());
        assert!(!err.is_transport_error());
    }
}
