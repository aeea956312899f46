//! multicurl - Concurrent HTTP batches over a bounded libcurl pool.
//!
//! This library runs a batch of independent HTTP requests concurrently
//! over at most `N` simultaneously open connections and returns one
//! parsed response per request ID.
//!
//! # Architecture
//!
//! The client follows a single-threaded, cooperative model:
//!
//! - **Batch**: Requests are resolved against client defaults and keyed by ID
//! - **Scheduler**: Hands requests to a fixed pool of reusable workers
//! - **Transport**: libcurl multi interface multiplexes every socket
//! - **Framer**: Splits the captured bytes into status, headers and body
//!
//! Key design principles:
//!
//! - At most `min(max_connections, batch size)` workers, allocated once
//! - Requests are submitted in batch order, completions drained as they land
//! - Non-2xx responses are results, transport failures abort the batch
//! - Malformed responses degrade in the framer, never error
//!
//! # Quick Start
//!
//! ```no_run
//! use multicurl::{MultiClient, Result};
//!
//! fn main() -> Result<()> {
//!     let mut client = MultiClient::builder().max_connections(2).build()?;
//!
//!     for id in 1..=5 {
//!         client.get(id, format!("https://api.example.com/items/{id}"))?;
//!     }
//!
//!     let results = client.send()?;
//!     for (id, body) in results.data(true) {
//!         println!("{id}: {body:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client facade: [`MultiClient`], [`MultiClientBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`request`] | Request descriptors, options and default merging |
//! | [`response`] | Response framer and result map |
//! | [`transport`] | Worker pool, scheduler and libcurl transport |
//!
//! # Features
//!
//! - `ssl`: libcurl with OpenSSL
//! - `rustls`: libcurl with rustls

// ============================================================================
// Modules
// ============================================================================

/// Client facade.
///
/// Use [`MultiClient::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for requests and workers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Request descriptors, typed options and default merging.
pub mod request;

/// Response framing and result collection.
pub mod response;

/// Worker pool, scheduler and transports.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{MultiClient, MultiClientBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, WorkerSlot};

// Request types
pub use request::{
    Headers, Method, RequestBatch, RequestBody, RequestDescriptor, RequestOptions, merge_headers,
    merge_options,
};

// Response types
pub use response::{Body, ResponseEntry, ResultMap};

// Transport types
pub use transport::{
    Completion, CurlTransport, Progress, Scheduler, TransferFailure, Transport, WorkerPool,
};
