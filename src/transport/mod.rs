//! Transport layer and connection-pool scheduler.
//!
//! The scheduler drives a [`Transport`]: a multiplexer over a fixed set of
//! reusable workers, each executing one HTTP exchange at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  submit(slot)   ┌───────────────────────────────┐
//! │  Scheduler   │────────────────►│  Transport (multiplexer)      │
//! │              │  perform/wait   │  ┌────────┐ ┌────────┐        │
//! │  WorkerPool  │────────────────►│  │ slot 0 │ │ slot 1 │  ...   │
//! │  idle: [..]  │                 │  └────────┘ └────────┘        │
//! │  busy: slot→id│◄───────────────│  next_completion()            │
//! └──────────────┘   raw bytes     └───────────────────────────────┘
//! ```
//!
//! # Run Lifecycle
//!
//! 1. Open the transport and allocate `min(max_connections, batch)` workers
//! 2. Submit requests in batch order, one per idle worker
//! 3. *Do work*: `perform` until fewer transfers run than workers are busy,
//!    waiting on socket readiness in between
//! 4. Drain completions: parse, record, return the worker to the idle list
//! 5. Drop the transport once every request has a result
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `curl` | libcurl multi interface transport |
//! | `pool` | Worker slot bookkeeping |
//! | `scheduler` | The run loop |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::Result;
use crate::identifiers::WorkerSlot;
use crate::request::RequestDescriptor;

// ============================================================================
// Submodules
// ============================================================================

/// libcurl multi transport.
pub mod curl;

/// Worker slot bookkeeping.
pub mod pool;

/// Connection-pool scheduler.
pub mod scheduler;

/// In-memory transport for tests.
#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::curl::CurlTransport;
pub use pool::WorkerPool;
pub use scheduler::Scheduler;

// ============================================================================
// Progress
// ============================================================================

/// Outcome of one multiplexer advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More work is immediately available; advance again without waiting.
    CallAgain,
    /// Steady state with this many transfers still running.
    Running(usize),
}

// ============================================================================
// Completion
// ============================================================================

/// Transport-level failure of a single transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    /// Effective URL at the time of failure.
    pub url: String,
    /// Transport error description.
    pub message: String,
}

/// A finished transfer reported by the multiplexer.
///
/// By the time a completion is handed out, its worker has been detached
/// from the multiplexer and can be submitted again.
#[derive(Debug)]
pub struct Completion {
    /// Worker that ran the transfer.
    pub slot: WorkerSlot,
    /// Captured raw response (header blocks and body), or the failure.
    pub outcome: std::result::Result<Vec<u8>, TransferFailure>,
}

// ============================================================================
// Transport
// ============================================================================

/// Capability the scheduler needs from an HTTP transport.
///
/// Implementations own one native handle per [`WorkerSlot`] plus the
/// multiplexer. Dropping the transport releases all of them.
pub trait Transport {
    /// Allocates the worker for `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerInit`](crate::Error::WorkerInit) if the
    /// worker cannot be created.
    fn allocate(&mut self, slot: WorkerSlot) -> Result<()>;

    /// Configures the idle worker at `slot` for `request` and adds it to
    /// the multiplexer. Response header capture is always enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerConfig`](crate::Error::WorkerConfig) if the
    /// worker rejects the configuration.
    fn submit(&mut self, slot: WorkerSlot, request: &RequestDescriptor) -> Result<()>;

    /// Advances every in-flight transfer without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Multiplexer`](crate::Error::Multiplexer) on a
    /// non-OK advance status.
    fn perform(&mut self) -> Result<Progress>;

    /// Blocks until socket activity or `timeout`, whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Multiplexer`](crate::Error::Multiplexer) if waiting
    /// fails.
    fn wait(&mut self, timeout: Duration) -> Result<()>;

    /// Pops the next finished transfer, detaching its worker.
    fn next_completion(&mut self) -> Option<Completion>;
}
