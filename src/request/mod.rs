//! Request side of a batch.
//!
//! Everything here is plain data assembly: the scheduler only ever reads
//! the finished [`RequestBatch`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `batch` | Ordered ID → descriptor mapping |
//! | `descriptor` | Resolved request and body encoding |
//! | `merge` | Default merging for options and headers |
//! | `options` | Typed transport options and methods |

// ============================================================================
// Submodules
// ============================================================================

/// Ordered request batch.
pub mod batch;

/// Resolved request descriptors.
pub mod descriptor;

/// Default merging.
pub mod merge;

/// Transport options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use batch::RequestBatch;
pub use descriptor::{Headers, RequestBody, RequestDescriptor};
pub use merge::{merge_headers, merge_options};
pub use options::{Method, RequestOptions};
