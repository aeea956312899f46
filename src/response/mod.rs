//! Response side of a batch.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `framer` | Raw HTTP/1.x bytes → [`ResponseEntry`] |
//! | `result` | [`ResponseEntry`], [`Body`] and the filtered [`ResultMap`] views |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP/1.x response framing.
pub mod framer;

/// Parsed responses and result views.
pub mod result;

// ============================================================================
// Re-exports
// ============================================================================

pub use framer::parse;
pub use result::{Body, ResponseEntry, ResultMap};
