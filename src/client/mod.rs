//! Client facade.
//!
//! This module provides the main entry point for running request batches.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MultiClient`] | Collects requests and sends them as one batch |
//! | [`MultiClientBuilder`] | Fluent configuration builder |
//!
//! # Example
//!
//! ```no_run
//! use multicurl::{MultiClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let mut client = MultiClient::builder().max_connections(4).build()?;
//!
//! client.get("home", "https://example.com/")?;
//! client.get("about", "https://example.com/about")?;
//!
//! let results = client.send_async().await?;
//! for (id, entry) in results.full(true) {
//!     println!("{id}: {} headers", entry.headers.len());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::MultiClientBuilder;
pub use core::MultiClient;
