//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`MultiClient`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use multicurl::{MultiClient, RequestOptions};
//!
//! # fn example() -> multicurl::Result<()> {
//! let client = MultiClient::builder()
//!     .max_connections(16)
//!     .default_header("Accept", "application/json")
//!     .default_options(RequestOptions::new().with_timeout(Duration::from_secs(10)))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::request::descriptor::validate_header;
use crate::request::{Headers, RequestOptions, merge_headers, merge_options};
use crate::transport::Scheduler;
use crate::transport::scheduler::{DEFAULT_MAX_CONNECTIONS, DEFAULT_WAIT_TIMEOUT};

use super::core::MultiClient;

// ============================================================================
// MultiClientBuilder
// ============================================================================

/// Builder for configuring a [`MultiClient`] instance.
///
/// Use [`MultiClient::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct MultiClientBuilder {
    /// Upper bound on simultaneously open connections.
    max_connections: usize,
    /// Options applied under every request.
    default_options: RequestOptions,
    /// Headers applied under every request.
    default_headers: Headers,
    /// Blocking wait per readiness poll.
    wait_timeout: Duration,
}

impl Default for MultiClientBuilder {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            default_options: RequestOptions::client_defaults(),
            default_headers: Headers::new(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

// ============================================================================
// MultiClientBuilder Implementation
// ============================================================================

impl MultiClientBuilder {
    /// Creates a builder with the stock defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upper bound on simultaneously open connections.
    ///
    /// The pool for a batch is `min(max_connections, batch size)`.
    #[inline]
    #[must_use]
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Layers `options` over the current client defaults.
    ///
    /// Fields left unset in `options` keep their current default.
    #[inline]
    #[must_use]
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.default_options = merge_options(&self.default_options, options);
        self
    }

    /// Edits the client default options in place.
    ///
    /// # Example
    ///
    /// ```
    /// # use multicurl::MultiClient;
    /// let builder = MultiClient::builder().default_option(|o| o.with_follow_redirects(true));
    /// ```
    #[inline]
    #[must_use]
    pub fn default_option(mut self, edit: impl FnOnce(RequestOptions) -> RequestOptions) -> Self {
        self.default_options = edit(self.default_options);
        self
    }

    /// Adds a header sent with every request unless the request sets the
    /// same key.
    #[inline]
    #[must_use]
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers = merge_headers(&self.default_headers, vec![(key.into(), value.into())]);
        self
    }

    /// Adds several default headers.
    #[must_use]
    pub fn default_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.default_headers = merge_headers(&self.default_headers, headers);
        self
    }

    /// Sets how long a readiness wait may block.
    #[inline]
    #[must_use]
    pub fn wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `max_connections` or `wait_timeout` is zero
    /// - [`Error::InvalidHeader`] if a default header cannot be sent
    pub fn build(self) -> Result<MultiClient> {
        self.validate()?;

        let scheduler = Scheduler::new(self.max_connections).with_wait_timeout(self.wait_timeout);
        Ok(MultiClient::new(
            scheduler,
            self.default_options,
            self.default_headers,
        ))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl MultiClientBuilder {
    /// Validates the collected configuration.
    fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::config(
                "max_connections must be at least 1.\n\
                 Example: MultiClient::builder().max_connections(8)",
            ));
        }

        if self.wait_timeout.is_zero() {
            return Err(Error::config(
                "wait_timeout must be greater than zero, a zero wait busy-loops the scheduler",
            ));
        }

        for (name, value) in &self.default_headers {
            validate_header(name, value)?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
