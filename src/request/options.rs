//! Per-request transport options.
//!
//! Typed set of the transport knobs a request may carry. Every field is
//! optional: an unset field falls back to the client-wide default during
//! [`merge_options`](super::merge_options), and a field still unset after
//! merging leaves the transport's own default in place.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use multicurl::{Method, RequestOptions};
//!
//! let options = RequestOptions::new()
//!     .with_method(Method::Put)
//!     .with_follow_redirects(true)
//!     .with_timeout(Duration::from_secs(10));
//!
//! assert_eq!(options.method, Some(Method::Put));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Method
// ============================================================================

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD` (no response body is transferred).
    Head,
    /// `OPTIONS`
    Options,
    /// Any other method token, sent verbatim.
    Custom(String),
}

impl Method {
    /// Returns the method token as sent on the request line.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Custom(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            _ => Self::Custom(token.to_owned()),
        }
    }
}

// ============================================================================
// RequestOptions
// ============================================================================

/// Transport options for a request.
///
/// `None` means "not specified here"; see the module docs for how unset
/// fields are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Request method. Unset means `GET`, or `POST` when a body is present.
    pub method: Option<Method>,

    /// Follow `Location` redirects.
    pub follow_redirects: Option<bool>,

    /// Maximum number of redirects to follow.
    pub max_redirects: Option<u32>,

    /// Whole-transfer timeout.
    pub timeout: Option<Duration>,

    /// Connection phase timeout.
    pub connect_timeout: Option<Duration>,

    /// `Accept-Encoding` to negotiate; empty string offers every encoding
    /// the transport can decode.
    pub accept_encoding: Option<String>,

    /// `User-Agent` header value.
    pub user_agent: Option<String>,

    /// Verify the peer certificate and host name.
    pub verify_tls: Option<bool>,

    /// Emit transport-level wire logging to stderr.
    pub verbose: Option<bool>,
}

// ============================================================================
// Constructors
// ============================================================================

impl RequestOptions {
    /// Creates an options set with every field unset.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            method: None,
            follow_redirects: None,
            max_redirects: None,
            timeout: None,
            connect_timeout: None,
            accept_encoding: None,
            user_agent: None,
            verify_tls: None,
            verbose: None,
        }
    }

    /// Client-wide defaults applied under every request.
    ///
    /// Offers every supported content encoding; everything else is left
    /// to the transport.
    #[must_use]
    pub fn client_defaults() -> Self {
        Self {
            accept_encoding: Some(String::new()),
            ..Self::new()
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RequestOptions {
    /// Sets the request method.
    #[inline]
    #[must_use]
    pub fn with_method(mut self, method: impl Into<Method>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Enables or disables redirect following.
    #[inline]
    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    /// Sets the redirect limit.
    #[inline]
    #[must_use]
    pub fn with_max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Sets the whole-transfer timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the `Accept-Encoding` value.
    #[inline]
    #[must_use]
    pub fn with_accept_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.accept_encoding = Some(encoding.into());
        self
    }

    /// Sets the `User-Agent` value.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Enables or disables TLS verification.
    #[inline]
    #[must_use]
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    /// Enables or disables verbose transport logging.
    #[inline]
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_unset() {
        assert_eq!(RequestOptions::new(), RequestOptions::default());
    }

    #[test]
    fn test_client_defaults_accept_all_encodings() {
        let defaults = RequestOptions::client_defaults();
        assert_eq!(defaults.accept_encoding.as_deref(), Some(""));
        assert!(defaults.method.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let options = RequestOptions::new()
            .with_method("delete")
            .with_max_redirects(3)
            .with_user_agent("multicurl-test")
            .with_verify_tls(false);

        assert_eq!(options.method, Some(Method::Delete));
        assert_eq!(options.max_redirects, Some(3));
        assert_eq!(options.user_agent.as_deref(), Some("multicurl-test"));
        assert_eq!(options.verify_tls, Some(false));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(Method::from("get"), Method::Get);
        assert_eq!(Method::from("PROPFIND"), Method::Custom("PROPFIND".into()));
        assert_eq!(Method::Custom("PURGE".into()).as_str(), "PURGE");
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
