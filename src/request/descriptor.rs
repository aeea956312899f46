//! Resolved request descriptors.
//!
//! A [`RequestDescriptor`] is what the scheduler hands to a transport
//! worker: URL, method, headers and body with every client default
//! already merged in.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::options::{Method, RequestOptions};

// ============================================================================
// Types
// ============================================================================

/// Ordered request headers as `(name, value)` pairs.
pub type Headers = Vec<(String, String)>;

// ============================================================================
// RequestBody
// ============================================================================

/// Request payload as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim.
    Text(String),
    /// Encoded with `serde_json` before sending.
    Json(Value),
}

impl RequestBody {
    /// Encodes the body into the exact text sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a JSON value cannot be serialized.
    pub fn encode(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// RequestDescriptor
// ============================================================================

/// A fully resolved request, read-only to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Key the response is stored under.
    pub id: RequestId,

    /// Absolute request URL.
    pub url: String,

    /// Headers in send order.
    pub headers: Headers,

    /// Encoded body, if any.
    pub body: Option<String>,

    /// Transport options after default merging.
    pub options: RequestOptions,
}

impl RequestDescriptor {
    /// Creates a descriptor, validating the URL and headers.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is not an absolute URL
    /// - [`Error::InvalidHeader`] if a header cannot be put on the wire
    pub fn new(
        id: RequestId,
        url: impl Into<String>,
        headers: Headers,
        body: Option<String>,
        options: RequestOptions,
    ) -> Result<Self> {
        let url = url.into();
        if let Err(e) = Url::parse(&url) {
            return Err(Error::invalid_url(id, url, e));
        }

        for (name, value) in &headers {
            validate_header(name, value)?;
        }

        Ok(Self {
            id,
            url,
            headers,
            body,
            options,
        })
    }

    /// Returns the method that goes on the request line.
    ///
    /// An explicit method wins; otherwise a body implies `POST`.
    #[must_use]
    pub fn effective_method(&self) -> Method {
        match (&self.options.method, &self.body) {
            (Some(method), _) => method.clone(),
            (None, Some(_)) => Method::Post,
            (None, None) => Method::Get,
        }
    }

    /// Formats headers as `Name: value` lines.
    #[must_use]
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Rejects headers that would corrupt the request head.
pub(crate) fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_header(name, "empty header name"));
    }

    if name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(Error::invalid_header(
            name,
            "header name contains ':' or whitespace",
        ));
    }

    if value.contains(['\r', '\n']) {
        return Err(Error::invalid_header(name, "header value contains a line break"));
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
