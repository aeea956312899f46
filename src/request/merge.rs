//! Default merging for options and headers.
//!
//! Pure functions combining client-wide defaults with per-request
//! overrides. A per-request value always wins; a default only fills what
//! the request left unspecified.

// ============================================================================
// Imports
// ============================================================================

use super::descriptor::Headers;
use super::options::RequestOptions;

// ============================================================================
// Options
// ============================================================================

/// Merges `overrides` over `defaults` field by field.
#[must_use]
pub fn merge_options(defaults: &RequestOptions, overrides: RequestOptions) -> RequestOptions {
    RequestOptions {
        method: overrides.method.or_else(|| defaults.method.clone()),
        follow_redirects: overrides.follow_redirects.or(defaults.follow_redirects),
        max_redirects: overrides.max_redirects.or(defaults.max_redirects),
        timeout: overrides.timeout.or(defaults.timeout),
        connect_timeout: overrides.connect_timeout.or(defaults.connect_timeout),
        accept_encoding: overrides
            .accept_encoding
            .or_else(|| defaults.accept_encoding.clone()),
        user_agent: overrides.user_agent.or_else(|| defaults.user_agent.clone()),
        verify_tls: overrides.verify_tls.or(defaults.verify_tls),
        verbose: overrides.verbose.or(defaults.verbose),
    }
}

// ============================================================================
// Headers
// ============================================================================

/// Merges `overrides` over `defaults`.
///
/// Keys compare case-sensitively. The result lists the request's own
/// headers first (a repeated key keeps its first position and its last
/// value), followed by every default whose key the request did not set.
#[must_use]
pub fn merge_headers(defaults: &Headers, overrides: Headers) -> Headers {
    let mut merged: Headers = Vec::with_capacity(overrides.len() + defaults.len());

    for (key, value) in overrides {
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => merged.push((key, value)),
        }
    }

    for (key, value) in defaults {
        if !merged.iter().any(|(existing, _)| existing == key) {
            merged.push((key.clone(), value.clone()));
        }
    }

    merged
}

// ============================================================================
// Tests
// ============================================================================
