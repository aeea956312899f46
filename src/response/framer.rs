//! HTTP/1.x response framing.
//!
//! Turns the raw bytes captured by a transport worker (every header block
//! followed by the body) into a [`ResponseEntry`].
//!
//! # Format
//!
//! ```text
//! HTTP/1.1 100 Continue\r\n
//! \r\n
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"a":1}
//! ```
//!
//! Interim blocks (`100 Continue`, redirect hops, proxy `CONNECT`
//! replies) are superseded by the last block. Parsing never fails: input
//! that does not look like a response comes back as a text body with no
//! status code.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::result::{Body, ResponseEntry};

// ============================================================================
// Constants
// ============================================================================

/// Separator between a header block and what follows it.
const BLOCK_SEPARATOR: &str = "\r\n\r\n";

/// Media type whose bodies are decoded as JSON.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Status line: `HTTP/<version> <code>` with a dotted numeric version.
static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^HTTP/\d+(?:\.\d+)*\s+(\d+)").expect("status line pattern is valid")
});

// ============================================================================
// Parsing
// ============================================================================

/// Parses a raw response into status code, headers and body.
///
/// Status and headers come from the last header block. Header names and
/// values are trimmed and lower-cased, and a repeated name keeps its last
/// value. The body is decoded as JSON when the final
/// `Content-Type` is `application/json` and the text is valid JSON;
/// otherwise the raw text is kept.
///
/// # Example
///
/// ```
/// use multicurl::response::framer::parse;
///
/// let entry = parse(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\n\r\nnot found");
/// assert_eq!(entry.status_code, Some(404));
/// assert_eq!(entry.header("content-type"), Some("text/plain"));
/// assert_eq!(entry.body.as_text(), Some("not found"));
/// ```
#[must_use]
pub fn parse(raw: &[u8]) -> ResponseEntry {
    let text = String::from_utf8_lossy(raw);

    let mut status_code = None;
    let mut headers = FxHashMap::default();
    let mut rest: &str = &text;

    let body_text = loop {
        let (segment, remainder) = match rest.split_once(BLOCK_SEPARATOR) {
            Some((segment, remainder)) => (segment, Some(remainder)),
            None => (rest, None),
        };

        let Some(code) = status_code_of(segment) else {
            break rest;
        };

        status_code = code.parse::<u16>().ok();
        headers = parse_header_block(segment);

        match remainder {
            Some(remainder) => rest = remainder,
            None => break "",
        }
    };

    let body = decode_body(body_text, &headers);

    ResponseEntry {
        status_code,
        headers,
        body,
    }
}

/// Returns the status code digits if `segment` opens with a status line.
fn status_code_of(segment: &str) -> Option<&str> {
    let first_line = segment.trim_start().lines().next()?.trim();
    STATUS_LINE
        .captures(first_line)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str())
}

/// Parses the `name: value` lines following a status line.
fn parse_header_block(segment: &str) -> FxHashMap<String, String> {
    let mut headers = FxHashMap::default();

    for line in segment.trim_start().lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        headers.insert(name.to_ascii_lowercase(), value.trim().to_ascii_lowercase());
    }

    headers
}

/// Decodes the body according to the final `Content-Type`.
fn decode_body(text: &str, headers: &FxHashMap<String, String>) -> Body {
    let is_json = headers
        .get("content-type")
        .is_some_and(|value| is_json_media_type(value));

    if is_json && let Ok(value) = serde_json::from_str::<Value>(text) {
        return Body::Json(value);
    }

    Body::Text(text.to_owned())
}

/// Compares the media type, ignoring parameters such as `charset`.
fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

// ============================================================================
// Tests
// ============================================================================
