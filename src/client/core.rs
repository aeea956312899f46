//! Batch HTTP client.
//!
//! The [`MultiClient`] collects requests into a batch and runs the batch
//! over a bounded pool of libcurl connections.
//!
//! # Example
//!
//! ```no_run
//! use multicurl::{MultiClient, RequestOptions};
//! use serde_json::json;
//!
//! # fn example() -> multicurl::Result<()> {
//! let mut client = MultiClient::builder().max_connections(2).build()?;
//!
//! client.get("users", "https://api.example.com/users")?;
//! client.add_request(
//!     "create",
//!     "https://api.example.com/users",
//!     Some(json!({ "name": "ada" }).into()),
//!     RequestOptions::new(),
//!     vec![("Content-Type".into(), "application/json".into())],
//! )?;
//!
//! for (id, body) in client.send()?.data(true) {
//!     println!("{id}: {body:?}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::error::Result;
use crate::identifiers::RequestId;
use crate::request::{
    Headers, RequestBatch, RequestBody, RequestDescriptor, RequestOptions, merge_headers,
    merge_options,
};
use crate::response::ResultMap;
use crate::transport::{CurlTransport, Scheduler, Transport};

use super::builder::MultiClientBuilder;

// ============================================================================
// MultiClient
// ============================================================================

/// Collects requests and runs them concurrently.
///
/// Requests are resolved against the client defaults when added. Sending
/// consumes the pending batch, so a client can be reused for any number
/// of batches.
#[derive(Debug)]
pub struct MultiClient {
    /// Pool bound and wait settings.
    scheduler: Scheduler,
    /// Options applied under every request.
    default_options: RequestOptions,
    /// Headers applied under every request.
    default_headers: Headers,
    /// Requests waiting for the next send.
    batch: RequestBatch,
}

// ============================================================================
// MultiClient - Construction
// ============================================================================

impl MultiClient {
    /// Creates a configuration builder for the client.
    ///
    /// # Example
    ///
    /// ```
    /// use multicurl::MultiClient;
    ///
    /// # fn example() -> multicurl::Result<()> {
    /// let client = MultiClient::builder().max_connections(8).build()?;
    /// assert!(client.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    #[must_use]
    pub fn builder() -> MultiClientBuilder {
        MultiClientBuilder::new()
    }

    /// Creates a client from validated parts.
    pub(crate) fn new(
        scheduler: Scheduler,
        default_options: RequestOptions,
        default_headers: Headers,
    ) -> Self {
        Self {
            scheduler,
            default_options,
            default_headers,
            batch: RequestBatch::new(),
        }
    }
}

// ============================================================================
// MultiClient - Public API
// ============================================================================

impl MultiClient {
    /// Adds a request to the pending batch.
    ///
    /// `options` and `headers` are merged over the client defaults. Any
    /// body makes the request a `POST` unless `options` names a method.
    /// Adding an ID that is already pending replaces that request.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`](crate::Error::InvalidUrl) if `url` is not absolute
    /// - [`Error::InvalidHeader`](crate::Error::InvalidHeader) if a header cannot be sent
    /// - [`Error::Json`](crate::Error::Json) if a JSON body cannot be encoded
    pub fn add_request(
        &mut self,
        id: impl Into<RequestId>,
        url: impl Into<String>,
        body: Option<RequestBody>,
        options: RequestOptions,
        headers: Headers,
    ) -> Result<()> {
        let id = id.into();
        let body = body.map(RequestBody::encode).transpose()?;
        let options = merge_options(&self.default_options, options);
        let headers = merge_headers(&self.default_headers, headers);

        let request = RequestDescriptor::new(id, url, headers, body, options)?;

        debug!(
            request_id = %request.id,
            method = %request.effective_method(),
            url = %request.url,
            "Request added"
        );

        if let Some(previous) = self.batch.insert(request) {
            debug!(request_id = %previous.id, "Replaced pending request");
        }

        Ok(())
    }

    /// Adds a request under a generated ID and returns that ID.
    ///
    /// # Errors
    ///
    /// Same as [`add_request`](Self::add_request).
    pub fn push_request(
        &mut self,
        url: impl Into<String>,
        body: Option<RequestBody>,
        options: RequestOptions,
        headers: Headers,
    ) -> Result<RequestId> {
        let id = RequestId::generate();
        self.add_request(id.clone(), url, body, options, headers)?;
        Ok(id)
    }

    /// Adds a plain `GET` request.
    ///
    /// # Errors
    ///
    /// Same as [`add_request`](Self::add_request).
    #[inline]
    pub fn get(&mut self, id: impl Into<RequestId>, url: impl Into<String>) -> Result<()> {
        self.add_request(id, url, None, RequestOptions::new(), Headers::new())
    }

    /// Adds a `POST` request with `body`.
    ///
    /// # Errors
    ///
    /// Same as [`add_request`](Self::add_request).
    #[inline]
    pub fn post(
        &mut self,
        id: impl Into<RequestId>,
        url: impl Into<String>,
        body: impl Into<RequestBody>,
    ) -> Result<()> {
        self.add_request(id, url, Some(body.into()), RequestOptions::new(), Headers::new())
    }

    /// Runs every pending request and returns one result per ID.
    ///
    /// Blocks the calling thread until the batch is done. The pending
    /// batch is consumed whether or not the run succeeds.
    ///
    /// # Errors
    ///
    /// Any transport failure aborts the whole batch; see
    /// [`Scheduler::run`].
    pub fn send(&mut self) -> Result<ResultMap> {
        let batch = self.take_batch();
        let pool_size = self.scheduler.pool_size(batch.len());

        self.scheduler
            .run(batch, || CurlTransport::with_connection_limit(pool_size))
    }

    /// Runs every pending request on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`Error::Join`](crate::Error::Join)
    /// if the blocking task panics or is cancelled.
    pub async fn send_async(&mut self) -> Result<ResultMap> {
        let batch = self.take_batch();
        let scheduler = self.scheduler;
        let pool_size = scheduler.pool_size(batch.len());

        tokio::task::spawn_blocking(move || {
            scheduler.run(batch, || CurlTransport::with_connection_limit(pool_size))
        })
        .await?
    }

    /// Runs every pending request over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::run`].
    pub fn send_with<T, F>(&mut self, open: F) -> Result<ResultMap>
    where
        T: Transport,
        F: FnOnce() -> Result<T>,
    {
        let batch = self.take_batch();
        self.scheduler.run(batch, open)
    }

    /// Returns the pending requests.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &RequestBatch {
        &self.batch
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Returns `true` if no request is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Discards every pending request.
    #[inline]
    pub fn clear(&mut self) {
        self.batch = RequestBatch::new();
    }

    /// Returns the scheduler settings.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns the client default options.
    #[inline]
    #[must_use]
    pub fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Returns the client default headers.
    #[inline]
    #[must_use]
    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }
}

// ============================================================================
// MultiClient - Internal
// ============================================================================

impl MultiClient {
    /// Moves the pending batch out, leaving an empty one.
    fn take_batch(&mut self) -> RequestBatch {
        std::mem::take(&mut self.batch)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::error::Error;
    use crate::request::Method;
    use crate::response::Body;
    use crate::transport::testing::{FakeTransport, echo};

    fn client() -> MultiClient {
        MultiClient::builder()
            .max_connections(2)
            .default_header("Accept", "application/json")
            .build()
            .expect("build")
    }

    #[test]
    fn test_add_request_merges_defaults() {
        let mut client = client();
        client
            .add_request(
                "a",
                "https://example.com/a",
                None,
                RequestOptions::new().with_follow_redirects(true),
                vec![("X-Trace".into(), "1".into())],
            )
            .expect("add");

        let request = client.pending().get("a").expect("pending");
        assert_eq!(
            request.headers,
            vec![
                ("X-Trace".to_owned(), "1".to_owned()),
                ("Accept".to_owned(), "application/json".to_owned()),
            ]
        );
        assert_eq!(request.options.follow_redirects, Some(true));
        assert_eq!(request.options.accept_encoding.as_deref(), Some(""));
    }

    #[test]
    fn test_request_header_overrides_default() {
        let mut client = client();
        client
            .add_request(
                "a",
                "https://example.com/a",
                None,
                RequestOptions::new(),
                vec![("Accept".into(), "text/html".into())],
            )
            .expect("add");

        let request = client.pending().get("a").expect("pending");
        assert_eq!(request.headers, vec![("Accept".to_owned(), "text/html".to_owned())]);
    }

    #[test]
    fn test_json_body_is_encoded_and_implies_post() {
        let mut client = client();
        client
            .post("p", "https://example.com/p", json!({ "k": [1, 2] }))
            .expect("add");

        let request = client.pending().get("p").expect("pending");
        assert_eq!(request.body.as_deref(), Some(r#"{"k":[1,2]}"#));
        assert_eq!(request.effective_method(), Method::Post);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut client = client();
        let err = client.get("x", "not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(client.is_empty());
    }

    #[test]
    fn test_readding_id_replaces_request() {
        let mut client = client();
        client.get(1, "https://example.com/old").expect("add");
        client.get(2, "https://example.com/two").expect("add");
        client.get(1, "https://example.com/new").expect("add");

        assert_eq!(client.len(), 2);
        let urls: Vec<&str> = client.pending().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/new", "https://example.com/two"]);
    }

    #[test]
    fn test_push_request_generates_distinct_ids() {
        let mut client = client();
        let a = client
            .push_request("https://example.com/a", None, RequestOptions::new(), Headers::new())
            .expect("push");
        let b = client
            .push_request("https://example.com/b", None, RequestOptions::new(), Headers::new())
            .expect("push");

        assert_ne!(a, b);
        assert!(client.pending().contains(a.as_str()));
        assert!(client.pending().contains(b.as_str()));
    }

    #[test]
    fn test_send_with_runs_and_consumes_batch() {
        let mut client = client();
        for id in ["1", "2", "3", "4", "5"] {
            client.get(id, format!("http://fake.test/{id}")).expect("add");
        }

        let transport = FakeTransport::new(echo(|_| 2));
        let stats = transport.stats();
        let results = client.send_with(move || Ok(transport)).expect("send");

        assert_eq!(results.len(), 5);
        assert_eq!(
            results.get("3").map(|entry| &entry.body),
            Some(&Body::Json(json!({ "id": "3" })))
        );
        assert_eq!(stats.borrow().allocated, 2);
        assert!(client.is_empty());
    }

    #[test]
    fn test_send_empty_batch() {
        let mut client = client();
        let results = client.send().expect("send");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_send_async_empty_batch() {
        let mut client = client();
        let results = client.send_async().await.expect("send");
        assert!(results.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut client = client();
        client.get("a", "https://example.com/").expect("add");
        client.clear();
        assert!(client.is_empty());
    }
}
