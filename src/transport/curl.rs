//! libcurl multi interface transport.
//!
//! Each worker is a libcurl easy handle. A handle is reset and
//! reconfigured for every request it runs, which keeps its connection
//! cache warm when the pool is smaller than the batch. TLS, DNS,
//! redirects and content decoding are all left to libcurl.
//!
//! # Worker States
//!
//! ```text
//!            submit (reset + configure + add)
//!   Idle(Easy2) ─────────────────────────────► Busy(Easy2Handle)
//!        ▲                                            │
//!        └──────── next_completion (remove) ──────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::time::Duration;

use curl::easy::{Easy2, Handler, List, WriteError};
use curl::multi::{Easy2Handle, Multi};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::WorkerSlot;
use crate::request::{Method, RequestDescriptor};

use super::{Completion, Progress, TransferFailure, Transport};

// ============================================================================
// Collector
// ============================================================================

/// Write handler buffering everything libcurl delivers.
///
/// With header capture enabled this is every header block followed by
/// the body.
#[derive(Debug, Default)]
pub struct Collector(Vec<u8>);

impl Collector {
    /// Takes the buffered bytes, leaving the buffer empty.
    #[inline]
    fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.0)
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.0.extend_from_slice(data);
        Ok(data.len())
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Native handle behind one worker slot.
enum Worker {
    /// Detached from the multiplexer, ready for reuse.
    Idle(Easy2<Collector>),
    /// Attached and transferring; keeps the requested URL for error reports.
    Busy(Easy2Handle<Collector>, String),
    /// Transiently empty while the handle moves between states.
    Vacant,
}

// ============================================================================
// CurlTransport
// ============================================================================

/// [`Transport`] backed by a libcurl multi handle.
pub struct CurlTransport {
    /// The multiplexer.
    multi: Multi,
    /// Workers indexed by slot.
    workers: Vec<Worker>,
    /// Completions read from the multiplexer but not yet handed out.
    finished: VecDeque<Completion>,
}

impl CurlTransport {
    /// Creates a transport with libcurl's default connection cache.
    ///
    /// # Errors
    ///
    /// Currently never fails. libcurl's global init and multi handle
    /// creation abort the process instead of reporting an error, so
    /// [`Error::TransportInit`] only comes from
    /// [`with_connection_limit`](Self::with_connection_limit).
    pub fn new() -> Result<Self> {
        curl::init();

        debug!("libcurl multi handle created");

        Ok(Self {
            multi: Multi::new(),
            workers: Vec::new(),
            finished: VecDeque::new(),
        })
    }

    /// Creates a transport that never opens more than `limit` connections.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportInit`] if the limit cannot be applied.
    pub fn with_connection_limit(limit: usize) -> Result<Self> {
        let mut transport = Self::new()?;
        transport
            .multi
            .set_max_total_connections(limit)
            .map_err(|e| Error::transport_init(format!("setting connection limit: {e}")))?;
        Ok(transport)
    }

    /// Returns the number of allocated workers.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Reads finished transfers off the multiplexer and detaches them.
    fn collect_finished(&mut self) {
        let mut done = Vec::new();
        let workers = &self.workers;

        self.multi.messages(|message| {
            let Ok(token) = message.token() else {
                return;
            };
            if let Some(Worker::Busy(handle, _)) = workers.get(token)
                && let Some(result) = message.result_for2(handle)
            {
                done.push((token, result));
            }
        });

        for (index, result) in done {
            let slot = WorkerSlot::new(index);
            let Worker::Busy(handle, url) =
                std::mem::replace(&mut self.workers[index], Worker::Vacant)
            else {
                continue;
            };

            let outcome = match self.multi.remove2(handle) {
                Ok(mut easy) => {
                    let raw = easy.get_mut().take();
                    let effective_url = easy
                        .effective_url()
                        .ok()
                        .flatten()
                        .map_or(url, str::to_owned);
                    self.workers[index] = Worker::Idle(easy);

                    match result {
                        Ok(()) => Ok(raw),
                        Err(e) => Err(TransferFailure {
                            url: effective_url,
                            message: e.to_string(),
                        }),
                    }
                }
                Err(e) => Err(TransferFailure {
                    url,
                    message: format!("detaching worker failed: {e}"),
                }),
            };

            debug!(%slot, ok = outcome.is_ok(), "Worker detached");
            self.finished.push_back(Completion { slot, outcome });
        }
    }
}

// ============================================================================
// CurlTransport - Transport
// ============================================================================

impl Transport for CurlTransport {
    /// Creates the easy handle for `slot`.
    ///
    /// Slots must arrive in order; an out-of-order slot is the only
    /// [`Error::WorkerInit`] this transport returns, since easy handle
    /// creation aborts rather than failing.
    fn allocate(&mut self, slot: WorkerSlot) -> Result<()> {
        if slot.index() != self.workers.len() {
            return Err(Error::worker_init(
                slot,
                format!("expected slot #{}", self.workers.len()),
            ));
        }

        self.workers.push(Worker::Idle(Easy2::new(Collector::default())));
        trace!(%slot, "Worker allocated");
        Ok(())
    }

    fn submit(&mut self, slot: WorkerSlot, request: &RequestDescriptor) -> Result<()> {
        let index = slot.index();
        let mut easy = match self.workers.get_mut(index).map(|w| std::mem::replace(w, Worker::Vacant)) {
            Some(Worker::Idle(easy)) => easy,
            Some(other) => {
                self.workers[index] = other;
                return Err(Error::worker_config(
                    request.id.clone(),
                    format!("worker {slot} is not idle"),
                ));
            }
            None => {
                return Err(Error::worker_config(
                    request.id.clone(),
                    format!("worker {slot} was never allocated"),
                ));
            }
        };

        easy.reset();
        easy.get_mut().take();

        if let Err(e) = configure(&mut easy, request) {
            self.workers[index] = Worker::Idle(easy);
            return Err(Error::worker_config(request.id.clone(), e.to_string()));
        }

        let mut handle = self
            .multi
            .add2(easy)
            .map_err(|e| Error::worker_config(request.id.clone(), e.to_string()))?;
        handle
            .set_token(index)
            .map_err(|e| Error::worker_config(request.id.clone(), e.to_string()))?;

        self.workers[index] = Worker::Busy(handle, request.url.clone());
        Ok(())
    }

    fn perform(&mut self) -> Result<Progress> {
        match self.multi.perform() {
            Ok(running) => {
                trace!(running, "Multiplexer advanced");
                Ok(Progress::Running(running as usize))
            }
            Err(e) if e.is_call_perform() => Ok(Progress::CallAgain),
            Err(e) => Err(Error::multiplexer(format!("perform failed: {e}"))),
        }
    }

    fn wait(&mut self, timeout: Duration) -> Result<()> {
        self.multi
            .wait(&mut [], timeout)
            .map(|_| ())
            .map_err(|e| Error::multiplexer(format!("wait failed: {e}")))
    }

    fn next_completion(&mut self) -> Option<Completion> {
        if self.finished.is_empty() {
            self.collect_finished();
        }
        self.finished.pop_front()
    }
}

impl Drop for CurlTransport {
    fn drop(&mut self) {
        debug!(workers = self.workers.len(), "libcurl transport released");
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Applies a request to a freshly reset easy handle.
fn configure(easy: &mut Easy2<Collector>, request: &RequestDescriptor) -> std::result::Result<(), curl::Error> {
    easy.url(&request.url)?;
    easy.show_header(true)?;

    match (request.effective_method(), &request.body) {
        (Method::Get, None) => easy.get(true)?,
        (Method::Post, _) => easy.post(true)?,
        (Method::Head, _) => easy.nobody(true)?,
        (method, _) => easy.custom_request(method.as_str())?,
    }

    match &request.body {
        Some(body) => easy.post_fields_copy(body.as_bytes())?,
        None if request.effective_method() == Method::Post => easy.post_fields_copy(&[])?,
        None => {}
    }

    let mut headers = List::new();
    for line in request.header_lines() {
        headers.append(&line)?;
    }
    easy.http_headers(headers)?;

    let options = &request.options;
    if let Some(follow) = options.follow_redirects {
        easy.follow_location(follow)?;
    }
    if let Some(max) = options.max_redirects {
        easy.max_redirections(max)?;
    }
    if let Some(timeout) = options.timeout {
        easy.timeout(timeout)?;
    }
    if let Some(timeout) = options.connect_timeout {
        easy.connect_timeout(timeout)?;
    }
    if let Some(encoding) = &options.accept_encoding {
        easy.accept_encoding(encoding)?;
    }
    if let Some(agent) = &options.user_agent {
        easy.useragent(agent)?;
    }
    if let Some(verify) = options.verify_tls {
        easy.ssl_verify_peer(verify)?;
        easy.ssl_verify_host(verify)?;
    }
    if let Some(verbose) = options.verbose {
        easy.verbose(verbose)?;
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
