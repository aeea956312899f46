//! Connection-pool scheduler.
//!
//! Maps a [`RequestBatch`] onto a fixed set of reusable transport workers
//! and drives the transport until every request has a response.
//!
//! Scheduling is single-threaded and cooperative: concurrency comes from
//! the transport's non-blocking multiplexing, and the only blocking point
//! is [`Transport::wait`] with the configured timeout.
//!
//! # Failure Policy
//!
//! Transport initialization, worker allocation, worker configuration,
//! multiplexer and per-transfer failures all abort the run. The transport
//! is dropped on the way out and no partial results are returned.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::WorkerSlot;
use crate::request::{RequestBatch, RequestDescriptor};
use crate::response::{ResultMap, framer};

use super::pool::WorkerPool;
use super::{Completion, Progress, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Default upper bound on simultaneously open connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Default time to block waiting for socket activity.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Scheduler
// ============================================================================

/// Runs batches over a bounded pool of transport workers.
///
/// # Example
///
/// ```no_run
/// use multicurl::{CurlTransport, RequestBatch, Scheduler};
///
/// # fn example(batch: RequestBatch) -> multicurl::Result<()> {
/// let results = Scheduler::new(8).run(batch, CurlTransport::new)?;
/// for (id, entry) in results.iter() {
///     println!("{id}: {:?}", entry.status_code);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    /// Upper bound on pool size.
    max_connections: usize,
    /// Blocking wait per readiness poll.
    wait_timeout: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONNECTIONS)
    }
}

impl Scheduler {
    /// Creates a scheduler bounded to `max_connections` workers.
    #[inline]
    #[must_use]
    pub const fn new(max_connections: usize) -> Self {
        Self {
            max_connections,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Sets how long each readiness wait may block.
    #[inline]
    #[must_use]
    pub const fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Returns the configured connection bound.
    #[inline]
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Returns the configured readiness wait.
    #[inline]
    #[must_use]
    pub const fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Returns the pool size used for a batch of `batch_len` requests.
    #[inline]
    #[must_use]
    pub fn pool_size(&self, batch_len: usize) -> usize {
        self.max_connections.min(batch_len)
    }

    /// Runs `batch` to completion.
    ///
    /// `open` creates the transport; it is not called for an empty batch.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `max_connections` is zero and the batch is not empty
    /// - [`Error::TransportInit`] if `open` fails
    /// - [`Error::WorkerInit`] if any worker cannot be allocated
    /// - [`Error::WorkerConfig`] if a worker rejects a request
    /// - [`Error::Multiplexer`] if the transport fails to advance or wait
    /// - [`Error::Transfer`] if any transfer fails at the transport level
    pub fn run<T, F>(&self, batch: RequestBatch, open: F) -> Result<ResultMap>
    where
        T: Transport,
        F: FnOnce() -> Result<T>,
    {
        if batch.is_empty() {
            debug!("Empty batch, nothing to run");
            return Ok(ResultMap::new());
        }

        if self.max_connections == 0 {
            return Err(Error::config(
                "max_connections must be at least 1 for a non-empty batch",
            ));
        }

        let started = Instant::now();
        let requests = batch.len();
        let pool_size = self.pool_size(requests);

        info!(requests, pool_size, "Running batch");

        let mut transport = open()?;
        for index in 0..pool_size {
            transport.allocate(WorkerSlot::new(index))?;
        }
        debug!(pool_size, "Workers allocated");

        let mut run = Run {
            transport,
            pool: WorkerPool::new(pool_size),
            results: ResultMap::with_capacity(requests),
            wait_timeout: self.wait_timeout,
        };

        for request in batch {
            run.submit(request)?;
        }

        while run.pool.busy_count() > 0 {
            run.do_work()?;
        }

        let Run {
            transport, results, ..
        } = run;
        drop(transport);

        info!(
            responses = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch finished"
        );

        Ok(results)
    }
}

// ============================================================================
// Run
// ============================================================================

/// State of one batch run. Owned exclusively by the scheduling loop.
struct Run<T> {
    transport: T,
    pool: WorkerPool,
    results: ResultMap,
    wait_timeout: Duration,
}

impl<T: Transport> Run<T> {
    /// Hands `request` to an idle worker, doing work until one frees up.
    fn submit(&mut self, request: RequestDescriptor) -> Result<()> {
        while !self.pool.has_idle() {
            self.do_work()?;
        }

        let slot = self
            .pool
            .acquire(request.id.clone())
            .ok_or_else(|| Error::multiplexer("no idle worker after draining completions"))?;

        self.transport.submit(slot, &request)?;

        debug!(
            request_id = %request.id,
            %slot,
            method = %request.effective_method(),
            url = %request.url,
            "Request submitted"
        );

        Ok(())
    }

    /// Advances transfers until at least one finished, then drains.
    fn do_work(&mut self) -> Result<()> {
        if self.pool.busy_count() == 0 {
            return Ok(());
        }

        loop {
            match self.transport.perform()? {
                Progress::CallAgain => continue,
                Progress::Running(running) if running < self.pool.busy_count() => break,
                Progress::Running(running) => {
                    trace!(running, busy = self.pool.busy_count(), "Waiting for activity");
                    self.transport.wait(self.wait_timeout)?;
                }
            }
        }

        self.drain()
    }

    /// Records every finished transfer and frees its worker.
    fn drain(&mut self) -> Result<()> {
        while let Some(Completion { slot, outcome }) = self.transport.next_completion() {
            let raw = match outcome {
                Ok(raw) => raw,
                Err(failure) => {
                    let request_id = self
                        .pool
                        .assigned(slot)
                        .cloned()
                        .unwrap_or_else(|| slot.index().into());
                    error!(
                        request_id = %request_id,
                        url = %failure.url,
                        error = %failure.message,
                        "Transfer failed, aborting batch"
                    );
                    return Err(Error::transfer(request_id, failure.url, failure.message));
                }
            };

            let Some(request_id) = self.pool.release(slot) else {
                warn!(%slot, "Completion reported for a worker that is not busy");
                return Err(Error::multiplexer(format!(
                    "completion reported for idle worker {slot}"
                )));
            };

            let entry = framer::parse(&raw);
            debug!(
                request_id = %request_id,
                %slot,
                status = ?entry.status_code,
                bytes = raw.len(),
                "Request completed"
            );

            if !self.results.record(request_id.clone(), entry) {
                warn!(request_id = %request_id, "Duplicate response ignored");
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
