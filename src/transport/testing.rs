//! In-memory transport for scheduler tests.
//!
//! Transfers take a fixed number of `perform` calls ("ticks") to finish,
//! so completion order is fully deterministic. Failures can be injected
//! at allocation, advance and transfer level.

// ============================================================================
// Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, WorkerSlot};
use crate::request::RequestDescriptor;

use super::{Completion, Progress, TransferFailure, Transport};

// ============================================================================
// FakeReply
// ============================================================================

/// Scripted reply for one request.
#[derive(Debug, Clone)]
pub(crate) struct FakeReply {
    /// `perform` calls until the transfer finishes.
    pub latency: u32,
    /// Raw response bytes or a transport failure.
    pub outcome: std::result::Result<Vec<u8>, TransferFailure>,
}

impl FakeReply {
    /// Reply with the given raw response text.
    pub fn raw(latency: u32, raw: impl Into<String>) -> Self {
        Self {
            latency,
            outcome: Ok(raw.into().into_bytes()),
        }
    }

    /// `200 OK` reply with a JSON body.
    pub fn json(latency: u32, body: Value) -> Self {
        Self::raw(
            latency,
            format!("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{body}"),
        )
    }

    /// Transport-level failure.
    pub fn failure(latency: u32, url: &str, message: &str) -> Self {
        Self {
            latency,
            outcome: Err(TransferFailure {
                url: url.to_owned(),
                message: message.to_owned(),
            }),
        }
    }
}

/// Responder echoing the last URL path segment as `{"id": ...}`.
pub(crate) fn echo(
    latency: impl Fn(&RequestDescriptor) -> u32 + 'static,
) -> impl Fn(&RequestDescriptor) -> FakeReply + 'static {
    move |request| {
        let id = request.url.rsplit('/').next().unwrap_or_default();
        FakeReply::json(latency(request), serde_json::json!({ "id": id }))
    }
}

// ============================================================================
// FakeStats
// ============================================================================

/// Observations shared with the test after the transport is moved away.
#[derive(Debug, Default)]
pub(crate) struct FakeStats {
    /// Workers allocated.
    pub allocated: usize,
    /// Submissions in order.
    pub submitted: Vec<(WorkerSlot, RequestId)>,
    /// Completions in the order they were handed out.
    pub completed: Vec<RequestId>,
    /// `perform` calls.
    pub performs: usize,
    /// `wait` calls.
    pub waits: usize,
    /// Highest number of workers attached at once.
    pub peak_in_flight: usize,
    /// Set when the transport is dropped.
    pub released: bool,
}

// ============================================================================
// FakeTransport
// ============================================================================

struct InFlight {
    slot: WorkerSlot,
    request_id: RequestId,
    remaining: u32,
    outcome: std::result::Result<Vec<u8>, TransferFailure>,
}

/// Deterministic [`Transport`] driven by a responder closure.
pub(crate) struct FakeTransport {
    responder: Box<dyn Fn(&RequestDescriptor) -> FakeReply>,
    /// Per slot: `true` while attached to the multiplexer.
    attached: Vec<bool>,
    in_flight: Vec<InFlight>,
    finished: VecDeque<(Completion, RequestId)>,
    stats: Rc<RefCell<FakeStats>>,
    fail_allocation_at: Option<usize>,
    fail_perform_after: Option<usize>,
    call_again: bool,
    call_again_pending: bool,
}

impl FakeTransport {
    pub fn new(responder: impl Fn(&RequestDescriptor) -> FakeReply + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            attached: Vec::new(),
            in_flight: Vec::new(),
            finished: VecDeque::new(),
            stats: Rc::new(RefCell::new(FakeStats::default())),
            fail_allocation_at: None,
            fail_perform_after: None,
            call_again: false,
            call_again_pending: false,
        }
    }

    /// Shared statistics handle.
    pub fn stats(&self) -> Rc<RefCell<FakeStats>> {
        Rc::clone(&self.stats)
    }

    /// Fails allocation of the worker at `index`.
    pub fn fail_allocation_at(mut self, index: usize) -> Self {
        self.fail_allocation_at = Some(index);
        self
    }

    /// Fails every `perform` after the first `count`.
    pub fn fail_perform_after(mut self, count: usize) -> Self {
        self.fail_perform_after = Some(count);
        self
    }

    /// Answers every other `perform` with [`Progress::CallAgain`].
    pub fn with_call_again(mut self) -> Self {
        self.call_again = true;
        self
    }
}

impl Transport for FakeTransport {
    fn allocate(&mut self, slot: WorkerSlot) -> Result<()> {
        if self.fail_allocation_at == Some(slot.index()) {
            return Err(Error::worker_init(slot, "injected allocation failure"));
        }
        assert_eq!(slot.index(), self.attached.len(), "slots allocated out of order");

        self.attached.push(false);
        self.stats.borrow_mut().allocated += 1;
        Ok(())
    }

    fn submit(&mut self, slot: WorkerSlot, request: &RequestDescriptor) -> Result<()> {
        match self.attached.get(slot.index()) {
            None => return Err(Error::worker_config(request.id.clone(), "unallocated worker")),
            Some(true) => return Err(Error::worker_config(request.id.clone(), "worker busy")),
            Some(false) => {}
        }

        self.attached[slot.index()] = true;
        let reply = (self.responder)(request);
        self.in_flight.push(InFlight {
            slot,
            request_id: request.id.clone(),
            remaining: reply.latency,
            outcome: reply.outcome,
        });

        let attached = self.attached.iter().filter(|a| **a).count();
        let mut stats = self.stats.borrow_mut();
        stats.submitted.push((slot, request.id.clone()));
        stats.peak_in_flight = stats.peak_in_flight.max(attached);
        Ok(())
    }

    fn perform(&mut self) -> Result<Progress> {
        let performs = {
            let mut stats = self.stats.borrow_mut();
            stats.performs += 1;
            stats.performs
        };

        if self.fail_perform_after.is_some_and(|limit| performs > limit) {
            return Err(Error::multiplexer("injected advance failure"));
        }

        if self.call_again {
            self.call_again_pending = !self.call_again_pending;
            if self.call_again_pending {
                return Ok(Progress::CallAgain);
            }
        }

        for transfer in &mut self.in_flight {
            transfer.remaining = transfer.remaining.saturating_sub(1);
        }

        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|transfer| transfer.remaining == 0);
        self.in_flight = running;

        for transfer in done {
            self.finished.push_back((
                Completion {
                    slot: transfer.slot,
                    outcome: transfer.outcome,
                },
                transfer.request_id,
            ));
        }

        Ok(Progress::Running(self.in_flight.len()))
    }

    fn wait(&mut self, _timeout: Duration) -> Result<()> {
        self.stats.borrow_mut().waits += 1;
        Ok(())
    }

    fn next_completion(&mut self) -> Option<Completion> {
        let (completion, request_id) = self.finished.pop_front()?;
        self.attached[completion.slot.index()] = false;
        self.stats.borrow_mut().completed.push(request_id);
        Some(completion)
    }
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        self.stats.borrow_mut().released = true;
    }
}
