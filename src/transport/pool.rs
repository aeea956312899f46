//! Worker slot bookkeeping.
//!
//! Tracks which workers are idle and which request each busy worker is
//! running. The native handles themselves live in the transport, indexed
//! by the same slots.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             WorkerPool (N=3)            │
//! │  workers: [Busy("a"), Idle, Busy("c")]  │
//! │  idle:    [1]                           │
//! │  busy:    2                             │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Invariant: every slot is either on the idle stack or busy, never both,
//! so `idle + busy == N` at all times.

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::{RequestId, WorkerSlot};

// ============================================================================
// WorkerState
// ============================================================================

/// State of one worker slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    /// Free for a new request.
    Idle,
    /// Running the request with this ID.
    Busy(RequestId),
}

// ============================================================================
// WorkerPool
// ============================================================================

/// Array-backed pool of worker slots with an idle free-list.
#[derive(Debug)]
pub struct WorkerPool {
    /// State per slot, indexed by slot.
    workers: Vec<WorkerState>,
    /// Idle slots, used as a stack.
    idle: Vec<WorkerSlot>,
    /// Number of busy slots.
    busy: usize,
}

impl WorkerPool {
    /// Creates a pool of `size` idle slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            workers: vec![WorkerState::Idle; size],
            idle: (0..size).rev().map(WorkerSlot::new).collect(),
            busy: 0,
        }
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of idle slots.
    #[inline]
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Returns the number of busy slots.
    #[inline]
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.busy
    }

    /// Returns `true` if at least one slot is idle.
    #[inline]
    #[must_use]
    pub fn has_idle(&self) -> bool {
        !self.idle.is_empty()
    }

    /// Returns the state of `slot`.
    #[must_use]
    pub fn state(&self, slot: WorkerSlot) -> Option<&WorkerState> {
        self.workers.get(slot.index())
    }

    /// Returns the request running on `slot`, if it is busy.
    #[must_use]
    pub fn assigned(&self, slot: WorkerSlot) -> Option<&RequestId> {
        match self.workers.get(slot.index()) {
            Some(WorkerState::Busy(id)) => Some(id),
            _ => None,
        }
    }

    /// Takes an idle slot and marks it busy with `request_id`.
    ///
    /// Returns `None` if every slot is busy.
    pub fn acquire(&mut self, request_id: RequestId) -> Option<WorkerSlot> {
        let slot = self.idle.pop()?;
        self.workers[slot.index()] = WorkerState::Busy(request_id);
        self.busy += 1;
        self.debug_check();
        Some(slot)
    }

    /// Returns a busy slot to the idle stack.
    ///
    /// Returns the request it was running, or `None` if the slot was not
    /// busy (the pool is left unchanged).
    pub fn release(&mut self, slot: WorkerSlot) -> Option<RequestId> {
        let state = self.workers.get_mut(slot.index())?;

        match std::mem::replace(state, WorkerState::Idle) {
            WorkerState::Busy(request_id) => {
                self.idle.push(slot);
                self.busy -= 1;
                self.debug_check();
                Some(request_id)
            }
            WorkerState::Idle => None,
        }
    }

    /// Asserts the idle/busy invariant in debug builds.
    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(self.idle.len() + self.busy, self.workers.len());
    }
}

// ============================================================================
// Tests
// ============================================================================
