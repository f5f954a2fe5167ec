//! Request concurrency limiter
//!
//! Caps the number of operations running at once and queues the rest in
//! submission order. Admission is decided when [`RequestQueue::submit`] is
//! called, not when the returned future is first polled, so FIFO order is the
//! order of `submit` calls.
//!
//! Dropping the future returned by `submit` cancels the operation: a queued
//! operation is skipped when its turn comes, a running one releases its slot.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::trace;

/// Shared admission state
#[derive(Debug, Default)]
struct QueueState {
    /// Operations currently holding a slot
    running: usize,
    /// Waiters in submission order; sending hands over a slot
    waiting: VecDeque<oneshot::Sender<()>>,
}

/// Fixed-capacity FIFO limiter for async operations
///
/// Cloning yields a handle to the same queue.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    state: Arc<Mutex<QueueState>>,
    limit: usize,
}

impl RequestQueue {
    /// Creates a queue admitting at most `limit` operations at once (minimum 1)
    pub fn new(limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of operations currently running
    pub fn running(&self) -> usize {
        lock(&self.state).running
    }

    /// Number of operations waiting for a slot
    pub fn queued(&self) -> usize {
        lock(&self.state).waiting.len()
    }

    /// Submits an operation
    ///
    /// The operation starts right away if a slot is free and nobody is
    /// waiting; otherwise it waits behind earlier submissions. The slot is
    /// released when the operation settles, whatever its result.
    pub fn submit<F, Fut, T>(&self, operation: F) -> impl Future<Output = T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.admit();
        async move {
            let _slot = ticket.admitted().await;
            operation().await
        }
    }

    fn admit(&self) -> Ticket {
        let mut state = lock(&self.state);
        if state.running < self.limit && state.waiting.is_empty() {
            state.running += 1;
            trace!(running = state.running, limit = self.limit, "operation admitted");
            Ticket {
                waiter: None,
                state: self.state.clone(),
            }
        } else {
            let (tx, rx) = oneshot::channel();
            state.waiting.push_back(tx);
            trace!(queued = state.waiting.len(), "operation queued");
            Ticket {
                waiter: Some(rx),
                state: self.state.clone(),
            }
        }
    }
}

/// A submitted operation that has not started yet
struct Ticket {
    /// Present while the operation is queued
    waiter: Option<oneshot::Receiver<()>>,
    state: Arc<Mutex<QueueState>>,
}

impl Ticket {
    /// Waits until a slot is handed over
    async fn admitted(mut self) -> Slot {
        if let Some(waiter) = self.waiter.as_mut() {
            // Senders leave the queue only through `release`, which sends
            // before dropping, and the ticket keeps the queue alive
            let handed_over = waiter.await;
            debug_assert!(handed_over.is_ok(), "waiter left the queue without a slot");
        }
        self.waiter = None;
        Slot {
            state: self.state.clone(),
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if let Some(mut waiter) = self.waiter.take() {
            waiter.close();
            // A slot may have been handed over just before cancellation
            if waiter.try_recv().is_ok() {
                release(&self.state);
            }
        }
    }
}

/// A held slot; releasing it admits the next live waiter
struct Slot {
    state: Arc<Mutex<QueueState>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        release(&self.state);
    }
}

fn release(state: &Mutex<QueueState>) {
    let mut state = lock(state);
    while let Some(next) = state.waiting.pop_front() {
        if next.send(()).is_ok() {
            // Slot passes to the waiter; running count is unchanged
            return;
        }
    }
    state.running = state.running.saturating_sub(1);
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
