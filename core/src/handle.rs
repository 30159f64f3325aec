//! Single-shot, cancellable, observable result of one fetch.
//!
//! # Design
//! The worker task and the [`FetchHandle`] share a `watch` channel holding the
//! [`Phase`]. Both sides move out of `Pending` with `send_if_modified`, which
//! is an atomic check-and-set under the channel's lock: whichever of
//! "begin delivery" and "cancel" lands first wins, and the loser is a no-op.
//! That is the whole cancellation story. The transport call is not
//! interrupted by it beyond a best-effort task abort.
//!
//! Observers and the stored outcome live under one mutex, so an observer
//! registered concurrently with delivery is either drained by the worker or
//! sees the stored outcome and is invoked on the spot. Never both.
//!
//! The work runs on its own task so a panic there surfaces as a `JoinError`
//! and is delivered as `TransportError::Worker`. A panicking observer is
//! contained and does not stop the others or the move to `Completed`.

use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::error::{FetchError, TransportError};

// ---------------------------------------------------------------------------
// Phase / Completion / Outcome
// ---------------------------------------------------------------------------

/// Lifecycle of one fetch: `Pending → Delivering → Completed`, or
/// `Pending → Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Delivering,
    Completed,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Cancelled)
    }
}

/// How a delivered outcome finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A value was delivered, possibly a fallback.
    Finished,
    /// An error was delivered.
    Failure,
}

/// The terminal outcome of a fetch. Exactly one is produced per call.
#[derive(Debug)]
pub enum Outcome<T> {
    Value(T),

    /// The call failed and a fallback value was substituted.
    Recovered { value: T, cause: FetchError },

    Failed(FetchError),
}

impl<T> Outcome<T> {
    pub fn completion(&self) -> Completion {
        match self {
            Outcome::Value(_) | Outcome::Recovered { .. } => Completion::Finished,
            Outcome::Failed(_) => Completion::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.completion() == Completion::Finished
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) | Outcome::Recovered { value, .. } => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    /// The error that was delivered. `None` for recovered outcomes; see
    /// [`Outcome::cause`].
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The error a fallback value replaced, if any.
    pub fn cause(&self) -> Option<&FetchError> {
        match self {
            Outcome::Recovered { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            Outcome::Value(value) | Outcome::Recovered { value, .. } => Ok(value),
            Outcome::Failed(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, FetchError>> for Outcome<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(err) => Outcome::Failed(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

type Observer<T> = Box<dyn FnOnce(&Outcome<T>) + Send>;

struct Slot<T> {
    observers: Vec<Observer<T>>,
    outcome: Option<Arc<Outcome<T>>>,
}

struct Shared<T> {
    phase: watch::Sender<Phase>,
    slot: Mutex<Slot<T>>,
}

impl<T> Shared<T> {
    fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Pending);
        Self {
            phase,
            slot: Mutex::new(Slot {
                observers: Vec::new(),
                outcome: None,
            }),
        }
    }

    fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    fn slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Leave `Pending` for `next`. False if something else got there first.
    fn leave_pending(&self, next: Phase) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Pending {
                *phase = next;
                true
            } else {
                false
            }
        })
    }

    fn deliver(&self, outcome: Outcome<T>) -> bool {
        if !self.leave_pending(Phase::Delivering) {
            return false;
        }
        let outcome = Arc::new(outcome);
        let observers = {
            let mut slot = self.slot();
            slot.outcome = Some(Arc::clone(&outcome));
            mem::take(&mut slot.observers)
        };
        for observer in observers {
            notify(observer, &outcome);
        }
        // Release our reference before waking `wait`, which unwraps the Arc.
        drop(outcome);
        self.phase.send_replace(Phase::Completed);
        true
    }
}

fn notify<T>(observer: Observer<T>, outcome: &Outcome<T>) {
    if panic::catch_unwind(AssertUnwindSafe(|| observer(outcome))).is_err() {
        warn!("fetch observer panicked");
    }
}

// ---------------------------------------------------------------------------
// FetchHandle
// ---------------------------------------------------------------------------

/// Handle to one in-flight fetch.
///
/// Delivers at most one [`Outcome`] to its observers. Dropping the handle
/// cancels it.
pub struct FetchHandle<T> {
    shared: Arc<Shared<T>>,
    task: AbortHandle,
}

impl<T: Send + Sync + 'static> FetchHandle<T> {
    /// Run `work` on a new tokio task and deliver its outcome through the
    /// returned handle. Must be called from within a tokio runtime.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let worker = Arc::clone(&shared);
        let task = tokio::spawn(work);
        let abort = task.abort_handle();
        tokio::spawn(async move {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    warn!(error = %e, "fetch worker panicked");
                    Outcome::Failed(TransportError::Worker(e.to_string()).into())
                }
            };
            if !worker.deliver(outcome) {
                debug!("fetch cancelled before delivery, outcome dropped");
            }
        });
        Self { shared, task: abort }
    }
}

impl<T> FetchHandle<T> {
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase() == Phase::Cancelled
    }

    /// Register an observer for the terminal outcome.
    ///
    /// Called at most once. If the outcome has already been delivered the
    /// observer runs immediately on the caller's thread; if the handle is
    /// cancelled it never runs.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let mut slot = self.shared.slot();
        let stored = slot.outcome.clone();
        if let Some(outcome) = stored {
            drop(slot);
            notify(Box::new(observer), &outcome);
            return;
        }
        if self.is_cancelled() {
            return;
        }
        slot.observers.push(Box::new(observer));
    }

    /// Cancel the fetch. Only effective while `Pending`; returns whether it
    /// took effect. The transport may keep working, but nothing is delivered.
    pub fn cancel(&self) -> bool {
        if !self.shared.leave_pending(Phase::Cancelled) {
            return false;
        }
        self.shared.slot().observers.clear();
        self.task.abort();
        debug!("fetch cancelled");
        true
    }

    /// Wait for the terminal outcome. `None` if the fetch was cancelled.
    pub async fn wait(self) -> Option<Outcome<T>> {
        let mut phase = self.shared.phase.subscribe();
        let terminal = match phase.wait_for(|p| p.is_terminal()).await {
            Ok(p) => *p,
            Err(_) => return None,
        };
        if terminal == Phase::Cancelled {
            return None;
        }
        let outcome = self.shared.slot().outcome.take()?;
        Arc::try_unwrap(outcome).ok()
    }
}

impl<T> Drop for FetchHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> fmt::Debug for FetchHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
