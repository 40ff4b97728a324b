//! Request lifecycle shared by every store.
//!
//! A store operation enters an in-flight scope with [`Resource::begin`]:
//! `loading` is raised and the previous `error` is cleared. The returned
//! [`InFlight`] guard lowers `loading` again when it is dropped, so the flag
//! is released on success, on failure, on early return, and when the
//! operation future itself is dropped. Failures go through
//! [`InFlight::fail`], which records a message in `error` and hands the
//! failure back so the caller can propagate it.
//!
//! With [`ConcurrencyPolicy::Serialized`] each store also owns a FIFO turn:
//! a second operation waits until the first one has left its scope. With
//! [`ConcurrencyPolicy::Interleaved`] calls overlap and the shared
//! `loading`/`error` fields reflect whichever call touched them last.

use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::warn;

use crate::error::StoreError;

/// Busy flag and last failure message of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Loading,
    Failed,
}

impl RequestStatus {
    pub fn phase(&self) -> RequestPhase {
        if self.loading {
            RequestPhase::Loading
        } else if self.error.is_some() {
            RequestPhase::Failed
        } else {
            RequestPhase::Idle
        }
    }
}

/// State slices that carry a [`RequestStatus`].
pub trait ResourceState: Send + Sync + 'static {
    fn status(&self) -> &RequestStatus;
    fn status_mut(&mut self) -> &mut RequestStatus;
}

/// How overlapping operations on one store are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// Operations queue up and run one at a time.
    #[default]
    Serialized,
    /// Operations run as soon as they are called and may interleave.
    Interleaved,
}

impl ConcurrencyPolicy {
    pub fn from_serialize_flag(serialize: bool) -> Self {
        if serialize {
            ConcurrencyPolicy::Serialized
        } else {
            ConcurrencyPolicy::Interleaved
        }
    }
}

/// Observable state container plus the operation queue of one store.
pub struct Resource<S> {
    state: watch::Sender<S>,
    queue: Mutex<()>,
    policy: ConcurrencyPolicy,
}

impl<S: ResourceState> Resource<S> {
    pub fn new(initial: S, policy: ConcurrencyPolicy) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            queue: Mutex::new(()),
            policy,
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Mutate the state and notify subscribers.
    pub fn modify(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn loading(&self) -> bool {
        self.read(|state| state.status().loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.status().error.clone())
    }

    /// Enter the in-flight scope of an operation.
    ///
    /// `fallback` is recorded when a failure has no description of its own.
    pub async fn begin(&self, fallback: &'static str) -> InFlight<'_, S> {
        let turn = match self.policy {
            ConcurrencyPolicy::Serialized => Some(self.queue.lock().await),
            ConcurrencyPolicy::Interleaved => None,
        };

        self.modify(|state| {
            let status = state.status_mut();
            status.loading = true;
            status.error = None;
        });

        InFlight {
            resource: self,
            fallback,
            _turn: turn,
        }
    }
}

/// Guard for one in-flight operation; lowers `loading` on drop.
#[must_use = "dropping the guard ends the operation immediately"]
pub struct InFlight<'a, S: ResourceState> {
    resource: &'a Resource<S>,
    fallback: &'static str,
    _turn: Option<MutexGuard<'a, ()>>,
}

impl<S: ResourceState> InFlight<'_, S> {
    /// Record `err` in the store's `error` field and return it for propagation.
    pub fn fail(&self, err: impl Into<StoreError>) -> StoreError {
        let err = err.into();
        let message = err
            .describe()
            .unwrap_or_else(|| self.fallback.to_string());

        warn!(error = %message, operation = self.fallback, "store operation failed");

        self.resource
            .modify(|state| state.status_mut().error = Some(message));
        err
    }
}

impl<S: ResourceState> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.resource
            .modify(|state| state.status_mut().loading = false);
    }
}
