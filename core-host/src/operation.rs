//! # Operation State Machine
//!
//! Lifecycle of a browse or search on one entity.
//!
//! ```text
//!            request                 completion
//!   Idle ─────────────► InProgress ─────────────► Complete ─┐
//!    ▲   pin, store cb,     │  request:              ▲      │ request:
//!    │   issue native call  │  reject / ignore       └──────┘ store cb,
//!    └──────────────────────┘                                 invoke now
//!      native call refused
//! ```
//!
//! The native call is issued at most once per entity. `Complete` is sticky
//! and caches the outcome, including a native failure, so later requests are
//! answered immediately with the same outcome. Completion unpins the proxy
//! and invokes whichever callback is current at that moment.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bridge_traits::{EntityKey, NativeSession};
use core_runtime::config::ReentryPolicy;
use tracing::{debug, error};

use crate::error::{HostError, Result};
use crate::proxy::{Entity, Proxy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    InProgress,
    Complete,
}

/// How a request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The native call was issued.
    Issued,
    /// Already in progress and the policy says to ignore re-entry.
    Ignored,
    /// Already complete; the callback ran with the cached outcome.
    Replayed,
}

/// Completion handler. Receives the proxy and `Ok` or the native failure.
pub type CompletionCallback<E> = Rc<dyn Fn(Proxy<E>, Result<()>)>;

type Outcome<R> = std::result::Result<Rc<R>, String>;

pub struct Operation<E: Entity, R> {
    key: EntityKey,
    state: Cell<OperationState>,
    callback: RefCell<Option<CompletionCallback<E>>>,
    outcome: RefCell<Option<Outcome<R>>>,
}

impl<E: Entity, R: 'static> Operation<E, R> {
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            state: Cell::new(OperationState::Idle),
            callback: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    pub fn state(&self) -> OperationState {
        self.state.get()
    }

    pub fn is_complete(&self) -> bool {
        self.state.get() == OperationState::Complete
    }

    /// Requests the operation for `proxy`.
    ///
    /// `issue` performs the native call and runs only on the first request.
    /// If it fails synchronously the machine returns to `Idle` and the pin is
    /// released.
    pub fn request<F>(
        &self,
        proxy: &Proxy<E>,
        callback: CompletionCallback<E>,
        issue: F,
    ) -> Result<RequestOutcome>
    where
        F: FnOnce(&dyn NativeSession) -> bridge_traits::error::Result<()>,
    {
        let host = proxy.host()?;

        match self.state.get() {
            OperationState::Idle => {
                host.pin(proxy);
                *self.callback.borrow_mut() = Some(callback);
                self.state.set(OperationState::InProgress);
                debug!(entity = %self.key, "Operation in progress");

                if let Err(err) = issue(host.native().as_ref()) {
                    let discarded = self.callback.borrow_mut().take();
                    drop(discarded);
                    self.state.set(OperationState::Idle);
                    host.unpin(self.key)?;
                    debug!(entity = %self.key, error = %err, "Native call refused, back to idle");
                    return Err(err.into());
                }
                Ok(RequestOutcome::Issued)
            }
            OperationState::InProgress => match host.config().reentry_policy {
                ReentryPolicy::Reject => {
                    Err(HostError::OperationAlreadyInProgress { key: self.key })
                }
                ReentryPolicy::Ignore => {
                    debug!(entity = %self.key, "Ignoring request while in progress");
                    Ok(RequestOutcome::Ignored)
                }
            },
            OperationState::Complete => {
                let previous = self.callback.borrow_mut().replace(Rc::clone(&callback));
                drop(previous);
                debug!(entity = %self.key, "Replaying cached outcome");
                callback(proxy.clone(), self.callback_result());
                Ok(RequestOutcome::Replayed)
            }
        }
    }

    /// Finishes the operation with the native outcome.
    ///
    /// Called from the host thread when the completion event is drained.
    /// The operation is `Complete` and the callback has run even when
    /// releasing the pin fails; that failure is returned afterwards.
    pub fn complete(
        &self,
        proxy: &Proxy<E>,
        outcome: std::result::Result<R, String>,
    ) -> Result<()> {
        if self.state.get() != OperationState::InProgress {
            error!(entity = %self.key, state = ?self.state.get(), "Completion without a request in progress");
            return Err(HostError::UnexpectedCompletion { key: self.key });
        }

        *self.outcome.borrow_mut() = Some(outcome.map(Rc::new));
        self.state.set(OperationState::Complete);
        debug!(entity = %self.key, "Operation complete");

        let unpinned = proxy.host().and_then(|host| host.unpin(self.key));

        let callback = self.callback.borrow().clone();
        match callback {
            Some(callback) => callback(proxy.clone(), self.callback_result()),
            None => error!(entity = %self.key, "Completed operation has no callback"),
        }
        unpinned
    }

    /// The cached result, once complete.
    pub fn result(&self) -> Result<Rc<R>> {
        match &*self.outcome.borrow() {
            Some(Ok(result)) => Ok(Rc::clone(result)),
            Some(Err(message)) => Err(HostError::OperationFailed(message.clone())),
            None => Err(HostError::EntityNotReady { key: self.key }),
        }
    }

    fn callback_result(&self) -> Result<()> {
        self.result().map(|_| ())
    }
}

impl<E: Entity, R> fmt::Debug for Operation<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("key", &self.key)
            .field("state", &self.state.get())
            .field("has_callback", &self.callback.borrow().is_some())
            .finish()
    }
}
