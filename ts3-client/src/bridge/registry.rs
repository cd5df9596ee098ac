//! Process-wide handler table guarded by one reader/writer lock.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use parking_lot::RwLock;

use crate::bridge::callback::{ClientCallbacks, Handler};
use crate::error::Result;
use crate::event::EventKind;
use crate::ids::ConnectionHandlerId;

/// Holds the current [`ClientCallbacks`] and hands them to the trampolines.
///
/// Registration swaps the whole set under the write lock; every delivery holds the read lock
/// from lookup until its handler returns. A delivery therefore sees either the complete old
/// set or the complete new one, never a mix.
///
/// The trampolines are bound to [`bridge::abi::REGISTRY`](crate::bridge::abi::REGISTRY).
/// Separate instances behave identically and are what tests use.
pub struct HandlerRegistry {
    callbacks: RwLock<ClientCallbacks>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(ClientCallbacks::default()),
        }
    }

    /// Install `callbacks`, then run `arm` while still holding the write lock.
    ///
    /// If `arm` fails the previous set is put back and the error returned, so the registry
    /// never holds handlers the library was not successfully armed for.
    ///
    /// Must not be called from inside a handler: the caller's own read lock would block the
    /// swap forever.
    pub fn replace<F>(&self, callbacks: ClientCallbacks, arm: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut current = self.callbacks.write();
        let previous = std::mem::replace(&mut *current, callbacks);
        match arm() {
            Ok(()) => {
                tracing::debug!(
                    handlers = current.registered().count(),
                    "handler set replaced"
                );
                Ok(())
            }
            Err(e) => {
                *current = previous;
                tracing::warn!("arming failed, previous handler set restored: {e}");
                Err(e)
            }
        }
    }

    /// Whether the current set has a handler for `kind`.
    pub fn is_set(&self, kind: EventKind) -> bool {
        self.callbacks.read_recursive().is_set(kind)
    }

    /// Look up the handler chosen by `select`, build its payload, and call it.
    ///
    /// Returns without building anything when the slot is empty. A panic from `build` or the
    /// handler is caught here and reported; it never unwinds into the caller.
    pub(crate) fn dispatch<E, S, B>(
        &self,
        kind: EventKind,
        connection: ConnectionHandlerId,
        select: S,
        build: B,
    ) where
        S: FnOnce(&ClientCallbacks) -> Option<&Handler<E>>,
        B: FnOnce() -> E,
    {
        // Recursive so a delivery nested inside a handler cannot queue behind a writer.
        let callbacks = self.callbacks.read_recursive();
        let Some(handler) = select(&*callbacks) else {
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let event = build();
            handler(connection, &event);
        }));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            tracing::error!(event = %kind, %connection, "handler panicked: {message}");
            if let Some(sink) = &callbacks.handler_panic {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| sink(kind, &message)));
            }
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
