#![forbid(unsafe_code)]

//! Observers: a notification callback paired with a non-owning receiver
//! handle.
//!
//! # Design
//!
//! An [`Observer`] stores its callback behind an `Rc`, so cloning an observer
//! (as the view does when it snapshots an interest list) is cheap and never
//! copies the closure. The receiver is identified by a [`NotifyContext`], a
//! type-erased `Weak` handle compared by allocation address. The context never
//! keeps its receiver alive, and because a `Weak` keeps the allocation itself
//! reserved, two contexts compare equal exactly when they were taken from the
//! same `Rc` allocation.
//!
//! # Invariants
//!
//! 1. Observer equality is context equality; the callback is not compared.
//! 2. Cloning an observer shares the callback and the context.
//! 3. A context never extends the lifetime of its receiver.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::HandlerResult;
use crate::notification::Notification;

/// Callback invoked with each delivered notification.
type NotifyFn = Rc<dyn Fn(&Notification) -> HandlerResult>;

/// Type-erased view of a `Weak<T>`.
trait ErasedWeak {
    fn addr(&self) -> *const ();
    fn is_alive(&self) -> bool;
}

impl<T: ?Sized + 'static> ErasedWeak for Weak<T> {
    fn addr(&self) -> *const () {
        self.as_ptr().cast::<()>()
    }

    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }
}

/// Non-owning, identity-comparable handle to an observer's receiver.
#[derive(Clone)]
pub struct NotifyContext {
    handle: Rc<dyn ErasedWeak>,
}

impl NotifyContext {
    /// Take a context from any shared receiver.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(target: &Rc<T>) -> Self {
        Self::from_weak(Rc::downgrade(target))
    }

    /// Take a context from an existing weak handle.
    #[must_use]
    pub fn from_weak<T: ?Sized + 'static>(target: Weak<T>) -> Self {
        Self {
            handle: Rc::new(target),
        }
    }

    /// Whether this context refers to `target`.
    #[must_use]
    pub fn refers_to<T: ?Sized + 'static>(&self, target: &Rc<T>) -> bool {
        self.handle.addr() == Rc::as_ptr(target).cast::<()>()
    }

    /// Whether the receiver is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }
}

impl PartialEq for NotifyContext {
    fn eq(&self, other: &Self) -> bool {
        self.handle.addr() == other.handle.addr()
    }
}

impl Eq for NotifyContext {}

impl fmt::Debug for NotifyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyContext")
            .field("addr", &self.handle.addr())
            .field("alive", &self.handle.is_alive())
            .finish()
    }
}

/// A subscription record: callback plus receiver identity.
#[derive(Clone)]
pub struct Observer {
    notify: NotifyFn,
    context: NotifyContext,
}

impl Observer {
    /// Create an observer from a callback and its receiver context.
    pub fn new<F>(notify: F, context: NotifyContext) -> Self
    where
        F: Fn(&Notification) -> HandlerResult + 'static,
    {
        Self {
            notify: Rc::new(notify),
            context,
        }
    }

    /// Invoke the callback.
    pub fn notify_observer(&self, notification: &Notification) -> HandlerResult {
        (self.notify)(notification)
    }

    /// The receiver context.
    #[must_use]
    pub fn context(&self) -> &NotifyContext {
        &self.context
    }

    /// Whether this observer's receiver is `context`.
    #[must_use]
    pub fn compare_notify_context(&self, context: &NotifyContext) -> bool {
        self.context == *context
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context
    }
}

impl Eq for Observer {}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
