#![forbid(unsafe_code)]

//! View registry: mediators, observer interest lists, and dispatch.
//!
//! # Design
//!
//! Interest lists map a notification name to the observers registered for
//! it, in registration order. [`View::notify_observers`] clones the list for
//! the notification's name before calling anyone (observers are `Rc`-backed,
//! so the copy is cheap) and then walks the copy with no borrow held.
//! Handlers can therefore register or remove mediators, observers and
//! commands, or send further notifications, while a notification is being
//! delivered. Nested sends run depth-first on the current stack.
//!
//! # Invariants
//!
//! 1. Observers for a name run in registration order.
//! 2. Delivery walks the snapshot taken at the start of the call; changes
//!    made by handlers affect later dispatches only.
//! 3. At most one mediator per name; a second registration under a taken
//!    name is ignored (first registration wins), so no observer is ever
//!    orphaned.
//! 4. Removing a mediator removes every observer whose context is that
//!    mediator, across all interest lists.
//! 5. Empty interest lists are dropped.
//! 6. A mediator's observers are its only owners besides the mediator map,
//!    and removal purges both, so the view keeps a removed mediator alive
//!    only until an in-flight dispatch that snapshotted it finishes.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Handler returns `Err` | Later observers skipped, error returned |
//! | Nesting exceeds `max_dispatch_depth` | `DispatchError::DepthExceeded` |
//! | Mediator removed mid-dispatch | Still receives the current notification |
//! | No observers for a name | No-op |

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, trace, warn};

use crate::config::CoreConfig;
use crate::error::{DispatchError, HandlerResult};
use crate::facade::{Facade, WeakFacade};
use crate::notification::Notification;
use crate::observer::{NotifyContext, Observer};

/// A named actor that reacts to notifications.
///
/// Mediators are shared (`Rc`) and only ever see `&self`; keep mutable state
/// behind `Cell`/`RefCell`. Avoid holding a `RefCell` borrow of your own
/// state while calling back into the facade.
pub trait Mediator: Any {
    /// Registry key.
    fn name(&self) -> &str;

    /// Notification names this mediator wants delivered. Read once, at
    /// registration.
    fn notification_interests(&self) -> Vec<String> {
        Vec::new()
    }

    /// React to a notification named in [`Mediator::notification_interests`].
    fn handle_notification(&self, _notification: &Notification, _facade: &Facade) -> HandlerResult {
        Ok(())
    }

    /// Called once the mediator and its observers have been registered.
    fn on_register(&self, _facade: &Facade) {}

    /// Called once the mediator and its observers have been removed.
    fn on_remove(&self, _facade: &Facade) {}
}

/// Decrements the dispatch depth counter on drop.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Per-core mediator registry and notification dispatcher.
pub struct View {
    key: String,
    core: WeakFacade,
    max_depth: usize,
    trace_dispatch: bool,
    depth: Cell<usize>,
    mediators: RefCell<HashMap<String, Rc<dyn Mediator>>>,
    observers: RefCell<HashMap<String, Vec<Observer>>>,
}

impl View {
    pub(crate) fn new(key: &str, core: WeakFacade, config: &CoreConfig) -> Self {
        Self {
            key: key.to_owned(),
            core,
            max_depth: config.max_dispatch_depth.max(1),
            trace_dispatch: config.trace_dispatch,
            depth: Cell::new(0),
            mediators: RefCell::new(HashMap::new()),
            observers: RefCell::new(HashMap::new()),
        }
    }

    // ── Observers ─────────────────────────────────────────────────────

    /// Append an observer to the interest list for `notification_name`.
    pub fn register_observer(&self, notification_name: impl Into<String>, observer: Observer) {
        self.observers
            .borrow_mut()
            .entry(notification_name.into())
            .or_default()
            .push(observer);
    }

    /// Remove the first observer for `notification_name` whose context is
    /// `context`. Returns whether one was removed.
    pub fn remove_observer(&self, notification_name: &str, context: &NotifyContext) -> bool {
        let removed = {
            let mut observers = self.observers.borrow_mut();
            let Some(list) = observers.get_mut(notification_name) else {
                return false;
            };
            let removed = list
                .iter()
                .position(|o| o.compare_notify_context(context))
                .map(|index| list.remove(index));
            if list.is_empty() {
                observers.remove(notification_name);
            }
            removed
        };
        removed.is_some()
    }

    /// Deliver `notification` to every observer registered for its name.
    pub fn notify_observers(&self, notification: &Notification) -> Result<(), DispatchError> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            warn!(
                core = %self.key,
                notification = %notification.name(),
                limit = self.max_depth,
                "dispatch depth limit reached"
            );
            return Err(DispatchError::DepthExceeded {
                notification: notification.name().to_owned(),
                limit: self.max_depth,
            });
        }

        let snapshot = self.observers.borrow().get(notification.name()).cloned();
        let Some(snapshot) = snapshot else {
            trace!(core = %self.key, notification = %notification.name(), "no observers");
            return Ok(());
        };

        let _depth = DepthGuard::enter(&self.depth);
        let _span = self.trace_dispatch.then(|| {
            debug_span!(
                "dispatch",
                core = %self.key,
                notification = %notification.name(),
                depth
            )
            .entered()
        });

        for (index, observer) in snapshot.iter().enumerate() {
            trace!(notification = %notification.name(), index, "notify observer");
            observer
                .notify_observer(notification)
                .map_err(|err| DispatchError::from_handler(notification.name(), err))?;
        }
        Ok(())
    }

    /// Number of observers registered for `notification_name`.
    #[must_use]
    pub fn observer_count(&self, notification_name: &str) -> usize {
        self.observers
            .borrow()
            .get(notification_name)
            .map_or(0, Vec::len)
    }

    /// Notification names with at least one observer, sorted.
    #[must_use]
    pub fn interest_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.observers.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    // ── Mediators ─────────────────────────────────────────────────────

    /// Register a mediator and subscribe it to its interests.
    ///
    /// Returns `false` (and changes nothing) if a mediator with the same
    /// name is already registered.
    pub fn register_mediator(&self, mediator: Rc<dyn Mediator>) -> bool {
        let name = mediator.name().to_owned();
        {
            let mut mediators = self.mediators.borrow_mut();
            if mediators.contains_key(&name) {
                debug!(core = %self.key, mediator = %name, "duplicate mediator ignored");
                return false;
            }
            mediators.insert(name.clone(), Rc::clone(&mediator));
        }

        let mut interests = mediator.notification_interests();
        dedup_in_order(&mut interests);
        if !interests.is_empty() {
            let observer = self.mediator_observer(&mediator);
            for interest in &interests {
                self.register_observer(interest.as_str(), observer.clone());
            }
        }
        debug!(
            core = %self.key,
            mediator = %name,
            interests = interests.len(),
            "mediator registered"
        );

        if let Some(facade) = self.core.upgrade() {
            mediator.on_register(&facade);
        }
        true
    }

    /// Look up a mediator by name.
    #[must_use]
    pub fn retrieve_mediator(&self, name: &str) -> Option<Rc<dyn Mediator>> {
        self.mediators.borrow().get(name).cloned()
    }

    /// Look up a mediator by name and downcast it to its concrete type.
    #[must_use]
    pub fn retrieve_mediator_as<T: Mediator>(&self, name: &str) -> Option<Rc<T>> {
        let mediator: Rc<dyn Any> = self.retrieve_mediator(name)?;
        mediator.downcast::<T>().ok()
    }

    /// Whether a mediator is registered under `name`.
    #[must_use]
    pub fn has_mediator(&self, name: &str) -> bool {
        self.mediators.borrow().contains_key(name)
    }

    /// Remove a mediator and all of its observers, then run `on_remove`.
    pub fn remove_mediator(&self, name: &str) -> Option<Rc<dyn Mediator>> {
        let mediator = self.mediators.borrow_mut().remove(name)?;
        let dropped = self.remove_observers_for(&NotifyContext::of(&mediator));
        debug!(core = %self.key, mediator = %name, observers = dropped, "mediator removed");

        if let Some(facade) = self.core.upgrade() {
            mediator.on_remove(&facade);
        }
        Some(mediator)
    }

    /// Registered mediator names, sorted.
    #[must_use]
    pub fn mediator_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.mediators.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every mediator and observer without running hooks (core
    /// teardown).
    pub(crate) fn clear(&self) {
        let observers = std::mem::take(&mut *self.observers.borrow_mut());
        let mediators = std::mem::take(&mut *self.mediators.borrow_mut());
        drop(observers);
        drop(mediators);
    }

    /// Remove every observer whose context is `context`, in all lists.
    ///
    /// The removed observers are dropped after the borrow is released.
    fn remove_observers_for(&self, context: &NotifyContext) -> usize {
        let mut removed = Vec::new();
        {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|_, list| {
                let (gone, kept): (Vec<Observer>, Vec<Observer>) = std::mem::take(list)
                    .into_iter()
                    .partition(|o| o.compare_notify_context(context));
                removed.extend(gone);
                *list = kept;
                !list.is_empty()
            });
        }
        removed.len()
    }

    /// Observer that forwards to `mediator.handle_notification`.
    ///
    /// The callback owns the mediator so a snapshot entry stays deliverable
    /// after removal; the context and the core stay weak.
    fn mediator_observer(&self, mediator: &Rc<dyn Mediator>) -> Observer {
        let target = Rc::clone(mediator);
        let core = self.core.clone();
        Observer::new(
            move |notification| {
                let Some(facade) = core.upgrade() else {
                    return Ok(());
                };
                target.handle_notification(notification, &facade)
            },
            NotifyContext::of(mediator),
        )
    }
}

fn dedup_in_order(names: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("core", &self.key)
            .field("mediators", &self.mediator_names())
            .field("interests", &self.interest_names())
            .field("depth", &self.depth.get())
            .finish()
    }
}
