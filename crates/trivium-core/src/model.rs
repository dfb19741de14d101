#![forbid(unsafe_code)]

//! Model registry: named proxy storage for one core.
//!
//! # Invariants
//!
//! 1. At most one proxy per name. Registering a second proxy under a taken
//!    name replaces the first (last registration wins); the replaced proxy
//!    gets no lifecycle hook.
//! 2. `on_register` runs after the proxy is visible through
//!    [`Model::retrieve_proxy`]; `on_remove` runs after it is gone.
//! 3. No internal borrow is held while a hook runs.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Retrieve/remove an absent name | Returns `None` |
//! | Core dropped while a `&Model` is in use | Hooks are skipped |

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::facade::{Facade, WeakFacade};

/// A named unit of model state.
///
/// Proxies are shared (`Rc`) and only ever see `&self`; keep mutable state
/// behind `Cell`/`RefCell`.
pub trait Proxy: Any {
    /// Registry key.
    fn name(&self) -> &str;

    /// Called once the proxy has been registered.
    fn on_register(&self, _facade: &Facade) {}

    /// Called once the proxy has been removed.
    fn on_remove(&self, _facade: &Facade) {}
}

/// Per-core proxy registry.
pub struct Model {
    key: String,
    core: WeakFacade,
    proxies: RefCell<HashMap<String, Rc<dyn Proxy>>>,
}

impl Model {
    pub(crate) fn new(key: &str, core: WeakFacade) -> Self {
        Self {
            key: key.to_owned(),
            core,
            proxies: RefCell::new(HashMap::new()),
        }
    }

    /// Register a proxy under its name, replacing any proxy already there.
    pub fn register_proxy(&self, proxy: Rc<dyn Proxy>) {
        let name = proxy.name().to_owned();
        let replaced = self
            .proxies
            .borrow_mut()
            .insert(name.clone(), Rc::clone(&proxy));
        if replaced.is_some() {
            debug!(core = %self.key, proxy = %name, "proxy replaced");
        } else {
            debug!(core = %self.key, proxy = %name, "proxy registered");
        }
        drop(replaced);

        if let Some(facade) = self.core.upgrade() {
            proxy.on_register(&facade);
        }
    }

    /// Look up a proxy by name.
    #[must_use]
    pub fn retrieve_proxy(&self, name: &str) -> Option<Rc<dyn Proxy>> {
        self.proxies.borrow().get(name).cloned()
    }

    /// Look up a proxy by name and downcast it to its concrete type.
    #[must_use]
    pub fn retrieve_proxy_as<T: Proxy>(&self, name: &str) -> Option<Rc<T>> {
        let proxy: Rc<dyn Any> = self.retrieve_proxy(name)?;
        proxy.downcast::<T>().ok()
    }

    /// Whether a proxy is registered under `name`.
    #[must_use]
    pub fn has_proxy(&self, name: &str) -> bool {
        self.proxies.borrow().contains_key(name)
    }

    /// Remove a proxy, running its `on_remove` hook.
    pub fn remove_proxy(&self, name: &str) -> Option<Rc<dyn Proxy>> {
        let proxy = self.proxies.borrow_mut().remove(name)?;
        debug!(core = %self.key, proxy = %name, "proxy removed");
        if let Some(facade) = self.core.upgrade() {
            proxy.on_remove(&facade);
        }
        Some(proxy)
    }

    /// Registered proxy names, sorted.
    #[must_use]
    pub fn proxy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.proxies.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered proxies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.borrow().len()
    }

    /// Whether no proxy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.borrow().is_empty()
    }

    /// Drop every proxy without running hooks (core teardown).
    pub(crate) fn clear(&self) {
        let proxies = std::mem::take(&mut *self.proxies.borrow_mut());
        drop(proxies);
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("core", &self.key)
            .field("proxies", &self.proxy_names())
            .finish()
    }
}
