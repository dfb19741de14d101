#![forbid(unsafe_code)]

//! Multiton: cores keyed by an application-chosen string.
//!
//! A [`CoreRegistry`] is an ordinary value the application owns and passes
//! around; there is no process-wide instance. Each key moves through
//! [`CoreState`]:
//!
//! ```text
//! Uninitialized ──access──▶ Active ──remove_core──▶ Removed
//!                             ▲                        │
//!                             └────────access──────────┘
//! ```
//!
//! Access under a never-seen or removed key builds a fresh core; it never
//! fails. [`CoreRegistry::create`] is the strict variant that refuses a key
//! that is already live.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::config::CoreConfig;
use crate::error::MultitonError;
use crate::facade::Facade;

/// Lifecycle state of a core key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreState {
    /// Never constructed.
    Uninitialized,
    /// A live core exists.
    Active,
    /// Torn down and not yet reconstructed.
    Removed,
}

/// Registry of independent cores.
#[derive(Default)]
pub struct CoreRegistry {
    config: CoreConfig,
    cores: RefCell<HashMap<String, Facade>>,
    /// Keys torn down and not yet rebuilt. Holds one entry per distinct
    /// removed key; an entry leaves when its key is accessed again.
    removed: RefCell<HashSet<String>>,
}

impl CoreRegistry {
    /// Create an empty registry whose cores use `config`.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            cores: RefCell::new(HashMap::new()),
            removed: RefCell::new(HashSet::new()),
        }
    }

    /// The configuration applied to every core built here.
    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The facade for `key`, constructing the core on first access.
    pub fn facade(&self, key: &str) -> Facade {
        self.get_or_init(key, |_| {})
    }

    /// The facade for `key`. If the core has to be constructed, `init` runs
    /// once on the new facade before it is returned.
    ///
    /// The core is already registered while `init` runs, so `init` may look
    /// it up again or send notifications through it.
    pub fn get_or_init<F>(&self, key: &str, init: F) -> Facade
    where
        F: FnOnce(&Facade),
    {
        if let Some(facade) = self.get(key) {
            return facade;
        }
        let facade = self.insert(key);
        init(&facade);
        facade
    }

    /// Construct the core for `key`, failing if one is already live.
    pub fn create(&self, key: &str) -> Result<Facade, MultitonError> {
        if self.has_core(key) {
            return Err(MultitonError::AlreadyConstructed {
                key: key.to_owned(),
            });
        }
        Ok(self.insert(key))
    }

    /// The live facade for `key`, without constructing one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Facade> {
        self.cores.borrow().get(key).cloned()
    }

    /// Whether a live core exists for `key`.
    #[must_use]
    pub fn has_core(&self, key: &str) -> bool {
        self.cores.borrow().contains_key(key)
    }

    /// Tear down the core for `key`: its proxies, mediators, observers and
    /// commands are dropped without running hooks. Returns whether a core
    /// was live.
    ///
    /// Facades handed out earlier stay usable but detached; the next access
    /// under `key` builds a fresh core.
    ///
    /// The key itself is remembered so [`core_state`](Self::core_state) can
    /// report [`CoreState::Removed`]. A registry that retires many distinct
    /// keys and never reuses them grows by one short string per key.
    pub fn remove_core(&self, key: &str) -> bool {
        let Some(facade) = self.cores.borrow_mut().remove(key) else {
            return false;
        };
        self.removed.borrow_mut().insert(key.to_owned());
        facade.teardown();
        true
    }

    /// Lifecycle state of `key`.
    #[must_use]
    pub fn core_state(&self, key: &str) -> CoreState {
        if self.has_core(key) {
            CoreState::Active
        } else if self.removed.borrow().contains(key) {
            CoreState::Removed
        } else {
            CoreState::Uninitialized
        }
    }

    /// Keys of live cores, sorted.
    #[must_use]
    pub fn core_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.cores.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of live cores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cores.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cores.borrow().is_empty()
    }

    fn insert(&self, key: &str) -> Facade {
        let facade = Facade::new(key, self.config.clone());
        self.cores
            .borrow_mut()
            .insert(key.to_owned(), facade.clone());
        self.removed.borrow_mut().remove(key);
        debug!(core = %key, live = self.len(), "core registered");
        facade
    }
}

impl fmt::Debug for CoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreRegistry")
            .field("config", &self.config)
            .field("cores", &self.core_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Proxy;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Marker;

    impl Proxy for Marker {
        fn name(&self) -> &str {
            "x"
        }
    }

    #[test]
    fn access_constructs_once() {
        let registry = CoreRegistry::default();
        assert_eq!(registry.core_state("a"), CoreState::Uninitialized);
        let first = registry.facade("a");
        let second = registry.facade("a");
        assert!(first.ptr_eq(&second));
        assert_eq!(registry.core_state("a"), CoreState::Active);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cores_are_isolated() {
        let registry = CoreRegistry::default();
        registry.facade("a").register_proxy(Rc::new(Marker));
        assert!(registry.facade("a").has_proxy("x"));
        assert!(!registry.facade("b").has_proxy("x"));
        assert_eq!(registry.core_keys(), vec!["a", "b"]);
    }

    #[test]
    fn removed_key_is_reused_fresh() {
        let registry = CoreRegistry::default();
        let old = registry.facade("app");
        old.register_proxy(Rc::new(Marker));

        assert!(registry.remove_core("app"));
        assert!(!registry.has_core("app"));
        assert_eq!(registry.core_state("app"), CoreState::Removed);
        assert!(old.is_removed());
        assert!(!old.has_proxy("x"));
        assert!(!registry.remove_core("app"));

        let fresh = registry.facade("app");
        assert!(!fresh.ptr_eq(&old));
        assert!(!fresh.has_proxy("x"));
        assert!(!fresh.is_removed());
        assert_eq!(registry.core_state("app"), CoreState::Active);
    }

    #[test]
    fn removed_keys_are_forgotten_on_reuse() {
        let registry = CoreRegistry::default();
        for key in ["a", "b", "c"] {
            registry.facade(key);
            registry.remove_core(key);
        }
        assert_eq!(registry.removed.borrow().len(), 3);

        registry.facade("b");
        registry.create("c").unwrap();
        assert_eq!(registry.removed.borrow().len(), 1);
        assert_eq!(registry.core_state("a"), CoreState::Removed);
        assert_eq!(registry.core_state("b"), CoreState::Active);

        assert!(!registry.remove_core("never"));
        assert_eq!(registry.core_state("never"), CoreState::Uninitialized);
        assert_eq!(registry.removed.borrow().len(), 1);
    }

    #[test]
    fn create_rejects_live_key() {
        let registry = CoreRegistry::default();
        registry.create("k").unwrap();
        assert_eq!(
            registry.create("k").unwrap_err(),
            MultitonError::AlreadyConstructed { key: "k".into() }
        );
        registry.remove_core("k");
        assert!(registry.create("k").is_ok());
    }

    #[test]
    fn get_does_not_construct() {
        let registry = CoreRegistry::default();
        assert!(registry.get("ghost").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn get_or_init_runs_once() {
        let registry = CoreRegistry::default();
        let runs = Cell::new(0);
        for _ in 0..3 {
            registry.get_or_init("boot", |facade| {
                runs.set(runs.get() + 1);
                facade.register_proxy(Rc::new(Marker));
            });
        }
        assert_eq!(runs.get(), 1);
        assert!(registry.facade("boot").has_proxy("x"));
    }

    #[test]
    fn init_may_reenter_registry() {
        let registry = CoreRegistry::default();
        registry.get_or_init("outer", |facade| {
            assert!(registry.facade("outer").ptr_eq(facade));
            registry.facade("inner");
        });
        assert_eq!(registry.core_keys(), vec!["inner", "outer"]);
    }

    #[test]
    fn config_is_shared_by_cores() {
        let config = CoreConfig::new().with_max_dispatch_depth(7);
        let registry = CoreRegistry::new(config.clone());
        assert_eq!(registry.facade("a").config(), &config);
        assert_eq!(registry.config(), &config);
    }
}
