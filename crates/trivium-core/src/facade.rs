#![forbid(unsafe_code)]

//! Facade: the per-core entry point.
//!
//! A [`Facade`] is a cheap, cloneable handle to one core: a Model, a View
//! and a Controller built together under one key. Applications talk to the
//! facade; the three registries are reachable for inspection but all
//! everyday operations delegate through here.
//!
//! Registries point back at their core through a [`WeakFacade`], so hooks
//! and handlers receive a `&Facade` without the core owning itself.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::info;

use crate::config::CoreConfig;
use crate::controller::{Command, CommandFactory, Controller};
use crate::error::DispatchError;
use crate::model::{Model, Proxy};
use crate::notification::{Body, Notification};
use crate::view::{Mediator, View};

struct CoreInner {
    key: String,
    config: CoreConfig,
    removed: Cell<bool>,
    model: Model,
    view: Rc<View>,
    controller: Controller,
}

/// Handle to one core.
#[derive(Clone)]
pub struct Facade {
    core: Rc<CoreInner>,
}

/// Non-owning handle to a core.
#[derive(Clone, Default)]
pub struct WeakFacade(Weak<CoreInner>);

impl WeakFacade {
    /// Upgrade to a [`Facade`] if the core is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Facade> {
        self.0.upgrade().map(|core| Facade { core })
    }
}

impl fmt::Debug for WeakFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakFacade")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl Facade {
    /// Build a standalone core. Most applications get facades from a
    /// [`CoreRegistry`](crate::CoreRegistry) instead.
    #[must_use]
    pub fn new(key: &str, config: CoreConfig) -> Self {
        let core = Rc::new_cyclic(|weak: &Weak<CoreInner>| {
            let handle = WeakFacade(weak.clone());
            let view = Rc::new(View::new(key, handle.clone(), &config));
            CoreInner {
                key: key.to_owned(),
                model: Model::new(key, handle.clone()),
                controller: Controller::new(key, handle, Rc::clone(&view)),
                view,
                removed: Cell::new(false),
                config,
            }
        });
        info!(core = %key, "core constructed");
        Self { core }
    }

    /// Non-owning handle to this core.
    #[must_use]
    pub fn downgrade(&self) -> WeakFacade {
        WeakFacade(Rc::downgrade(&self.core))
    }

    /// The core key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.core.key
    }

    /// The configuration this core was built with.
    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.core.config
    }

    /// Whether this core has been torn down by its registry.
    ///
    /// A removed facade still works, but it is detached: its registry hands
    /// out a fresh core for the same key.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.core.removed.get()
    }

    /// Whether two handles refer to the same core instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.core.model
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.core.view
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.core.controller
    }

    // ── Proxies ───────────────────────────────────────────────────────

    /// See [`Model::register_proxy`].
    pub fn register_proxy(&self, proxy: Rc<dyn Proxy>) {
        self.core.model.register_proxy(proxy);
    }

    #[must_use]
    pub fn retrieve_proxy(&self, name: &str) -> Option<Rc<dyn Proxy>> {
        self.core.model.retrieve_proxy(name)
    }

    #[must_use]
    pub fn retrieve_proxy_as<T: Proxy>(&self, name: &str) -> Option<Rc<T>> {
        self.core.model.retrieve_proxy_as(name)
    }

    pub fn remove_proxy(&self, name: &str) -> Option<Rc<dyn Proxy>> {
        self.core.model.remove_proxy(name)
    }

    #[must_use]
    pub fn has_proxy(&self, name: &str) -> bool {
        self.core.model.has_proxy(name)
    }

    // ── Mediators ─────────────────────────────────────────────────────

    /// See [`View::register_mediator`]. Returns `false` for an ignored
    /// duplicate.
    pub fn register_mediator(&self, mediator: Rc<dyn Mediator>) -> bool {
        self.core.view.register_mediator(mediator)
    }

    #[must_use]
    pub fn retrieve_mediator(&self, name: &str) -> Option<Rc<dyn Mediator>> {
        self.core.view.retrieve_mediator(name)
    }

    #[must_use]
    pub fn retrieve_mediator_as<T: Mediator>(&self, name: &str) -> Option<Rc<T>> {
        self.core.view.retrieve_mediator_as(name)
    }

    pub fn remove_mediator(&self, name: &str) -> Option<Rc<dyn Mediator>> {
        self.core.view.remove_mediator(name)
    }

    #[must_use]
    pub fn has_mediator(&self, name: &str) -> bool {
        self.core.view.has_mediator(name)
    }

    // ── Commands ──────────────────────────────────────────────────────

    /// Map `notification_name` to a command constructor.
    pub fn register_command<F, C>(&self, notification_name: impl Into<String>, make: F)
    where
        F: Fn() -> C + 'static,
        C: Command + 'static,
    {
        self.core.controller.register_command(notification_name, make);
    }

    /// Map `notification_name` to `C::default()`.
    pub fn register_command_type<C>(&self, notification_name: impl Into<String>)
    where
        C: Command + Default + 'static,
    {
        self.core
            .controller
            .register_command(notification_name, C::default);
    }

    pub fn register_command_factory(
        &self,
        notification_name: impl Into<String>,
        factory: CommandFactory,
    ) {
        self.core
            .controller
            .register_command_factory(notification_name, factory);
    }

    pub fn remove_command(&self, notification_name: &str) -> bool {
        self.core.controller.remove_command(notification_name)
    }

    #[must_use]
    pub fn has_command(&self, notification_name: &str) -> bool {
        self.core.controller.has_command(notification_name)
    }

    // ── Notifications ─────────────────────────────────────────────────

    /// Build a notification and dispatch it.
    pub fn send_notification(
        &self,
        name: impl Into<String>,
        body: Option<Body>,
        kind: Option<&str>,
    ) -> Result<(), DispatchError> {
        let notification = Notification::from_parts(name, body, kind.map(str::to_owned));
        self.core.view.notify_observers(&notification)
    }

    /// Dispatch an already built notification.
    pub fn notify_observers(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.core.view.notify_observers(notification)
    }

    /// Empty all three registries without running hooks and mark the core
    /// removed.
    pub(crate) fn teardown(&self) {
        self.core.removed.set(true);
        self.core.controller.clear();
        self.core.view.clear();
        self.core.model.clear();
        info!(core = %self.core.key, "core removed");
    }
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("key", &self.core.key)
            .field("removed", &self.core.removed.get())
            .field("model", &self.core.model)
            .field("view", &self.core.view)
            .field("controller", &self.core.controller)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use std::cell::RefCell;

    struct Named(&'static str);

    impl Proxy for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct Echo {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Mediator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn notification_interests(&self) -> Vec<String> {
            vec!["say".into()]
        }

        fn handle_notification(&self, note: &Notification, _facade: &Facade) -> HandlerResult {
            let text = note.body::<String>().cloned().unwrap_or_default();
            let kind = note.kind().unwrap_or("-");
            self.log.borrow_mut().push(format!("{text}/{kind}"));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RegisterEcho;

    impl Command for RegisterEcho {
        fn execute(&self, note: &Notification, facade: &Facade) -> HandlerResult {
            let log = note
                .body::<Rc<RefCell<Vec<String>>>>()
                .cloned()
                .ok_or("missing log")?;
            facade.register_mediator(Rc::new(Echo { log }));
            Ok(())
        }
    }

    #[test]
    fn delegates_to_registries() {
        let facade = Facade::new("delegate", CoreConfig::default());
        facade.register_proxy(Rc::new(Named("p")));
        assert!(facade.has_proxy("p"));
        assert!(facade.model().has_proxy("p"));
        assert!(facade.retrieve_proxy_as::<Named>("p").is_some());
        assert!(facade.remove_proxy("p").is_some());
        assert!(!facade.has_proxy("p"));

        facade.register_command_type::<RegisterEcho>("startup");
        assert!(facade.has_command("startup"));
        assert!(facade.controller().has_command("startup"));
        assert!(facade.remove_command("startup"));
        assert!(!facade.has_command("startup"));
    }

    #[test]
    fn send_notification_builds_and_dispatches() {
        let facade = Facade::new("send", CoreConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        facade.register_command_type::<RegisterEcho>("startup");

        let body: Body = Rc::new(Rc::clone(&log));
        facade.send_notification("startup", Some(body), None).unwrap();
        assert!(facade.has_mediator("echo"));

        facade
            .send_notification("say", Some(Rc::new(String::from("hi"))), Some("greeting"))
            .unwrap();
        facade
            .notify_observers(&Notification::new("say").with_body(String::from("again")))
            .unwrap();
        assert_eq!(*log.borrow(), vec!["hi/greeting", "again/-"]);

        let echo = facade.retrieve_mediator_as::<Echo>("echo").unwrap();
        assert!(Rc::ptr_eq(&echo.log, &log));
        assert!(facade.remove_mediator("echo").is_some());
        assert!(facade.retrieve_mediator("echo").is_none());
    }

    #[test]
    fn weak_handle_does_not_own_core() {
        let facade = Facade::new("weak", CoreConfig::default());
        let weak = facade.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&facade));
        drop(facade);
        assert!(weak.upgrade().is_none());
        assert!(WeakFacade::default().upgrade().is_none());
    }

    #[test]
    fn teardown_empties_registries() {
        let facade = Facade::new("teardown", CoreConfig::default());
        facade.register_proxy(Rc::new(Named("p")));
        facade.register_mediator(Rc::new(Echo {
            log: Rc::new(RefCell::new(Vec::new())),
        }));
        facade.register_command_type::<RegisterEcho>("startup");

        facade.teardown();
        assert!(facade.is_removed());
        assert!(facade.model().is_empty());
        assert!(facade.view().mediator_names().is_empty());
        assert!(facade.view().interest_names().is_empty());
        assert!(facade.controller().command_names().is_empty());
    }

    #[test]
    fn key_and_config() {
        let config = CoreConfig::new().with_max_dispatch_depth(4);
        let facade = Facade::new("keyed", config.clone());
        assert_eq!(facade.key(), "keyed");
        assert_eq!(facade.config(), &config);
        assert!(!facade.is_removed());
    }
}
