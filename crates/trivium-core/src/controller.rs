#![forbid(unsafe_code)]

//! Controller: maps notification names to command factories.
//!
//! Registering the first command for a name subscribes the controller to
//! that name in the view. Each matching notification builds a fresh command
//! from the factory, runs it once and drops it, so commands carry no state
//! between notifications.
//!
//! # Invariants
//!
//! 1. At most one factory per name; re-registering replaces the factory and
//!    does not add a second observer.
//! 2. The controller's observer for a name exists exactly while a factory is
//!    mapped under that name.
//! 3. Every execution gets a newly constructed command.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{DispatchError, HandlerResult};
use crate::facade::{Facade, WeakFacade};
use crate::notification::Notification;
use crate::observer::{NotifyContext, Observer};
use crate::view::View;

/// A stateless unit of work run in response to a notification.
pub trait Command {
    /// Run the command.
    fn execute(&self, notification: &Notification, facade: &Facade) -> HandlerResult;
}

/// Builds a fresh command instance per execution.
pub type CommandFactory = Rc<dyn Fn() -> Box<dyn Command>>;

/// Wrap a constructor closure as a [`CommandFactory`].
pub fn command_factory<F, C>(make: F) -> CommandFactory
where
    F: Fn() -> C + 'static,
    C: Command + 'static,
{
    Rc::new(move || Box::new(make()) as Box<dyn Command>)
}

type CommandMap = RefCell<HashMap<String, CommandFactory>>;

/// Per-core command registry.
pub struct Controller {
    key: String,
    core: WeakFacade,
    view: Rc<View>,
    commands: Rc<CommandMap>,
}

impl Controller {
    pub(crate) fn new(key: &str, core: WeakFacade, view: Rc<View>) -> Self {
        Self {
            key: key.to_owned(),
            core,
            view,
            commands: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Map `notification_name` to a command constructor.
    pub fn register_command<F, C>(&self, notification_name: impl Into<String>, make: F)
    where
        F: Fn() -> C + 'static,
        C: Command + 'static,
    {
        self.register_command_factory(notification_name, command_factory(make));
    }

    /// Map `notification_name` to a command factory, replacing any previous
    /// one.
    pub fn register_command_factory(
        &self,
        notification_name: impl Into<String>,
        factory: CommandFactory,
    ) {
        let name = notification_name.into();
        let previous = self.commands.borrow_mut().insert(name.clone(), factory);
        if previous.is_some() {
            debug!(core = %self.key, command = %name, "command replaced");
            return;
        }

        self.view.register_observer(name.clone(), self.command_observer());
        debug!(core = %self.key, command = %name, "command registered");
    }

    /// Whether a command is mapped under `notification_name`.
    #[must_use]
    pub fn has_command(&self, notification_name: &str) -> bool {
        self.commands.borrow().contains_key(notification_name)
    }

    /// Unmap a command and unsubscribe from its name. Returns whether a
    /// command was mapped.
    pub fn remove_command(&self, notification_name: &str) -> bool {
        let removed = self.commands.borrow_mut().remove(notification_name);
        if removed.is_none() {
            return false;
        }
        self.view.remove_observer(notification_name, &self.context());
        debug!(core = %self.key, command = %notification_name, "command removed");
        true
    }

    /// Build and run the command mapped to the notification's name.
    ///
    /// A notification with no mapped command is ignored.
    pub fn execute_command(&self, notification: &Notification) -> Result<(), DispatchError> {
        let factory = self.commands.borrow().get(notification.name()).cloned();
        let (Some(factory), Some(facade)) = (factory, self.core.upgrade()) else {
            return Ok(());
        };
        run(&factory, notification, &facade)
            .map_err(|err| DispatchError::from_handler(notification.name(), err))
    }

    /// Mapped notification names, sorted.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every mapping without touching the view (core teardown).
    pub(crate) fn clear(&self) {
        let commands = std::mem::take(&mut *self.commands.borrow_mut());
        drop(commands);
    }

    fn context(&self) -> NotifyContext {
        NotifyContext::of(&self.commands)
    }

    fn command_observer(&self) -> Observer {
        let commands = Rc::downgrade(&self.commands);
        let core = self.core.clone();
        Observer::new(
            move |notification| {
                let Some(commands) = commands.upgrade() else {
                    return Ok(());
                };
                let factory = commands.borrow().get(notification.name()).cloned();
                let (Some(factory), Some(facade)) = (factory, core.upgrade()) else {
                    return Ok(());
                };
                run(&factory, notification, &facade)
            },
            self.context(),
        )
    }
}

fn run(factory: &CommandFactory, notification: &Notification, facade: &Facade) -> HandlerResult {
    trace!(core = %facade.key(), command = %notification.name(), "execute command");
    let command = factory();
    command.execute(notification, facade)
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("core", &self.key)
            .field("commands", &self.command_names())
            .finish()
    }
}
