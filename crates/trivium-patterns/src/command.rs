#![forbid(unsafe_code)]

//! Command helpers: closure commands and macro commands.

use std::fmt;
use std::rc::Rc;

use tracing::trace;
use trivium_core::{Command, CommandFactory, Facade, HandlerResult, Notification, command_factory};

type Body = Rc<dyn Fn(&Notification, &Facade) -> HandlerResult>;

/// A command that runs a closure.
///
/// The closure is shared between instances; each instance carries nothing
/// else, so a fresh `FnCommand` per dispatch keeps commands stateless.
#[derive(Clone)]
pub struct FnCommand {
    body: Body,
}

impl FnCommand {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Notification, &Facade) -> HandlerResult + 'static,
    {
        Self {
            body: Rc::new(body),
        }
    }

    /// A factory producing a new `FnCommand` around `body` on every call.
    pub fn factory<F>(body: F) -> CommandFactory
    where
        F: Fn(&Notification, &Facade) -> HandlerResult + 'static,
    {
        let template = Self::new(body);
        command_factory(move || template.clone())
    }
}

impl Command for FnCommand {
    fn execute(&self, notification: &Notification, facade: &Facade) -> HandlerResult {
        (self.body)(notification, facade)
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand").finish_non_exhaustive()
    }
}

/// Runs a list of sub-commands, first added first run.
///
/// Each sub-command is built from its factory at execution time and
/// receives the same notification. A failing sub-command ends the run and
/// its error is returned; the rest are not built.
///
/// ```ignore
/// facade.register_command("startup", || {
///     MacroCommand::new()
///         .with_command(PrepareModel::default)
///         .with_command(PrepareView::default)
/// });
/// ```
#[derive(Default)]
pub struct MacroCommand {
    sub_commands: Vec<CommandFactory>,
}

impl MacroCommand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sub-command constructor.
    #[must_use]
    pub fn with_command<F, C>(self, make: F) -> Self
    where
        F: Fn() -> C + 'static,
        C: Command + 'static,
    {
        self.with_factory(command_factory(make))
    }

    /// Append a sub-command factory.
    #[must_use]
    pub fn with_factory(mut self, factory: CommandFactory) -> Self {
        self.add_sub_command(factory);
        self
    }

    /// Append a sub-command factory in place.
    pub fn add_sub_command(&mut self, factory: CommandFactory) {
        self.sub_commands.push(factory);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sub_commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sub_commands.is_empty()
    }
}

impl Command for MacroCommand {
    fn execute(&self, notification: &Notification, facade: &Facade) -> HandlerResult {
        for (index, factory) in self.sub_commands.iter().enumerate() {
            trace!(
                core = %facade.key(),
                notification = %notification.name(),
                index,
                "macro sub-command"
            );
            let command = factory();
            command.execute(notification, facade)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MacroCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroCommand")
            .field("sub_commands", &self.sub_commands.len())
            .finish()
    }
}
