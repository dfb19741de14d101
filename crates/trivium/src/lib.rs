#![forbid(unsafe_code)]

//! Trivium: independent Model/View/Controller cores wired together by
//! synchronous notifications.
//!
//! Each core, selected by a string key in a [`CoreRegistry`], owns:
//! - a **Model** of named [`Proxy`] values,
//! - a **View** of named [`Mediator`]s and the observer lists that route
//!   notifications to them,
//! - a **Controller** mapping notification names to [`Command`] factories.
//!
//! Applications work through the core's [`Facade`]:
//!
//! ```
//! use std::rc::Rc;
//! use trivium::prelude::*;
//!
//! let registry = CoreRegistry::default();
//! let app = registry.facade("app");
//!
//! app.register_proxy(Rc::new(DataProxy::new("counter", 0_u32)));
//! app.register_command_factory(
//!     "increment",
//!     FnCommand::factory(|_, facade| {
//!         if let Some(counter) = facade.retrieve_proxy_as::<DataProxy<u32>>("counter") {
//!             counter.update(|n| *n += 1);
//!         }
//!         Ok(())
//!     }),
//! );
//!
//! app.send_notification("increment", None, None)?;
//! app.send_notification("increment", None, None)?;
//! let counter = app.retrieve_proxy_as::<DataProxy<u32>>("counter");
//! assert_eq!(counter.map(|c| c.get()), Some(2));
//! # Ok::<(), DispatchError>(())
//! ```

pub mod prelude;

pub use trivium_core::{
    Body, Command, CommandFactory, Controller, CoreConfig, CoreRegistry, CoreState, DispatchError,
    Facade, HandlerError, HandlerResult, Mediator, Model, MultitonError, Notification,
    NotifyContext, Observer, Proxy, View, WeakFacade, command_factory,
};
pub use trivium_patterns::{DataProxy, FnCommand, FnMediator, FnMediatorBuilder, MacroCommand};
