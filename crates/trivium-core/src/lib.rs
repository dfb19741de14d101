#![forbid(unsafe_code)]

//! Core: multiton registries and notification dispatch.
//!
//! # Role in Trivium
//! `trivium-core` owns the per-core Model/View/Controller triad and the
//! publish/subscribe dispatch that connects them. Everything an application
//! writes (proxies, mediators, commands) plugs in through the traits defined
//! here; `trivium-patterns` supplies ready-made implementations.
//!
//! # Primary responsibilities
//! - **CoreRegistry**: explicit multiton map from core key to [`Facade`].
//! - **Facade**: one entry point per core, delegating to the registries.
//! - **Model**: named [`Proxy`] storage (last registration wins).
//! - **View**: named [`Mediator`] storage (first registration wins) plus the
//!   observer interest lists, and the only place notifications are
//!   dispatched.
//! - **Controller**: notification name → [`Command`] factory mapping; a fresh
//!   command per matching notification.
//!
//! # Execution model
//! Everything is single-threaded and synchronous. Registries are shared via
//! `Rc` and mutated through `RefCell`; no borrow is held across a call into
//! application code, so handlers may re-enter the facade (register, remove,
//! send) while a notification is being delivered. Nested sends are dispatched
//! depth-first on the caller's stack.

pub mod config;
pub mod controller;
pub mod error;
pub mod facade;
pub mod model;
pub mod multiton;
pub mod notification;
pub mod observer;
pub mod view;

pub use config::CoreConfig;
pub use controller::{Command, CommandFactory, Controller, command_factory};
pub use error::{DispatchError, HandlerError, HandlerResult, MultitonError};
pub use facade::{Facade, WeakFacade};
pub use model::{Model, Proxy};
pub use multiton::{CoreRegistry, CoreState};
pub use notification::{Body, Notification};
pub use observer::{NotifyContext, Observer};
pub use view::{Mediator, View};
