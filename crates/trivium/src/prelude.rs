//! Trivium prelude.
//!
//! Curated re-exports for application code.

pub use trivium_core::{
    Body, Command, CoreConfig, CoreRegistry, DispatchError, Facade, HandlerResult, Mediator,
    Notification, Proxy,
};
pub use trivium_patterns::{DataProxy, FnCommand, FnMediator, MacroCommand};
