#![forbid(unsafe_code)]

//! Reusable collaborators for trivium cores.
//!
//! - [`DataProxy`]: a named proxy around one value.
//! - [`FnMediator`]: a mediator assembled from closures with
//!   [`FnMediatorBuilder`].
//! - [`FnCommand`]: a command wrapping a closure.
//! - [`MacroCommand`]: runs a fixed list of sub-commands in order.

pub mod command;
pub mod mediator;
pub mod proxy;

pub use command::{FnCommand, MacroCommand};
pub use mediator::{FnMediator, FnMediatorBuilder};
pub use proxy::DataProxy;
