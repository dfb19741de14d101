#![forbid(unsafe_code)]

//! Error types.
//!
//! Absent names are never errors: lookups and removals return `Option`.
//! Errors only arise from failing handlers, runaway recursion, and strict
//! multiton construction.

use thiserror::Error;

/// Error type returned by application handlers (mediator handlers and
/// command bodies).
///
/// Boxed so any error converts with `?`, including a [`DispatchError`]
/// coming back from a nested `send_notification`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by application handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Failure while delivering a notification.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// An observer's handler returned an error. Observers after it in the
    /// interest list did not run.
    #[error("handler for notification '{notification}' failed: {source}")]
    Handler {
        /// Name of the notification being delivered when the handler failed.
        notification: String,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },

    /// Recursive dispatch within one core nested deeper than
    /// [`CoreConfig::max_dispatch_depth`](crate::CoreConfig::max_dispatch_depth).
    #[error("dispatch depth limit {limit} exceeded while sending '{notification}'")]
    DepthExceeded {
        /// Name of the notification that was refused.
        notification: String,
        /// The configured limit.
        limit: usize,
    },
}

impl DispatchError {
    /// Wrap a handler failure.
    ///
    /// A `DispatchError` raised by a nested dispatch is passed through as-is
    /// so the outermost sender sees the original failure.
    #[must_use]
    pub fn from_handler(notification: &str, error: HandlerError) -> Self {
        match error.downcast::<DispatchError>() {
            Ok(nested) => *nested,
            Err(source) => Self::Handler {
                notification: notification.to_owned(),
                source,
            },
        }
    }

    /// Name of the notification this error was raised for.
    #[must_use]
    pub fn notification(&self) -> &str {
        match self {
            Self::Handler { notification, .. } | Self::DepthExceeded { notification, .. } => {
                notification
            }
        }
    }
}

/// Strict multiton construction failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultitonError {
    /// A live core already exists for the key.
    #[error("core '{key}' is already constructed")]
    AlreadyConstructed {
        /// The conflicting core key.
        key: String,
    },
}
