#![forbid(unsafe_code)]

//! Immutable notification values.
//!
//! A [`Notification`] carries a name, an optional type-erased body and an
//! optional type tag. Dispatch only looks at the name; the body and tag are
//! for the receivers. Builders consume `self`, so once a notification is
//! handed to the view it can no longer change.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Shared, type-erased notification body.
pub type Body = Rc<dyn Any>;

/// A named value broadcast to interested observers.
///
/// Cloning is cheap: the body is reference counted, not copied.
#[derive(Clone)]
pub struct Notification {
    name: String,
    body: Option<Body>,
    kind: Option<String>,
}

impl Notification {
    /// Create a notification with no body and no type tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: None,
            kind: None,
        }
    }

    /// Create a notification from all three parts at once.
    #[must_use]
    pub fn from_parts(name: impl Into<String>, body: Option<Body>, kind: Option<String>) -> Self {
        Self {
            name: name.into(),
            body,
            kind,
        }
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body<T: Any>(mut self, body: T) -> Self {
        self.body = Some(Rc::new(body));
        self
    }

    /// Attach an already shared body.
    #[must_use]
    pub fn with_shared_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a type tag.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// The notification name observers are keyed by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The body, if present and of type `T`.
    #[must_use]
    pub fn body<T: Any>(&self) -> Option<&T> {
        self.body.as_deref()?.downcast_ref::<T>()
    }

    /// The type-erased body.
    #[must_use]
    pub fn raw_body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Whether a body is attached.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// The type tag.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("name", &self.name)
            .field("has_body", &self.body.is_some())
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Notification Name: {}", self.name)?;
        match self.body {
            Some(_) => writeln!(f, "Body:<opaque>")?,
            None => writeln!(f, "Body:None")?,
        }
        match &self.kind {
            Some(kind) => write!(f, "Type:{kind}"),
            None => write!(f, "Type:None"),
        }
    }
}
