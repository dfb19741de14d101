#![forbid(unsafe_code)]

//! [`FnMediator`]: a mediator assembled from closures.
//!
//! ```ignore
//! let mediator = FnMediator::builder("status_bar")
//!     .view_component(StatusBar::default())
//!     .interests(["saved", "failed"])
//!     .on_notification(|me, note, _facade| {
//!         if let Some(bar) = me.view_component::<StatusBar>() {
//!             bar.show(note.name());
//!         }
//!         Ok(())
//!     })
//!     .build_rc();
//! facade.register_mediator(mediator);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use trivium_core::{Facade, HandlerResult, Mediator, Notification};

type Handler = Box<dyn Fn(&FnMediator, &Notification, &Facade) -> HandlerResult>;
type Hook = Box<dyn Fn(&FnMediator, &Facade)>;

/// A mediator whose behavior is supplied as closures.
///
/// The optional view component is any shared value the mediator manages;
/// handlers reach it through [`FnMediator::view_component`].
pub struct FnMediator {
    name: String,
    view_component: RefCell<Option<Rc<dyn Any>>>,
    interests: Vec<String>,
    handler: Option<Handler>,
    on_register: Option<Hook>,
    on_remove: Option<Hook>,
}

impl FnMediator {
    /// Name used when the builder is given none.
    pub const DEFAULT_NAME: &'static str = "Mediator";

    /// Start building a mediator called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FnMediatorBuilder {
        FnMediatorBuilder::new(name)
    }

    /// The view component, if set and of type `T`.
    #[must_use]
    pub fn view_component<T: Any>(&self) -> Option<Rc<T>> {
        let component = self.view_component.borrow().clone()?;
        component.downcast::<T>().ok()
    }

    /// The type-erased view component.
    #[must_use]
    pub fn raw_view_component(&self) -> Option<Rc<dyn Any>> {
        self.view_component.borrow().clone()
    }

    /// Replace the view component.
    pub fn set_view_component(&self, component: Option<Rc<dyn Any>>) {
        *self.view_component.borrow_mut() = component;
    }
}

impl Mediator for FnMediator {
    fn name(&self) -> &str {
        &self.name
    }

    fn notification_interests(&self) -> Vec<String> {
        self.interests.clone()
    }

    fn handle_notification(&self, notification: &Notification, facade: &Facade) -> HandlerResult {
        match &self.handler {
            Some(handler) => handler(self, notification, facade),
            None => Ok(()),
        }
    }

    fn on_register(&self, facade: &Facade) {
        if let Some(hook) = &self.on_register {
            hook(self, facade);
        }
    }

    fn on_remove(&self, facade: &Facade) {
        if let Some(hook) = &self.on_remove {
            hook(self, facade);
        }
    }
}

impl fmt::Debug for FnMediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMediator")
            .field("name", &self.name)
            .field("interests", &self.interests)
            .field("has_view_component", &self.view_component.borrow().is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FnMediator`].
pub struct FnMediatorBuilder {
    name: String,
    view_component: Option<Rc<dyn Any>>,
    interests: Vec<String>,
    handler: Option<Handler>,
    on_register: Option<Hook>,
    on_remove: Option<Hook>,
}

impl FnMediatorBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            view_component: None,
            interests: Vec::new(),
            handler: None,
            on_register: None,
            on_remove: None,
        }
    }

    #[must_use]
    pub fn view_component<T: Any>(self, component: T) -> Self {
        self.shared_view_component(Rc::new(component))
    }

    #[must_use]
    pub fn shared_view_component(mut self, component: Rc<dyn Any>) -> Self {
        self.view_component = Some(component);
        self
    }

    /// Add one notification name of interest.
    #[must_use]
    pub fn interest(mut self, name: impl Into<String>) -> Self {
        self.interests.push(name.into());
        self
    }

    /// Add several notification names of interest.
    #[must_use]
    pub fn interests<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn on_notification<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FnMediator, &Notification, &Facade) -> HandlerResult + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_register<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FnMediator, &Facade) + 'static,
    {
        self.on_register = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_remove<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FnMediator, &Facade) + 'static,
    {
        self.on_remove = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn build(self) -> FnMediator {
        FnMediator {
            name: self.name,
            view_component: RefCell::new(self.view_component),
            interests: self.interests,
            handler: self.handler,
            on_register: self.on_register,
            on_remove: self.on_remove,
        }
    }

    /// Build and wrap in `Rc`, ready for `register_mediator`.
    #[must_use]
    pub fn build_rc(self) -> Rc<FnMediator> {
        Rc::new(self.build())
    }
}

impl Default for FnMediatorBuilder {
    fn default() -> Self {
        Self::new(FnMediator::DEFAULT_NAME)
    }
}
