#![forbid(unsafe_code)]

//! [`DataProxy`]: a named proxy holding one value.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;

use trivium_core::{Facade, Proxy};

type Hook = Box<dyn Fn(&Facade)>;

/// A proxy that owns a single value of type `T`.
///
/// The value sits behind a `RefCell`; [`DataProxy::data`] hands out a
/// shared borrow, so drop it before calling anything that might write.
pub struct DataProxy<T> {
    name: String,
    data: RefCell<T>,
    on_register: Option<Hook>,
    on_remove: Option<Hook>,
}

impl<T: Any> DataProxy<T> {
    /// Name used by [`DataProxy::unnamed`].
    pub const DEFAULT_NAME: &'static str = "Proxy";

    #[must_use]
    pub fn new(name: impl Into<String>, data: T) -> Self {
        Self {
            name: name.into(),
            data: RefCell::new(data),
            on_register: None,
            on_remove: None,
        }
    }

    /// A proxy registered under [`DataProxy::DEFAULT_NAME`].
    #[must_use]
    pub fn unnamed(data: T) -> Self {
        Self::new(Self::DEFAULT_NAME, data)
    }

    /// Run `hook` each time the proxy is registered.
    #[must_use]
    pub fn with_on_register(mut self, hook: impl Fn(&Facade) + 'static) -> Self {
        self.on_register = Some(Box::new(hook));
        self
    }

    /// Run `hook` when the proxy is removed.
    #[must_use]
    pub fn with_on_remove(mut self, hook: impl Fn(&Facade) + 'static) -> Self {
        self.on_remove = Some(Box::new(hook));
        self
    }

    /// Borrow the value.
    pub fn data(&self) -> Ref<'_, T> {
        self.data.borrow()
    }

    /// Replace the value, returning the previous one.
    pub fn set_data(&self, data: T) -> T {
        self.data.replace(data)
    }

    /// Mutate the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.data.borrow_mut())
    }

    /// Copy of the value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.data.borrow().clone()
    }
}

impl<T: Any> Proxy for DataProxy<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_register(&self, facade: &Facade) {
        if let Some(hook) = &self.on_register {
            hook(facade);
        }
    }

    fn on_remove(&self, facade: &Facade) {
        if let Some(hook) = &self.on_remove {
            hook(facade);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DataProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DataProxy");
        s.field("name", &self.name);
        match self.data.try_borrow() {
            Ok(data) => s.field("data", &*data),
            Err(_) => s.field("data", &"<borrowed>"),
        };
        s.finish()
    }
}
