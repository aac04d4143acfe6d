//! Adapts objects with their own "property changed" events into sources.

use crate::graph::{AnyNode, Changeable, Notifier, Source};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    sync::{Arc, Mutex},
};

/// An object that reports its own changes, optionally naming the field that changed.
pub trait PropertyNotify: Send + Sync + 'static {
    /// Identifies a registered handler, so that it can be removed again.
    type Token: Send + Sync + 'static;

    /// Registers `handler` to be called with the name of the changed field on every change.
    fn add_handler(
        &self,
        handler: Box<dyn Fn(Option<&str>) + Send + Sync>,
    ) -> Self::Token;

    /// Removes a handler registered with [`PropertyNotify::add_handler`].
    fn remove_handler(&self, token: Self::Token);
}

impl<P: PropertyNotify> PropertyNotify for Arc<P> {
    type Token = P::Token;

    fn add_handler(
        &self,
        handler: Box<dyn Fn(Option<&str>) + Send + Sync>,
    ) -> Self::Token {
        (**self).add_handler(handler)
    }

    fn remove_handler(&self, token: Self::Token) {
        (**self).remove_handler(token)
    }
}

/// A source over a [`PropertyNotify`] object.
///
/// The bridge notifies on every event for the field it watches, or on every event at all if it
/// watches the empty field name. Reading the bridge runs the extractor against the object. The
/// handler is removed from the object when the last handle to the bridge is dropped.
///
/// ```rust
/// use reactive_flow::{bridge::{Bridge, PropertyNotify}, prelude::*};
/// use std::sync::{Arc, Mutex};
///
/// type Handler = Box<dyn Fn(Option<&str>) + Send + Sync>;
///
/// #[derive(Default)]
/// struct Settings {
///     volume: Mutex<u8>,
///     handlers: Mutex<Vec<Option<Handler>>>,
/// }
///
/// impl Settings {
///     fn set_volume(&self, volume: u8) {
///         *self.volume.lock().unwrap() = volume;
///         for handler in self.handlers.lock().unwrap().iter().flatten() {
///             handler(Some("volume"));
///         }
///     }
/// }
///
/// impl PropertyNotify for Settings {
///     type Token = usize;
///
///     fn add_handler(&self, handler: Handler) -> usize {
///         let mut handlers = self.handlers.lock().unwrap();
///         handlers.push(Some(handler));
///         handlers.len() - 1
///     }
///
///     fn remove_handler(&self, token: usize) {
///         self.handlers.lock().unwrap()[token] = None;
///     }
/// }
///
/// let settings = Arc::new(Settings::default());
/// let volume = Bridge::new(Arc::clone(&settings), "volume", |settings| {
///     *settings.volume.lock().unwrap()
/// });
///
/// settings.set_volume(7);
/// assert_eq!(volume.get(), 7);
/// ```
pub struct Bridge<S: PropertyNotify, T> {
    inner: Arc<BridgeInner<S, T>>,
}

struct BridgeInner<S: PropertyNotify, T> {
    object: S,
    extract: Box<dyn Fn(&S) -> T + Send + Sync>,
    notifier: Notifier,
    token: Mutex<Option<S::Token>>,
}

impl<S: PropertyNotify, T> Clone for Bridge<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PropertyNotify, T> Debug for Bridge<S, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Bridge")
            .field("object", &std::any::type_name::<S>())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<S: PropertyNotify, T> Drop for BridgeInner<S, T> {
    fn drop(&mut self) {
        if let Some(token) = self.token.lock().or_poisoned().take() {
            self.object.remove_handler(token);
        }
    }
}

impl<S, T> Bridge<S, T>
where
    S: PropertyNotify,
    T: Send + Sync + 'static,
{
    /// Creates a source over `object`, notifying on changes of `field` (of any field, if
    /// `field` is empty) and reading its value with `extract`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(object, extract))
    )]
    pub fn new(
        object: S,
        field: &str,
        extract: impl Fn(&S) -> T + Send + Sync + 'static,
    ) -> Self {
        let notifier = Notifier::new();
        let token = object.add_handler(Box::new({
            let notifier = notifier.clone();
            let field = field.to_string();
            move |changed: Option<&str>| {
                if field.is_empty() || changed == Some(field.as_str()) {
                    notifier.notify();
                }
            }
        }));

        Self {
            inner: Arc::new(BridgeInner {
                object,
                extract: Box::new(extract),
                notifier,
                token: Mutex::new(Some(token)),
            }),
        }
    }

    /// The object being watched.
    pub fn object(&self) -> &S {
        &self.inner.object
    }
}

impl<S, T> Changeable for Bridge<S, T>
where
    S: PropertyNotify,
    T: Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<S, T> Source for Bridge<S, T>
where
    S: PropertyNotify,
    T: Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        (self.inner.extract)(&self.inner.object)
    }
}
