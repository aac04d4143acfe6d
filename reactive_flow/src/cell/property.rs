use crate::graph::{AnyNode, Changeable, Mutable, Notifier, Source};
use std::{
    fmt::{Debug, Formatter, Result},
    sync::Arc,
};

/// A mutable source backed by a getter and a setter, usually over a field stored elsewhere.
///
/// A `Property` cannot tell when its backing storage changes, so whoever changes it is
/// responsible for calling [`Changeable::notify`]. The setter decides for itself whether to
/// notify.
///
/// ```rust
/// use reactive_flow::{cell::Property, prelude::*};
/// use std::sync::{Arc, RwLock};
///
/// let field = Arc::new(RwLock::new(1));
/// let property = Property::new(
///     {
///         let field = Arc::clone(&field);
///         move || *field.read().unwrap()
///     },
///     {
///         let field = Arc::clone(&field);
///         move |value| *field.write().unwrap() = value
///     },
/// );
///
/// property.set(3);
/// assert_eq!(property.get(), 3);
/// ```
pub struct Property<T> {
    inner: Arc<PropertyInner<T>>,
}

struct PropertyInner<T> {
    get: Box<dyn Fn() -> T + Send + Sync>,
    set: Box<dyn Fn(T) + Send + Sync>,
    notifier: Notifier,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Property<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Property")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T: 'static> Property<T> {
    /// Creates a property from its accessors.
    pub fn new(
        get: impl Fn() -> T + Send + Sync + 'static,
        set: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(PropertyInner {
                get: Box::new(get),
                set: Box::new(set),
                notifier: Notifier::new(),
            }),
        }
    }
}

impl<T: 'static> Changeable for Property<T> {
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T: 'static> Source for Property<T> {
    type Value = T;

    fn get(&self) -> T {
        (self.inner.get)()
    }
}

impl<T: 'static> Mutable for Property<T> {
    fn set(&self, value: T) {
        (self.inner.set)(value)
    }
}
