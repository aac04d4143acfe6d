//! Stored values with change-on-difference write semantics.

use crate::{
    error::FlowError,
    graph::{AnyNode, Changeable, Mutable, Notifier, Source},
    owner::Disposer,
    resource::{self, ArcResource},
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    panic::Location,
    sync::{Arc, RwLock},
};

mod property;
pub use property::Property;

/// A mutable source that stores its value.
///
/// Setting a value equal to the current one does nothing. Setting a different value replaces
/// it and notifies subscribers; the new value is already in place when they run.
///
/// If `T` is an [Arc-resource](ArcResource), every [`get`](Source::get) acquires the value for the
/// caller, the value a [`set`](Mutable::set) replaces is disposed, and a rejected equal value is
/// disposed immediately.
///
/// ```rust
/// use reactive_flow::{cell::Cell, prelude::*};
/// let count = Cell::new(5);
/// assert_eq!(count.get(), 5);
/// count.set(7);
/// assert_eq!(count.get(), 7);
/// ```
pub struct Cell<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    pub(crate) inner: Arc<CellInner<T>>,
}

pub(crate) struct CellInner<T> {
    value: RwLock<Option<T>>,
    notifier: Notifier,
}

impl<T> Clone for Cell<T> {
    #[track_caller]
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Cell<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Cell")
            .field("type", &std::any::type_name::<T>())
            .field("value", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> PartialEq for Cell<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Cell<T> {}

impl<T> Default for Cell<T>
where
    T: ArcResource + Default + Send + Sync + 'static,
{
    #[track_caller]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Cell<T>
where
    T: ArcResource + Send + Sync + 'static,
{
    /// Creates a cell holding a plain value.
    ///
    /// # Panics
    /// Panics if `T` is an Arc-resource, which requires a disposer: use
    /// [`Cell::new_with_disposer`] instead.
    #[track_caller]
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new(value: T) -> Self {
        match Self::new_with_disposer(value, None) {
            Ok(cell) => cell,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a cell, registering the release of its value with `disposer`.
    ///
    /// A disposer is required when `T` is an Arc-resource and refused otherwise; in either case
    /// a mismatch fails with [`FlowError::ResourceContractMismatch`].
    #[track_caller]
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new_with_disposer(
        value: T,
        disposer: Option<&dyn Disposer>,
    ) -> std::result::Result<Self, FlowError> {
        resource::check_disposer::<T>(disposer)?;

        let inner = Arc::new(CellInner {
            value: RwLock::new(Some(value)),
            notifier: Notifier::new(),
        });

        if let Some(disposer) = disposer {
            let weak = Arc::downgrade(&inner);
            disposer.add(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let value = inner.value.write().or_poisoned().take();
                    if let Some(value) = value {
                        resource::dispose(&value);
                    }
                }
            }));
        }

        Ok(Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        })
    }

    /// Returns the current value, or `None` if it has been released by its disposer.
    pub fn try_get(&self) -> Option<T>
    where
        T: Clone,
    {
        let value = self.inner.value.read().or_poisoned();
        value.as_ref().map(|value| {
            resource::acquire(value);
            value.clone()
        })
    }

    /// Replaces the value if it differs from the current one, and notifies subscribers.
    ///
    /// Returns whether the value changed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn try_set(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut current = self.inner.value.write().or_poisoned();
            if current.as_ref() == Some(&value) {
                resource::dispose(&value);
                return false;
            }
            if let Some(previous) = current.replace(value) {
                resource::dispose(&previous);
            }
        }

        self.inner.notifier.notify();
        true
    }

    /// Whether the value has been released by the cell's disposer.
    pub fn is_disposed(&self) -> bool {
        self.inner.value.read().or_poisoned().is_none()
    }

    /// Where this cell was created, in debug builds.
    pub fn defined_at(&self) -> Option<&'static Location<'static>> {
        #[cfg(debug_assertions)]
        {
            Some(self.defined_at)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

impl<T> Changeable for Cell<T>
where
    T: ArcResource + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for Cell<T>
where
    T: ArcResource + Clone + Send + Sync + 'static,
{
    type Value = T;

    /// Returns the current value.
    ///
    /// # Panics
    /// Panics if the value has been released by the cell's disposer.
    #[track_caller]
    fn get(&self) -> T {
        self.try_get().unwrap_or_else(|| {
            panic!("{}", disposed_message(self.defined_at()))
        })
    }
}

impl<T> Mutable for Cell<T>
where
    T: ArcResource + Clone + PartialEq + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        self.try_set(value);
    }
}

fn disposed_message(defined_at: Option<&'static Location<'static>>) -> String {
    match defined_at {
        Some(location) => format!(
            "Tried to read a cell whose value has already been disposed. The \
             cell was created at {location}."
        ),
        None => "Tried to read a cell whose value has already been disposed."
            .to_string(),
    }
}

/// Creates a cell for a value that is only ever read.
#[track_caller]
pub fn constant<T>(value: T) -> Cell<T>
where
    T: ArcResource + Send + Sync + 'static,
{
    Cell::new(value)
}
