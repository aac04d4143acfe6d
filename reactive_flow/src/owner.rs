//! Owners, which scope the lifetime of effects and run teardown for disposable values.

use crate::{
    effect::registry,
    graph::{AnyOwner, ToAnyOwner},
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::Debug,
    mem,
    sync::{Arc, Mutex, Weak},
};

/// Registers teardown work to run when a scope ends.
///
/// Nodes that store [Arc-resources](crate::resource::ArcResource) require a disposer, and use it
/// to release the value they hold when the scope is torn down.
pub trait Disposer {
    /// Adds a function to run at teardown.
    fn add(&self, fun: Box<dyn FnOnce() + Send + Sync>);
}

/// An externally held identity that scopes the lifetime of subscriptions and effects.
///
/// 1) Subscriptions registered with an `Owner` stop firing once every clone of it has been
///    dropped.
/// 2) [`Effect`](crate::effect::Effect)s created with an `Owner` are kept alive exactly as long as
///    the owner is, without the owner referencing them.
/// 3) Cleanup functions added with [`Owner::on_cleanup`] (or through [`Disposer`]) run when
///    [`Owner::cleanup`] is called, or when the owner is dropped.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Owner {
    pub(crate) inner: Arc<OwnerInner>,
}

impl Owner {
    /// Creates a new owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a unique identifier for this owner, intended for debugging only.
    pub fn debug_id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Registers a function to be run the next time this owner is cleaned up.
    pub fn on_cleanup(&self, fun: impl FnOnce() + Send + Sync + 'static) {
        self.inner.cleanups.lock().or_poisoned().push(Box::new(fun));
    }

    /// Runs and clears all registered cleanup functions, in the order they were added.
    ///
    /// Effects registered with this owner keep running until the owner is dropped.
    pub fn cleanup(&self) {
        self.inner.cleanup();
    }

    /// Creates a weak reference to this owner.
    pub fn downgrade(&self) -> WeakOwner {
        WeakOwner {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Owner {}

impl ToAnyOwner for Owner {
    fn to_any_owner(&self) -> AnyOwner {
        AnyOwner::from_weak(&Arc::downgrade(&self.inner))
    }
}

impl Disposer for Owner {
    fn add(&self, fun: Box<dyn FnOnce() + Send + Sync>) {
        self.inner.cleanups.lock().or_poisoned().push(fun);
    }
}

/// A weak reference to an [`Owner`], used to check whether it is still alive.
#[derive(Debug, Clone)]
pub struct WeakOwner {
    inner: Weak<OwnerInner>,
}

impl WeakOwner {
    /// Returns the owner, if any clone of it is still alive.
    pub fn upgrade(&self) -> Option<Owner> {
        self.inner.upgrade().map(|inner| Owner { inner })
    }

    /// Whether any clone of the owner is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[derive(Default)]
pub(crate) struct OwnerInner {
    cleanups: Mutex<Vec<Box<dyn FnOnce() + Send + Sync>>>,
}

impl OwnerInner {
    fn cleanup(&self) {
        let cleanups = mem::take(&mut *self.cleanups.lock().or_poisoned());
        for cleanup in cleanups {
            cleanup();
        }
    }
}

impl Debug for OwnerInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerInner")
            .field("cleanups", &self.cleanups.lock().or_poisoned().len())
            .finish()
    }
}

impl Drop for OwnerInner {
    fn drop(&mut self) {
        self.cleanup();
        registry::release(self as *const OwnerInner as usize);
    }
}
