use core::{fmt::Debug, hash::Hash};
use std::{
    any::Any,
    sync::{Arc, Weak},
};

/// Converts a type to the weak, type-erased owner identity a subscription is registered under.
pub trait ToAnyOwner {
    /// Converts this type to its type-erased equivalent.
    fn to_any_owner(&self) -> AnyOwner;
}

/// A type-erased weak reference to the owner of a subscription.
///
/// The address of the owner's allocation identifies it. Because the `Weak` keeps that
/// allocation reserved, the identifier cannot be reused by another owner while this is held.
#[derive(Clone)]
pub struct AnyOwner(pub(crate) usize, pub(crate) Weak<dyn Any + Send + Sync>);

impl AnyOwner {
    pub(crate) fn from_weak<T: Send + Sync + 'static>(weak: &Weak<T>) -> Self {
        AnyOwner(
            weak.as_ptr() as usize,
            Weak::clone(weak) as Weak<dyn Any + Send + Sync>,
        )
    }

    /// Whether the owner is still alive.
    pub fn is_alive(&self) -> bool {
        self.1.strong_count() > 0
    }

    /// Returns a strong reference that keeps the owner alive, if it still exists.
    pub(crate) fn upgrade(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.1.upgrade()
    }
}

impl<T: Send + Sync + 'static> ToAnyOwner for Arc<T> {
    fn to_any_owner(&self) -> AnyOwner {
        AnyOwner::from_weak(&Arc::downgrade(self))
    }
}

impl ToAnyOwner for AnyOwner {
    fn to_any_owner(&self) -> AnyOwner {
        self.clone()
    }
}

impl Debug for AnyOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnyOwner").field(&self.0).finish()
    }
}

impl Hash for AnyOwner {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq for AnyOwner {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for AnyOwner {}
