use crate::graph::{
    AnyNode, AnyOwner, Changeable, Notifier, Source, Subscription,
};
use std::{
    fmt::{Debug, Formatter, Result},
    panic::Location,
    sync::{Arc, OnceLock},
};

/// A value computed from any number of upstream nodes, recomputed on every read.
///
/// A `Derived` stores nothing: each [`get`](Source::get) runs the computation again. It notifies
/// its own subscribers whenever any upstream node notifies. Use a [`Cache`](super::Cache) on top
/// of it when the computation is expensive.
///
/// The upstream nodes are held strongly for as long as the `Derived` exists.
///
/// ```rust
/// use reactive_flow::{cell::Cell, computed::Derived, prelude::*};
///
/// let first = Cell::new("Ada".to_string());
/// let last = Cell::new("Lovelace".to_string());
/// let full_name = Derived::new(
///     {
///         let (first, last) = (first.clone(), last.clone());
///         move || format!("{} {}", first.get(), last.get())
///     },
///     &[&first, &last],
/// );
///
/// assert_eq!(full_name.get(), "Ada Lovelace");
/// last.set("Byron".to_string());
/// assert_eq!(full_name.get(), "Ada Byron");
/// ```
pub struct Derived<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<DerivedInner<T>>,
}

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T + Send + Sync>,
    notifier: Notifier,
    _upstream: Vec<AnyNode>,
    // set once the inner is alive: a weak owner that cannot upgrade yet reads as dead, and
    // would be pruned by a concurrent notification
    _subscriptions: OnceLock<Vec<Subscription>>,
}

impl<T> Clone for Derived<T> {
    #[track_caller]
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Derived<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Derived")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T: Send + Sync + 'static> Derived<T> {
    /// Creates a value computed by `compute`, which changes whenever any of `upstream` does.
    #[track_caller]
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new(
        compute: impl Fn() -> T + Send + Sync + 'static,
        upstream: &[&dyn Changeable],
    ) -> Self {
        let inner = Arc::new(DerivedInner {
            compute: Box::new(compute),
            notifier: Notifier::new(),
            _upstream: upstream.iter().map(|node| node.to_any_node()).collect(),
            _subscriptions: OnceLock::new(),
        });

        let owner = AnyOwner::from_weak(&Arc::downgrade(&inner));
        let subscriptions = upstream
            .iter()
            .map(|node| {
                let notifier = inner.notifier.clone();
                node.notifier()
                    .attach(owner.clone(), move || notifier.notify())
            })
            .collect();
        _ = inner._subscriptions.set(subscriptions);

        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        }
    }

    /// Where this value was created, in debug builds.
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

impl<T: Send + Sync + 'static> Changeable for Derived<T> {
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T: Send + Sync + 'static> Source for Derived<T> {
    type Value = T;

    fn get(&self) -> T {
        (self.inner.compute)()
    }
}
