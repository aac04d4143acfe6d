use crate::{
    cell::Cell,
    error::FlowError,
    graph::{AnyNode, AnyOwner, Changeable, Notifier, Source, Subscription},
    owner::Disposer,
    resource::ArcResource,
};
use std::{
    fmt::{Debug, Formatter, Result},
    sync::{Arc, OnceLock},
};

/// Mirrors an upstream source, but only notifies when its value actually changes.
///
/// On every upstream notification the upstream is read once and the result is stored with
/// [`Cell`] semantics: a value equal to the one already held is discarded without notifying.
/// Reads are served from the stored value.
pub struct Filtered<T> {
    inner: Arc<FilteredInner<T>>,
}

struct FilteredInner<T> {
    cell: Cell<T>,
    source: Box<dyn Source<Value = T>>,
    // set once the inner is alive, like `Derived`
    _upstream: OnceLock<Subscription>,
}

impl<T> Clone for Filtered<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Filtered<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Filtered")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> Filtered<T>
where
    T: ArcResource + Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a filter over `source`, reading its current value immediately.
    ///
    /// The disposer follows the same rules as [`Cell::new_with_disposer`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new(
        source: impl Source<Value = T>,
        disposer: Option<&dyn Disposer>,
    ) -> std::result::Result<Self, FlowError> {
        let cell = Cell::new_with_disposer(source.get(), disposer)?;

        let inner = Arc::new(FilteredInner {
            cell,
            source: Box::new(source),
            _upstream: OnceLock::new(),
        });

        let weak = Arc::downgrade(&inner);
        let upstream = inner.source.notifier().attach(
            AnyOwner::from_weak(&weak),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.cell.try_set(inner.source.get());
                }
            },
        );
        _ = inner._upstream.set(upstream);
        // catches a change that landed between the first read and the attach
        inner.cell.try_set(inner.source.get());

        Ok(Self { inner })
    }
}

impl<T> Changeable for Filtered<T>
where
    T: ArcResource + Clone + PartialEq + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        self.inner.cell.notifier()
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for Filtered<T>
where
    T: ArcResource + Clone + PartialEq + Send + Sync + 'static,
{
    type Value = T;

    #[track_caller]
    fn get(&self) -> T {
        self.inner.cell.get()
    }
}
