use crate::{
    error::FlowError,
    graph::{AnyNode, AnyOwner, Changeable, Notifier, Source, Subscription},
    owner::Disposer,
    resource::{self, ArcResource},
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    sync::{Arc, Mutex, OnceLock},
};

/// Memoizes the value of an upstream source until the upstream notifies.
///
/// The upstream is read at most once per upstream notification, no matter how many times the
/// cache is read in between. The upstream is never read while the cache's own lock is held, so
/// an invalidation arriving from another thread is never blocked by a slow computation.
///
/// Validity is decided by a generation counter, bumped on every upstream notification. A read
/// that started before an invalidation still returns the value it computed, but does not store
/// it: the next read computes again.
///
/// If `T` is an [Arc-resource](ArcResource), a stale cached value is not disposed from the
/// notification callback. It is disposed by the next [`get`](Source::get), on the thread that
/// reads the cache, which matters for resources that must be released on the thread that uses
/// them.
///
/// ```rust
/// use reactive_flow::{cell::Cell, prelude::*};
/// use std::sync::{
///     atomic::{AtomicUsize, Ordering},
///     Arc,
/// };
///
/// let input = Cell::new(2);
/// let runs = Arc::new(AtomicUsize::new(0));
/// let squared = input
///     .map({
///         let runs = Arc::clone(&runs);
///         move |n| {
///             runs.fetch_add(1, Ordering::Relaxed);
///             n * n
///         }
///     })
///     .cache(None)
///     .unwrap();
///
/// assert_eq!(squared.get(), 4);
/// assert_eq!(squared.get(), 4);
/// assert_eq!(runs.load(Ordering::Relaxed), 1);
///
/// input.set(3);
/// assert_eq!(squared.get(), 9);
/// assert_eq!(runs.load(Ordering::Relaxed), 2);
/// ```
pub struct Cache<T> {
    inner: Arc<CacheInner<T>>,
}

struct CacheInner<T> {
    source: Box<dyn Source<Value = T>>,
    state: Mutex<CacheState<T>>,
    notifier: Notifier,
    // set once the inner is alive, like `Derived`
    _upstream: OnceLock<Subscription>,
}

struct CacheState<T> {
    cached: Option<(u64, T)>,
    generation: u64,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Cache<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Cache")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> Cache<T>
where
    T: ArcResource + Clone + Send + Sync + 'static,
{
    /// Creates a cache over `source`.
    ///
    /// A disposer is required when `T` is an Arc-resource, and refused otherwise; a mismatch
    /// fails with [`FlowError::ResourceContractMismatch`]. The disposer releases the cached
    /// value at teardown.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new(
        source: impl Source<Value = T>,
        disposer: Option<&dyn Disposer>,
    ) -> std::result::Result<Self, FlowError> {
        resource::check_disposer::<T>(disposer)?;

        let inner = Arc::new(CacheInner {
            source: Box::new(source),
            state: Mutex::new(CacheState {
                cached: None,
                generation: 0,
            }),
            notifier: Notifier::new(),
            _upstream: OnceLock::new(),
        });

        let weak = Arc::downgrade(&inner);
        let upstream = inner.source.notifier().attach(
            AnyOwner::from_weak(&weak),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.invalidate();
                }
            },
        );
        _ = inner._upstream.set(upstream);

        if let Some(disposer) = disposer {
            let weak = Arc::downgrade(&inner);
            disposer.add(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let cached = inner.state.lock().or_poisoned().cached.take();
                    if let Some((_, value)) = cached {
                        resource::dispose(&value);
                    }
                }
            }));
        }

        Ok(Self { inner })
    }

    /// Discards the cached value and notifies subscribers, as if the upstream had changed.
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// Whether a read right now would be served from the cache.
    pub fn is_cached(&self) -> bool {
        let state = self.inner.state.lock().or_poisoned();
        matches!(state.cached, Some((generation, _)) if generation == state.generation)
    }
}

impl<T> CacheInner<T>
where
    T: ArcResource + Clone + Send + Sync + 'static,
{
    fn invalidate(&self) {
        {
            let mut state = self.state.lock().or_poisoned();
            state.generation += 1;
            // Arc-resources are released by the next read, on the reading thread
            if !T::IS_ARC {
                state.cached = None;
            }
        }
        self.notifier.notify();
    }

    fn get(&self) -> T {
        let started_at = {
            let state = self.state.lock().or_poisoned();
            match &state.cached {
                Some((generation, value)) if *generation == state.generation => {
                    resource::acquire(value);
                    return value.clone();
                }
                _ => state.generation,
            }
        };

        let value = self.source.get();

        let mut state = self.state.lock().or_poisoned();
        if state.generation != started_at {
            // invalidated while computing: the value is still this read's result, but is
            // already stale for anyone else
            return value;
        }
        let stale = state.cached.replace((started_at, value.clone()));
        resource::acquire(&value);
        drop(state);

        if let Some((_, stale)) = stale {
            resource::dispose(&stale);
        }
        value
    }
}

impl<T> Changeable for Cache<T>
where
    T: ArcResource + Clone + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for Cache<T>
where
    T: ArcResource + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        self.inner.get()
    }
}
