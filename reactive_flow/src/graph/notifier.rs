use super::{AnyOwner, Broadcast, Subscription, ToAnyOwner};
use crate::error::FlowError;
use std::fmt::{Debug, Formatter, Result};

/// An owner-scoped change notifier.
///
/// A notification says only that something changed; it carries no payload. Subscribers are
/// held weakly by their owners: a callback runs only while its owner is alive, and never
/// keeps the owner alive itself.
///
/// ```rust
/// use reactive_flow::graph::Notifier;
/// use std::sync::{
///     atomic::{AtomicUsize, Ordering},
///     Arc,
/// };
///
/// let notifier = Notifier::new();
/// let owner = Arc::new(());
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// notifier
///     .subscribe(&owner, {
///         let hits = Arc::clone(&hits);
///         move || {
///             hits.fetch_add(1, Ordering::Relaxed);
///         }
///     })
///     .unwrap();
///
/// notifier.notify();
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
///
/// // once the owner is gone, its callback no longer runs
/// drop(owner);
/// notifier.notify();
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Notifier {
    inner: Broadcast<()>,
}

impl Notifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run on every notification, for as long as `owner` is alive.
    ///
    /// Fails with [`FlowError::DuplicateSubscription`] if `owner` is already subscribed.
    pub fn subscribe(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> std::result::Result<(), FlowError> {
        self.inner.subscribe(owner, move |_| callback())
    }

    /// Registers `callback` like [`Notifier::subscribe`], and returns a handle that removes the
    /// subscription early when cancelled or dropped.
    pub fn subscribe_scoped(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> std::result::Result<Subscription, FlowError> {
        self.inner.subscribe_scoped(owner, move |_| callback())
    }

    pub(crate) fn attach(
        &self,
        owner: AnyOwner,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.attach(owner, move |_| callback())
    }

    /// Runs every live subscriber synchronously on the calling thread.
    ///
    /// # Panics
    /// Resumes the first panic raised by a subscriber, after every subscriber has run.
    pub fn notify(&self) {
        self.inner.emit(&());
    }

    /// The number of subscribers whose owners are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    pub(crate) fn id(&self) -> usize {
        self.inner.as_ptr()
    }

    /// Whether both handles refer to the same notifier, i.e. the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl Debug for Notifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Notifier")
            .field("data", &self.id())
            .finish()
    }
}
