//! The owner-scoped subscription registry behind every notifier.
//!
//! Entries live in a [`SlotMap`] arena. Each entry records the weak identity of its owner; an
//! entry whose owner has been dropped is never invoked, and is removed the next time the
//! registry is subscribed to or emits. No finalizers or timers are involved.

use super::{AnyOwner, ToAnyOwner};
use crate::error::FlowError;
use or_poisoned::OrPoisoned;
use slotmap::{new_key_type, SlotMap};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
    sync::{Arc, RwLock, Weak},
};

new_key_type! {
    /// Identifies a single subscription slot.
    pub struct SubscriptionKey;
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    owner: AnyOwner,
    callback: Callback<E>,
}

pub(crate) struct SubscriberMap<E> {
    slots: SlotMap<SubscriptionKey, Entry<E>>,
}

impl<E> Default for SubscriberMap<E> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }
}

impl<E> SubscriberMap<E> {
    fn insert(&mut self, owner: AnyOwner, callback: Callback<E>) -> SubscriptionKey {
        self.slots.insert(Entry { owner, callback })
    }

    fn has_live_owner(&self, owner: &AnyOwner) -> bool {
        self.slots
            .values()
            .any(|entry| &entry.owner == owner && entry.owner.is_alive())
    }

    /// Removes every entry whose owner is gone. The removed entries are returned so that their
    /// callbacks can be dropped after the lock is released.
    fn prune(&mut self) -> Vec<Entry<E>> {
        let dead = self
            .slots
            .iter()
            .filter(|(_, entry)| !entry.owner.is_alive())
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        dead.into_iter()
            .filter_map(|key| self.slots.remove(key))
            .collect()
    }

    fn live_len(&self) -> usize {
        self.slots
            .values()
            .filter(|entry| entry.owner.is_alive())
            .count()
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, key: SubscriptionKey);

    fn is_subscribed(&self, key: SubscriptionKey) -> bool;
}

impl<E> Unsubscribe for RwLock<SubscriberMap<E>> {
    fn unsubscribe(&self, key: SubscriptionKey) {
        let removed = self.write().or_poisoned().slots.remove(key);
        drop(removed);
    }

    fn is_subscribed(&self, key: SubscriptionKey) -> bool {
        self.read().or_poisoned().slots.contains_key(key)
    }
}

/// A handle to a single subscription, which removes it when cancelled or dropped.
///
/// Cancelling is idempotent, and a handle only ever removes its own entry: cancelling after the
/// entry has already been pruned does nothing.
#[must_use = "dropping a `Subscription` cancels it"]
pub struct Subscription {
    key: SubscriptionKey,
    map: Option<Weak<dyn Unsubscribe + Send + Sync>>,
}

impl Subscription {
    /// Removes the subscription. Calling this more than once has no further effect.
    pub fn cancel(&mut self) {
        if let Some(map) = self.map.take().and_then(|map| map.upgrade()) {
            map.unsubscribe(self.key);
        }
    }

    /// Whether the subscription is still registered.
    pub fn is_active(&self) -> bool {
        self.map
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|map| map.is_subscribed(self.key))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Fans an event out to every live subscriber.
///
/// Each owner may hold at most one subscription made through [`Broadcast::subscribe`] or
/// [`Broadcast::subscribe_scoped`]. The order in which subscribers run is unspecified.
pub struct Broadcast<E> {
    inner: Arc<RwLock<SubscriberMap<E>>>,
}

impl<E> Clone for Broadcast<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Broadcast<E> {
    fn default() -> Self {
        Self {
            inner: Default::default(),
        }
    }
}

impl<E> Debug for Broadcast<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Broadcast")
            .field("event", &std::any::type_name::<E>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<E> PartialEq for Broadcast<E> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> Eq for Broadcast<E> {}

impl<E: 'static> Broadcast<E> {
    /// Creates a registry with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for as long as `owner` is alive.
    ///
    /// Fails with [`FlowError::DuplicateSubscription`] if the owner already has a live
    /// subscription here.
    pub fn subscribe(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn(&E) + Send + Sync + 'static,
    ) -> Result<(), FlowError> {
        self.insert_unique(owner.to_any_owner(), Arc::new(callback))
            .map(|_| ())
    }

    /// Registers `callback` like [`Broadcast::subscribe`], and returns a handle that can remove
    /// it before the owner is dropped.
    pub fn subscribe_scoped(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn(&E) + Send + Sync + 'static,
    ) -> Result<Subscription, FlowError> {
        self.insert_unique(owner.to_any_owner(), Arc::new(callback))
            .map(|key| self.handle(key))
    }

    /// Registers a callback without checking for an existing subscription by the same owner.
    /// Nodes in this crate manage their own subscription handles and use this directly.
    pub(crate) fn attach(
        &self,
        owner: AnyOwner,
        callback: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription {
        let (key, pruned) = {
            let mut map = self.inner.write().or_poisoned();
            let pruned = map.prune();
            (map.insert(owner, Arc::new(callback)), pruned)
        };
        drop(pruned);
        self.handle(key)
    }

    fn insert_unique(
        &self,
        owner: AnyOwner,
        callback: Callback<E>,
    ) -> Result<SubscriptionKey, FlowError> {
        let (result, pruned) = {
            let mut map = self.inner.write().or_poisoned();
            let pruned = map.prune();
            let result = if map.has_live_owner(&owner) {
                Err(FlowError::DuplicateSubscription)
            } else {
                Ok(map.insert(owner, callback))
            };
            (result, pruned)
        };
        drop(pruned);
        result
    }

    fn handle(&self, key: SubscriptionKey) -> Subscription {
        Subscription {
            key,
            map: Some(
                Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe + Send + Sync>
            ),
        }
    }

    /// Invokes every live callback with `event`.
    ///
    /// No lock is held while callbacks run, so a callback may subscribe to or emit on this same
    /// registry. A subscription cancelled by an earlier callback in the same pass does not run.
    ///
    /// # Panics
    /// If a callback panics, the remaining callbacks still run, and the first panic is resumed
    /// once all of them have been attempted.
    pub fn emit(&self, event: &E) {
        let (snapshot, has_dead) = {
            let map = self.inner.read().or_poisoned();
            let mut has_dead = false;
            let snapshot = map
                .slots
                .iter()
                .filter(|(_, entry)| {
                    let alive = entry.owner.is_alive();
                    has_dead |= !alive;
                    alive
                })
                .map(|(key, entry)| {
                    (key, entry.owner.clone(), Arc::clone(&entry.callback))
                })
                .collect::<Vec<_>>();
            (snapshot, has_dead)
        };

        if has_dead {
            let pruned = self.inner.write().or_poisoned().prune();
            drop(pruned);
        }

        let mut first_panic = None;
        for (key, owner, callback) in snapshot {
            if !self.inner.is_subscribed(key) {
                continue;
            }
            // keeps the owner alive for the duration of the call
            let Some(_owner) = owner.upgrade() else {
                continue;
            };
            if let Err(payload) =
                catch_unwind(AssertUnwindSafe(|| callback(event)))
            {
                crate::log_warning(format_args!(
                    "a subscriber panicked during notification; the remaining \
                     subscribers will still run"
                ));
                first_panic.get_or_insert(payload);
            }
        }

        if let Some(payload) = first_panic {
            resume_unwind(payload);
        }
    }

    /// The number of subscribers whose owners are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().or_poisoned().live_len()
    }

    /// Whether both handles refer to the same registry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn as_ptr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}
