//! An ordered, mutable list that reports structural changes.

use crate::graph::{AnyNode, Broadcast, Changeable, Notifier, Source};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    mem,
    sync::{Arc, RwLock},
};

/// A structural change to a [`FlowList`], with the position and item it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange<T> {
    /// `item` was inserted at `index`.
    Added {
        /// Position of the new item.
        index: usize,
        /// The new item.
        item: T,
    },
    /// `item` was removed from `index`.
    Removed {
        /// Position the item was removed from.
        index: usize,
        /// The removed item.
        item: T,
    },
    /// The item at `index` was replaced by `item`.
    Replaced {
        /// Position of the replaced item.
        index: usize,
        /// The new item.
        item: T,
    },
    /// The contents were replaced wholesale.
    Reset,
}

/// An ordered list of values that notifies on every mutation.
///
/// Each mutation first fires the list's [`Notifier`], and then emits a [`ListChange`] describing
/// it on [`FlowList::changes`]. No lock is held while either runs. As a [`Source`], a list
/// reads as a copy of its items.
///
/// ```rust
/// use reactive_flow::list::{FlowList, ListChange};
/// use std::sync::{Arc, Mutex};
///
/// let list: FlowList<&'static str> = FlowList::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let owner = Arc::new(());
/// list.changes()
///     .subscribe(&owner, {
///         let seen = Arc::clone(&seen);
///         move |change| seen.lock().unwrap().push(change.clone())
///     })
///     .unwrap();
///
/// list.push("a");
/// list.insert(0, "b");
/// assert_eq!(list.to_vec(), ["b", "a"]);
/// assert_eq!(
///     *seen.lock().unwrap(),
///     [
///         ListChange::Added { index: 0, item: "a" },
///         ListChange::Added { index: 0, item: "b" },
///     ]
/// );
/// ```
pub struct FlowList<T> {
    inner: Arc<FlowListInner<T>>,
}

struct FlowListInner<T> {
    items: RwLock<Vec<T>>,
    notifier: Notifier,
    changes: Broadcast<ListChange<T>>,
}

impl<T> Clone for FlowList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Debug> Debug for FlowList<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("FlowList")
            .field("items", &*self.inner.items.read().or_poisoned())
            .finish()
    }
}

impl<T> PartialEq for FlowList<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for FlowList<T> {}

impl<T> Default for FlowList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for FlowList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(FlowListInner {
                items: RwLock::new(items),
                notifier: Notifier::new(),
                changes: Broadcast::new(),
            }),
        }
    }
}

impl<T> FlowList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Structural change events for this list.
    pub fn changes(&self) -> &Broadcast<ListChange<T>> {
        &self.inner.changes
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.inner.items.read().or_poisoned().len()
    }

    /// Whether the list has no items.
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().or_poisoned().is_empty()
    }

    /// Returns the item at `index`, if there is one.
    pub fn get_item(&self, index: usize) -> Option<T> {
        self.inner.items.read().or_poisoned().get(index).cloned()
    }

    /// Copies the current items.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.read().or_poisoned().clone()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.write().or_poisoned();
            items.push(item.clone());
            items.len() - 1
        };
        self.changed(ListChange::Added { index, item });
    }

    /// Inserts an item at `index`, shifting later items back.
    ///
    /// # Panics
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&self, index: usize, item: T) {
        self.inner
            .items
            .write()
            .or_poisoned()
            .insert(index, item.clone());
        self.changed(ListChange::Added { index, item });
    }

    /// Removes the first item equal to `item`. Returns whether one was found.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let removed = {
            let mut items = self.inner.items.write().or_poisoned();
            items
                .iter()
                .position(|candidate| candidate == item)
                .map(|index| (index, items.remove(index)))
        };
        match removed {
            Some((index, item)) => {
                self.changed(ListChange::Removed { index, item });
                true
            }
            None => false,
        }
    }

    /// Removes and returns the item at `index`, if there is one.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let item = {
            let mut items = self.inner.items.write().or_poisoned();
            (index < items.len()).then(|| items.remove(index))
        }?;
        self.changed(ListChange::Removed {
            index,
            item: item.clone(),
        });
        Some(item)
    }

    /// Replaces the item at `index`, returning the previous one. Does nothing if `index` is
    /// out of bounds.
    pub fn set_item(&self, index: usize, item: T) -> Option<T> {
        let previous = {
            let mut items = self.inner.items.write().or_poisoned();
            let slot = items.get_mut(index)?;
            mem::replace(slot, item.clone())
        };
        self.changed(ListChange::Replaced { index, item });
        Some(previous)
    }

    /// Replaces every item.
    pub fn replace_all(&self, items: impl IntoIterator<Item = T>) {
        let items = items.into_iter().collect();
        let previous =
            mem::replace(&mut *self.inner.items.write().or_poisoned(), items);
        drop(previous);
        self.changed(ListChange::Reset);
    }

    /// Removes every item. Does nothing if the list is already empty.
    pub fn clear(&self) {
        let previous = mem::take(&mut *self.inner.items.write().or_poisoned());
        if !previous.is_empty() {
            drop(previous);
            self.changed(ListChange::Reset);
        }
    }

    fn changed(&self, change: ListChange<T>) {
        self.inner.notifier.notify();
        self.inner.changes.emit(&change);
    }
}

impl<T> Changeable for FlowList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for FlowList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = Vec<T>;

    fn get(&self) -> Vec<T> {
        self.to_vec()
    }
}
