use super::{
    downcast,
    inner::{ChainCore, Terminal, Transition},
};
use crate::{
    graph::{AnyNode, AnyOwner, Broadcast, Changeable, Notifier, Source},
    list::{FlowList, ListChange},
};
use std::{
    fmt::{Debug, Formatter, Result},
    sync::Arc,
};

/// A chain whose target is a [`FlowList`].
///
/// Structural changes of the current target list are re-emitted on [`ListChain::changes`]
/// exactly as the list reports them. The chain's own notifier fires on every mutation of the
/// target list, and once more whenever a link before the list changes, i.e. when the chain
/// starts following a different list. Switching lists emits no structural event.
///
/// List operations are applied to the current target.
pub struct ListChain<T> {
    core: Arc<ChainCore>,
    changes: Broadcast<ListChange<T>>,
}

impl<T> Clone for ListChain<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            changes: self.changes.clone(),
        }
    }
}

impl<T> Debug for ListChain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("ListChain")
            .field("item", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.core))
            .finish()
    }
}

impl<T> ListChain<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(root: AnyNode, transitions: Vec<Transition>) -> Self {
        let changes: Broadcast<ListChange<T>> = Broadcast::new();
        let terminal = Terminal::Structural(Box::new({
            let changes = changes.clone();
            move |node: &AnyNode, owner: AnyOwner| {
                let changes = changes.clone();
                downcast::<FlowList<T>>(node)
                    .changes()
                    .attach(owner, move |change| changes.emit(change))
            }
        }));

        Self {
            core: ChainCore::new(root, transitions, terminal),
            changes,
        }
    }

    /// Structural changes of whichever list the chain currently targets.
    pub fn changes(&self) -> &Broadcast<ListChange<T>> {
        &self.changes
    }

    /// The current target list.
    pub fn target(&self) -> FlowList<T> {
        downcast::<FlowList<T>>(&self.core.target()).clone()
    }

    /// See [`FlowList::len`].
    pub fn len(&self) -> usize {
        self.target().len()
    }

    /// See [`FlowList::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.target().is_empty()
    }

    /// See [`FlowList::get_item`].
    pub fn get_item(&self, index: usize) -> Option<T> {
        self.target().get_item(index)
    }

    /// See [`FlowList::to_vec`].
    pub fn to_vec(&self) -> Vec<T> {
        self.target().to_vec()
    }

    /// See [`FlowList::push`].
    pub fn push(&self, item: T) {
        self.target().push(item);
    }

    /// See [`FlowList::insert`].
    #[track_caller]
    pub fn insert(&self, index: usize, item: T) {
        self.target().insert(index, item);
    }

    /// See [`FlowList::remove`].
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.target().remove(item)
    }

    /// See [`FlowList::remove_at`].
    pub fn remove_at(&self, index: usize) -> Option<T> {
        self.target().remove_at(index)
    }

    /// See [`FlowList::set_item`].
    pub fn set_item(&self, index: usize, item: T) -> Option<T> {
        self.target().set_item(index, item)
    }

    /// See [`FlowList::replace_all`].
    pub fn replace_all(&self, items: impl IntoIterator<Item = T>) {
        self.target().replace_all(items);
    }

    /// See [`FlowList::clear`].
    pub fn clear(&self) {
        self.target().clear();
    }
}

impl<T> Changeable for ListChain<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for ListChain<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = Vec<T>;

    fn get(&self) -> Vec<T> {
        self.to_vec()
    }
}
