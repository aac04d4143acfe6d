use super::{Notifier, Subscription, ToAnyOwner};
use crate::error::FlowError;
use std::{
    any::Any,
    fmt::{Debug, Formatter, Result},
    sync::Arc,
};

/// Any node in the graph: something that can be subscribed to for changes.
pub trait Changeable: Send + Sync + 'static {
    /// The notifier that fires whenever this node changes.
    fn notifier(&self) -> &Notifier;

    /// Converts this node to a type-erased handle that keeps it alive.
    fn to_any_node(&self) -> AnyNode;

    /// Subscribes `callback` to changes of this node, for as long as `owner` is alive.
    fn subscribe(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> std::result::Result<(), FlowError>
    where
        Self: Sized,
    {
        self.notifier().subscribe(owner, callback)
    }

    /// Subscribes `callback` to changes of this node, returning a handle that can cancel it.
    fn subscribe_scoped(
        &self,
        owner: &impl ToAnyOwner,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> std::result::Result<Subscription, FlowError>
    where
        Self: Sized,
    {
        self.notifier().subscribe_scoped(owner, callback)
    }

    /// Notifies subscribers as though this node had changed.
    fn notify(&self) {
        self.notifier().notify();
    }
}

/// A node that produces a value on demand.
///
/// Notifications from [`Changeable::notifier`] mean that a future call to [`Source::get`] may
/// return a different result.
pub trait Source: Changeable {
    /// The type of value produced.
    type Value;

    /// Produces the current value.
    fn get(&self) -> Self::Value;
}

/// A source whose value can be set.
pub trait Mutable: Source {
    /// Replaces the current value.
    fn set(&self, value: Self::Value);
}

impl Changeable for Notifier {
    fn notifier(&self) -> &Notifier {
        self
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

/// A type-erased, strongly held node.
///
/// Holding an `AnyNode` keeps the node alive, along with anything the node itself holds.
#[derive(Clone)]
pub struct AnyNode {
    node: Arc<dyn Any + Send + Sync>,
    notifier: Notifier,
}

impl AnyNode {
    /// Erases the type of `node`.
    pub fn new<N: Changeable + Clone>(node: &N) -> Self {
        Self {
            notifier: node.notifier().clone(),
            node: Arc::new(node.clone()),
        }
    }

    /// The notifier of the erased node.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Returns the node, if it is of type `N`.
    pub fn downcast_ref<N: 'static>(&self) -> Option<&N> {
        // a handle erased twice is still the same node
        (self as &dyn Any)
            .downcast_ref::<N>()
            .or_else(|| self.node.downcast_ref())
    }

    /// Whether both handles refer to the same node.
    pub fn same_node(&self, other: &AnyNode) -> bool {
        self.notifier.ptr_eq(&other.notifier)
    }
}

impl Debug for AnyNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("AnyNode")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl Changeable for AnyNode {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        self.clone()
    }
}
