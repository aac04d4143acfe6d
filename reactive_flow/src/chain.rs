//! Chains follow a sequence of value-dependent transitions from a root node to a target node.
//!
//! Each transition maps the current node of one link to the node of the next link. Whenever a
//! link notifies, every link after it is resolved again with the current transitions, and the
//! chain notifies once. A chain always exposes a fully resolved target: reads never observe a
//! chain that is halfway through re-resolving.
//!
//! ```rust
//! use reactive_flow::{cell::Cell, chain::ChainBuilder, prelude::*};
//!
//! #[derive(Clone)]
//! struct Account {
//!     balance: Cell<u64>,
//! }
//!
//! let alice = Account { balance: Cell::new(10) };
//! let bob = Account { balance: Cell::new(20) };
//!
//! let selected = Cell::new(0_usize);
//! let accounts = vec![alice.clone(), bob.clone()];
//! let balance = ChainBuilder::new(selected.clone())
//!     .then_value(move |index| accounts[index].balance.clone())
//!     .build();
//!
//! assert_eq!(balance.get(), 10);
//! selected.set(1);
//! assert_eq!(balance.get(), 20);
//!
//! // writes go to the current target
//! balance.set(25);
//! assert_eq!(bob.balance.get(), 25);
//! ```
//!
//! ## Terminals
//! A chain built with [`ChainBuilder::build`] treats every change of its target as a change of
//! the chain. A chain to a [`FlowList`] built with [`ChainBuilder::build_list`] does the same,
//! and also forwards the list's structural [`ListChange`](crate::list::ListChange) events.
//!
//! ## Transitions
//! Transitions run while the chain is locked for re-resolution. They must not read or write
//! the chain they belong to.

use crate::{
    graph::{AnyNode, Changeable, Mutable, Notifier, Source},
    list::FlowList,
};
use std::{
    fmt::{Debug, Formatter, Result},
    marker::PhantomData,
    sync::Arc,
};

mod inner;
mod list_chain;

use inner::{ChainCore, Terminal, Transition};
pub use list_chain::ListChain;

/// Collects the links of a chain, starting from a root node.
///
/// `N` is the type of the last link added so far.
pub struct ChainBuilder<N> {
    root: AnyNode,
    transitions: Vec<Transition>,
    ty: PhantomData<fn() -> N>,
}

impl<N> Debug for ChainBuilder<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("ChainBuilder")
            .field("root", &self.root)
            .field("links", &self.transitions.len())
            .finish()
    }
}

impl<N> ChainBuilder<N>
where
    N: Changeable + Clone,
{
    /// Starts a chain at `root`.
    pub fn new(root: N) -> Self {
        Self {
            root: root.to_any_node(),
            transitions: Vec::new(),
            ty: PhantomData,
        }
    }

    /// Adds a link, mapping the current node of the last link to the node of the new one.
    pub fn then<M>(
        mut self,
        transition: impl Fn(&N) -> M + Send + Sync + 'static,
    ) -> ChainBuilder<M>
    where
        M: Changeable + Clone,
    {
        self.transitions.push(Arc::new(move |node: &AnyNode| {
            transition(downcast::<N>(node)).to_any_node()
        }));
        ChainBuilder {
            root: self.root,
            transitions: self.transitions,
            ty: PhantomData,
        }
    }

    /// Adds a link, mapping the current value of the last link to the node of the new one.
    pub fn then_value<M>(
        self,
        transition: impl Fn(N::Value) -> M + Send + Sync + 'static,
    ) -> ChainBuilder<M>
    where
        N: Source,
        M: Changeable + Clone,
    {
        self.then(move |node: &N| transition(node.get()))
    }

    /// Resolves the chain, treating every change of the target as a change of the chain.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn build(self) -> Chain<N> {
        Chain {
            core: ChainCore::new(self.root, self.transitions, Terminal::Scalar),
            ty: PhantomData,
        }
    }
}

impl<T> ChainBuilder<FlowList<T>>
where
    T: Clone + Send + Sync + 'static,
{
    /// Resolves the chain, forwarding the structural changes of the target list.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn build_list(self) -> ListChain<T> {
        ListChain::new(self.root, self.transitions)
    }
}

pub(crate) fn downcast<N: 'static>(node: &AnyNode) -> &N {
    let Some(node) = node.downcast_ref::<N>() else {
        unreachable!(
            "chain link is not a `{}`",
            std::any::type_name::<N>()
        )
    };
    node
}

/// A chain whose target is a node of type `N`.
///
/// A chain is a [`Source`] when its target is, reading the current target's value, and
/// [`Mutable`] when its target is, writing to the current target.
pub struct Chain<N> {
    core: Arc<ChainCore>,
    ty: PhantomData<fn() -> N>,
}

impl<N> Clone for Chain<N> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            ty: PhantomData,
        }
    }
}

impl<N> Debug for Chain<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Chain")
            .field("target", &std::any::type_name::<N>())
            .field("data", &Arc::as_ptr(&self.core))
            .finish()
    }
}

impl<N> Chain<N>
where
    N: Changeable + Clone,
{
    /// The current target.
    pub fn target(&self) -> N {
        downcast::<N>(&self.core.target()).clone()
    }
}

impl<N> Changeable for Chain<N>
where
    N: Changeable + Clone,
{
    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<N> Source for Chain<N>
where
    N: Source + Clone,
{
    type Value = N::Value;

    fn get(&self) -> N::Value {
        self.target().get()
    }
}

impl<N> Mutable for Chain<N>
where
    N: Mutable + Clone,
{
    fn set(&self, value: N::Value) {
        self.target().set(value);
    }
}
