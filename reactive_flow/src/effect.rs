//! Side effects that run whenever an upstream node changes, for as long as their owner lives.

use crate::{
    graph::{AnyNode, Changeable, Subscription, ToAnyOwner},
    owner::Owner,
};
use std::{
    any::Any,
    fmt::{Debug, Formatter, Result},
    sync::{Arc, Weak},
};

pub mod registry;

/// Runs an action once for every notification from any of its upstream nodes.
///
/// An effect is bound to an [`Owner`]: it keeps running for exactly as long as the owner is
/// alive, even if every `Effect` handle has been dropped, and the owner does not hold a
/// reference to it. Once the owner is dropped, the effect stops reacting and releases its
/// upstream nodes, unless an `Effect` handle is still held; a handle can still
/// [run](Effect::run) the action manually.
///
/// The action is not run when the effect is created.
///
/// ```rust
/// use reactive_flow::{cell::Cell, effect::Effect, owner::Owner, prelude::*};
/// use std::sync::{
///     atomic::{AtomicUsize, Ordering},
///     Arc,
/// };
///
/// let owner = Owner::new();
/// let cell = Cell::new(5);
/// let calls = Arc::new(AtomicUsize::new(0));
///
/// Effect::new(
///     &owner,
///     {
///         let calls = Arc::clone(&calls);
///         move || {
///             calls.fetch_add(1, Ordering::Relaxed);
///         }
///     },
///     &[&cell],
/// );
///
/// cell.set(5);
/// assert_eq!(calls.load(Ordering::Relaxed), 0);
/// cell.set(7);
/// assert_eq!(calls.load(Ordering::Relaxed), 1);
///
/// drop(owner);
/// cell.set(8);
/// assert_eq!(calls.load(Ordering::Relaxed), 1);
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Arc<EffectInner>,
}

struct EffectInner {
    action: Box<dyn Fn() + Send + Sync>,
    _upstream: Vec<AnyNode>,
    _subscriptions: Vec<Subscription>,
}

impl Debug for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Effect")
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl Effect {
    /// Creates an effect that runs `action` whenever any of `upstream` changes, for as long as
    /// `owner` is alive.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn new(
        owner: &Owner,
        action: impl Fn() + Send + Sync + 'static,
        upstream: &[&dyn Changeable],
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<EffectInner>| EffectInner {
            action: Box::new(action),
            _upstream: upstream.iter().map(|node| node.to_any_node()).collect(),
            _subscriptions: upstream
                .iter()
                .map(|node| {
                    let weak = Weak::clone(weak);
                    node.notifier()
                        .attach(owner.to_any_owner(), move || {
                            if let Some(inner) = weak.upgrade() {
                                (inner.action)();
                            }
                        })
                })
                .collect(),
        });

        registry::retain(
            owner,
            Arc::clone(&inner) as Arc<dyn Any + Send + Sync>,
        );

        Self { inner }
    }

    /// Runs the action immediately, regardless of whether anything changed.
    pub fn run(&self) {
        (self.inner.action)();
    }
}
