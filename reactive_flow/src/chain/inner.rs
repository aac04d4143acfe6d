use crate::graph::{AnyNode, AnyOwner, Notifier, Subscription};
use or_poisoned::OrPoisoned;
use std::sync::{Arc, RwLock, Weak};

pub(crate) type Transition = Arc<dyn Fn(&AnyNode) -> AnyNode + Send + Sync>;

/// How a chain watches its current target, beyond forwarding its changes.
pub(crate) enum Terminal {
    /// Changes of the target are the only thing forwarded.
    Scalar,
    /// Also attaches to the target's structural events, with the chain core as the owner.
    Structural(
        Box<dyn Fn(&AnyNode, AnyOwner) -> Subscription + Send + Sync>,
    ),
}

/// The shared machinery of every chain: resolves the links from the root to the target and
/// re-resolves the suffix after any link that changes.
pub(crate) struct ChainCore {
    transitions: Vec<Transition>,
    terminal: Terminal,
    links: RwLock<Links>,
    notifier: Notifier,
}

/// `resolved[0]` is the root and `resolved[i + 1]` is `transitions[i](resolved[i])`.
/// `subscriptions[i]` watches `resolved[i]`. `structural` watches the structural events of the
/// target, if the terminal has any.
#[derive(Default)]
struct Links {
    resolved: Vec<AnyNode>,
    subscriptions: Vec<Subscription>,
    structural: Option<Subscription>,
}

impl ChainCore {
    pub fn new(
        root: AnyNode,
        transitions: Vec<Transition>,
        terminal: Terminal,
    ) -> Arc<Self> {
        let core = Arc::new(ChainCore {
            transitions,
            terminal,
            links: Default::default(),
            notifier: Notifier::new(),
        });

        {
            let mut links = core.links.write().or_poisoned();
            let this = Arc::downgrade(&core);
            let subscription = core.watch(&this, 0, &root);
            links.resolved.push(root);
            links.subscriptions.push(subscription);
            core.resolve(&this, &mut links);
        }

        core
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The fully resolved target. Never observes a chain that is halfway through
    /// re-resolving.
    pub fn target(&self) -> AnyNode {
        let links = self.links.read().or_poisoned();
        let Some(target) = links.resolved.last() else {
            unreachable!("a chain always resolves at least its root")
        };
        target.clone()
    }

    /// Resolves and watches every link after the last one already resolved.
    fn resolve(&self, this: &Weak<Self>, links: &mut Links) {
        while links.resolved.len() <= self.transitions.len() {
            let index = links.resolved.len() - 1;
            let next = (self.transitions[index])(&links.resolved[index]);
            let subscription = self.watch(this, index + 1, &next);
            links.resolved.push(next);
            links.subscriptions.push(subscription);
        }

        if let Terminal::Structural(attach) = &self.terminal {
            if links.structural.is_none() {
                if let Some(target) = links.resolved.last() {
                    let subscription = attach(target, AnyOwner::from_weak(this));
                    links.structural = Some(subscription);
                }
            }
        }
    }

    fn watch(
        &self,
        this: &Weak<Self>,
        index: usize,
        node: &AnyNode,
    ) -> Subscription {
        let owner = AnyOwner::from_weak(this);
        if index < self.transitions.len() {
            let this = Weak::clone(this);
            let link = node.notifier().id();
            node.notifier().attach(owner, move || {
                if let Some(core) = this.upgrade() {
                    core.relink(index, link);
                }
            })
        } else {
            let notifier = self.notifier.clone();
            node.notifier().attach(owner, move || notifier.notify())
        }
    }

    /// Re-resolves every link after `changed`, then notifies once.
    ///
    /// `link` identifies the node that fired; a notification from a node that has already
    /// been replaced is ignored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self))
    )]
    fn relink(self: &Arc<Self>, changed: usize, link: usize) {
        let stale = {
            let mut links = self.links.write().or_poisoned();
            match links.resolved.get(changed) {
                Some(node) if node.notifier().id() == link => {}
                _ => return,
            }

            let stale = (
                links.structural.take(),
                links.subscriptions.split_off(changed + 1),
                links.resolved.split_off(changed + 1),
            );
            self.resolve(&Arc::downgrade(self), &mut links);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                changed,
                replaced = stale.2.len(),
                "chain link changed; re-resolved the rest of the chain"
            );
            stale
        };
        // replaced links are released outside the lock
        drop(stale);

        self.notifier.notify();
    }
}
