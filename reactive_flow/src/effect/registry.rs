//! The process-wide registry that keeps effects alive for as long as their owners.
//!
//! Entries are keyed by the address of the owner's allocation. Each entry also holds a `Weak`
//! to the owner, so the address cannot be reused by a new owner while the entry exists. An
//! entry is removed when its owner is dropped; entries whose owner died without being released
//! are pruned on the next registration.

use crate::owner::{Owner, OwnerInner};
use or_poisoned::OrPoisoned;
use rustc_hash::FxHashMap;
use std::{
    any::Any,
    mem,
    sync::{Arc, LazyLock, Mutex, Weak},
};

static REGISTRY: LazyLock<Mutex<FxHashMap<usize, Retained>>> =
    LazyLock::new(Default::default);

struct Retained {
    owner: Weak<OwnerInner>,
    nodes: Vec<Arc<dyn Any + Send + Sync>>,
}

pub(crate) fn retain(owner: &Owner, node: Arc<dyn Any + Send + Sync>) {
    let id = Arc::as_ptr(&owner.inner) as usize;
    // dropped after the lock is released, since dropping a node can reach back in here
    let pruned = {
        let mut registry = REGISTRY.lock().or_poisoned();
        let dead = registry
            .iter()
            .filter(|(_, retained)| retained.owner.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        let pruned = dead
            .into_iter()
            .filter_map(|id| registry.remove(&id))
            .collect::<Vec<_>>();

        registry
            .entry(id)
            .or_insert_with(|| Retained {
                owner: Arc::downgrade(&owner.inner),
                nodes: Vec::new(),
            })
            .nodes
            .push(node);
        pruned
    };
    drop(pruned);
}

pub(crate) fn release(id: usize) {
    let retained = REGISTRY.lock().or_poisoned().remove(&id);
    if let Some(retained) = retained {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            owner = id,
            effects = retained.nodes.len(),
            "releasing effects"
        );
        mem::drop(retained);
    }
}

/// The number of live owners that currently have at least one effect registered.
pub fn retained_owners() -> usize {
    REGISTRY
        .lock()
        .or_poisoned()
        .values()
        .filter(|retained| retained.owner.strong_count() > 0)
        .count()
}
