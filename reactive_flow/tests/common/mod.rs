use reactive_flow::prelude::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts the notifications of `node` for as long as the returned owner is held.
pub fn watch(node: &impl Changeable) -> (Arc<()>, Arc<AtomicUsize>) {
    let owner = Arc::new(());
    let hits = Arc::new(AtomicUsize::new(0));
    node.subscribe(&owner, {
        let hits = Arc::clone(&hits);
        move || {
            hits.fetch_add(1, Ordering::Relaxed);
        }
    })
    .unwrap();
    (owner, hits)
}
