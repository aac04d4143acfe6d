use reactive_flow::{
    cell::{constant, Cell, Property},
    error::FlowError,
    owner::Owner,
    prelude::*,
};
use std::sync::{
    atomic::{AtomicIsize, Ordering},
    Arc, Mutex, RwLock,
};

mod common;
use common::watch;

/// A use-counted resource; `uses` starts at one for the reference its creator holds.
#[derive(Clone, Debug)]
struct Texture {
    id: u32,
    uses: Arc<AtomicIsize>,
}

impl Texture {
    fn new(id: u32) -> Self {
        Self {
            id,
            uses: Arc::new(AtomicIsize::new(1)),
        }
    }

    fn uses(&self) -> isize {
        self.uses.load(Ordering::SeqCst)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl ArcResource for Texture {
    const IS_ARC: bool = true;

    fn acquire(&self) {
        self.uses.fetch_add(1, Ordering::SeqCst);
    }

    fn dispose(&self) {
        self.uses.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn cell_reads_and_writes() {
    let a = Cell::new(0);
    assert_eq!(a.get(), 0);
    a.set(1);
    assert_eq!(a.get(), 1);
    assert_eq!(a.try_get(), Some(1));
}

#[test]
fn setting_equal_value_does_not_notify() {
    let a = Cell::new(5);
    let (_owner, hits) = watch(&a);

    a.set(5);
    assert_eq!(hits.load(Ordering::Relaxed), 0);
    a.set(7);
    assert_eq!(hits.load(Ordering::Relaxed), 1);
    a.set(7);
    assert_eq!(hits.load(Ordering::Relaxed), 1);

    assert!(!a.try_set(7));
    assert!(a.try_set(8));
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[test]
fn subscribers_observe_the_new_value() {
    let a = Cell::new("before".to_string());
    let seen = Arc::new(Mutex::new(None));
    let owner = Owner::new();
    a.subscribe(&owner, {
        let a = a.clone();
        let seen = Arc::clone(&seen);
        move || *seen.lock().unwrap() = Some(a.get())
    })
    .unwrap();

    a.set("after".to_string());
    assert_eq!(seen.lock().unwrap().as_deref(), Some("after"));
}

#[test]
fn clones_share_the_value() {
    let a = Cell::new(1);
    let b = a.clone();
    b.set(2);
    assert_eq!(a.get(), 2);
    assert_eq!(a, b);
    assert_ne!(a, Cell::new(2));
}

#[test]
fn manual_notify_simulates_a_change() {
    let a = Cell::new(1);
    let (_owner, hits) = watch(&a);
    a.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn constant_never_notifies() {
    let c = constant("fixed");
    assert_eq!(c.get(), "fixed");
    assert_eq!(c.notifier().subscriber_count(), 0);
}

#[test]
fn property_reads_through_accessors() {
    let field = Arc::new(RwLock::new(1));
    let property = Property::new(
        {
            let field = Arc::clone(&field);
            move || *field.read().unwrap()
        },
        {
            let field = Arc::clone(&field);
            move |value| *field.write().unwrap() = value
        },
    );
    let (_owner, hits) = watch(&property);

    *field.write().unwrap() = 4;
    assert_eq!(property.get(), 4);
    // the backing field cannot report its own changes
    assert_eq!(hits.load(Ordering::Relaxed), 0);
    property.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 1);

    property.set(9);
    assert_eq!(*field.read().unwrap(), 9);
}

#[test]
fn arc_resource_requires_a_disposer() {
    assert!(matches!(
        Cell::new_with_disposer(Texture::new(1), None),
        Err(FlowError::ResourceContractMismatch { .. })
    ));
}

#[test]
fn plain_value_refuses_a_disposer() {
    let owner = Owner::new();
    assert!(matches!(
        Cell::new_with_disposer(1, Some(&owner)),
        Err(FlowError::ResourceContractMismatch { .. })
    ));
}

#[test]
#[should_panic]
fn new_panics_for_arc_resource() {
    _ = Cell::new(Texture::new(1));
}

#[test]
fn arc_resource_lifecycle() {
    let owner = Owner::new();
    let first = Texture::new(1);
    let cell =
        Cell::new_with_disposer(first.clone(), Some(&owner)).unwrap();
    assert_eq!(first.uses(), 1);

    // every read hands out its own use
    let read = cell.get();
    assert_eq!(first.uses(), 2);
    read.dispose();
    assert_eq!(first.uses(), 1);

    // an equal value is rejected and released
    let same = first.clone();
    same.acquire();
    assert_eq!(first.uses(), 2);
    cell.set(same);
    assert_eq!(first.uses(), 1);

    // a different value replaces and releases the previous one
    let second = Texture::new(2);
    cell.set(second.clone());
    assert_eq!(first.uses(), 0);
    assert_eq!(second.uses(), 1);

    // tearing down the owner releases the stored value
    drop(owner);
    assert_eq!(second.uses(), 0);
    assert!(cell.is_disposed());
    assert_eq!(cell.try_get(), None);
}

#[test]
#[should_panic(expected = "already been disposed")]
fn reading_a_disposed_cell_panics() {
    let owner = Owner::new();
    let cell = Cell::new_with_disposer(Texture::new(1), Some(&owner)).unwrap();
    owner.cleanup();
    _ = cell.get();
}

#[test]
fn cell_is_shared_across_threads() {
    let a = Cell::new(0_usize);
    let (_owner, hits) = watch(&a);

    std::thread::scope(|scope| {
        for n in 1..=4 {
            let a = a.clone();
            scope.spawn(move || a.set(n));
        }
    });

    // each set changed the value, because no two threads wrote the same one
    assert_eq!(hits.load(Ordering::Relaxed), 4);
    assert!((1..=4).contains(&a.get()));
}
