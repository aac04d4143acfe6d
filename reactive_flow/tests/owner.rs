use reactive_flow::{owner::Owner, prelude::*};
use std::sync::{Arc, Mutex};

fn log() -> Arc<Mutex<Vec<&'static str>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn cleanup_runs_in_registration_order() {
    let owner = Owner::new();
    let ran = log();
    for name in ["first", "second", "third"] {
        let ran = Arc::clone(&ran);
        owner.on_cleanup(move || ran.lock().unwrap().push(name));
    }

    owner.cleanup();
    assert_eq!(*ran.lock().unwrap(), ["first", "second", "third"]);

    // cleanups only run once
    owner.cleanup();
    assert_eq!(ran.lock().unwrap().len(), 3);
}

#[test]
fn dropping_the_last_clone_cleans_up() {
    let owner = Owner::new();
    let clone = owner.clone();
    let ran = log();
    owner.on_cleanup({
        let ran = Arc::clone(&ran);
        move || ran.lock().unwrap().push("cleanup")
    });
    Disposer::add(&clone, {
        let ran = Arc::clone(&ran);
        Box::new(move || ran.lock().unwrap().push("disposer"))
    });

    drop(owner);
    assert!(ran.lock().unwrap().is_empty());
    drop(clone);
    assert_eq!(*ran.lock().unwrap(), ["cleanup", "disposer"]);
}

#[test]
fn weak_owners_do_not_keep_owners_alive() {
    let owner = Owner::new();
    let weak = owner.downgrade();
    assert!(weak.is_alive());
    assert_eq!(weak.upgrade(), Some(owner.clone()));

    drop(owner);
    assert!(!weak.is_alive());
    assert_eq!(weak.upgrade(), None);
}

#[test]
fn owners_compare_by_identity() {
    let owner = Owner::new();
    let clone = owner.clone();
    assert_eq!(owner, clone);
    assert_eq!(owner.debug_id(), clone.debug_id());
    assert_ne!(owner, Owner::new());
}

#[test]
fn owners_scope_subscriptions() {
    let owner = Owner::new();
    let cell = reactive_flow::cell::Cell::new(0);
    cell.subscribe(&owner, || {}).unwrap();
    assert_eq!(cell.notifier().subscriber_count(), 1);

    // cleanup does not end the owner's subscriptions
    owner.cleanup();
    assert_eq!(cell.notifier().subscriber_count(), 1);

    drop(owner);
    assert_eq!(cell.notifier().subscriber_count(), 0);
}
