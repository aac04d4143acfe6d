use reactive_flow::{
    cell::Cell,
    computed::{Derived, Filtered},
    graph::Notifier,
    prelude::*,
};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

mod common;
use common::watch;

#[test]
fn derived_computes_from_all_upstreams() {
    let a = Cell::new(1);
    let b = Cell::new(2);
    let c = Cell::new(3);
    let sum = Derived::new(
        {
            let (a, b, c) = (a.clone(), b.clone(), c.clone());
            move || a.get() + b.get() + c.get()
        },
        &[&a, &b, &c],
    );
    let (_owner, hits) = watch(&sum);

    assert_eq!(sum.get(), 6);
    a.set(10);
    c.set(30);
    assert_eq!(sum.get(), 42);
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[test]
fn every_read_recomputes() {
    let runs = Arc::new(AtomicUsize::new(0));
    let derived = Derived::new(
        {
            let runs = Arc::clone(&runs);
            move || runs.fetch_add(1, Ordering::Relaxed)
        },
        &[],
    );
    derived.get();
    derived.get();
    derived.get();
    assert_eq!(runs.load(Ordering::Relaxed), 3);
}

#[test]
fn plain_notifiers_can_be_upstream() {
    let trigger = Notifier::new();
    let derived = Derived::new(|| "value", &[&trigger]);
    let (_owner, hits) = watch(&derived);

    trigger.notify();
    trigger.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[test]
fn map_follows_its_source() {
    let count = Cell::new(2);
    let double = count.map(|n| n * 2);
    let label = double.map(|n| format!("{n} items"));
    let (_owner, hits) = watch(&label);

    assert_eq!(label.get(), "4 items");
    count.set(3);
    assert_eq!(label.get(), "6 items");
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn derived_keeps_its_upstream_alive() {
    let derived = {
        let hidden = Cell::new(5);
        hidden.map(|n| n + 1)
    };
    assert_eq!(derived.get(), 6);
}

#[test]
fn dropping_derived_detaches_it() {
    let a = Cell::new(1);
    let derived = a.map(|n| n + 1);
    assert_eq!(a.notifier().subscriber_count(), 1);
    drop(derived);
    assert_eq!(a.notifier().subscriber_count(), 0);
}

#[test]
fn filter_changes_only_notifies_on_difference() {
    let n = Cell::new(4);
    let parity = n.map(|n| n % 2).filter_changes(None).unwrap();
    let (_owner, hits) = watch(&parity);

    n.set(6);
    n.set(8);
    assert_eq!(hits.load(Ordering::Relaxed), 0);
    assert_eq!(parity.get(), 0);

    n.set(9);
    assert_eq!(hits.load(Ordering::Relaxed), 1);
    assert_eq!(parity.get(), 1);
}

/// Runs `build` repeatedly while another thread keeps notifying `input`.
fn build_while_notifying(input: &Cell<i32>, build: impl Fn(&Cell<i32>)) {
    let stop = Arc::new(AtomicBool::new(false));
    let notifying = thread::spawn({
        let (input, stop) = (input.clone(), Arc::clone(&stop));
        move || {
            while !stop.load(Ordering::Relaxed) {
                input.notify();
            }
        }
    });

    for _ in 0..2_000 {
        build(input);
    }
    stop.store(true, Ordering::Relaxed);
    notifying.join().unwrap();
}

#[test]
fn derived_built_during_notifications_stays_subscribed() {
    let input = Cell::new(0);
    build_while_notifying(&input, |input| {
        let derived = Derived::new(|| 0, &[input]);
        assert_eq!(input.notifier().subscriber_count(), 1);
        drop(derived);
    });

    let derived = input.map(|n| n + 1);
    let (_owner, hits) = watch(&derived);
    input.set(1);
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn filtered_built_during_notifications_stays_subscribed() {
    let input = Cell::new(0);
    build_while_notifying(&input, |input| {
        let filtered = Filtered::new(input.clone(), None).unwrap();
        assert_eq!(input.notifier().subscriber_count(), 1);
        drop(filtered);
    });

    let filtered = input.filter_changes(None).unwrap();
    input.set(7);
    assert_eq!(filtered.get(), 7);
}
