use reactive_flow::{
    error::FlowError,
    graph::{Broadcast, Notifier},
    owner::Owner,
};
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let callback = {
        let hits = Arc::clone(&hits);
        move || {
            hits.fetch_add(1, Ordering::Relaxed);
        }
    };
    (hits, callback)
}

#[test]
fn notify_runs_every_live_subscriber() {
    let notifier = Notifier::new();
    let a = Arc::new(());
    let b = Owner::new();
    let (hits_a, callback_a) = counter();
    let (hits_b, callback_b) = counter();
    notifier.subscribe(&a, callback_a).unwrap();
    notifier.subscribe(&b, callback_b).unwrap();

    notifier.notify();
    notifier.notify();
    assert_eq!(hits_a.load(Ordering::Relaxed), 2);
    assert_eq!(hits_b.load(Ordering::Relaxed), 2);
    assert_eq!(notifier.subscriber_count(), 2);
}

#[test]
fn second_subscription_for_same_owner_fails() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    notifier.subscribe(&owner, || {}).unwrap();
    assert_eq!(
        notifier.subscribe(&owner, || {}),
        Err(FlowError::DuplicateSubscription)
    );
    assert!(matches!(
        notifier.subscribe_scoped(&owner, || {}),
        Err(FlowError::DuplicateSubscription)
    ));

    // another notifier does not care
    let other = Notifier::new();
    other.subscribe(&owner, || {}).unwrap();
}

#[test]
fn owner_can_subscribe_again_once_cancelled() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let mut subscription = notifier.subscribe_scoped(&owner, || {}).unwrap();
    subscription.cancel();
    notifier.subscribe(&owner, || {}).unwrap();
}

#[test]
fn dropped_owner_stops_receiving() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let (hits, callback) = counter();
    notifier.subscribe(&owner, callback).unwrap();

    notifier.notify();
    drop(owner);
    notifier.notify();

    assert_eq!(hits.load(Ordering::Relaxed), 1);
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn subscription_does_not_keep_owner_alive() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let released = Arc::downgrade(&owner);
    notifier
        .subscribe(&owner, {
            let owner = Arc::downgrade(&owner);
            move || _ = owner.upgrade()
        })
        .unwrap();

    drop(owner);
    assert!(released.upgrade().is_none());
}

#[test]
fn cancel_is_idempotent() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let (hits, callback) = counter();
    let mut subscription = notifier.subscribe_scoped(&owner, callback).unwrap();
    assert!(subscription.is_active());

    subscription.cancel();
    subscription.cancel();
    assert!(!subscription.is_active());

    notifier.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 0);
}

#[test]
fn dropping_subscription_cancels_it() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let (hits, callback) = counter();
    let subscription = notifier.subscribe_scoped(&owner, callback).unwrap();
    notifier.notify();
    drop(subscription);
    notifier.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn subscriber_may_reenter_the_notifier() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let late = Arc::new(());
    let (hits, callback) = counter();
    let callback = Arc::new(callback);

    notifier
        .subscribe(&owner, {
            let notifier = notifier.clone();
            let late = Arc::clone(&late);
            let callback = Arc::clone(&callback);
            move || {
                // only the first registration succeeds
                let callback = Arc::clone(&callback);
                _ = notifier.subscribe(&late, move || callback());
            }
        })
        .unwrap();

    notifier.notify();
    assert_eq!(notifier.subscriber_count(), 2);

    notifier.notify();
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn subscriber_cancelled_by_another_does_not_run_afterwards() {
    let notifier = Notifier::new();
    let first = Arc::new(());
    let second = Arc::new(());
    let (hits, callback) = counter();
    let victim = Arc::new(Mutex::new(Some(
        notifier.subscribe_scoped(&second, callback).unwrap(),
    )));

    notifier
        .subscribe(&first, {
            let victim = Arc::clone(&victim);
            move || {
                victim.lock().unwrap().take();
            }
        })
        .unwrap();

    notifier.notify();
    let after_first = hits.load(Ordering::Relaxed);
    // depending on order, the victim ran at most once before it was cancelled
    assert!(after_first <= 1);

    notifier.notify();
    assert_eq!(hits.load(Ordering::Relaxed), after_first);
}

#[test]
fn panicking_subscriber_does_not_stop_the_others() {
    let notifier = Notifier::new();
    let owners = (0..3).map(|_| Arc::new(())).collect::<Vec<_>>();
    let (hits, callback) = counter();
    let callback = Arc::new(callback);

    notifier.subscribe(&owners[0], || panic!("first")).unwrap();
    for owner in &owners[1..] {
        let callback = Arc::clone(&callback);
        notifier.subscribe(owner, move || callback()).unwrap();
    }

    let result = catch_unwind(AssertUnwindSafe(|| notifier.notify()));
    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"first"));
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[test]
fn broadcast_delivers_payload() {
    let events = Broadcast::<u32>::new();
    let owner = Arc::new(());
    let seen = Arc::new(Mutex::new(Vec::new()));
    events
        .subscribe(&owner, {
            let seen = Arc::clone(&seen);
            move |n: &u32| seen.lock().unwrap().push(*n)
        })
        .unwrap();

    events.emit(&1);
    events.emit(&2);
    assert_eq!(*seen.lock().unwrap(), [1, 2]);
}

#[test]
fn notifications_from_many_threads() {
    let notifier = Notifier::new();
    let owner = Arc::new(());
    let (hits, callback) = counter();
    notifier.subscribe(&owner, callback).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    notifier.notify();
                }
            });
        }
    });

    assert_eq!(hits.load(Ordering::Relaxed), 400);
}
