//! A source whose upstream can be swapped at any time.

use crate::graph::{
    AnyNode, AnyOwner, Changeable, Notifier, Source, Subscription,
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    sync::{Arc, Mutex},
};

type DynSource<T> = Arc<dyn Source<Value = T>>;

/// Forwards the value of whichever source it is currently connected to.
///
/// While disconnected, a connector reads as its default value. Connecting, reconnecting, or
/// disconnecting notifies subscribers exactly once, even if the new upstream happens to hold
/// the same value as the old one: a connector tracks *which* source it forwards, not the value.
/// Connecting to the source it is already connected to does nothing.
///
/// ```rust
/// use reactive_flow::{cell::Cell, connector::Connector, prelude::*};
///
/// let connector = Connector::new(0);
/// assert_eq!(connector.get(), 0);
///
/// connector.connect(Cell::new(9));
/// assert_eq!(connector.get(), 9);
///
/// connector.disconnect();
/// assert_eq!(connector.get(), 0);
/// ```
pub struct Connector<T> {
    inner: Arc<ConnectorInner<T>>,
}

struct ConnectorInner<T> {
    default: T,
    state: Mutex<ConnectorState<T>>,
    notifier: Notifier,
}

struct ConnectorState<T> {
    current: Option<DynSource<T>>,
    subscription: Option<Subscription>,
}

impl<T> Clone for Connector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Connector<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Connector")
            .field("type", &std::any::type_name::<T>())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl<T> Connector<T> {
    /// Whether an upstream source is currently connected.
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().or_poisoned().current.is_some()
    }
}

impl<T> Connector<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a disconnected connector that reads as `default`.
    pub fn new(default: T) -> Self {
        Self {
            inner: Arc::new(ConnectorInner {
                default,
                state: Mutex::new(ConnectorState {
                    current: None,
                    subscription: None,
                }),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Starts forwarding `source`, replacing the current upstream.
    pub fn connect(&self, source: impl Source<Value = T>) {
        let source: DynSource<T> = Arc::new(source);
        self.set_source(Some(source));
    }

    /// Stops forwarding; the connector reads as its default until connected again.
    pub fn disconnect(&self) {
        self.set_source(None);
    }

    /// Replaces the upstream source, or removes it with `None`.
    ///
    /// Notifies subscribers unless `source` is the source already connected.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn set_source(&self, source: Option<DynSource<T>>) {
        let replaced = {
            let mut state = self.inner.state.lock().or_poisoned();
            let unchanged = match (&state.current, &source) {
                (None, None) => true,
                (Some(current), Some(source)) => {
                    current.notifier().ptr_eq(source.notifier())
                }
                _ => false,
            };
            if unchanged {
                return;
            }

            let subscription = source.as_ref().map(|source| {
                let notifier = self.inner.notifier.clone();
                source.notifier().attach(
                    AnyOwner::from_weak(&Arc::downgrade(&self.inner)),
                    move || notifier.notify(),
                )
            });
            let previous = (
                state.current.take(),
                state.subscription.take(),
            );
            state.current = source;
            state.subscription = subscription;
            previous
        };
        // the old upstream may be dropped here, outside the lock
        drop(replaced);

        self.inner.notifier.notify();
    }
}

impl<T> Changeable for Connector<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn to_any_node(&self) -> AnyNode {
        AnyNode::new(self)
    }
}

impl<T> Source for Connector<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        let current = self.inner.state.lock().or_poisoned().current.clone();
        match current {
            Some(source) => source.get(),
            None => self.inner.default.clone(),
        }
    }
}
