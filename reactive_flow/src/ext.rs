//! Extension methods for building nodes on top of an existing source.

use crate::{
    computed::{Cache, Derived, Filtered},
    connector::Connector,
    effect::Effect,
    error::FlowError,
    graph::Source,
    owner::{Disposer, Owner},
    resource::ArcResource,
};

/// Helpers for chaining nodes off a [`Source`].
pub trait SourceExt: Source + Clone {
    /// A value computed from this source's value on every read.
    fn map<U>(
        &self,
        f: impl Fn(Self::Value) -> U + Send + Sync + 'static,
    ) -> Derived<U>
    where
        U: Send + Sync + 'static,
    {
        let source = self.clone();
        Derived::new(move || f(source.get()), &[self])
    }

    /// Memoizes this source's value until it changes. See [`Cache::new`].
    fn cache(
        &self,
        disposer: Option<&dyn Disposer>,
    ) -> Result<Cache<Self::Value>, FlowError>
    where
        Self::Value: ArcResource + Clone + Send + Sync + 'static,
    {
        Cache::new(self.clone(), disposer)
    }

    /// A connector, already connected to this source.
    fn connector(&self, default: Self::Value) -> Connector<Self::Value>
    where
        Self::Value: Clone + Send + Sync + 'static,
    {
        let connector = Connector::new(default);
        connector.connect(self.clone());
        connector
    }

    /// Mirrors this source, notifying only when its value actually changes. See
    /// [`Filtered::new`].
    fn filter_changes(
        &self,
        disposer: Option<&dyn Disposer>,
    ) -> Result<Filtered<Self::Value>, FlowError>
    where
        Self::Value: ArcResource + Clone + PartialEq + Send + Sync + 'static,
    {
        Filtered::new(self.clone(), disposer)
    }

    /// Runs `f` with this source's value whenever it changes, for as long as `owner` is alive.
    fn effect(
        &self,
        owner: &Owner,
        f: impl Fn(Self::Value) + Send + Sync + 'static,
    ) -> Effect {
        let source = self.clone();
        Effect::new(owner, move || f(source.get()), &[self])
    }
}

impl<S: Source + Clone> SourceExt for S {}
