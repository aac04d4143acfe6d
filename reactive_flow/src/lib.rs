//! A synchronous value-propagation graph.
//!
//! Nodes in the graph hold or compute values and tell interested parties when those values
//! change. The graph is built from a small number of primitives:
//! 1. **Cells**: stored values, which can be set directly. Setting a value equal to the current
//!    one is a no-op.
//! 2. **Computations**: [`Derived`](computed::Derived) values, recomputed on every read, and
//!    [`Cache`](computed::Cache)s, which memoize an upstream value until it changes.
//! 3. **Connectors**: a [`Connector`](connector::Connector) forwards whichever upstream source it
//!    is currently connected to, and can be rewired at any time.
//! 4. **Chains**: a [`Chain`](chain::Chain) follows a sequence of value-dependent transitions
//!    from a root to a target, and re-resolves the rest of the sequence whenever a link changes.
//! 5. **Effects**: side effects that run whenever an upstream node changes, for as long as their
//!    [`Owner`](owner::Owner) is alive.
//!
//! Notifications carry no payload: they only say that a future read may produce a different
//! result. Values are pulled on read, never pushed on write.
//!
//! ```rust
//! use reactive_flow::{
//!     cell::Cell, effect::Effect, owner::Owner, prelude::*,
//! };
//! use std::sync::{
//!     atomic::{AtomicUsize, Ordering},
//!     Arc,
//! };
//!
//! let owner = Owner::new();
//! let count = Cell::new(1);
//! let double = count.map(|n| n * 2);
//!
//! let runs = Arc::new(AtomicUsize::new(0));
//! Effect::new(
//!     &owner,
//!     {
//!         let runs = Arc::clone(&runs);
//!         move || {
//!             runs.fetch_add(1, Ordering::Relaxed);
//!         }
//!     },
//!     &[&double],
//! );
//!
//! count.set(2);
//! assert_eq!(double.get(), 4);
//! assert_eq!(runs.load(Ordering::Relaxed), 1);
//!
//! // setting an equal value does not notify anyone
//! count.set(2);
//! assert_eq!(runs.load(Ordering::Relaxed), 1);
//! ```
//!
//! ## Subscriptions and lifetimes
//! Every subscription belongs to an *owner*, and is held weakly by it: registering a callback
//! never keeps its owner alive. Once the owner is dropped the callback stops firing, and its
//! entry is pruned the next time the notifier is touched. Each node subscribes to its upstream
//! nodes with itself as the owner, so dropping the last handle to a node detaches it from the
//! graph.
//!
//! ## Threading
//! All propagation is synchronous on the thread that performs a mutation. Each stateful node
//! guards its own state with a lock, and never holds that lock while calling code that can
//! re-enter the graph (upstream reads, subscriber callbacks).

#![deny(missing_docs)]

use std::fmt::Arguments;

pub mod bridge;
pub mod cell;
pub mod chain;
pub mod computed;
pub mod connector;
pub mod effect;
pub mod error;
pub mod ext;
pub mod graph;
pub mod list;
pub mod member;
pub mod owner;
pub mod resource;

/// Reexports frequently-used traits.
pub mod prelude {
    pub use crate::{
        ext::SourceExt,
        graph::{Changeable, Mutable, Source, ToAnyOwner},
        member::MemberAccess,
        owner::Disposer,
        resource::ArcResource,
    };
}

#[doc(hidden)]
pub fn log_warning(text: Arguments) {
    #[cfg(feature = "tracing")]
    {
        tracing::warn!(text);
    }
    #[cfg(not(feature = "tracing"))]
    {
        eprintln!("{}", text);
    }
}
