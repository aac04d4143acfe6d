//! The Arc-resource contract: values with manual, deterministic use-counting.
//!
//! Nodes that store a value ([`Cell`](crate::cell::Cell), [`Cache`](crate::computed::Cache))
//! check [`ArcResource::IS_ARC`] when they are created. For Arc-resources they
//! [`acquire`](ArcResource::acquire) the value on every read they hand out, and
//! [`dispose`](ArcResource::dispose) values they stop holding. Plain values pass through
//! untouched.
//!
//! ```rust
//! use reactive_flow::{cell::Cell, owner::Owner, prelude::*};
//! use std::sync::{
//!     atomic::{AtomicIsize, Ordering},
//!     Arc,
//! };
//!
//! #[derive(Clone)]
//! struct Texture {
//!     id: u32,
//!     uses: Arc<AtomicIsize>,
//! }
//!
//! impl PartialEq for Texture {
//!     fn eq(&self, other: &Self) -> bool {
//!         self.id == other.id
//!     }
//! }
//!
//! impl ArcResource for Texture {
//!     const IS_ARC: bool = true;
//!
//!     fn acquire(&self) {
//!         self.uses.fetch_add(1, Ordering::SeqCst);
//!     }
//!
//!     fn dispose(&self) {
//!         self.uses.fetch_sub(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let uses = Arc::new(AtomicIsize::new(1));
//! let owner = Owner::new();
//! let texture = Cell::new_with_disposer(
//!     Texture { id: 1, uses: Arc::clone(&uses) },
//!     Some(&owner),
//! )
//! .unwrap();
//!
//! let read = texture.get();
//! assert_eq!(uses.load(Ordering::SeqCst), 2);
//! read.dispose();
//!
//! // tearing down the owner releases the stored value
//! drop(owner);
//! assert_eq!(uses.load(Ordering::SeqCst), 0);
//! ```

use crate::{error::FlowError, owner::Disposer};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    rc::Rc,
    sync::Arc,
};

/// A value type that may need manual acquire/release around storage boundaries.
///
/// Plain values implement this with the defaults. A reference-counted resource sets
/// [`IS_ARC`](ArcResource::IS_ARC) to `true` and implements both methods.
pub trait ArcResource {
    /// Whether values of this type are use-counted resources.
    const IS_ARC: bool = false;

    /// Increments the use count.
    fn acquire(&self) {}

    /// Decrements the use count, freeing the resource when it reaches zero.
    fn dispose(&self) {}
}

/// Checks that a disposer is supplied exactly when `T` is an Arc-resource.
pub(crate) fn check_disposer<T: ArcResource>(
    disposer: Option<&dyn Disposer>,
) -> Result<(), FlowError> {
    match (T::IS_ARC, disposer.is_some()) {
        (true, false) => Err(FlowError::missing_disposer::<T>()),
        (false, true) => Err(FlowError::unexpected_disposer::<T>()),
        _ => Ok(()),
    }
}

pub(crate) fn acquire<T: ArcResource>(value: &T) {
    if T::IS_ARC {
        value.acquire();
    }
}

pub(crate) fn dispose<T: ArcResource>(value: &T) {
    if T::IS_ARC {
        value.dispose();
    }
}

macro_rules! plain {
    ($($ty:ty),* $(,)?) => {
        $(impl ArcResource for $ty {})*
    };
}

plain!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T> ArcResource for Vec<T> {}
impl<T> ArcResource for VecDeque<T> {}
impl<T> ArcResource for Option<T> {}
impl<T: ?Sized> ArcResource for Box<T> {}
impl<T: ?Sized> ArcResource for Arc<T> {}
impl<T: ?Sized> ArcResource for Rc<T> {}
impl<K, V> ArcResource for HashMap<K, V> {}
impl<K, V> ArcResource for BTreeMap<K, V> {}
impl<T> ArcResource for HashSet<T> {}
impl<T: ?Sized + ToOwned> ArcResource for Cow<'static, T> {}

macro_rules! plain_tuple {
    ($($T:ident),*) => {
        impl<$($T,)*> ArcResource for ($($T,)*) {}
    };
}

plain_tuple!(T0, T1);
plain_tuple!(T0, T1, T2);
plain_tuple!(T0, T1, T2, T3);
plain_tuple!(T0, T1, T2, T3, T4);
plain_tuple!(T0, T1, T2, T3, T4, T5);
