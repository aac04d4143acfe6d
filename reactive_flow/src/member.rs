//! Access to named members of the value held by a node.
//!
//! This is the entry point for binding layers that address values by field name rather than by
//! type. Value types opt in by implementing [`Members`]; nodes expose it through
//! [`MemberAccess`]. Only nodes that can be written to support [`MemberAccess::set_member`];
//! every other node reports [`FlowError::UnsupportedMutation`].
//!
//! ```rust
//! use reactive_flow::{cell::Cell, error::FlowError, member::Members, prelude::*};
//! use std::any::Any;
//!
//! #[derive(Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl ArcResource for Point {}
//!
//! impl Members for Point {
//!     fn read_member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError> {
//!         match name {
//!             "x" => Ok(Box::new(self.x)),
//!             "y" => Ok(Box::new(self.y)),
//!             _ => Err(FlowError::UnknownMember { name: name.to_string() }),
//!         }
//!     }
//!
//!     fn write_member(
//!         &mut self,
//!         name: &str,
//!         value: Box<dyn Any + Send>,
//!     ) -> Result<(), FlowError> {
//!         let slot = match name {
//!             "x" => &mut self.x,
//!             "y" => &mut self.y,
//!             _ => return Err(FlowError::UnknownMember { name: name.to_string() }),
//!         };
//!         *slot = *value
//!             .downcast::<i32>()
//!             .map_err(|_| FlowError::MemberTypeMismatch { name: name.to_string() })?;
//!         Ok(())
//!     }
//! }
//!
//! let point = Cell::new(Point { x: 1, y: 2 });
//! point.set_member("y", Box::new(5)).unwrap();
//! assert_eq!(point.get().y, 5);
//!
//! let y = point.member("y").unwrap();
//! assert_eq!(y.downcast_ref::<i32>(), Some(&5));
//!
//! let sum = point.map(|p| p.x + p.y);
//! assert_eq!(sum.get(), 6);
//! ```

use crate::{
    cell::{Cell, Property},
    chain::Chain,
    computed::{Cache, Derived, Filtered},
    connector::Connector,
    error::FlowError,
    graph::{Changeable, Mutable, Source},
    resource::{self, ArcResource},
};
use std::any::Any;

/// A value type whose members can be read and written by name.
pub trait Members {
    /// Returns a copy of the member called `name`.
    fn read_member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError>;

    /// Replaces the member called `name`.
    ///
    /// Fails with [`FlowError::MemberTypeMismatch`] if `value` is not of the member's type.
    fn write_member(
        &mut self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError>;
}

/// Named-member access on the current value of a node.
pub trait MemberAccess {
    /// Reads the member called `name` of the current value.
    fn member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError>;

    /// Writes the member called `name`, storing the modified value back into the node.
    ///
    /// Read-only nodes fail with [`FlowError::UnsupportedMutation`].
    fn set_member(
        &self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError> {
        _ = (name, value);
        Err(FlowError::unsupported_mutation::<Self>())
    }
}

fn read<S>(source: &S, name: &str) -> Result<Box<dyn Any + Send>, FlowError>
where
    S: Source,
    S::Value: Members + ArcResource,
{
    let value = source.get();
    let member = value.read_member(name);
    resource::dispose(&value);
    member
}

fn write<S>(
    source: &S,
    name: &str,
    value: Box<dyn Any + Send>,
) -> Result<(), FlowError>
where
    S: Mutable,
    S::Value: Members,
{
    let mut current = source.get();
    current.write_member(name, value)?;
    source.set(current);
    Ok(())
}

impl<T> MemberAccess for Cell<T>
where
    T: Members + ArcResource + Clone + PartialEq + Send + Sync + 'static,
{
    fn member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError> {
        read(self, name)
    }

    fn set_member(
        &self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError> {
        write(self, name, value)
    }
}

impl<T> MemberAccess for Property<T>
where
    T: Members + ArcResource + 'static,
{
    fn member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError> {
        read(self, name)
    }

    fn set_member(
        &self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError> {
        write(self, name, value)
    }
}

/// A chain reads and writes the members of its current target.
impl<N> MemberAccess for Chain<N>
where
    N: MemberAccess + Changeable + Clone,
{
    fn member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError> {
        self.target().member(name)
    }

    fn set_member(
        &self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError> {
        self.target().set_member(name, value)
    }
}

macro_rules! read_only {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T> MemberAccess for $ty<T>
            where
                $ty<T>: Source<Value = T>,
                T: Members + ArcResource,
            {
                fn member(
                    &self,
                    name: &str,
                ) -> Result<Box<dyn Any + Send>, FlowError> {
                    read(self, name)
                }
            }
        )*
    };
}

read_only!(Cache, Derived, Filtered, Connector);
