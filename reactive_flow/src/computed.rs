//! Values computed from other nodes: recomputed on every read ([`Derived`]), memoized until
//! the upstream changes ([`Cache`]), or mirrored with duplicate notifications removed
//! ([`Filtered`]).

mod cache;
mod derived;
mod filtered;

pub use cache::*;
pub use derived::*;
pub use filtered::*;
