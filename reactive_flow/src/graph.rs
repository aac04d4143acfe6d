//! The change-notification substrate shared by every node in the graph.

mod any_owner;
mod node;
mod notifier;
mod subscribers;

pub use any_owner::*;
pub use node::*;
pub use notifier::*;
pub use subscribers::*;
