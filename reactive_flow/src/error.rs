//! Errors raised when a node is used against its contract.
//!
//! Every variant describes a programming error detected eagerly, at construction or at the
//! first offending call. None of them are retried internally.

use thiserror::Error;

/// A contract violation in the reactive graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The owner already has a live subscription on this notifier.
    #[error("owner already has a subscription on this notifier")]
    DuplicateSubscription,

    /// A value type and its disposer do not agree: Arc-resources require one, plain values
    /// must not have one.
    #[error("resource contract mismatch for `{type_name}`: {reason}")]
    ResourceContractMismatch {
        /// Name of the value type.
        type_name: &'static str,
        /// What was wrong with the supplied disposer.
        reason: &'static str,
    },

    /// The node does not support writing through its named-member access path.
    #[error("`{type_name}` is read-only and cannot set members")]
    UnsupportedMutation {
        /// Name of the node type.
        type_name: &'static str,
    },

    /// The value has no member with this name.
    #[error("no member named `{name}`")]
    UnknownMember {
        /// The requested member name.
        name: String,
    },

    /// The member exists, but the supplied value has a different type.
    #[error("member `{name}` has a different type than the value supplied")]
    MemberTypeMismatch {
        /// The requested member name.
        name: String,
    },
}

impl FlowError {
    pub(crate) fn missing_disposer<T>() -> Self {
        FlowError::ResourceContractMismatch {
            type_name: std::any::type_name::<T>(),
            reason: "Arc-resource values require a disposer",
        }
    }

    pub(crate) fn unexpected_disposer<T>() -> Self {
        FlowError::ResourceContractMismatch {
            type_name: std::any::type_name::<T>(),
            reason: "a disposer cannot be used for plain values",
        }
    }

    pub(crate) fn unsupported_mutation<T: ?Sized>() -> Self {
        FlowError::UnsupportedMutation {
            type_name: std::any::type_name::<T>(),
        }
    }
}
