use std::fmt::Display;
use std::fmt::Formatter;

use thiserror::Error;

use crate::gateway::RemoteId;
use crate::store::Value;
use crate::store::VariableRef;

/// The errors which flow through dataflow variables.
///
/// A thread which encounters one of these while running fails, and every variable it was the sole
/// producer for is put into the failed state carrying the same error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A variable was bound to a value which is incompatible with its existing binding.
    #[error("cannot bind {variable} to {attempted}, it is already bound to {existing}")]
    Conflict {
        variable: VariableRef,
        existing: Value,
        attempted: Value,
    },
    /// A constraint space detected that it has no solutions.
    #[error("constraint space is inconsistent: {reason}")]
    Inconsistency { reason: String },
    /// A configured ceiling was hit.
    #[error("{resource} exhausted (limit {limit})")]
    ResourceExhausted { resource: Resource, limit: usize },
    /// A remote peer failed or sent something which could not be applied.
    #[error("remote reference {remote} failed: {reason}")]
    RemoteFailure { remote: RemoteId, reason: String },
    /// The computation group the producer belonged to was cancelled.
    #[error("computation was cancelled")]
    Cancelled,
    /// A computation gave up with an error of its own.
    #[error("{0}")]
    Raised(String),
}

/// The resources for which the runtime enforces a ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Threads,
    Variables,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Threads => write!(f, "threads"),
            Resource::Variables => write!(f, "variables"),
        }
    }
}
