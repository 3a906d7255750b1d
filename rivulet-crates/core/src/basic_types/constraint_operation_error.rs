use thiserror::Error;

/// Errors related to adding constraints to a [`ConstraintSpace`].
///
/// [`ConstraintSpace`]: crate::engine::ConstraintSpace
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The space was already inconsistent before the constraint was added.
    #[error("Adding constraint failed because the space is in an infeasible state")]
    InfeasibleState,
    /// Posting the constraint led to an inconsistency at the root.
    #[error("Adding the constraint failed because it is infeasible at the root")]
    InfeasiblePropagator,
    /// Constraints can only be added before search has made any decision.
    #[error("Constraints can only be added at the root")]
    NotAtRoot,
}
