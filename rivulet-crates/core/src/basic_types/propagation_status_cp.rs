use crate::engine::EmptyDomain;
use crate::engine::propagation::PropagatorId;

/// The result of invoking a propagator: either the domains were narrowed (possibly not at all)
/// or the propagator found that its constraint cannot be satisfied.
pub type PropagationStatusCP = Result<(), Inconsistency>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A domain update would have removed the last value of a domain.
    EmptyDomain,
    /// The propagator detected a violation without emptying a domain.
    Conflict(PropagatorId),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}
