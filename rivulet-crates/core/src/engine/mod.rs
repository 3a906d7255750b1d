//! The finite-domain propagation engine.
//!
//! Variables of a [`ConstraintSpace`] have domains stored as sorted interval lists. Propagators
//! watch [`DomainEvent`]s on those domains and are run from a priority queue until a fixpoint is
//! reached or a domain would become empty. Narrowings are recorded on a trail per checkpoint so
//! search can go back to any earlier checkpoint at a cost proportional to what changed since.
mod assignments;
mod constraint_space;
mod domain;
mod domain_events;
pub mod predicates;
pub mod propagation;
mod solution;
mod store_link;
#[cfg(test)]
pub(crate) mod test_space;
pub mod variables;

pub use assignments::Assignments;
pub use assignments::EmptyDomain;
pub use constraint_space::ConstraintSpace;
pub use constraint_space::EngineStatistics;
pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub use solution::Solution;
pub use variables::DomainId;
