//! The constraints which can be added to a [`ConstraintSpace`].
//!
//! A constraint is a relation over variables. In the engine, constraints are enforced through
//! propagators, and a constraint can be viewed as a collection of propagators.
//!
//! # Example
//! ```
//! # use rivulet_core::constraints;
//! # use rivulet_core::constraints::Constraint;
//! # use rivulet_core::engine::ConstraintSpace;
//! let mut space = ConstraintSpace::default();
//!
//! let a = space.new_bounded_integer(0, 3);
//! let b = space.new_bounded_integer(0, 3);
//!
//! constraints::less_than_or_equals([a, b], 2)
//!     .post(&mut space)
//!     .expect("the constraint is satisfiable");
//! ```
mod all_different;
mod arithmetic;
mod boolean;
mod domain;
mod element;

pub use all_different::*;
pub use arithmetic::*;
pub use boolean::*;
pub use domain::*;
pub use element::*;

use crate::basic_types::ConstraintOperationError;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::ConstraintSpace;

/// A relation over variables of a [`ConstraintSpace`].
pub trait Constraint {
    /// Add the [`Constraint`] to the [`ConstraintSpace`].
    ///
    /// This method returns a [`ConstraintOperationError`] if the addition of the [`Constraint`] led
    /// to a root-level inconsistency.
    fn post(self, space: &mut ConstraintSpace) -> Result<(), ConstraintOperationError>;
}

impl<ConcretePropagator> Constraint for ConcretePropagator
where
    ConcretePropagator: PropagatorConstructor + 'static,
{
    fn post(self, space: &mut ConstraintSpace) -> Result<(), ConstraintOperationError> {
        let _ = space.add_propagator(self)?;
        Ok(())
    }
}

impl<C: Constraint> Constraint for Vec<C> {
    fn post(self, space: &mut ConstraintSpace) -> Result<(), ConstraintOperationError> {
        self.into_iter().try_for_each(|c| c.post(space))
    }
}
