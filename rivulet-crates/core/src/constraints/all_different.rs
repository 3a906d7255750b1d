use super::Constraint;
use crate::engine::variables::IntegerVariable;
use crate::propagators::AllDifferentPropagatorArgs;

/// Creates the [`Constraint`] that enforces that all the given `variables` are distinct.
pub fn all_different<Var: IntegerVariable + 'static>(
    variables: impl Into<Box<[Var]>>,
) -> impl Constraint {
    AllDifferentPropagatorArgs {
        vars: variables.into(),
    }
}
