use super::Constraint;
use crate::engine::variables::IntegerVariable;
use crate::propagators::ElementArgs;

/// Creates the [`Constraint`] `array[index] = rhs`, where `index` counts from 0.
pub fn element<ElementVar: IntegerVariable + 'static>(
    index: impl IntegerVariable + 'static,
    array: impl Into<Box<[ElementVar]>>,
    rhs: impl IntegerVariable + 'static,
) -> impl Constraint {
    ElementArgs {
        array: array.into(),
        index,
        rhs,
    }
}
