use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::engine::variables::IntegerVariable;
use crate::engine::ConstraintSpace;
use crate::propagators::BinaryEqualsPropagatorArgs;
use crate::propagators::BinaryNotEqualsPropagatorArgs;
use crate::propagators::LinearLessOrEqualPropagatorArgs;
use crate::propagators::LinearNotEqualPropagatorArgs;
use crate::propagators::MaximumArgs;

/// Creates the [`Constraint`] `lhs = rhs`.
pub fn equals<Var: IntegerVariable + 'static>(lhs: Var, rhs: Var) -> impl Constraint {
    BinaryEqualsPropagatorArgs { a: lhs, b: rhs }
}

/// Creates the [`Constraint`] `lhs != rhs`.
pub fn not_equals<Var: IntegerVariable + 'static>(lhs: Var, rhs: Var) -> impl Constraint {
    BinaryNotEqualsPropagatorArgs { a: lhs, b: rhs }
}

struct LinearEqualConstraint<Var> {
    terms: Box<[Var]>,
    rhs: i32,
}

impl<Var: IntegerVariable + 'static> Constraint for LinearEqualConstraint<Var> {
    fn post(self, space: &mut ConstraintSpace) -> Result<(), ConstraintOperationError> {
        let negated = self.terms.iter().map(|var| var.scaled(-1)).collect();

        less_than_or_equals(self.terms, self.rhs).post(space)?;
        LinearLessOrEqualPropagatorArgs {
            x: negated,
            c: -self.rhs,
        }
        .post(space)
    }
}

/// Creates the [`Constraint`] `\sum terms_i = rhs`.
pub fn linear_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    LinearEqualConstraint {
        terms: terms.into(),
        rhs,
    }
}

/// Creates the [`Constraint`] `\sum terms_i != rhs`.
pub fn linear_not_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    LinearNotEqualPropagatorArgs {
        terms: terms.into(),
        rhs,
    }
}

/// Creates the [`Constraint`] `\sum terms_i <= rhs`.
pub fn less_than_or_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    LinearLessOrEqualPropagatorArgs {
        x: terms.into(),
        c: rhs,
    }
}

/// Creates the [`Constraint`] `\sum terms_i < rhs`.
pub fn less_than<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    less_than_or_equals(terms, rhs - 1)
}

/// Creates the [`Constraint`] `\sum terms_i >= rhs`.
pub fn greater_than_or_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    let terms: Box<[Var]> = terms.into();
    let negated = terms
        .iter()
        .map(|var| var.scaled(-1))
        .collect::<Box<[_]>>();
    less_than_or_equals(negated, -rhs)
}

/// Creates the [`Constraint`] `max(array) = rhs`.
pub fn maximum<Var: IntegerVariable + 'static>(
    array: impl Into<Box<[Var]>>,
    rhs: impl IntegerVariable + 'static,
) -> impl Constraint {
    MaximumArgs {
        array: array.into(),
        rhs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    #[test]
    fn linear_equality_propagates_both_directions() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 10);
        let y = space.new_bounded_integer(0, 10);

        linear_equals([x, y], 15).post(&mut space).unwrap();

        assert_eq!(5, space.lower_bound(&x));
        assert_eq!(5, space.lower_bound(&y));

        space.new_checkpoint();
        space.apply_decision(predicate!(x <= 6)).unwrap();
        assert!(space.propagate().is_ok());
        assert_eq!(9, space.lower_bound(&y));
    }

    #[test]
    fn greater_than_or_equals_raises_lower_bounds() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 3);
        let y = space.new_bounded_integer(0, 3);

        greater_than_or_equals([x, y], 5).post(&mut space).unwrap();

        assert_eq!(2, space.lower_bound(&x));
        assert_eq!(2, space.lower_bound(&y));
    }

    #[test]
    fn strict_inequality_is_one_tighter() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 10);

        less_than([x], 4).post(&mut space).unwrap();

        assert_eq!(3, space.upper_bound(&x));
    }
}
